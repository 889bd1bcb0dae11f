//! 通知层 - 事件分类、过滤与分发
//!
//! # 组成
//! 1. `event`: 宿主事件解码和内部事件类型
//! 2. `classifier`: 宿主事件 -> 内部事件类型
//! 3. `dispatcher`: 焦点、防抖、耗时判断后并发触发通知和声音，再启动外部命令
//! 4. `channels`: 各平台的通知和声音实现
//!
//! # 使用示例
//! ```ignore
//! use agent_notifier::{NotifierBuilder, NotifierConfig, HostEvent};
//!
//! let notifier = NotifierBuilder::new(NotifierConfig::load(None)).build()?;
//! let event = HostEvent::parse(r#"{"type":"session.idle","properties":{"sessionID":"s1"}}"#)?;
//! notifier.handle(&event).await;
//! ```

pub mod builder;
pub mod channel;
pub mod channels;
pub mod classifier;
pub mod command;
pub mod deduplicator;
pub mod dispatcher;
pub mod event;

pub use builder::NotifierBuilder;
pub use channel::{NotificationSink, SendResult, SoundSink};
pub use classifier::EventClassifier;
pub use command::{CommandRunner, ProcessCommandRunner};
pub use deduplicator::{DebounceGate, DEBOUNCE_WINDOW};
pub use dispatcher::{should_skip_command, ActionOutcome, DispatchReport, NotificationDispatcher};
pub use event::{EventKind, HostEvent};
