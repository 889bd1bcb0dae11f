//! Agent Notifier - AI 编码代理事件的桌面通知、提示音和外部命令

pub mod cli;
pub mod config;
pub mod focus;
pub mod notification;
pub mod notify;
pub mod session;

pub use config::{CommandConfig, NotifierConfig};
pub use focus::{FocusOracle, ScriptFocusOracle};
pub use notification::{
    ActionOutcome, CommandRunner, DebounceGate, DispatchReport, EventClassifier, EventKind,
    HostEvent, NotificationDispatcher, NotificationSink, NotifierBuilder, SendResult, SoundSink,
};
pub use notify::Notifier;
pub use session::{HostClient, OpencodeClient, SessionInfo, SessionInspector, SessionMessage};
