//! 通知分发器 - 判断并触发通知、声音和外部命令
//!
//! 每个事件的处理顺序：
//! 1. 需要按耗时过滤命令时，查询距离最后一条用户消息的秒数
//! 2. 开启了焦点抑制时，以会话标题和终端标题为参数检测宿主是否有焦点
//! 3. 取出该事件的消息文本
//! 4. 耗时不足时跳过命令，否则以 fire-and-forget 方式启动
//! 5. 通知和声音各自经过开关、焦点、防抖判断后并发触发，互不影响
//!
//! 所有失败都在内部记录日志后吞掉，`dispatch` 不会返回错误。

use super::channel::{NotificationSink, SendResult, SoundSink};
use super::command::CommandRunner;
use super::deduplicator::DebounceGate;
use super::event::{EventKind, HostEvent};
use crate::config::NotifierConfig;
use crate::focus::{focus_script_args, FocusOracle};
use crate::session::SessionInspector;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// 单个动作的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// 配置中未启用
    Disabled,
    /// 宿主有焦点，被抑制
    Focused,
    /// 防抖窗口内的重复
    Debounced,
    /// 距离最后一条用户消息的时间不足
    TooSoon { elapsed_secs: f64, min_secs: f64 },
    /// 已交给渠道
    Delivered(SendResult),
    /// 渠道报错
    Failed(String),
    /// 命令已启动（不等待结果）
    Started,
}

/// 一次分发的完整记录
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub kind: EventKind,
    pub focused: bool,
    pub elapsed_secs: Option<f64>,
    pub notification: ActionOutcome,
    pub sound: ActionOutcome,
    pub command: ActionOutcome,
}

/// 耗时不足时跳过命令
///
/// 只有配置了最短时长、耗时已知且严格小于最短时长时才跳过；耗时未知永远不跳过。
pub fn should_skip_command(min_duration: Option<f64>, elapsed_secs: Option<f64>) -> bool {
    match (min_duration, elapsed_secs) {
        (Some(min), Some(elapsed)) => elapsed < min,
        _ => false,
    }
}

/// 把渠道返回值转换为动作结果
fn settle(channel: &str, kind: EventKind, result: Result<SendResult>) -> ActionOutcome {
    match result {
        Ok(SendResult::Failed(reason)) => {
            warn!(channel = %channel, kind = %kind, error = %reason, "Channel delivery failed");
            ActionOutcome::Delivered(SendResult::Failed(reason))
        }
        Ok(result) => ActionOutcome::Delivered(result),
        Err(e) => {
            warn!(channel = %channel, kind = %kind, error = %e, "Channel send failed");
            ActionOutcome::Failed(e.to_string())
        }
    }
}

/// 通知分发器
pub struct NotificationDispatcher {
    config: Arc<NotifierConfig>,
    notifier: Arc<dyn NotificationSink>,
    sound: Arc<dyn SoundSink>,
    command_runner: Arc<dyn CommandRunner>,
    focus: Arc<dyn FocusOracle>,
    sessions: SessionInspector,
    /// 通知防抖，按消息文本
    notification_gate: Mutex<DebounceGate>,
    /// 声音防抖，按事件类型
    sound_gate: Mutex<DebounceGate>,
}

impl NotificationDispatcher {
    pub fn new(
        config: Arc<NotifierConfig>,
        notifier: Arc<dyn NotificationSink>,
        sound: Arc<dyn SoundSink>,
        command_runner: Arc<dyn CommandRunner>,
        focus: Arc<dyn FocusOracle>,
        sessions: SessionInspector,
    ) -> Self {
        Self {
            config,
            notifier,
            sound,
            command_runner,
            focus,
            sessions,
            notification_gate: Mutex::new(DebounceGate::new()),
            sound_gate: Mutex::new(DebounceGate::new()),
        }
    }

    /// 替换防抖闸门（测试用自定义窗口）
    pub fn with_gates(mut self, notification_gate: DebounceGate, sound_gate: DebounceGate) -> Self {
        self.notification_gate = Mutex::new(notification_gate);
        self.sound_gate = Mutex::new(sound_gate);
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// 处理一个已分类的事件
    pub async fn dispatch(
        &self,
        kind: EventKind,
        project_name: Option<&str>,
        event: &HostEvent,
    ) -> DispatchReport {
        let config = &self.config;
        let min_duration = config.command.duration_gate();

        // 1. 耗时（仅在需要时查询）
        let elapsed_secs = match (min_duration, event.session_id()) {
            (Some(_), Some(session_id)) => self.sessions.elapsed_seconds(session_id).await,
            _ => None,
        };

        // 2. 焦点
        let focused = if config.suppress_when_focused {
            self.check_focus(event).await
        } else {
            false
        };

        // 3. 消息
        let message = config.message(kind);

        // 4. 命令先启动，不受通知和声音耗时影响
        let command = self.trigger_command(kind, message, min_duration, elapsed_secs);

        // 5. 通知和声音并发
        let notification = self.trigger_notification(kind, project_name, message, focused);
        let sound = self.trigger_sound(kind, focused);
        let (notification, sound) = tokio::join!(notification, sound);

        let report = DispatchReport {
            kind,
            focused,
            elapsed_secs,
            notification,
            sound,
            command,
        };
        debug!(?report, "Dispatch finished");
        report
    }

    /// 会话标题只在配置了脚本时才查询
    async fn check_focus(&self, event: &HostEvent) -> bool {
        let script = self.config.focus_detection_script.as_deref();
        let session_title = match (script, event.session_id()) {
            (Some(_), Some(session_id)) => self.sessions.session_title(session_id).await,
            _ => None,
        };
        let args = focus_script_args(
            session_title.as_deref(),
            self.config.focus_terminal_title.as_deref(),
        );
        self.focus.is_focused(script, &args).await
    }

    async fn trigger_notification(
        &self,
        kind: EventKind,
        project_name: Option<&str>,
        message: &str,
        focused: bool,
    ) -> ActionOutcome {
        if !self.config.is_notification_enabled(kind) {
            return ActionOutcome::Disabled;
        }
        if focused {
            debug!(kind = %kind, "Host is focused, notification suppressed");
            return ActionOutcome::Focused;
        }

        let title = self.config.notification_title(project_name);
        if !self.gate_passes(&self.notification_gate, message) {
            return ActionOutcome::Debounced;
        }

        info!(kind = %kind, title = %title, "Sending notification");
        let result = self
            .notifier
            .notify(&title, message, self.config.timeout)
            .await;
        settle(self.notifier.name(), kind, result)
    }

    async fn trigger_sound(&self, kind: EventKind, focused: bool) -> ActionOutcome {
        if !self.config.is_sound_enabled(kind) {
            return ActionOutcome::Disabled;
        }
        if focused {
            debug!(kind = %kind, "Host is focused, sound suppressed");
            return ActionOutcome::Focused;
        }
        if !self.gate_passes(&self.sound_gate, kind.as_str()) {
            return ActionOutcome::Debounced;
        }

        debug!(kind = %kind, "Playing sound");
        let result = self.sound.play(kind, self.config.sound_path(kind)).await;
        settle(self.sound.name(), kind, result)
    }

    fn trigger_command(
        &self,
        kind: EventKind,
        message: &str,
        min_duration: Option<f64>,
        elapsed_secs: Option<f64>,
    ) -> ActionOutcome {
        let command = &self.config.command;
        if !command.is_runnable() {
            return ActionOutcome::Disabled;
        }

        if should_skip_command(min_duration, elapsed_secs) {
            let (min_secs, elapsed_secs) = (min_duration.unwrap_or(0.0), elapsed_secs.unwrap_or(0.0));
            debug!(kind = %kind, elapsed_secs, min_secs, "Command skipped, session too short");
            return ActionOutcome::TooSoon {
                elapsed_secs,
                min_secs,
            };
        }

        self.command_runner.run(command, kind, message);
        ActionOutcome::Started
    }

    /// 锁只在检查期间持有，不跨 await
    fn gate_passes(&self, gate: &Mutex<DebounceGate>, key: &str) -> bool {
        match gate.lock() {
            Ok(mut gate) => gate.should_trigger(key),
            Err(poisoned) => poisoned.into_inner().should_trigger(key),
        }
    }
}
