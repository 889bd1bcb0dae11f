//! 通知器构建器 - 按配置装配各个组件

use super::channel::{NotificationSink, SoundSink};
use super::channels::sound::default_sounds_dir;
use super::channels::{desktop_sink, DryRunCommandRunner, DryRunSink, PlayerSoundSink};
use super::classifier::EventClassifier;
use super::command::{CommandRunner, ProcessCommandRunner};
use super::dispatcher::NotificationDispatcher;
use crate::config::NotifierConfig;
use crate::focus::{FocusOracle, ScriptFocusOracle};
use crate::notify::Notifier;
use crate::session::{HostClient, OpencodeClient, SessionInspector};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// 通知器构建器
pub struct NotifierBuilder {
    config: Arc<NotifierConfig>,
    project_name: Option<String>,
    dry_run: bool,
    notifier: Option<Arc<dyn NotificationSink>>,
    sound: Option<Arc<dyn SoundSink>>,
    command_runner: Option<Arc<dyn CommandRunner>>,
    focus: Option<Arc<dyn FocusOracle>>,
    host: Option<Arc<dyn HostClient>>,
}

impl NotifierBuilder {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config: Arc::new(config),
            project_name: None,
            dry_run: false,
            notifier: None,
            sound: None,
            command_runner: None,
            focus: None,
            host: None,
        }
    }

    /// 设置项目名（用于通知标题）
    pub fn project_name(mut self, name: Option<String>) -> Self {
        self.project_name = name;
        self
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(sink);
        self
    }

    pub fn sound_sink(mut self, sink: Arc<dyn SoundSink>) -> Self {
        self.sound = Some(sink);
        self
    }

    pub fn command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.command_runner = Some(runner);
        self
    }

    pub fn focus_oracle(mut self, focus: Arc<dyn FocusOracle>) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn host_client(mut self, host: Arc<dyn HostClient>) -> Self {
        self.host = Some(host);
        self
    }

    /// 构建通知器，未指定的组件按平台和配置选择默认实现
    pub fn build(self) -> Result<Notifier> {
        let config = self.config;
        let dry_run = self.dry_run;

        let notifier: Arc<dyn NotificationSink> = match self.notifier {
            Some(sink) => sink,
            None if dry_run => Arc::new(DryRunSink),
            None => desktop_sink(),
        };

        let sound: Arc<dyn SoundSink> = match self.sound {
            Some(sink) => sink,
            None if dry_run => Arc::new(DryRunSink),
            None => {
                let dir = config.sounds_dir.clone().unwrap_or_else(default_sounds_dir);
                Arc::new(PlayerSoundSink::new(dir))
            }
        };

        let command_runner: Arc<dyn CommandRunner> = match self.command_runner {
            Some(runner) => runner,
            None if dry_run => Arc::new(DryRunCommandRunner),
            None => Arc::new(ProcessCommandRunner),
        };

        let focus: Arc<dyn FocusOracle> = match self.focus {
            Some(focus) => focus,
            None => Arc::new(ScriptFocusOracle),
        };

        let host: Arc<dyn HostClient> = match self.host {
            Some(host) => host,
            None => Arc::new(OpencodeClient::new(config.host_url.clone())?),
        };

        info!(
            notifier = notifier.name(),
            sound = sound.name(),
            host_url = %config.host_url,
            dry_run,
            "Notifier ready"
        );

        let sessions = SessionInspector::new(host);
        let dispatcher = NotificationDispatcher::new(
            config,
            notifier,
            sound,
            command_runner,
            focus,
            sessions.clone(),
        );

        Ok(Notifier::new(
            EventClassifier::new(sessions),
            dispatcher,
            self.project_name,
        ))
    }
}
