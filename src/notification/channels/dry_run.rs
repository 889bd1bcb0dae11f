//! Dry-run 渠道 - 只打印将要执行的动作

use crate::config::CommandConfig;
use crate::notification::channel::{NotificationSink, SendResult, SoundSink};
use crate::notification::command::{render_args, CommandRunner};
use crate::notification::event::EventKind;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// 替代通知和声音渠道
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

#[async_trait]
impl NotificationSink for DryRunSink {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn notify(&self, title: &str, message: &str, timeout_secs: u64) -> Result<SendResult> {
        info!(title = %title, message = %message, timeout_secs, "[DRY-RUN] Would show notification");
        Ok(SendResult::Skipped("dry-run".to_string()))
    }
}

#[async_trait]
impl SoundSink for DryRunSink {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn play(&self, kind: EventKind, custom_path: Option<&Path>) -> Result<SendResult> {
        info!(kind = %kind, custom_path = ?custom_path, "[DRY-RUN] Would play sound");
        Ok(SendResult::Skipped("dry-run".to_string()))
    }
}

/// 替代命令执行
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunCommandRunner;

impl CommandRunner for DryRunCommandRunner {
    fn run(&self, config: &CommandConfig, kind: EventKind, message: &str) {
        let args = render_args(&config.args, kind, message);
        info!(command = %config.path, args = ?args, "[DRY-RUN] Would run command");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_skips() {
        let sink = DryRunSink;
        assert_eq!(
            sink.notify("t", "m", 5).await.unwrap(),
            SendResult::Skipped("dry-run".to_string())
        );
        assert_eq!(
            SoundSink::play(&sink, EventKind::Error, None).await.unwrap(),
            SendResult::Skipped("dry-run".to_string())
        );
    }
}
