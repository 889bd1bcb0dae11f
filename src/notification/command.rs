//! 外部命令 - 事件触发时执行用户配置的命令
//!
//! 参数中的 `{event}` 和 `{message}` 会被替换。
//! 命令以 fire-and-forget 方式执行：启动后交给一个独立的 tokio 任务等待退出，
//! 退出状态只记录日志，不会返回给调用方。

use crate::config::CommandConfig;
use crate::notification::event::EventKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// 命令执行接口
pub trait CommandRunner: Send + Sync {
    /// 启动命令，不等待结果
    fn run(&self, config: &CommandConfig, kind: EventKind, message: &str);
}

/// 替换参数模板中的占位符
pub fn render_args(args: &[String], kind: EventKind, message: &str) -> Vec<String> {
    args.iter()
        .map(|arg| {
            arg.replace("{event}", kind.as_str())
                .replace("{message}", message)
        })
        .collect()
}

/// 以子进程方式执行命令
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    /// 需要在 tokio runtime 内调用
    fn run(&self, config: &CommandConfig, kind: EventKind, message: &str) {
        let args = render_args(&config.args, kind, message);

        let child = Command::new(&config.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %config.path, error = %e, "Failed to launch command");
                return;
            }
        };

        info!(command = %config.path, kind = %kind, "Command started");

        let command = config.path.clone();
        // 分离的等待任务，结果只进日志
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!(command = %command, "Command finished");
                }
                Ok(status) => {
                    warn!(command = %command, status = %status, "Command exited with failure");
                }
                Err(e) => {
                    warn!(command = %command, error = %e, "Failed to wait for command");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args() {
        let args = vec![
            "--kind={event}".to_string(),
            "{message}".to_string(),
            "static".to_string(),
        ];
        assert_eq!(
            render_args(&args, EventKind::SubagentComplete, "Subagent task completed"),
            vec![
                "--kind=subagent_complete",
                "Subagent task completed",
                "static"
            ]
        );
    }

    #[test]
    fn test_render_args_message_not_reinterpreted() {
        // 消息中出现的占位符不会被二次替换
        let args = vec!["{message}".to_string()];
        assert_eq!(
            render_args(&args, EventKind::Error, "literal {event}"),
            vec!["literal {event}"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let config = CommandConfig {
            enabled: true,
            path: "/bin/sh".to_string(),
            args: vec![
                "-c".to_string(),
                format!("echo \"$0\" > {}", out.display()),
                "{event}".to_string(),
            ],
            min_duration: 0.0,
        };

        ProcessCommandRunner.run(&config, EventKind::Complete, "done");

        for _ in 0..50 {
            if std::fs::read_to_string(&out).map(|s| !s.is_empty()).unwrap_or(false) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "complete");
    }

    #[tokio::test]
    async fn test_runner_launch_failure_is_swallowed() {
        let config = CommandConfig {
            enabled: true,
            path: "/nonexistent/agent-notifier-hook".to_string(),
            args: vec![],
            min_duration: 0.0,
        };
        ProcessCommandRunner.run(&config, EventKind::Error, "boom");
    }
}
