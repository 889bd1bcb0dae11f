//! 桌面通知渠道
//!
//! 启动时由 `desktop_sink()` 选定实现：
//! - macOS: `osascript -e 'display notification ...'`
//! - 其他平台: `notify-rust`（Linux / BSD 走 D-Bus，Windows 走 toast）

use super::run_quiet;
use crate::notification::channel::{NotificationSink, SendResult};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 通知中显示的应用名
const APP_NAME: &str = "agent-notifier";

/// 显示时长换算为毫秒
fn timeout_millis(timeout_secs: u64) -> u32 {
    u32::try_from(timeout_secs.saturating_mul(1000)).unwrap_or(u32::MAX)
}

/// Linux / BSD / Windows: 通过 `notify-rust` 发送原生通知
#[cfg(not(target_os = "macos"))]
#[derive(Debug, Default, Clone)]
pub struct NativeSink;

#[cfg(not(target_os = "macos"))]
#[async_trait]
impl NotificationSink for NativeSink {
    fn name(&self) -> &str {
        "notify-rust"
    }

    async fn notify(&self, title: &str, message: &str, timeout_secs: u64) -> Result<SendResult> {
        use notify_rust::{Notification, Timeout};

        let title = title.to_string();
        let message = message.to_string();
        let timeout = timeout_millis(timeout_secs);

        // show() 在 Linux 上会同步等待 D-Bus 回复
        tokio::task::spawn_blocking(move || {
            Notification::new()
                .appname(APP_NAME)
                .summary(&title)
                .body(&message)
                .timeout(Timeout::Milliseconds(timeout))
                .show()
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!("desktop notification failed: {}", e))
        })
        .await??;

        debug!(sink = "notify-rust", "Notification shown");
        Ok(SendResult::Sent)
    }
}

/// macOS: AppleScript `display notification`
///
/// 系统通知中心自己管理显示时长，timeout 被忽略。
#[derive(Debug, Default, Clone)]
pub struct OsascriptSink;

impl OsascriptSink {
    fn script(title: &str, message: &str) -> String {
        format!(
            "display notification \"{}\" with title \"{}\"",
            escape_applescript(message),
            escape_applescript(title)
        )
    }
}

#[async_trait]
impl NotificationSink for OsascriptSink {
    fn name(&self) -> &str {
        "osascript"
    }

    async fn notify(&self, title: &str, message: &str, _timeout_secs: u64) -> Result<SendResult> {
        let script = Self::script(title, message);
        run_quiet("osascript", &["-e", script.as_str()]).await?;
        debug!(sink = "osascript", "Notification shown");
        Ok(SendResult::Sent)
    }
}

/// 反斜杠必须最先替换
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// 选择当前平台的通知渠道
#[cfg(target_os = "macos")]
pub fn desktop_sink() -> Arc<dyn NotificationSink> {
    Arc::new(OsascriptSink)
}

/// 选择当前平台的通知渠道
#[cfg(not(target_os = "macos"))]
pub fn desktop_sink() -> Arc<dyn NotificationSink> {
    Arc::new(NativeSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_millis() {
        assert_eq!(timeout_millis(5), 5000);
        assert_eq!(timeout_millis(0), 0);
        assert_eq!(timeout_millis(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_applescript_escaping() {
        let script = OsascriptSink::script("My \"App\"", r#"path C:\tmp "quoted""#);
        assert_eq!(
            script,
            r#"display notification "path C:\\tmp \"quoted\"" with title "My \"App\"""#
        );
    }

    #[test]
    fn test_applescript_escapes_line_breaks() {
        assert_eq!(escape_applescript("line1\nline2\r"), r"line1\nline2\r");
    }

    #[test]
    fn test_desktop_sink_matches_platform() {
        let sink = desktop_sink();
        if cfg!(target_os = "macos") {
            assert_eq!(sink.name(), "osascript");
        } else {
            assert_eq!(sink.name(), "notify-rust");
        }
    }
}
