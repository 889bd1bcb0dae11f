//! Hook 命令 - 处理单个宿主事件后退出

use crate::notification::event::HostEvent;
use crate::notify::Notifier;
use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use tracing::{info, warn};

/// Hook 命令参数
#[derive(Args, Debug, Clone, Default)]
pub struct HookArgs {
    /// 事件 JSON（不指定时从 stdin 读取）
    #[arg(long)]
    pub event: Option<String>,
}

/// 读取事件载荷：优先使用参数，其次 stdin
fn read_payload(args: &HookArgs) -> Result<Vec<u8>> {
    match &args.event {
        Some(payload) => Ok(payload.clone().into_bytes()),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read event from stdin")?;
            Ok(buf)
        }
    }
}

/// 解码并解析事件，失败时记录警告并返回 `None`
fn decode_event(payload: &[u8]) -> Option<HostEvent> {
    let text = match std::str::from_utf8(payload) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Ignoring event payload with invalid UTF-8");
            return None;
        }
    };

    match HostEvent::parse(text) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable event payload");
            None
        }
    }
}

/// 处理 hook 命令
///
/// 无法解码或解析的事件只记录警告，不会让宿主的 hook 失败。
pub async fn handle_hook(notifier: &Notifier, args: HookArgs) -> Result<()> {
    let payload = read_payload(&args)?;
    let Some(event) = decode_event(&payload) else {
        return Ok(());
    };

    if let Some(report) = notifier.handle(&event).await {
        info!(
            kind = %report.kind,
            notification = ?report.notification,
            sound = ?report.sound,
            command = ?report.command,
            "Event handled"
        );
    }

    Ok(())
}
