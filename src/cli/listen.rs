//! Listen 命令 - 从 stdin 逐行读取事件（JSON Lines）
//!
//! 事件按到达顺序逐个处理，防抖状态在整个进程内保持。

use crate::notification::event::HostEvent;
use crate::notify::Notifier;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// 处理 listen 命令
pub async fn handle_listen(notifier: &Notifier) -> Result<()> {
    info!("Listening for events on stdin");
    let handled = handle_lines(notifier, BufReader::new(tokio::io::stdin())).await?;
    info!(handled, "Input closed, exiting");
    Ok(())
}

/// 逐行处理事件，返回实际分发的事件数
///
/// 空行跳过，非 UTF-8 或无法解析的行记录警告后继续。
pub async fn handle_lines<R>(notifier: &Notifier, mut reader: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut handled = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(error = %e, "Skipping event line with invalid UTF-8");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match HostEvent::parse(line) {
            Ok(event) => {
                if notifier.handle(&event).await.is_some() {
                    handled += 1;
                }
            }
            Err(e) => {
                warn!(error = %e, "Skipping unparseable event line");
                debug!(line = %line, "Unparseable line");
            }
        }
    }

    Ok(handled)
}
