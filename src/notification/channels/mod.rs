//! 渠道实现

pub mod desktop;
pub mod dry_run;
pub mod sound;

#[cfg(not(target_os = "macos"))]
pub use desktop::NativeSink;
pub use desktop::{desktop_sink, OsascriptSink};
pub use dry_run::{DryRunCommandRunner, DryRunSink};
pub use sound::PlayerSoundSink;

use anyhow::{bail, Context, Result};
use std::process::Stdio;
use tokio::process::Command;

/// 运行外部命令并等待退出，不连接任何 stdio
///
/// 退出码非 0 视为失败。
pub(crate) async fn run_quiet<S: AsRef<str>>(program: &str, args: &[S]) -> Result<()> {
    let status = Command::new(program)
        .args(args.iter().map(|a| a.as_ref()))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .with_context(|| format!("failed to launch {}", program))?;

    if !status.success() {
        bail!("{} exited with {}", program, status);
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_quiet_success() {
        assert!(run_quiet("true", &[] as &[&str]).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_quiet_nonzero_exit() {
        let err = run_quiet("false", &[] as &[&str]).await.unwrap_err();
        assert!(err.to_string().contains("false exited"));
    }

    #[tokio::test]
    async fn test_run_quiet_missing_program() {
        let err = run_quiet("agent-notifier-no-such-program", &["x"]).await.unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }
}
