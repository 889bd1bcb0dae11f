//! 焦点检测 - 判断宿主应用当前是否拥有用户焦点
//!
//! 检测逻辑交给外部脚本：退出码 0 表示有焦点，其他情况一律视为没有焦点。
//! 脚本参数为 `<会话标题> [终端初始标题]`，会话标题未知时传空字符串。
//! 未配置脚本或脚本不存在时直接返回 `false`，不启动任何进程。

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// 焦点检测接口
#[async_trait]
pub trait FocusOracle: Send + Sync {
    /// 宿主是否有焦点（失败时返回 false）
    async fn is_focused(&self, script_path: Option<&Path>, args: &[String]) -> bool;
}

/// 通过外部脚本检测焦点
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptFocusOracle;

#[async_trait]
impl FocusOracle for ScriptFocusOracle {
    async fn is_focused(&self, script_path: Option<&Path>, args: &[String]) -> bool {
        is_focused(script_path, args).await
    }
}

/// 焦点检测脚本的参数
pub fn focus_script_args(session_title: Option<&str>, terminal_title: Option<&str>) -> Vec<String> {
    let mut args = vec![session_title.unwrap_or_default().to_string()];
    if let Some(title) = terminal_title.filter(|t| !t.is_empty()) {
        args.push(title.to_string());
    }
    args
}

/// 运行焦点检测脚本
///
/// 没有超时：脚本卡住会阻塞当前事件的处理。
pub async fn is_focused(script_path: Option<&Path>, args: &[String]) -> bool {
    let Some(script) = script_path else {
        return false;
    };

    if !script.exists() {
        debug!(script = %script.display(), "Focus detection script not found");
        return false;
    }

    let status = Command::new(script)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => {
            debug!(script = %script.display(), code = ?status.code(), "Focus check finished");
            status.success()
        }
        Err(e) => {
            debug!(script = %script.display(), error = %e, "Failed to run focus detection script");
            false
        }
    }
}

/// 固定返回值的焦点检测
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedFocus(pub bool);

#[cfg(test)]
#[async_trait]
impl FocusOracle for FixedFocus {
    async fn is_focused(&self, _script_path: Option<&Path>, _args: &[String]) -> bool {
        self.0
    }
}

/// 测试辅助：在目录下写一个可执行的 sh 脚本
#[cfg(all(test, unix))]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// 测试辅助：以指定退出码结束的脚本
#[cfg(all(test, unix))]
pub(crate) fn write_exit_script(dir: &Path, name: &str, code: i32) -> std::path::PathBuf {
    write_script(dir, name, &format!("exit {}", code))
}
