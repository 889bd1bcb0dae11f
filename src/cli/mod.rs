//! CLI command handling

pub mod hook;
pub mod listen;

pub use hook::*;
pub use listen::*;

use crate::config::NotifierConfig;
use crate::notification::NotifierBuilder;
use crate::notify::{project_name_from_dir, Notifier};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// 所有事件处理命令共用的参数
#[derive(Args, Debug, Clone, Default)]
pub struct NotifierArgs {
    /// 配置文件路径（默认 ~/.config/agent-notifier/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 项目目录，目录名作为通知标题中的项目名（默认当前目录）
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,

    /// Dry-run 模式（只记录将要执行的动作）
    #[arg(long, global = true)]
    pub dry_run: bool,
}

impl NotifierArgs {
    pub fn load_config(&self) -> NotifierConfig {
        NotifierConfig::load(self.config.as_deref())
    }

    pub fn project_name(&self) -> Option<String> {
        let dir = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().ok()?,
        };
        project_name_from_dir(&dir)
    }
}

/// 按命令行参数构建通知器
pub fn build_notifier(args: &NotifierArgs) -> Result<Notifier> {
    NotifierBuilder::new(args.load_config())
        .project_name(args.project_name())
        .dry_run(args.dry_run)
        .build()
}
