//! Agent Notifier CLI
//!
//! 接收 AI 编码代理（OpenCode）的生命周期事件，发送桌面通知、播放提示音、执行外部命令

use agent_notifier::cli::{build_notifier, handle_hook, handle_listen, HookArgs, NotifierArgs};
use agent_notifier::NotifierConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "agent-notify")]
#[command(about = "Agent Notifier - AI 编码代理事件通知")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    notifier: NotifierArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 处理单个事件（JSON，来自 --event 或 stdin）
    Hook(HookArgs),
    /// 从 stdin 持续读取事件（每行一个 JSON）
    Listen,
    /// 输出生效的配置
    Config {
        /// 只输出配置文件路径
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agent_notifier=info,agent_notify=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hook(args) => {
            let notifier = build_notifier(&cli.notifier)?;
            handle_hook(&notifier, args).await?;
        }
        Commands::Listen => {
            let notifier = build_notifier(&cli.notifier)?;
            handle_listen(&notifier).await?;
        }
        Commands::Config { path } => {
            if path {
                let resolved = NotifierConfig::resolve_path(cli.notifier.config.as_deref());
                println!("{}", resolved.display());
            } else {
                let config = cli.notifier.load_config();
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
