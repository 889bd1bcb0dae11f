//! 输出渠道 trait 定义
//!
//! 桌面通知和声音是两个独立的渠道，各自实现自己的 trait。
//! 去重由调用方负责，渠道只管投递。

use super::event::EventKind;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run、没有可播放的文件等）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 桌面通知渠道
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 显示一条系统通知
    async fn notify(&self, title: &str, message: &str, timeout_secs: u64) -> Result<SendResult>;
}

/// 声音渠道
#[async_trait]
pub trait SoundSink: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 播放事件对应的声音，`custom_path` 优先
    async fn play(&self, kind: EventKind, custom_path: Option<&Path>) -> Result<SendResult>;
}
