//! 防抖闸门 - 防止同一个 key 在短时间内重复触发
//!
//! 通知按消息文本去重，声音按事件类型去重，两者各用一个独立实例。
//! 第一次出现的 key 总是放行；窗口内的重复被抑制且不刷新记录。
//! 记录不会过期清理，只会被覆盖（key 的数量受消息模板和事件类型限制）。

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// 默认防抖窗口
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1000);

/// 防抖闸门
#[derive(Debug)]
pub struct DebounceGate {
    /// key -> 上次成功触发的时间
    last_trigger: HashMap<String, Instant>,
    /// 防抖窗口
    window: Duration,
}

impl DebounceGate {
    /// 创建默认 1000ms 窗口的闸门
    pub fn new() -> Self {
        Self::with_window(DEBOUNCE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            last_trigger: HashMap::new(),
            window,
        }
    }

    /// 检查并记录（使用当前时间）
    pub fn should_trigger(&mut self, key: &str) -> bool {
        self.should_trigger_at(key, Instant::now())
    }

    /// 检查并记录（指定时间，用于测试）
    ///
    /// 返回 `true` 时把 `now` 记为该 key 的最近触发时间；
    /// 返回 `false` 时记录保持不变。
    pub fn should_trigger_at(&mut self, key: &str, now: Instant) -> bool {
        if let Some(last) = self.last_trigger.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.window {
                debug!(
                    key = %key,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Debounced repeat trigger"
                );
                return false;
            }
        }

        self.last_trigger.insert(key.to_string(), now);
        true
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 已记录的 key 数量
    pub fn len(&self) -> usize {
        self.last_trigger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_trigger.is_empty()
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new()
    }
}
