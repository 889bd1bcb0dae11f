//! 配置加载
//!
//! 配置文件 `~/.config/agent-notifier/config.json`（JSON 格式），读取优先级：
//! 1. 命令行 `--config <path>`
//! 2. 环境变量 `AGENT_NOTIFIER_CONFIG`
//! 3. 默认路径
//!
//! 文件不存在时使用全部默认值；文件格式错误时记录警告并使用默认值。
//! 加载后只读，整个进程生命周期内不会修改。

use crate::notification::event::EventKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "AGENT_NOTIFIER_CONFIG";

/// 默认通知标题
pub const DEFAULT_TITLE: &str = "OpenCode";

/// 默认宿主 API 地址
pub const DEFAULT_HOST_URL: &str = "http://127.0.0.1:4096";

/// 通知器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifierConfig {
    /// 全局声音开关
    pub sound: bool,
    /// 全局通知开关
    pub notification: bool,
    /// 通知显示时长（秒），小数四舍五入
    #[serde(deserialize_with = "deserialize_timeout")]
    pub timeout: u64,
    /// 标题中是否带项目名
    pub show_project_name: bool,
    /// 宿主窗口有焦点时不打扰
    pub suppress_when_focused: bool,
    /// 焦点检测脚本（退出码 0 表示有焦点）
    pub focus_detection_script: Option<PathBuf>,
    /// 终端初始标题，作为焦点检测脚本的第二个参数
    pub focus_terminal_title: Option<String>,
    /// 宿主 HTTP API 地址
    pub host_url: String,
    /// 内置声音目录（为空时使用可执行文件旁的 `sounds/`）
    pub sounds_dir: Option<PathBuf>,
    /// 外部命令
    pub command: CommandConfig,
    /// 每个事件的开关
    pub events: EventToggles,
    /// 每个事件的消息文本
    pub messages: EventMessages,
    /// 每个事件的自定义声音文件
    pub sounds: EventSounds,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sound: true,
            notification: true,
            timeout: 5,
            show_project_name: true,
            suppress_when_focused: false,
            focus_detection_script: None,
            focus_terminal_title: None,
            host_url: DEFAULT_HOST_URL.to_string(),
            sounds_dir: None,
            command: CommandConfig::default(),
            events: EventToggles::default(),
            messages: EventMessages::default(),
            sounds: EventSounds::default(),
        }
    }
}

/// 时长允许写成整数或小数，负数和非有限值视为 0
fn deserialize_timeout<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs.round() as u64)
    } else {
        Ok(0)
    }
}

/// 外部命令配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandConfig {
    pub enabled: bool,
    /// 可执行文件路径
    pub path: String,
    /// 参数模板，支持 `{event}` 和 `{message}` 占位符
    pub args: Vec<String>,
    /// 距离最后一条用户消息的最短秒数，不足则不执行
    pub min_duration: f64,
}

impl CommandConfig {
    /// 命令是否可执行（已启用且有路径）
    pub fn is_runnable(&self) -> bool {
        self.enabled && !self.path.trim().is_empty()
    }

    /// 需要按耗时过滤时返回最短秒数
    ///
    /// 只有命令可执行且 `min_duration` 为正的有限值时才返回 `Some`。
    pub fn duration_gate(&self) -> Option<f64> {
        if self.is_runnable() && self.min_duration.is_finite() && self.min_duration > 0.0 {
            Some(self.min_duration)
        } else {
            None
        }
    }
}

/// 单个事件的开关
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventToggleRepr")]
pub struct EventToggle {
    pub sound: bool,
    pub notification: bool,
}

impl Default for EventToggle {
    fn default() -> Self {
        Self {
            sound: true,
            notification: true,
        }
    }
}

/// 允许写成 `true/false` 或 `{ "sound": .., "notification": .. }`
#[derive(Deserialize)]
#[serde(untagged)]
enum EventToggleRepr {
    Flag(bool),
    Detailed {
        #[serde(default = "default_true")]
        sound: bool,
        #[serde(default = "default_true")]
        notification: bool,
    },
}

fn default_true() -> bool {
    true
}

impl From<EventToggleRepr> for EventToggle {
    fn from(repr: EventToggleRepr) -> Self {
        match repr {
            EventToggleRepr::Flag(on) => EventToggle {
                sound: on,
                notification: on,
            },
            EventToggleRepr::Detailed {
                sound,
                notification,
            } => EventToggle {
                sound,
                notification,
            },
        }
    }
}

/// 每个事件的开关
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventToggles {
    pub permission: EventToggle,
    pub complete: EventToggle,
    pub subagent_complete: EventToggle,
    pub error: EventToggle,
    pub question: EventToggle,
}

impl EventToggles {
    pub fn get(&self, kind: EventKind) -> &EventToggle {
        match kind {
            EventKind::Permission => &self.permission,
            EventKind::Complete => &self.complete,
            EventKind::SubagentComplete => &self.subagent_complete,
            EventKind::Error => &self.error,
            EventKind::Question => &self.question,
        }
    }
}

/// 每个事件的消息文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMessages {
    pub permission: String,
    pub complete: String,
    pub subagent_complete: String,
    pub error: String,
    pub question: String,
}

impl Default for EventMessages {
    fn default() -> Self {
        Self {
            permission: "Session needs permission".to_string(),
            complete: "Session has finished".to_string(),
            subagent_complete: "Subagent task completed".to_string(),
            error: "Session encountered an error".to_string(),
            question: "Session has a question".to_string(),
        }
    }
}

impl EventMessages {
    pub fn get(&self, kind: EventKind) -> &str {
        match kind {
            EventKind::Permission => &self.permission,
            EventKind::Complete => &self.complete,
            EventKind::SubagentComplete => &self.subagent_complete,
            EventKind::Error => &self.error,
            EventKind::Question => &self.question,
        }
    }
}

/// 每个事件的自定义声音文件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSounds {
    pub permission: Option<PathBuf>,
    pub complete: Option<PathBuf>,
    pub subagent_complete: Option<PathBuf>,
    pub error: Option<PathBuf>,
    pub question: Option<PathBuf>,
}

impl EventSounds {
    pub fn get(&self, kind: EventKind) -> Option<&Path> {
        let path = match kind {
            EventKind::Permission => &self.permission,
            EventKind::Complete => &self.complete,
            EventKind::SubagentComplete => &self.subagent_complete,
            EventKind::Error => &self.error,
            EventKind::Question => &self.question,
        };
        path.as_deref()
    }
}

impl NotifierConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agent-notifier")
            .join("config.json")
    }

    /// 解析实际使用的配置文件路径
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::default_path(),
        }
    }

    /// 加载配置，任何问题都退回默认值
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = Self::resolve_path(explicit);
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// 从指定文件加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config JSON")
    }

    /// 该事件是否发送通知（全局开关且事件开关）
    pub fn is_notification_enabled(&self, kind: EventKind) -> bool {
        self.notification && self.events.get(kind).notification
    }

    /// 该事件是否播放声音（全局开关且事件开关）
    pub fn is_sound_enabled(&self, kind: EventKind) -> bool {
        self.sound && self.events.get(kind).sound
    }

    pub fn message(&self, kind: EventKind) -> &str {
        self.messages.get(kind)
    }

    pub fn sound_path(&self, kind: EventKind) -> Option<&Path> {
        self.sounds.get(kind)
    }

    /// 通知标题
    pub fn notification_title(&self, project_name: Option<&str>) -> String {
        match project_name {
            Some(project) if self.show_project_name && !project.is_empty() => {
                format!("{} - {}", DEFAULT_TITLE, project)
            }
            _ => DEFAULT_TITLE.to_string(),
        }
    }
}
