//! 事件定义
//!
//! `EventKind` 是内部事件类型（决定使用哪条配置和消息模板），
//! `HostEvent` 是宿主进程推送的原始事件，在入口处一次性解码。
//! 宿主协议会演进（旧的 `permission.updated` 和新的 `permission.asked`），
//! 不认识的事件类型统一落到 `Unrecognized`，不会报错。

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 内部事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 需要用户授权
    Permission,
    /// 根会话完成
    Complete,
    /// 子会话（subagent）完成
    SubagentComplete,
    /// 会话出错
    Error,
    /// 需要用户回答问题
    Question,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Permission,
        EventKind::Complete,
        EventKind::SubagentComplete,
        EventKind::Error,
        EventKind::Question,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Permission => "permission",
            EventKind::Complete => "complete",
            EventKind::SubagentComplete => "subagent_complete",
            EventKind::Error => "error",
            EventKind::Question => "question",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 宿主推送的原始事件
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// 旧版权限事件 `permission.updated`
    PermissionUpdated { session_id: Option<String> },
    /// 新版权限事件 `permission.asked`
    PermissionAsked { session_id: Option<String> },
    /// `session.idle`
    SessionIdle { session_id: Option<String> },
    /// `session.error`
    SessionError { session_id: Option<String> },
    /// `tool.execute.before`
    ToolExecuteBefore {
        tool: String,
        session_id: Option<String>,
    },
    /// 显式的 `permission.ask` hook，没有事件载荷
    PermissionAskHook,
    /// 无法识别的事件，忽略
    Unrecognized { event_type: String },
}

impl HostEvent {
    /// 解析一条 JSON 事件
    ///
    /// 只有输入不是 JSON 对象时才返回错误；类型未知或字段缺失都会被容忍。
    pub fn parse(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload.trim())?;
        if !value.is_object() {
            return Err(anyhow!("event payload is not a JSON object"));
        }
        Ok(Self::from_value(&value))
    }

    /// 从 JSON 值解码
    pub fn from_value(value: &Value) -> Self {
        let event_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let session_id = session_id_of(value);

        match event_type.as_str() {
            "permission.updated" => HostEvent::PermissionUpdated { session_id },
            "permission.asked" => HostEvent::PermissionAsked { session_id },
            "session.idle" => HostEvent::SessionIdle { session_id },
            "session.error" => HostEvent::SessionError { session_id },
            "tool.execute.before" => HostEvent::ToolExecuteBefore {
                tool: field_str(value, "tool").unwrap_or_default(),
                session_id,
            },
            "permission.ask" => HostEvent::PermissionAskHook,
            _ => HostEvent::Unrecognized { event_type },
        }
    }

    /// 事件携带的会话 ID（如果有）
    pub fn session_id(&self) -> Option<&str> {
        match self {
            HostEvent::PermissionUpdated { session_id }
            | HostEvent::PermissionAsked { session_id }
            | HostEvent::SessionIdle { session_id }
            | HostEvent::SessionError { session_id }
            | HostEvent::ToolExecuteBefore { session_id, .. } => session_id.as_deref(),
            HostEvent::PermissionAskHook | HostEvent::Unrecognized { .. } => None,
        }
    }

    /// 事件名（用于日志）
    pub fn name(&self) -> &str {
        match self {
            HostEvent::PermissionUpdated { .. } => "permission.updated",
            HostEvent::PermissionAsked { .. } => "permission.asked",
            HostEvent::SessionIdle { .. } => "session.idle",
            HostEvent::SessionError { .. } => "session.error",
            HostEvent::ToolExecuteBefore { .. } => "tool.execute.before",
            HostEvent::PermissionAskHook => "permission.ask",
            HostEvent::Unrecognized { event_type } => event_type,
        }
    }
}

/// 先找 `properties.<key>`，再找顶层 `<key>`
fn field_str(value: &Value, key: &str) -> Option<String> {
    value
        .get("properties")
        .and_then(|p| p.get(key))
        .or_else(|| value.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn session_id_of(value: &Value) -> Option<String> {
    field_str(value, "sessionID")
        .or_else(|| field_str(value, "session_id"))
        .or_else(|| {
            // permission 事件把 sessionID 放在 properties.info 里
            value
                .get("properties")
                .and_then(|p| p.get("info"))
                .and_then(|i| i.get("sessionID"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        })
        .filter(|s| !s.is_empty())
}
