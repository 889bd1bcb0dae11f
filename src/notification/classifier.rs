//! 事件分类 - 把宿主事件映射为内部事件类型
//!
//! | 宿主事件 | 内部类型 |
//! |---|---|
//! | `permission.updated` / `permission.asked` / `permission.ask` | `permission` |
//! | `session.idle`（根会话或拿不到会话 ID） | `complete` |
//! | `session.idle`（子会话） | `subagent_complete` |
//! | `session.error` | `error` |
//! | `tool.execute.before` 且工具为 `question` | `question` |

use super::event::{EventKind, HostEvent};
use crate::session::SessionInspector;

/// 触发 question 事件的工具名
pub const QUESTION_TOOL: &str = "question";

/// 事件分类器
#[derive(Clone)]
pub struct EventClassifier {
    sessions: SessionInspector,
}

impl EventClassifier {
    pub fn new(sessions: SessionInspector) -> Self {
        Self { sessions }
    }

    /// 返回匹配的内部事件类型，不关心的事件返回 `None`
    pub async fn classify(&self, event: &HostEvent) -> Option<EventKind> {
        match event {
            HostEvent::PermissionUpdated { .. }
            | HostEvent::PermissionAsked { .. }
            | HostEvent::PermissionAskHook => Some(EventKind::Permission),
            HostEvent::SessionIdle { session_id } => match session_id {
                Some(id) if self.sessions.is_child_session(id).await => {
                    Some(EventKind::SubagentComplete)
                }
                _ => Some(EventKind::Complete),
            },
            HostEvent::SessionError { .. } => Some(EventKind::Error),
            HostEvent::ToolExecuteBefore { tool, .. } if tool == QUESTION_TOOL => {
                Some(EventKind::Question)
            }
            HostEvent::ToolExecuteBefore { .. } | HostEvent::Unrecognized { .. } => None,
        }
    }
}
