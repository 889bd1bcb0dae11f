//! 通知器 - 事件处理入口
//!
//! 解码后的宿主事件先经过 `EventClassifier` 分类，
//! 匹配到内部事件类型后交给 `NotificationDispatcher`。

use crate::notification::classifier::EventClassifier;
use crate::notification::dispatcher::{DispatchReport, NotificationDispatcher};
use crate::notification::event::HostEvent;
use std::path::Path;
use tracing::{debug, info};

/// 通知器
pub struct Notifier {
    classifier: EventClassifier,
    dispatcher: NotificationDispatcher,
    /// 项目名（工作目录的最后一段）
    project_name: Option<String>,
}

impl Notifier {
    pub fn new(
        classifier: EventClassifier,
        dispatcher: NotificationDispatcher,
        project_name: Option<String>,
    ) -> Self {
        Self {
            classifier,
            dispatcher,
            project_name,
        }
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// 处理一个宿主事件，不关心的事件返回 `None`
    pub async fn handle(&self, event: &HostEvent) -> Option<DispatchReport> {
        let Some(kind) = self.classifier.classify(event).await else {
            debug!(event = %event.name(), "Ignoring event");
            return None;
        };

        info!(event = %event.name(), kind = %kind, session_id = ?event.session_id(), "Handling event");
        Some(
            self.dispatcher
                .dispatch(kind, self.project_name(), event)
                .await,
        )
    }
}

/// 从目录路径提取项目名
pub fn project_name_from_dir(dir: &Path) -> Option<String> {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
