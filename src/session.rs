//! 会话查询 - 通过宿主 API 获取会话元数据和消息历史
//!
//! - `SessionInspector::is_child_session`: 是否为子会话（subagent），查询失败视为根会话
//! - `SessionInspector::elapsed_seconds`: 距离最后一条用户消息的秒数，查询失败返回 `None`
//! - `SessionInspector::session_title`: 会话标题，传给焦点检测脚本

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 宿主 API 请求超时（秒）
pub const HOST_TIMEOUT_SECS: u64 = 5;

/// 会话元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SessionInfo {
    /// 有非空 parent 的是子会话
    pub fn is_child(&self) -> bool {
        self.parent_id.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// 会话消息（只关心角色和创建时间）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub info: MessageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub role: String,
    #[serde(default)]
    pub time: MessageTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageTime {
    /// 毫秒时间戳
    #[serde(default)]
    pub created: Option<i64>,
}

impl SessionMessage {
    pub fn new(role: impl Into<String>, created_ms: i64) -> Self {
        Self {
            info: MessageInfo {
                role: role.into(),
                time: MessageTime {
                    created: Some(created_ms),
                },
            },
        }
    }
}

/// 宿主客户端接口
#[async_trait]
pub trait HostClient: Send + Sync {
    /// 获取会话元数据
    async fn session(&self, session_id: &str) -> Result<SessionInfo>;

    /// 获取会话的全部消息
    async fn messages(&self, session_id: &str) -> Result<Vec<SessionMessage>>;
}

/// OpenCode HTTP API 客户端
#[derive(Debug, Clone)]
pub struct OpencodeClient {
    client: Client,
    base_url: String,
}

impl OpencodeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HOST_TIMEOUT_SECS))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/session/{id}[/{tail}]`，会话 ID 作为单个路径段编码
    fn session_url(&self, session_id: &str, tail: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid host URL: {}", self.base_url))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("host URL cannot have a path: {}", self.base_url))?;
            segments.pop_if_empty().push("session").push(session_id);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl HostClient for OpencodeClient {
    async fn session(&self, session_id: &str) -> Result<SessionInfo> {
        let url = self.session_url(session_id, None)?;
        let info = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?
            .json::<SessionInfo>()
            .await
            .context("failed to parse session response")?;
        Ok(info)
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<SessionMessage>> {
        let url = self.session_url(session_id, Some("message"))?;
        let messages = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?
            .json::<Vec<SessionMessage>>()
            .await
            .context("failed to parse message list")?;
        Ok(messages)
    }
}

/// 最后一条用户消息的创建时间（毫秒）
pub fn last_user_message_time(messages: &[SessionMessage]) -> Option<i64> {
    messages
        .iter()
        .filter(|m| m.info.role == "user")
        .filter_map(|m| m.info.time.created)
        .max()
}

/// 会话查询
#[derive(Clone)]
pub struct SessionInspector {
    client: Arc<dyn HostClient>,
}

impl SessionInspector {
    pub fn new(client: Arc<dyn HostClient>) -> Self {
        Self { client }
    }

    /// 是否为子会话，查询失败时返回 false
    pub async fn is_child_session(&self, session_id: &str) -> bool {
        match self.client.session(session_id).await {
            Ok(info) => info.is_child(),
            Err(e) => {
                debug!(session_id = %session_id, error = %e, "Session lookup failed, treating as root session");
                false
            }
        }
    }

    /// 会话标题，查询失败或没有标题时返回 `None`
    pub async fn session_title(&self, session_id: &str) -> Option<String> {
        match self.client.session(session_id).await {
            Ok(info) => info.title.filter(|t| !t.is_empty()),
            Err(e) => {
                debug!(session_id = %session_id, error = %e, "Session title lookup failed");
                None
            }
        }
    }

    /// 距离最后一条用户消息的秒数
    pub async fn elapsed_seconds(&self, session_id: &str) -> Option<f64> {
        self.elapsed_seconds_at(session_id, Utc::now().timestamp_millis())
            .await
    }

    /// 距离最后一条用户消息的秒数（指定当前时间，毫秒）
    ///
    /// 没有用户消息或查询失败时返回 `None`，调用方不能当成 0。
    pub async fn elapsed_seconds_at(&self, session_id: &str, now_ms: i64) -> Option<f64> {
        let messages = match self.client.messages(session_id).await {
            Ok(messages) => messages,
            Err(e) => {
                debug!(session_id = %session_id, error = %e, "Message history lookup failed");
                return None;
            }
        };

        let last = last_user_message_time(&messages)?;
        let elapsed = now_ms.saturating_sub(last) as f64 / 1000.0;
        debug!(session_id = %session_id, elapsed_secs = elapsed, "Resolved elapsed time");
        Some(elapsed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 测试用的内存宿主
    #[derive(Default)]
    pub(crate) struct MockHost {
        pub sessions: HashMap<String, SessionInfo>,
        pub messages: HashMap<String, Vec<SessionMessage>>,
        pub fail: bool,
        pub message_calls: AtomicUsize,
    }

    #[async_trait]
    impl HostClient for MockHost {
        async fn session(&self, session_id: &str) -> Result<SessionInfo> {
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            self.sessions
                .get(session_id)
                .cloned()
                .ok_or_else(|| anyhow!("session {} not found", session_id))
        }

        async fn messages(&self, session_id: &str) -> Result<Vec<SessionMessage>> {
            self.message_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.messages.get(session_id).cloned().unwrap_or_default())
        }
    }

    fn session(id: &str, parent: Option<&str>) -> SessionInfo {
        SessionInfo {
            id: id.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            title: None,
        }
    }

    #[test]
    fn test_session_info_parse() {
        let info: SessionInfo =
            serde_json::from_str(r#"{"id":"s1","parentID":"root","title":"x"}"#).unwrap();
        assert!(info.is_child());

        let info: SessionInfo = serde_json::from_str(r#"{"id":"s1"}"#).unwrap();
        assert!(!info.is_child());

        let info: SessionInfo = serde_json::from_str(r#"{"id":"s1","parentID":""}"#).unwrap();
        assert!(!info.is_child());
    }

    #[test]
    fn test_message_parse() {
        let messages: Vec<SessionMessage> = serde_json::from_str(
            r#"[
                {"info":{"role":"user","time":{"created":1000}},"parts":[]},
                {"info":{"role":"assistant","time":{"created":2000,"completed":3000}},"parts":[]}
            ]"#,
        )
        .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(last_user_message_time(&messages), Some(1000));
    }

    #[test]
    fn test_last_user_message_time_takes_max() {
        let messages = vec![
            SessionMessage::new("user", 5_000),
            SessionMessage::new("assistant", 9_000),
            SessionMessage::new("user", 7_000),
            SessionMessage::new("user", 6_000),
        ];
        assert_eq!(last_user_message_time(&messages), Some(7_000));
        assert_eq!(
            last_user_message_time(&[SessionMessage::new("assistant", 1)]),
            None
        );
    }

    #[tokio::test]
    async fn test_is_child_session() {
        let mut host = MockHost::default();
        host.sessions.insert("s1".into(), session("s1", None));
        host.sessions.insert("s2".into(), session("s2", Some("root")));
        let inspector = SessionInspector::new(Arc::new(host));

        assert!(!inspector.is_child_session("s1").await);
        assert!(inspector.is_child_session("s2").await);
        // 未知会话查询失败 -> 根会话
        assert!(!inspector.is_child_session("missing").await);
    }

    #[tokio::test]
    async fn test_is_child_session_on_failure() {
        let host = MockHost {
            fail: true,
            ..Default::default()
        };
        let inspector = SessionInspector::new(Arc::new(host));
        assert!(!inspector.is_child_session("s1").await);
    }

    #[tokio::test]
    async fn test_elapsed_seconds() {
        let mut host = MockHost::default();
        host.messages.insert(
            "s1".into(),
            vec![
                SessionMessage::new("user", 100_000),
                SessionMessage::new("assistant", 130_000),
            ],
        );
        let inspector = SessionInspector::new(Arc::new(host));

        let elapsed = inspector.elapsed_seconds_at("s1", 140_000).await;
        assert_eq!(elapsed, Some(40.0));
    }

    #[tokio::test]
    async fn test_elapsed_seconds_unknown() {
        let mut host = MockHost::default();
        host.messages
            .insert("s1".into(), vec![SessionMessage::new("assistant", 1_000)]);
        let inspector = SessionInspector::new(Arc::new(host));
        assert_eq!(inspector.elapsed_seconds_at("s1", 10_000).await, None);
        assert_eq!(inspector.elapsed_seconds_at("empty", 10_000).await, None);

        let failing = SessionInspector::new(Arc::new(MockHost {
            fail: true,
            ..Default::default()
        }));
        assert_eq!(failing.elapsed_seconds("s1").await, None);
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = OpencodeClient::new("http://localhost:4096/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:4096");
        assert_eq!(
            client.session_url("abc", None).unwrap().as_str(),
            "http://localhost:4096/session/abc"
        );
        assert_eq!(
            client.session_url("abc", Some("message")).unwrap().as_str(),
            "http://localhost:4096/session/abc/message"
        );
    }

    #[test]
    fn test_session_id_is_single_path_segment() {
        let client = OpencodeClient::new("http://localhost:4096/api").unwrap();
        let url = client.session_url("../x?y#z", Some("message")).unwrap();
        assert_eq!(url.path(), "/api/session/..%2Fx%3Fy%23z/message");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_invalid_host_url_fails_lookup() {
        let client = OpencodeClient::new("not a url").unwrap();
        assert!(client.session_url("s1", None).is_err());
    }

    #[tokio::test]
    async fn test_elapsed_seconds_saturates() {
        let mut host = MockHost::default();
        host.messages
            .insert("s1".into(), vec![SessionMessage::new("user", i64::MIN)]);
        let inspector = SessionInspector::new(Arc::new(host));

        let elapsed = inspector.elapsed_seconds_at("s1", i64::MAX).await;
        assert_eq!(elapsed, Some(i64::MAX as f64 / 1000.0));
    }

    #[tokio::test]
    async fn test_session_title() {
        let mut host = MockHost::default();
        let mut titled = session("s1", None);
        titled.title = Some("Fix login bug".into());
        host.sessions.insert("s1".into(), titled);
        host.sessions.insert("s2".into(), session("s2", None));
        let inspector = SessionInspector::new(Arc::new(host));

        assert_eq!(inspector.session_title("s1").await, Some("Fix login bug".into()));
        assert_eq!(inspector.session_title("s2").await, None);
        assert_eq!(inspector.session_title("missing").await, None);
    }
}
