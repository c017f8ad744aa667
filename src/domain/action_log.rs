// ==========================================
// 教会社区管理 - 操作日志领域模型
// ==========================================
// 红线: 所有成功的写操作必须记录
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: String,       // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,
    pub actor: String,             // 操作人 person_id
    pub segment_id: Option<String>,
    pub director_id: Option<String>,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    /// 以当前时间构造日志
    pub fn now(action_type: ActionType, actor: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            segment_id: None,
            director_id: None,
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_scope(mut self, segment_id: &str, director_id: &str) -> Self {
        self.segment_id = Some(segment_id.to_string());
        self.director_id = Some(director_id.to_string());
        self
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    SyncAssignments, // 同步小组分配
    CreateDirector,  // 新建阶段主任
    DeleteDirector,  // 删除阶段主任（级联）
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::SyncAssignments => write!(f, "SYNC_ASSIGNMENTS"),
            ActionType::CreateDirector => write!(f, "CREATE_DIRECTOR"),
            ActionType::DeleteDirector => write!(f, "DELETE_DIRECTOR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_scope() {
        let log = ActionLog::now(ActionType::SyncAssignments, "P1")
            .with_scope("S1", "D1")
            .with_detail("merge");
        assert_eq!(log.action_type, "SYNC_ASSIGNMENTS");
        assert_eq!(log.segment_id.as_deref(), Some("S1"));
        assert_eq!(log.director_id.as_deref(), Some("D1"));
        assert_eq!(log.detail.as_deref(), Some("merge"));
        assert!(log.payload_json.is_none());
    }
}
