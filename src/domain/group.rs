// ==========================================
// 教会社区管理 - 小组领域模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 小组 (grupo)
///
/// 属于唯一的分区与季度；被分配关系引用，不被拥有
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub segment_id: String,
    pub season_id: Option<String>,
    pub season_name: Option<String>,
    pub active: bool,
    pub deleted: bool,
}

/// 分配读接口的单行输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRosterInfo {
    pub id: String,
    pub name: String,
    pub assigned: bool,
    pub directors_count: i64,
    pub directors_sample: Vec<String>,
    pub season_name: Option<String>,
    pub members_count: i64,
    pub leaders: Vec<String>,
    pub active: bool,
}

/// 分配读接口的整体输出
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignableGroups {
    pub grupos: Vec<GroupRosterInfo>,
    pub total: usize,
    pub assigned_count: usize,
}
