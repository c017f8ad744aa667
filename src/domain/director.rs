// ==========================================
// 教会社区管理 - 阶段主任领域模型
// ==========================================
// 对齐: segment_directors / director_locations / director_groups 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 阶段主任记录 (segment_directors 表中的一行)
///
/// 将某人限定到一个分区(segment)，角色标签应为 `director_etapa`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Director {
    pub id: String,
    pub segment_id: String,
    pub person_id: String,
    pub role_tag: String, // 原样存储，由 API 层校验
    pub created_at: NaiveDateTime,
}

impl Director {
    /// 阶段主任的存储标签
    pub const ROLE_TAG: &'static str = "director_etapa";

    /// 新建阶段主任记录（id 由 uuid v4 生成）
    pub fn new(segment_id: String, person_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            segment_id,
            person_id,
            role_tag: Self::ROLE_TAG.to_string(),
            created_at: chrono::Local::now().naive_local(),
        }
    }

    pub fn is_director_etapa(&self) -> bool {
        self.role_tag == Self::ROLE_TAG
    }
}

/// 主任列表视图（带显示名与已分配小组数）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorSummary {
    pub id: String,
    pub segment_id: String,
    pub person_id: String,
    pub display_name: String,
    pub location_id: Option<String>,
    pub assigned_groups: i64,
}

/// 删除主任时的级联结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorRemoval {
    pub locations_removed: usize,
    pub assignments_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_director_defaults() {
        let d = Director::new("S1".to_string(), "P1".to_string());
        assert!(d.is_director_etapa());
        assert_eq!(d.segment_id, "S1");
        assert!(!d.id.is_empty());
    }
}
