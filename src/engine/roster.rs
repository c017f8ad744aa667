// ==========================================
// 教会社区管理 - 小组花名册汇总引擎
// ==========================================
// 职责: 为小组列表附加主任数/主任样本/成员数/组长样本
// 输入: 仓储按扫描顺序返回的原始行
// 红线: 只读投影，不参与写入判定
// ==========================================

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::instrument;

use crate::domain::group::{Group, GroupRosterInfo};
use crate::domain::types::MembershipRole;

/// 样本名单上限（主任样本、组长样本）
pub const SAMPLE_LIMIT: usize = 3;

/// 主任-小组关联行（含主任显示名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorLinkRow {
    pub group_id: String,
    pub director_id: String,
    pub display_name: String,
}

/// 小组成员行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRow {
    pub group_id: String,
    pub person_id: String,
    pub role: String,
    pub exit_date: Option<String>,
    pub display_name: String,
}

impl MembershipRow {
    /// exit_date 为空即当前有效成员
    pub fn is_active(&self) -> bool {
        self.exit_date
            .as_deref()
            .map(|d| d.trim().is_empty())
            .unwrap_or(true)
    }
}

#[derive(Default)]
struct GroupStats {
    director_ids: HashSet<String>,
    directors_sample: Vec<String>,
    member_ids: HashSet<String>,
    leader_ids: HashSet<String>,
    leaders: Vec<String>,
}

// ==========================================
// RosterEnrichmentEngine
// ==========================================
pub struct RosterEnrichmentEngine {
    sample_limit: usize,
}

impl RosterEnrichmentEngine {
    pub fn new() -> Self {
        Self {
            sample_limit: SAMPLE_LIMIT,
        }
    }

    /// 组装花名册
    ///
    /// - `assigned`: 被查看主任当前已分配的小组ID
    /// - 输出顺序与 `groups` 一致
    #[instrument(skip_all, fields(groups = groups.len()))]
    pub fn build(
        &self,
        groups: &[Group],
        assigned: &BTreeSet<String>,
        director_links: &[DirectorLinkRow],
        memberships: &[MembershipRow],
    ) -> Vec<GroupRosterInfo> {
        let mut stats: HashMap<&str, GroupStats> = HashMap::new();

        for link in director_links {
            let entry = stats.entry(link.group_id.as_str()).or_default();
            if entry.director_ids.insert(link.director_id.clone())
                && entry.directors_sample.len() < self.sample_limit
            {
                entry.directors_sample.push(link.display_name.clone());
            }
        }

        for row in memberships.iter().filter(|m| m.is_active()) {
            let entry = stats.entry(row.group_id.as_str()).or_default();
            entry.member_ids.insert(row.person_id.clone());

            // 仅 "Líder"；"Colíder" 不计入
            if MembershipRole::parse(&row.role) == Some(MembershipRole::Lider)
                && entry.leader_ids.insert(row.person_id.clone())
                && entry.leaders.len() < self.sample_limit
            {
                entry.leaders.push(row.display_name.clone());
            }
        }

        groups
            .iter()
            .map(|g| {
                let s = stats.remove(g.id.as_str()).unwrap_or_default();
                GroupRosterInfo {
                    id: g.id.clone(),
                    name: g.name.clone(),
                    assigned: assigned.contains(&g.id),
                    directors_count: s.director_ids.len() as i64,
                    directors_sample: s.directors_sample,
                    season_name: g.season_name.clone(),
                    members_count: s.member_ids.len() as i64,
                    leaders: s.leaders,
                    active: g.active,
                }
            })
            .collect()
    }
}

impl Default for RosterEnrichmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str) -> Group {
        Group {
            id: id.to_string(),
            name: format!("Grupo {}", id),
            segment_id: "S1".to_string(),
            season_id: Some("T1".to_string()),
            season_name: Some("2026".to_string()),
            active: true,
            deleted: false,
        }
    }

    fn link(group_id: &str, director_id: &str, name: &str) -> DirectorLinkRow {
        DirectorLinkRow {
            group_id: group_id.to_string(),
            director_id: director_id.to_string(),
            display_name: name.to_string(),
        }
    }

    fn member(group_id: &str, person_id: &str, role: &str, exit: Option<&str>) -> MembershipRow {
        MembershipRow {
            group_id: group_id.to_string(),
            person_id: person_id.to_string(),
            role: role.to_string(),
            exit_date: exit.map(|s| s.to_string()),
            display_name: format!("Persona {}", person_id),
        }
    }

    #[test]
    fn test_directors_sample_is_capped_in_first_seen_order() {
        let links = vec![
            link("G1", "D1", "Uno"),
            link("G1", "D2", "Dos"),
            link("G1", "D1", "Uno"),
            link("G1", "D3", "Tres"),
            link("G1", "D4", "Cuatro"),
        ];
        let out = RosterEnrichmentEngine::new().build(&[group("G1")], &BTreeSet::new(), &links, &[]);
        assert_eq!(out[0].directors_count, 4);
        assert_eq!(out[0].directors_sample, vec!["Uno", "Dos", "Tres"]);
        assert!(!out[0].assigned);
    }

    #[test]
    fn test_leaders_exclude_colider_and_former_members() {
        let rows = vec![
            member("G1", "P1", "Líder", None),
            member("G1", "P2", "Colíder", None),
            member("G1", "P3", "lider", Some("2025-12-01")),
            member("G1", "P4", "Miembro", None),
            member("G1", "P5", "LIDER", Some("")),
        ];
        let out = RosterEnrichmentEngine::new().build(&[group("G1")], &BTreeSet::new(), &[], &rows);
        assert_eq!(out[0].leaders, vec!["Persona P1", "Persona P5"]);
        assert_eq!(out[0].members_count, 4);
    }

    #[test]
    fn test_groups_without_rows_get_zero_stats() {
        let assigned: BTreeSet<String> = ["G2".to_string()].into_iter().collect();
        let out = RosterEnrichmentEngine::new().build(&[group("G1"), group("G2")], &assigned, &[], &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "G1");
        assert_eq!(out[0].directors_count, 0);
        assert!(out[0].directors_sample.is_empty());
        assert_eq!(out[0].members_count, 0);
        assert!(out[1].assigned);
        assert_eq!(out[1].season_name.as_deref(), Some("2026"));
    }
}
