// ==========================================
// 教会社区管理 - 小组分配同步引擎
// ==========================================
// 职责: 计算主任当前小组集合 → 目标集合的最小增删
// 红线: Engine 不拼 SQL；current 必须由调用方在写入前现读
// ==========================================
// merge:   to_add = agregar \ current, to_remove = quitar ∩ current
// replace: to_add = target  \ current, to_remove = current \ target
// 不变量:  to_add ∩ current = ∅, to_remove ⊆ current
// ==========================================

use std::collections::BTreeSet;

use tracing::instrument;

use crate::domain::types::SyncMode;

/// 一次同步的增删计划
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

// ==========================================
// AssignmentSyncEngine
// ==========================================
pub struct AssignmentSyncEngine;

impl AssignmentSyncEngine {
    pub fn new() -> Self {
        Self
    }

    /// 找出不能被本次请求引用的小组ID（升序，便于报告）
    ///
    /// - agregar 只能指向分区内未软删除的小组
    /// - merge 的 quitar 可指向分区内任意小组（含软删除，便于清理）
    /// - replace 模式下 quitar 被忽略，不参与校验
    pub fn out_of_segment(
        &self,
        mode: SyncMode,
        agregar: &BTreeSet<String>,
        quitar: &BTreeSet<String>,
        assignable_ids: &BTreeSet<String>,
        segment_group_ids: &BTreeSet<String>,
    ) -> Vec<String> {
        let mut invalid: BTreeSet<&String> = agregar.difference(assignable_ids).collect();
        if mode == SyncMode::Merge {
            invalid.extend(quitar.difference(segment_group_ids));
        }
        invalid.into_iter().cloned().collect()
    }

    /// 计算增删计划
    #[instrument(skip_all, fields(mode = %mode, current = current.len()))]
    pub fn plan(
        &self,
        mode: SyncMode,
        current: &BTreeSet<String>,
        agregar: &BTreeSet<String>,
        quitar: &BTreeSet<String>,
    ) -> SyncPlan {
        match mode {
            SyncMode::Merge => SyncPlan {
                to_add: agregar.difference(current).cloned().collect(),
                to_remove: quitar.intersection(current).cloned().collect(),
            },
            SyncMode::Replace => SyncPlan {
                to_add: agregar.difference(current).cloned().collect(),
                to_remove: current.difference(agregar).cloned().collect(),
            },
        }
    }
}

impl Default for AssignmentSyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_add_and_remove() {
        let engine = AssignmentSyncEngine::new();
        let plan = engine.plan(
            SyncMode::Merge,
            &set(&["G1", "G2"]),
            &set(&["G3"]),
            &set(&["G1"]),
        );
        assert_eq!(plan.to_add, set(&["G3"]));
        assert_eq!(plan.to_remove, set(&["G1"]));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let engine = AssignmentSyncEngine::new();
        // A 已分配 → 不重复新增；B 未分配 → 不删除
        let plan = engine.plan(SyncMode::Merge, &set(&["A"]), &set(&["A"]), &set(&["B"]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_replace_completeness() {
        let engine = AssignmentSyncEngine::new();
        let plan = engine.plan(SyncMode::Replace, &set(&["A", "B"]), &set(&["B", "C"]), &set(&[]));
        assert_eq!(plan.to_add, set(&["C"]));
        assert_eq!(plan.to_remove, set(&["A"]));
    }

    #[test]
    fn test_replace_ignores_quitar() {
        let engine = AssignmentSyncEngine::new();
        let plan = engine.plan(SyncMode::Replace, &set(&["G2", "G3"]), &set(&["G2", "G4"]), &set(&["G2"]));
        assert_eq!(plan.to_add, set(&["G4"]));
        assert_eq!(plan.to_remove, set(&["G3"]));

        let segment = set(&["G2", "G3", "G4"]);
        let invalid = engine.out_of_segment(SyncMode::Replace, &set(&["G4"]), &set(&["G9"]), &segment, &segment);
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_replace_with_empty_target_removes_all() {
        let engine = AssignmentSyncEngine::new();
        let plan = engine.plan(SyncMode::Replace, &set(&["A", "B"]), &set(&[]), &set(&[]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, set(&["A", "B"]));
    }

    #[test]
    fn test_out_of_segment_reports_only_foreign_ids() {
        let engine = AssignmentSyncEngine::new();
        let segment = set(&["G1", "G2", "G3"]);
        let invalid = engine.out_of_segment(SyncMode::Merge, &set(&["G3", "G5"]), &set(&["G1", "G7"]), &segment, &segment);
        assert_eq!(invalid, vec!["G5".to_string(), "G7".to_string()]);
    }

    #[test]
    fn test_soft_deleted_group_only_removable() {
        let engine = AssignmentSyncEngine::new();
        // G3 软删除：在分区内，但不可新增
        let assignable = set(&["G1", "G2"]);
        let segment = set(&["G1", "G2", "G3"]);

        let invalid = engine.out_of_segment(SyncMode::Merge, &set(&["G3"]), &set(&[]), &assignable, &segment);
        assert_eq!(invalid, vec!["G3".to_string()]);

        let invalid = engine.out_of_segment(SyncMode::Replace, &set(&["G1", "G3"]), &set(&[]), &assignable, &segment);
        assert_eq!(invalid, vec!["G3".to_string()]);

        let invalid = engine.out_of_segment(SyncMode::Merge, &set(&[]), &set(&["G3"]), &assignable, &segment);
        assert!(invalid.is_empty());
    }

    fn id_set() -> impl Strategy<Value = BTreeSet<String>> {
        proptest::collection::btree_set("G[0-9]{1,2}", 0..12)
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn plan_is_disjoint_from_current(
            current in id_set(),
            agregar in id_set(),
            quitar in id_set(),
            replace in any::<bool>(),
        ) {
            let mode = if replace { SyncMode::Replace } else { SyncMode::Merge };
            let plan = AssignmentSyncEngine::new().plan(mode, &current, &agregar, &quitar);
            prop_assert!(plan.to_add.is_disjoint(&current));
            prop_assert!(plan.to_remove.is_subset(&current));
            prop_assert!(plan.to_add.is_disjoint(&plan.to_remove));
        }

        #[test]
        fn replace_reaches_target_exactly(current in id_set(), target in id_set()) {
            let plan = AssignmentSyncEngine::new().plan(SyncMode::Replace, &current, &target, &BTreeSet::new());
            let mut result: BTreeSet<String> = current.difference(&plan.to_remove).cloned().collect();
            result.extend(plan.to_add.iter().cloned());
            prop_assert_eq!(result, target);
        }
    }
}
