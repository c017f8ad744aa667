// ==========================================
// 教会社区管理 - 小组分配 API
// ==========================================
// 职责: 可分配小组列表（读）+ 分配同步（写）
// 写路径: 权限 → 主任解析 → 分区归属 → 现读 current → 单事务增删
// 读路径: 充实数据失败时记录 warn! 并降级，不让整个读取失败
// ==========================================

use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::record_action;
use crate::api::validator::{parse_sync_request, DirectorGuard, SyncRequest};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::director::Director;
use crate::domain::group::{AssignableGroups, Group};
use crate::domain::types::SyncMode;
use crate::engine::assignment_sync::AssignmentSyncEngine;
use crate::engine::permission::Caller;
use crate::engine::roster::RosterEnrichmentEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::assignment_repo::{AppliedChanges, AssignmentRepository};
use crate::repository::director_repo::DirectorRepository;
use crate::repository::group_repo::GroupRepository;

// ==========================================
// 同步结果
// ==========================================

/// 同步结果（实际生效的增删 + 写入后现查的总数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub mode: SyncMode,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub total_assigned: i64,
}

impl SyncOutcome {
    pub fn to_response(&self) -> SyncResponse {
        SyncResponse {
            ok: true,
            modo: self.mode,
            agregados: self.added.len(),
            quitados: self.removed.len(),
            total_asignados: self.total_assigned,
        }
    }
}

/// 写接口响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResponse {
    pub ok: bool,
    pub modo: SyncMode,
    pub agregados: usize,
    pub quitados: usize,
    #[serde(rename = "totalAsignados")]
    pub total_asignados: i64,
}

// ==========================================
// AssignmentApi
// ==========================================
pub struct AssignmentApi {
    guard: Arc<DirectorGuard>,
    director_repo: Arc<DirectorRepository>,
    group_repo: Arc<GroupRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    sync_engine: AssignmentSyncEngine,
    roster_engine: RosterEnrichmentEngine,
}

impl AssignmentApi {
    pub fn new(
        guard: Arc<DirectorGuard>,
        director_repo: Arc<DirectorRepository>,
        group_repo: Arc<GroupRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            guard,
            director_repo,
            group_repo,
            assignment_repo,
            action_log_repo,
            sync_engine: AssignmentSyncEngine::new(),
            roster_engine: RosterEnrichmentEngine::new(),
        }
    }

    // ==========================================
    // 读: 可分配小组列表
    // ==========================================

    /// 查询某主任的可分配小组
    ///
    /// - 上级角色: 分区全部小组，`assigned` 相对被查看的主任
    /// - 受限角色: 仅限调用方本人主任记录已分配的小组
    #[instrument(skip(self, caller), fields(caller = %caller.person_id))]
    pub fn list_assignable_groups(
        &self,
        caller: &Caller,
        segment_id: &str,
        director_id: &str,
    ) -> ApiResult<AssignableGroups> {
        let director = self.guard.resolve(segment_id, director_id)?;
        let segment_groups = self.group_repo.list_by_segment(&director.segment_id)?;

        let groups: Vec<Group> = if caller.is_superior() {
            segment_groups
        } else {
            let own_scope = self.caller_scope(caller, &director.segment_id)?;
            segment_groups
                .into_iter()
                .filter(|g| own_scope.contains(&g.id))
                .collect()
        };

        let assigned = self.assignment_repo.current_group_ids(&director.id)?;

        let group_ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();
        let director_links = self
            .assignment_repo
            .director_links(&group_ids)
            .unwrap_or_else(|e| {
                warn!(error = %e, director_id = %director.id, "主任关联查询失败，降级为空");
                Vec::new()
            });
        let memberships = self
            .group_repo
            .membership_rows(&group_ids)
            .unwrap_or_else(|e| {
                warn!(error = %e, director_id = %director.id, "成员查询失败，降级为空");
                Vec::new()
            });

        let grupos = self
            .roster_engine
            .build(&groups, &assigned, &director_links, &memberships);
        let assigned_count = grupos.iter().filter(|g| g.assigned).count();

        Ok(AssignableGroups {
            total: grupos.len(),
            assigned_count,
            grupos,
        })
    }

    /// 受限调用方在分区内的可见范围: 本人全部主任记录的分配并集
    fn caller_scope(&self, caller: &Caller, segment_id: &str) -> ApiResult<BTreeSet<String>> {
        let own: Vec<Director> = self
            .director_repo
            .find_by_person_and_segment(&caller.person_id, segment_id)?
            .into_iter()
            .filter(|d| d.is_director_etapa())
            .collect();
        if own.is_empty() {
            return Err(ApiError::segment_access_denied());
        }

        let mut scope = BTreeSet::new();
        for d in &own {
            scope.extend(self.assignment_repo.current_group_ids(&d.id)?);
        }
        Ok(scope)
    }

    // ==========================================
    // 写: 分配同步
    // ==========================================

    /// 从原始请求体同步（先校验权限，再解析请求体）
    pub fn synchronize_json(
        &self,
        caller: &Caller,
        segment_id: &str,
        director_id: &str,
        body: &[u8],
    ) -> ApiResult<SyncOutcome> {
        self.guard.require_superior(caller)?;
        let request = parse_sync_request(body)?;
        self.synchronize_checked(caller, segment_id, director_id, &request)
    }

    /// 同步主任的小组分配
    ///
    /// 前置条件依次校验，任一失败即返回且不产生写入
    #[instrument(skip(self, caller, request), fields(caller = %caller.person_id, mode = %request.mode))]
    pub fn synchronize(
        &self,
        caller: &Caller,
        segment_id: &str,
        director_id: &str,
        request: &SyncRequest,
    ) -> ApiResult<SyncOutcome> {
        // 1. 权限
        self.guard.require_superior(caller)?;
        self.synchronize_checked(caller, segment_id, director_id, request)
    }

    /// 权限已校验后的同步主体
    fn synchronize_checked(
        &self,
        caller: &Caller,
        segment_id: &str,
        director_id: &str,
        request: &SyncRequest,
    ) -> ApiResult<SyncOutcome> {
        // 2. 主任解析
        let director = self.guard.resolve(segment_id, director_id)?;

        // 3. 分区归属（新增不可指向软删除小组）
        let segment_group_ids = self.group_repo.ids_in_segment(&director.segment_id)?;
        let assignable_ids = self
            .group_repo
            .assignable_ids_in_segment(&director.segment_id)?;
        let invalid = self.sync_engine.out_of_segment(
            request.mode,
            &request.agregar,
            &request.quitar,
            &assignable_ids,
            &segment_group_ids,
        );
        if !invalid.is_empty() {
            warn!(director_id = %director.id, invalid = ?invalid, "请求包含分区外小组");
            return Err(ApiError::out_of_segment(invalid));
        }

        // 4. 现读 current 并计算增删
        let current = self.assignment_repo.current_group_ids(&director.id)?;
        let plan = self
            .sync_engine
            .plan(request.mode, &current, &request.agregar, &request.quitar);

        // 5. 单事务写入
        let applied = if plan.is_empty() {
            AppliedChanges::default()
        } else {
            self.assignment_repo
                .apply_changes(&director.id, &plan.to_remove, &plan.to_add)?
        };

        // 6. 现查总数
        let total_assigned = self.assignment_repo.count_for_director(&director.id)?;

        info!(
            director_id = %director.id,
            mode = %request.mode,
            added = applied.added.len(),
            removed = applied.removed.len(),
            total_assigned,
            "分配同步完成"
        );

        if !applied.added.is_empty() || !applied.removed.is_empty() {
            let log = ActionLog::now(ActionType::SyncAssignments, &caller.person_id)
                .with_scope(&director.segment_id, &director.id)
                .with_payload(json!({
                    "agregados": applied.added,
                    "quitados": applied.removed,
                    "totalAsignados": total_assigned,
                }))
                .with_detail(request.mode.as_str());
            record_action(&self.action_log_repo, &log);
        }

        Ok(SyncOutcome {
            mode: request.mode,
            added: applied.added,
            removed: applied.removed,
            total_assigned,
        })
    }
}
