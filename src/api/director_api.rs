// ==========================================
// 教会社区管理 - 阶段主任管理 API
// ==========================================
// 职责: 主任列表 / 新建 / 级联删除 / 操作历史
// 约束: 写操作与历史查询仅限上级角色
// ==========================================

use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::record_action;
use crate::api::validator::{parse_create_director_request, CreateDirectorRequest, DirectorGuard};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::director::{Director, DirectorRemoval, DirectorSummary};
use crate::domain::types::RoleTag;
use crate::engine::permission::Caller;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::director_repo::DirectorRepository;
use crate::repository::person_repo::PersonRepository;

/// 历史查询默认条数
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

/// 阶段主任管理API
///
/// 职责：
/// 1. 分区内主任列表（受限角色仅见本人）
/// 2. 新建主任（授予角色 + 可选位置）
/// 3. 删除主任（位置 → 小组分配 → 主任记录）
/// 4. ActionLog记录与查询
pub struct DirectorApi {
    guard: Arc<DirectorGuard>,
    person_repo: Arc<PersonRepository>,
    director_repo: Arc<DirectorRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl DirectorApi {
    pub fn new(
        guard: Arc<DirectorGuard>,
        person_repo: Arc<PersonRepository>,
        director_repo: Arc<DirectorRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            guard,
            person_repo,
            director_repo,
            action_log_repo,
        }
    }

    /// 查询分区内的主任
    ///
    /// 受限调用方在分区内没有本人记录时返回 PermissionDenied
    pub fn list_directors(
        &self,
        caller: &Caller,
        segment_id: &str,
    ) -> ApiResult<Vec<DirectorSummary>> {
        self.guard.require_segment(segment_id)?;
        let all = self.director_repo.list_by_segment(segment_id.trim())?;
        if caller.is_superior() {
            return Ok(all);
        }

        let own: Vec<DirectorSummary> = all
            .into_iter()
            .filter(|d| d.person_id == caller.person_id)
            .collect();
        if own.is_empty() {
            return Err(ApiError::segment_access_denied());
        }
        Ok(own)
    }

    /// 从原始请求体新建主任（先校验权限，再解析请求体）
    pub fn create_director_json(
        &self,
        caller: &Caller,
        segment_id: &str,
        body: &[u8],
    ) -> ApiResult<Director> {
        self.guard.require_superior(caller)?;
        let request = parse_create_director_request(body)?;
        self.create_director(caller, segment_id, &request)
    }

    /// 新建阶段主任
    #[instrument(skip(self, caller, request), fields(caller = %caller.person_id, person = %request.person_id))]
    pub fn create_director(
        &self,
        caller: &Caller,
        segment_id: &str,
        request: &CreateDirectorRequest,
    ) -> ApiResult<Director> {
        self.guard.require_superior(caller)?;
        self.guard.require_segment(segment_id)?;
        let segment_id = segment_id.trim();

        let person = self
            .person_repo
            .find_by_id(&request.person_id)?
            .ok_or_else(|| ApiError::not_found("person", &request.person_id))?;

        let existing = self
            .director_repo
            .find_by_person_and_segment(&request.person_id, segment_id)?;
        if existing.iter().any(|d| d.is_director_etapa()) {
            return Err(ApiError::director_exists(&request.person_id));
        }

        let director = Director::new(segment_id.to_string(), request.person_id.clone());
        self.director_repo.create(
            &director,
            RoleTag::DirectorEtapa.to_db_str(),
            request.location_id.as_deref(),
        )?;

        info!(
            director_id = %director.id,
            segment_id,
            person = %person.display_name(),
            "主任已创建"
        );

        let log = ActionLog::now(ActionType::CreateDirector, &caller.person_id)
            .with_scope(segment_id, &director.id)
            .with_payload(json!({
                "personId": director.person_id,
                "locationId": request.location_id,
            }));
        record_action(&self.action_log_repo, &log);

        Ok(director)
    }

    /// 删除主任（单事务级联）
    ///
    /// 本人的 director-etapa 角色标签保留
    #[instrument(skip(self, caller), fields(caller = %caller.person_id))]
    pub fn delete_director(
        &self,
        caller: &Caller,
        segment_id: &str,
        director_id: &str,
    ) -> ApiResult<DirectorRemoval> {
        self.guard.require_superior(caller)?;
        let director = self.guard.resolve(segment_id, director_id)?;

        let removal = self.director_repo.delete_cascade(&director.id)?;

        info!(
            director_id = %director.id,
            locations = removal.locations_removed,
            assignments = removal.assignments_removed,
            "主任已删除"
        );

        let log = ActionLog::now(ActionType::DeleteDirector, &caller.person_id)
            .with_scope(&director.segment_id, &director.id)
            .with_payload(json!({
                "personId": director.person_id,
                "locationsRemoved": removal.locations_removed,
                "assignmentsRemoved": removal.assignments_removed,
            }));
        record_action(&self.action_log_repo, &log);

        Ok(removal)
    }

    /// 主任操作历史（新 → 旧）
    pub fn list_history(
        &self,
        caller: &Caller,
        segment_id: &str,
        director_id: &str,
        limit: Option<i64>,
    ) -> ApiResult<Vec<ActionLog>> {
        self.guard.require_superior(caller)?;
        let director = self.guard.resolve(segment_id, director_id)?;
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        Ok(self.action_log_repo.find_by_director(&director.id, limit)?)
    }
}
