// ==========================================
// 教会社区管理 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ApiError, ApiResult, AssignmentApi, DirectorApi, DirectorGuard};
use crate::config::app_config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::domain::types::RoleTag;
use crate::engine::permission::Caller;
use crate::repository::{
    ActionLogRepository, AssignmentRepository, DirectorRepository, GroupRepository,
    PersonRepository, SegmentRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，所有仓储共享同一连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 单请求超时
    pub request_timeout: Duration,

    /// 小组分配API
    pub assignment_api: Arc<AssignmentApi>,

    /// 阶段主任API
    pub director_api: Arc<DirectorApi>,

    person_repo: Arc<PersonRepository>,
}

impl AppState {
    /// 打开数据库（建表幂等）并组装所有API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        match crate::db::read_schema_version(&conn) {
            Ok(Some(version)) => tracing::info!("schema_version: {}", version),
            Ok(None) => tracing::warn!("schema_version 表缺失"),
            Err(e) => tracing::warn!("读取 schema_version 失败: {}", e),
        }

        Ok(Self::from_connection(Arc::new(Mutex::new(conn)), db_path))
    }

    /// 从已有连接组装（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, db_path: String) -> Self {
        let segment_repo = Arc::new(SegmentRepository::new(conn.clone()));
        let person_repo = Arc::new(PersonRepository::new(conn.clone()));
        let group_repo = Arc::new(GroupRepository::new(conn.clone()));
        let director_repo = Arc::new(DirectorRepository::new(conn.clone()));
        let assignment_repo = Arc::new(AssignmentRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn));

        let guard = Arc::new(DirectorGuard::new(segment_repo, director_repo.clone()));

        let assignment_api = Arc::new(AssignmentApi::new(
            guard.clone(),
            director_repo.clone(),
            group_repo,
            assignment_repo,
            action_log_repo.clone(),
        ));
        let director_api = Arc::new(DirectorApi::new(
            guard,
            person_repo.clone(),
            director_repo,
            action_log_repo,
        ));

        Self {
            db_path,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            assignment_api,
            director_api,
            person_repo,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 由上游认证给出的人员ID解析调用方及其角色
    ///
    /// 无法识别的角色标签忽略
    pub fn resolve_caller(&self, person_id: &str) -> ApiResult<Caller> {
        let person_id = person_id.trim();
        if person_id.is_empty() {
            return Err(ApiError::authentication_required());
        }

        let roles = self
            .person_repo
            .roles_for_person(person_id)?
            .iter()
            .filter_map(|raw| RoleTag::parse(raw))
            .collect::<Vec<_>>();

        Ok(Caller::new(person_id, roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AccessTier;

    fn state() -> AppState {
        let conn = crate::db::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO persons (id, first_name) VALUES ('P1', 'Ana'), ('P2', 'Luis');
            INSERT INTO person_roles (person_id, role_tag) VALUES
                ('P1', 'Director_General'), ('P1', 'tesorero'), ('P2', 'director-etapa');
            "#,
        )
        .unwrap();
        AppState::from_connection(Arc::new(Mutex::new(conn)), ":memory:".to_string())
    }

    #[test]
    fn test_resolve_caller_classifies_roles() {
        let state = state();
        assert_eq!(state.resolve_caller("P1").unwrap().tier(), AccessTier::Superior);
        assert_eq!(state.resolve_caller("P2").unwrap().tier(), AccessTier::Scoped);
        // 未登记角色的人员为受限
        assert_eq!(state.resolve_caller("P9").unwrap().tier(), AccessTier::Scoped);
    }

    #[test]
    fn test_blank_identity_requires_authentication() {
        let state = state();
        assert!(matches!(
            state.resolve_caller("   "),
            Err(ApiError::AuthenticationRequired(_))
        ));
    }
}
