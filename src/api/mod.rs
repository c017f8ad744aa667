// ==========================================
// 教会社区管理 - API 层
// ==========================================
// 职责: 前置条件校验 + 编排仓储与引擎，供 HTTP 层调用
// ==========================================

pub mod assignment_api;
pub mod director_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use assignment_api::{AssignmentApi, SyncOutcome, SyncResponse};
pub use director_api::DirectorApi;
pub use error::{ApiError, ApiResult};
pub use validator::{
    parse_create_director_request, parse_sync_request, CreateDirectorRequest, DirectorGuard,
    SyncRequest,
};

use tracing::warn;

use crate::domain::action_log::ActionLog;
use crate::repository::action_log_repo::ActionLogRepository;

/// 写入审计日志；失败只记录警告（主操作已提交）
pub(crate) fn record_action(repo: &ActionLogRepository, log: &ActionLog) {
    if let Err(e) = repo.insert(log) {
        warn!(
            error = %e,
            action_type = %log.action_type,
            director_id = ?log.director_id,
            "审计日志写入失败"
        );
    }
}
