// ==========================================
// 教会社区管理 - API层错误类型
// ==========================================
// 职责: 定义对外错误分类，转换Repository错误
// 说明: 消息在构造时按当前语言翻译；仓储错误消息原样透传
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 身份与权限
    // ==========================================
    #[error("{0}")]
    AuthenticationRequired(String),

    #[error("{0}")]
    PermissionDenied(String),

    // ==========================================
    // 引用解析
    // ==========================================
    #[error("{0}")]
    NotFound(String),

    /// 主任记录存在，但角色标签不是 director_etapa
    #[error("{0}")]
    InvalidRole(String),

    /// 主任记录存在，但不属于路径中的分区
    #[error("{0}")]
    SegmentMismatch(String),

    /// 引用了主任分区之外的小组
    #[error("{message}")]
    OutOfSegmentGroups {
        message: String,
        invalid_ids: Vec<String>,
    },

    // ==========================================
    // 请求格式
    // ==========================================
    #[error("{0}")]
    MalformedRequest(String),

    // ==========================================
    // 数据访问 / 通用
    // ==========================================
    /// 数据存储拒绝操作，消息原样透传
    #[error("{0}")]
    RepositoryError(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn authentication_required() -> Self {
        ApiError::AuthenticationRequired(t("error.authentication_required"))
    }

    pub fn permission_denied() -> Self {
        ApiError::PermissionDenied(t("error.permission_denied"))
    }

    /// 读取时调用方与分区无任何关系
    pub fn segment_access_denied() -> Self {
        ApiError::PermissionDenied(t("error.segment_access_denied"))
    }

    /// `entity_key`: locales 中 entity.* 的键名
    pub fn not_found(entity_key: &str, id: &str) -> Self {
        let entity = t(&format!("entity.{}", entity_key));
        ApiError::NotFound(t_with_args(
            "error.not_found",
            &[("entity", &entity), ("id", id)],
        ))
    }

    pub fn invalid_role(director_id: &str) -> Self {
        ApiError::InvalidRole(t_with_args("error.invalid_role", &[("id", director_id)]))
    }

    pub fn segment_mismatch(director_id: &str, segment_id: &str) -> Self {
        ApiError::SegmentMismatch(t_with_args(
            "error.segment_mismatch",
            &[("id", director_id), ("segment", segment_id)],
        ))
    }

    pub fn out_of_segment(invalid_ids: Vec<String>) -> Self {
        let message = t_with_args("error.out_of_segment", &[("ids", &invalid_ids.join(", "))]);
        ApiError::OutOfSegmentGroups {
            message,
            invalid_ids,
        }
    }

    /// `reason_key`: locales 中 reason.* 的键名
    pub fn malformed(reason_key: &str, args: &[(&str, &str)]) -> Self {
        let reason = t_with_args(&format!("reason.{}", reason_key), args);
        ApiError::MalformedRequest(t_with_args("error.malformed", &[("reason", &reason)]))
    }

    pub fn missing_id(field: &str) -> Self {
        ApiError::MalformedRequest(t_with_args("error.missing_id", &[("field", field)]))
    }

    pub fn director_exists(person_id: &str) -> Self {
        ApiError::MalformedRequest(t_with_args(
            "error.director_exists",
            &[("person", person_id)],
        ))
    }

    pub fn timeout() -> Self {
        ApiError::Timeout(t("error.timeout"))
    }

    pub fn internal(reason: &str) -> Self {
        ApiError::Internal(t_with_args("error.internal", &[("reason", reason)]))
    }

    /// 稳定的机器可读错误码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::AuthenticationRequired(_) => "AUTHENTICATION_REQUIRED",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidRole(_) => "INVALID_ROLE",
            ApiError::SegmentMismatch(_) => "SEGMENT_MISMATCH",
            ApiError::OutOfSegmentGroups { .. } => "OUT_OF_SEGMENT_GROUPS",
            ApiError::MalformedRequest(_) => "MALFORMED_REQUEST",
            ApiError::RepositoryError(_) => "REPOSITORY_ERROR",
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::LockError(msg) | RepositoryError::InternalError(msg) => {
                ApiError::internal(&msg)
            }
            other => ApiError::RepositoryError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
