// ==========================================
// 教会社区管理 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 消息会原样透传给调用方，保持西语
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("registro no encontrado: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("no se pudo conectar a la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("no se pudo obtener el bloqueo de la base de datos: {0}")]
    LockError(String),

    #[error("la transacción falló: {0}")]
    DatabaseTransactionError(String),

    #[error("{0}")]
    DatabaseQueryError(String),

    #[error("restricción de unicidad violada: {0}")]
    UniqueConstraintViolation(String),

    #[error("restricción de clave foránea violada: {0}")]
    ForeignKeyViolation(String),

    // ===== 通用错误 =====
    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
