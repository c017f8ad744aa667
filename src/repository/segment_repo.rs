// ==========================================
// 教会社区管理 - 分区(segmento)数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SegmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SegmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 分区是否存在
    pub fn exists(&self, segment_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM segments WHERE id = ?1",
                params![segment_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// 新建分区（种子数据/测试使用）
    pub fn insert(&self, segment_id: &str, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO segments (id, name) VALUES (?1, ?2)",
            params![segment_id, name],
        )?;
        Ok(())
    }
}
