// ==========================================
// 教会社区管理 - 主任-小组分配数据仓储
// ==========================================
// 对齐: director_groups 表，(director_id, group_id) 唯一
// 红线: Repository 不含业务逻辑
// 约束: 插入已存在/删除不存在均为 no-op，不报错
// ==========================================

use crate::engine::name::display_name;
use crate::engine::roster::DirectorLinkRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// 实际生效的增删结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 主任当前已分配的小组ID
    pub fn current_group_ids(&self, director_id: &str) -> RepositoryResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT group_id FROM director_groups WHERE director_id = ?1")?;
        let ids = stmt
            .query_map(params![director_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<BTreeSet<_>>>()?;
        Ok(ids)
    }

    /// 主任当前分配总数（写入后现查，不做算术推导）
    pub fn count_for_director(&self, director_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM director_groups WHERE director_id = ?1",
            params![director_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 在单个事务内先删后增
    ///
    /// 返回实际生效的ID（并发下已被他人写入/删除的行不计入）
    pub fn apply_changes(
        &self,
        director_id: &str,
        to_remove: &BTreeSet<String>,
        to_add: &BTreeSet<String>,
    ) -> RepositoryResult<AppliedChanges> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let mut applied = AppliedChanges::default();
        {
            let mut delete_stmt = tx.prepare(
                "DELETE FROM director_groups WHERE director_id = ?1 AND group_id = ?2",
            )?;
            for group_id in to_remove {
                if delete_stmt.execute(params![director_id, group_id])? > 0 {
                    applied.removed.push(group_id.clone());
                }
            }

            let mut insert_stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO director_groups (director_id, group_id, created_at)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for group_id in to_add {
                if insert_stmt.execute(params![director_id, group_id, now])? > 0 {
                    applied.added.push(group_id.clone());
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(applied)
    }

    /// 指定小组的主任关联行（含主任显示名，按写入顺序）
    pub fn director_links(&self, group_ids: &[String]) -> RepositoryResult<Vec<DirectorLinkRow>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = std::iter::repeat("?")
            .take(group_ids.len())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT dg.group_id, dg.director_id, p.first_name, p.last_name, p.email
            FROM director_groups dg
            JOIN segment_directors d ON d.id = dg.director_id
            LEFT JOIN persons p ON p.id = d.person_id
            WHERE dg.group_id IN ({})
            ORDER BY dg.rowid ASC
            "#,
            placeholders
        );
        let params: Vec<Value> = group_ids.iter().map(|id| Value::from(id.clone())).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let first: Option<String> = row.get(2)?;
                let last: Option<String> = row.get(3)?;
                let email: Option<String> = row.get(4)?;
                Ok(DirectorLinkRow {
                    group_id: row.get(0)?,
                    director_id: row.get(1)?,
                    display_name: display_name(first.as_deref(), last.as_deref(), email.as_deref()),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}
