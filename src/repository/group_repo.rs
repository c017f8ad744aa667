// ==========================================
// 教会社区管理 - 小组数据仓储
// ==========================================
// 对齐: small_groups / seasons / group_members 表
// 红线: Repository 不含业务逻辑（有效成员/组长过滤在引擎层）
// ==========================================

use crate::domain::group::Group;
use crate::engine::name::display_name;
use crate::engine::roster::MembershipRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub struct GroupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GroupRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询分区内未删除的小组（按名称排序，含季度名）
    pub fn list_by_segment(&self, segment_id: &str) -> RepositoryResult<Vec<Group>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT g.id, g.name, g.segment_id, g.season_id, s.name, g.active, g.deleted
            FROM small_groups g
            LEFT JOIN seasons s ON s.id = g.season_id
            WHERE g.segment_id = ?1 AND g.deleted = 0
            ORDER BY g.name ASC, g.id ASC
            "#,
        )?;

        let groups = stmt
            .query_map(params![segment_id], |row| {
                Ok(Group {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    segment_id: row.get(2)?,
                    season_id: row.get(3)?,
                    season_name: row.get(4)?,
                    active: row.get::<_, i64>(5)? != 0,
                    deleted: row.get::<_, i64>(6)? != 0,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(groups)
    }

    /// 分区内全部小组ID（含软删除），用于分区归属校验
    pub fn ids_in_segment(&self, segment_id: &str) -> RepositoryResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id FROM small_groups WHERE segment_id = ?1")?;
        let ids = stmt
            .query_map(params![segment_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<BTreeSet<_>>>()?;
        Ok(ids)
    }

    /// 分区内未软删除的小组ID，新增分配只能指向这些小组
    pub fn assignable_ids_in_segment(&self, segment_id: &str) -> RepositoryResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id FROM small_groups WHERE segment_id = ?1 AND deleted = 0")?;
        let ids = stmt
            .query_map(params![segment_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<BTreeSet<_>>>()?;
        Ok(ids)
    }

    /// 新建小组（种子数据/测试使用）
    pub fn insert(&self, group: &Group) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO small_groups (id, name, segment_id, season_id, active, deleted)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                group.id,
                group.name,
                group.segment_id,
                group.season_id,
                group.active as i64,
                group.deleted as i64,
            ],
        )?;
        Ok(())
    }

    /// 新增小组成员（种子数据/测试使用）
    pub fn add_member(
        &self,
        group_id: &str,
        person_id: &str,
        role: &str,
        exit_date: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO group_members (person_id, group_id, role, exit_date) VALUES (?1, ?2, ?3, ?4)",
            params![person_id, group_id, role, exit_date],
        )?;
        Ok(())
    }

    /// 查询指定小组的成员行（含历史成员，按扫描顺序）
    pub fn membership_rows(&self, group_ids: &[String]) -> RepositoryResult<Vec<MembershipRow>> {
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
            SELECT m.group_id, m.person_id, m.role, m.exit_date,
                   p.first_name, p.last_name, p.email
            FROM group_members m
            LEFT JOIN persons p ON p.id = m.person_id
            WHERE m.group_id IN ({})
            ORDER BY m.rowid ASC
            "#,
            placeholders
        );
        let params: Vec<Value> = group_ids.iter().map(|id| Value::from(id.clone())).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let first: Option<String> = row.get(4)?;
                let last: Option<String> = row.get(5)?;
                let email: Option<String> = row.get(6)?;
                Ok(MembershipRow {
                    group_id: row.get(0)?,
                    person_id: row.get(1)?,
                    role: row.get(2)?,
                    exit_date: row.get(3)?,
                    display_name: display_name(first.as_deref(), last.as_deref(), email.as_deref()),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}
