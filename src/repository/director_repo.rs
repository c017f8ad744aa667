// ==========================================
// 教会社区管理 - 阶段主任数据仓储
// ==========================================
// 对齐: segment_directors / director_locations / person_roles 表
// 红线: Repository 不含业务逻辑，级联删除在单个事务内完成
// ==========================================

use crate::domain::director::{Director, DirectorRemoval, DirectorSummary};
use crate::engine::name::display_name;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct DirectorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DirectorRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_director(row: &Row<'_>) -> SqliteResult<Director> {
        let ts: String = row.get(4)?;
        let created_at = NaiveDateTime::parse_from_str(&ts, TS_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Director {
            id: row.get(0)?,
            segment_id: row.get(1)?,
            person_id: row.get(2)?,
            role_tag: row.get(3)?,
            created_at,
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, director_id: &str) -> RepositoryResult<Option<Director>> {
        let conn = self.get_conn()?;
        let director = conn
            .query_row(
                r#"
                SELECT id, segment_id, person_id, role_tag, created_at
                FROM segment_directors
                WHERE id = ?1
                "#,
                params![director_id],
                Self::map_director,
            )
            .optional()?;
        Ok(director)
    }

    /// 查询某人在某分区的主任记录（按创建时间）
    pub fn find_by_person_and_segment(
        &self,
        person_id: &str,
        segment_id: &str,
    ) -> RepositoryResult<Vec<Director>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, segment_id, person_id, role_tag, created_at
            FROM segment_directors
            WHERE person_id = ?1 AND segment_id = ?2
            ORDER BY created_at ASC, id ASC
            "#,
        )?;
        let directors = stmt
            .query_map(params![person_id, segment_id], Self::map_director)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(directors)
    }

    /// 分区内主任列表（含显示名、位置、已分配小组数）
    pub fn list_by_segment(&self, segment_id: &str) -> RepositoryResult<Vec<DirectorSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT d.id, d.segment_id, d.person_id,
                   p.first_name, p.last_name, p.email,
                   l.location_id,
                   (SELECT COUNT(*) FROM director_groups dg WHERE dg.director_id = d.id)
            FROM segment_directors d
            LEFT JOIN persons p ON p.id = d.person_id
            LEFT JOIN director_locations l ON l.director_id = d.id
            WHERE d.segment_id = ?1
            ORDER BY d.created_at ASC, d.id ASC
            "#,
        )?;

        let list = stmt
            .query_map(params![segment_id], |row| {
                let first: Option<String> = row.get(3)?;
                let last: Option<String> = row.get(4)?;
                let email: Option<String> = row.get(5)?;
                Ok(DirectorSummary {
                    id: row.get(0)?,
                    segment_id: row.get(1)?,
                    person_id: row.get(2)?,
                    display_name: display_name(first.as_deref(), last.as_deref(), email.as_deref()),
                    location_id: row.get(6)?,
                    assigned_groups: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(list)
    }

    /// 新建主任（事务）：主任记录 + 角色授予 + 可选位置
    pub fn create(
        &self,
        director: &Director,
        grant_role_tag: &str,
        location_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO segment_directors (id, segment_id, person_id, role_tag, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                director.id,
                director.segment_id,
                director.person_id,
                director.role_tag,
                director.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        tx.execute(
            "INSERT OR IGNORE INTO person_roles (person_id, role_tag) VALUES (?1, ?2)",
            params![director.person_id, grant_role_tag],
        )?;

        if let Some(location_id) = location_id {
            tx.execute(
                "INSERT INTO director_locations (director_id, location_id) VALUES (?1, ?2)",
                params![director.id, location_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 级联删除（事务）：位置 → 全部小组分配 → 主任记录
    pub fn delete_cascade(&self, director_id: &str) -> RepositoryResult<DirectorRemoval> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let locations_removed = tx.execute(
            "DELETE FROM director_locations WHERE director_id = ?1",
            params![director_id],
        )?;
        let assignments_removed = tx.execute(
            "DELETE FROM director_groups WHERE director_id = ?1",
            params![director_id],
        )?;
        let rows = tx.execute(
            "DELETE FROM segment_directors WHERE id = ?1",
            params![director_id],
        )?;

        if rows == 0 {
            // 事务随 tx drop 回滚
            return Err(RepositoryError::NotFound {
                entity: "segment_directors".to_string(),
                id: director_id.to_string(),
            });
        }

        tx.commit()?;
        Ok(DirectorRemoval {
            locations_removed,
            assignments_removed,
        })
    }
}
