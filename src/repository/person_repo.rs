// ==========================================
// 教会社区管理 - 人员与角色数据仓储
// ==========================================
// 对齐: persons / person_roles 表
// 红线: Repository 不含业务逻辑（角色字符串原样返回）
// ==========================================

use crate::domain::person::Person;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

pub struct PersonRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PersonRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按ID查询人员
    pub fn find_by_id(&self, person_id: &str) -> RepositoryResult<Option<Person>> {
        let conn = self.get_conn()?;
        let person = conn
            .query_row(
                "SELECT id, first_name, last_name, email FROM persons WHERE id = ?1",
                params![person_id],
                |row| {
                    Ok(Person {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(person)
    }

    /// 新建人员（种子数据/测试使用）
    pub fn insert(&self, person: &Person) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO persons (id, first_name, last_name, email) VALUES (?1, ?2, ?3, ?4)",
            params![person.id, person.first_name, person.last_name, person.email],
        )?;
        Ok(())
    }

    /// 查询人员的角色标签（原样字符串，按字母序）
    pub fn roles_for_person(&self, person_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT role_tag FROM person_roles WHERE person_id = ?1 ORDER BY role_tag",
        )?;
        let roles = stmt
            .query_map(params![person_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(roles)
    }

    /// 授予角色（已存在则忽略）
    pub fn grant_role(&self, person_id: &str, role_tag: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO person_roles (person_id, role_tag) VALUES (?1, ?2)",
            params![person_id, role_tag],
        )?;
        Ok(())
    }
}
