// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use iglesia_grupos::domain::{Group, Person};
use iglesia_grupos::repository::{
    AssignmentRepository, GroupRepository, PersonRepository, SegmentRepository,
};

/// 直接写库的种子数据构建器
///
/// 链式调用；任何写入失败直接 panic（仅测试使用）
pub struct TestDataBuilder {
    conn: Arc<Mutex<Connection>>,
    segment_repo: SegmentRepository,
    person_repo: PersonRepository,
    group_repo: GroupRepository,
    assignment_repo: AssignmentRepository,
}

impl TestDataBuilder {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            segment_repo: SegmentRepository::new(conn.clone()),
            person_repo: PersonRepository::new(conn.clone()),
            group_repo: GroupRepository::new(conn.clone()),
            assignment_repo: AssignmentRepository::new(conn.clone()),
            conn,
        }
    }

    pub fn segment(&self, id: &str) -> &Self {
        self.segment_repo
            .insert(id, &format!("Segmento {}", id))
            .expect("插入分区失败");
        self
    }

    pub fn person(&self, id: &str, first: Option<&str>, last: Option<&str>, email: Option<&str>) -> &Self {
        self.person_repo
            .insert(&Person {
                id: id.to_string(),
                first_name: first.map(str::to_string),
                last_name: last.map(str::to_string),
                email: email.map(str::to_string),
            })
            .expect("插入人员失败");
        self
    }

    pub fn role(&self, person_id: &str, role_tag: &str) -> &Self {
        self.person_repo
            .grant_role(person_id, role_tag)
            .expect("授予角色失败");
        self
    }

    pub fn season(&self, id: &str, name: &str) -> &Self {
        self.conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO seasons (id, name) VALUES (?1, ?2)",
                params![id, name],
            )
            .expect("插入季度失败");
        self
    }

    /// 名称与ID相同、启用、未删除的小组
    pub fn group(&self, id: &str, segment_id: &str) -> &Self {
        self.group_with(GroupBuilder::new(id, segment_id).build())
    }

    pub fn group_with(&self, group: Group) -> &Self {
        self.group_repo.insert(&group).expect("插入小组失败");
        self
    }

    pub fn member(&self, group_id: &str, person_id: &str, role: &str, exit_date: Option<&str>) -> &Self {
        self.group_repo
            .add_member(group_id, person_id, role, exit_date)
            .expect("插入成员失败");
        self
    }

    /// 固定ID的主任记录（role_tag 可自定义以构造非法角色）
    pub fn director_with_role(&self, id: &str, segment_id: &str, person_id: &str, role_tag: &str) -> &Self {
        self.conn
            .lock()
            .unwrap()
            .execute(
                r#"
                INSERT INTO segment_directors (id, segment_id, person_id, role_tag, created_at)
                VALUES (?1, ?2, ?3, ?4, '2026-01-01 00:00:00')
                "#,
                params![id, segment_id, person_id, role_tag],
            )
            .expect("插入主任失败");
        self
    }

    pub fn director(&self, id: &str, segment_id: &str, person_id: &str) -> &Self {
        self.director_with_role(id, segment_id, person_id, "director_etapa")
    }

    pub fn assign(&self, director_id: &str, group_ids: &[&str]) -> &Self {
        let to_add: BTreeSet<String> = group_ids.iter().map(|s| s.to_string()).collect();
        self.assignment_repo
            .apply_changes(director_id, &BTreeSet::new(), &to_add)
            .expect("插入分配失败");
        self
    }
}

// ==========================================
// Group 构建器
// ==========================================

pub struct GroupBuilder {
    group: Group,
}

impl GroupBuilder {
    pub fn new(id: &str, segment_id: &str) -> Self {
        Self {
            group: Group {
                id: id.to_string(),
                name: id.to_string(),
                segment_id: segment_id.to_string(),
                season_id: None,
                season_name: None,
                active: true,
                deleted: false,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.group.name = name.to_string();
        self
    }

    pub fn season(mut self, season_id: &str) -> Self {
        self.group.season_id = Some(season_id.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.group.active = false;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.group.deleted = true;
        self
    }

    pub fn build(self) -> Group {
        self.group
    }
}
