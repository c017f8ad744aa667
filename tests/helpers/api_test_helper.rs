// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用环境与标准场景
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use rusqlite::Connection;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use iglesia_grupos::api::{AssignmentApi, DirectorApi};
use iglesia_grupos::app::AppState;
use iglesia_grupos::db::open_sqlite_connection;
use iglesia_grupos::domain::RoleTag;
use iglesia_grupos::engine::Caller;
use iglesia_grupos::repository::{ActionLogRepository, AssignmentRepository};

use super::test_data_builder::TestDataBuilder;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 使用临时数据库文件；AppState 与种子构建器共享同一连接
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: Arc<AppState>,
    pub assignment_api: Arc<AssignmentApi>,
    pub director_api: Arc<DirectorApi>,

    // Repository层（用于断言）
    pub assignment_repo: Arc<AssignmentRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,

    pub data: TestDataBuilder,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, String> {
        iglesia_grupos::logging::init_test();

        let (temp_file, db_path) =
            test_helpers::create_test_db().map_err(|e| format!("无法创建测试数据库: {}", e))?;

        let conn = open_sqlite_connection(&db_path).map_err(|e| e.to_string())?;
        let conn: Arc<Mutex<Connection>> = Arc::new(Mutex::new(conn));

        let state = Arc::new(AppState::from_connection(conn.clone(), db_path.clone()));

        Ok(Self {
            db_path,
            assignment_api: state.assignment_api.clone(),
            director_api: state.director_api.clone(),
            assignment_repo: Arc::new(AssignmentRepository::new(conn.clone())),
            action_log_repo: Arc::new(ActionLogRepository::new(conn.clone())),
            data: TestDataBuilder::new(conn),
            state,
            _temp_file: temp_file,
        })
    }

    /// 标准场景
    ///
    /// - 分区 S: 小组 G1..G4；分区 S2: 小组 G5
    /// - 主任 D（人员 PD，分区 S）已分配 {G1, G2}
    /// - PASTOR 为上级角色
    pub fn with_standard_scenario() -> Self {
        let env = Self::new().expect("无法创建测试环境");
        env.data
            .segment("S")
            .segment("S2")
            .person("PASTOR", Some("Samuel"), Some("Ortiz"), None)
            .role("PASTOR", "pastor")
            .person("PD", Some("Diana"), Some("Reyes"), None)
            .role("PD", "director-etapa")
            .group("G1", "S")
            .group("G2", "S")
            .group("G3", "S")
            .group("G4", "S")
            .group("G5", "S2")
            .director("D", "S", "PD")
            .assign("D", &["G1", "G2"]);
        env
    }

    pub fn assigned(&self, director_id: &str) -> BTreeSet<String> {
        self.assignment_repo
            .current_group_ids(director_id)
            .expect("查询分配失败")
    }
}

// ==========================================
// 调用方
// ==========================================

pub fn superior() -> Caller {
    Caller::new("PASTOR", [RoleTag::Pastor])
}

pub fn scoped(person_id: &str) -> Caller {
    Caller::new(person_id, [RoleTag::DirectorEtapa])
}

pub fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
