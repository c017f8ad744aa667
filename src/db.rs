// ==========================================
// 教会社区管理 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键必须每个连接开启）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表幂等，schema_version 仅用于提示
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库（测试用），已建表
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
///
/// 远端平台上这些表由托管服务维护；本地 SQLite 作为等价替身
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS segments (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS seasons (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persons (
    id TEXT PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    email TEXT
);

CREATE TABLE IF NOT EXISTS person_roles (
    person_id TEXT NOT NULL REFERENCES persons(id) ON DELETE CASCADE,
    role_tag TEXT NOT NULL,
    PRIMARY KEY (person_id, role_tag)
);

CREATE TABLE IF NOT EXISTS small_groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    segment_id TEXT NOT NULL REFERENCES segments(id),
    season_id TEXT REFERENCES seasons(id),
    active INTEGER NOT NULL DEFAULT 1,
    deleted INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_small_groups_segment ON small_groups(segment_id);

CREATE TABLE IF NOT EXISTS group_members (
    person_id TEXT NOT NULL REFERENCES persons(id),
    group_id TEXT NOT NULL REFERENCES small_groups(id),
    role TEXT NOT NULL,
    exit_date TEXT
);
CREATE INDEX IF NOT EXISTS idx_group_members_group ON group_members(group_id);

CREATE TABLE IF NOT EXISTS segment_directors (
    id TEXT PRIMARY KEY,
    segment_id TEXT NOT NULL REFERENCES segments(id),
    person_id TEXT NOT NULL REFERENCES persons(id),
    role_tag TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_segment_directors_segment ON segment_directors(segment_id);

CREATE TABLE IF NOT EXISTS director_locations (
    director_id TEXT PRIMARY KEY REFERENCES segment_directors(id),
    location_id TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS director_groups (
    director_id TEXT NOT NULL REFERENCES segment_directors(id),
    group_id TEXT NOT NULL REFERENCES small_groups(id),
    created_at TEXT NOT NULL,
    UNIQUE (director_id, group_id)
);
CREATE INDEX IF NOT EXISTS idx_director_groups_group ON director_groups(group_id);

CREATE TABLE IF NOT EXISTS action_log (
    action_id TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    action_ts TEXT NOT NULL,
    actor TEXT NOT NULL,
    segment_id TEXT,
    director_id TEXT,
    payload_json TEXT,
    detail TEXT
);
CREATE INDEX IF NOT EXISTS idx_action_director_ts ON action_log(director_id, action_ts);
"#;
