// ==========================================
// 教会社区管理 - 配置层
// ==========================================
// 职责: 从环境变量加载运行配置
// ==========================================

pub mod app_config;

pub use app_config::{env_keys, get_default_db_path, AppConfig};
