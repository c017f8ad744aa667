// ==========================================
// 教会社区管理 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 阶段主任与小组分配服务（认证由上游负责）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（无 I/O）
pub mod engine;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 接入
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AccessTier, MembershipRole, RoleTag, SyncMode};

// 领域实体
pub use domain::{ActionLog, ActionType, Director, Group, GroupRosterInfo, Person};

// 引擎
pub use engine::{classify, AssignmentSyncEngine, Caller, RosterEnrichmentEngine};

// API
pub use api::{ApiError, ApiResult, AssignmentApi, DirectorApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Iglesia Grupos";
