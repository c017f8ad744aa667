// ==========================================
// 教会社区管理 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod assignment_repo;
pub mod director_repo;
pub mod error;
pub mod group_repo;
pub mod person_repo;
pub mod segment_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use assignment_repo::{AppliedChanges, AssignmentRepository};
pub use director_repo::DirectorRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use group_repo::GroupRepository;
pub use person_repo::PersonRepository;
pub use segment_repo::SegmentRepository;
