// ==========================================
// 教会社区管理 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod director;
pub mod group;
pub mod person;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use director::{Director, DirectorRemoval, DirectorSummary};
pub use group::{AssignableGroups, Group, GroupRosterInfo};
pub use person::Person;
pub use types::{AccessTier, MembershipRole, RoleTag, SyncMode};
