// ==========================================
// 教会社区管理 - 引擎层
// ==========================================
// 职责: 实现业务规则,不拼 SQL
// 红线: Engine 无 I/O，仓储结果由 API 层传入
// ==========================================

pub mod assignment_sync;
pub mod name;
pub mod permission;
pub mod roster;

// 重导出核心引擎
pub use assignment_sync::{AssignmentSyncEngine, SyncPlan};
pub use name::{display_name, fold_accents, SIN_NOMBRE};
pub use permission::{classify, Caller};
pub use roster::{DirectorLinkRow, MembershipRow, RosterEnrichmentEngine, SAMPLE_LIMIT};
