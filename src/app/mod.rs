// ==========================================
// 教会社区管理 - 应用层
// ==========================================
// 职责: 共享状态组装 + HTTP 接入
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::{build_router, CALLER_HEADER};
pub use state::AppState;
