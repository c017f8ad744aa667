// ==========================================
// 教会社区管理 - 人员领域模型
// ==========================================

use serde::{Deserialize, Serialize};

use crate::engine::name::display_name;

/// 人员（只读使用：显示名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Person {
    /// 显示名（姓名 → 邮箱 → "(Sin nombre)"）
    pub fn display_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.email.as_deref(),
        )
    }
}
