// ==========================================
// 教会社区管理 - 权限分级器
// ==========================================
// 规则: 角色集合与 {admin, pastor, director-general} 有交集 → Superior
//       其余（含空集）→ Scoped
// 纯函数，无 I/O，无错误
// ==========================================

use std::collections::BTreeSet;

use crate::domain::types::{AccessTier, RoleTag};

/// 按角色集合判定访问层级
pub fn classify<'a, I>(roles: I) -> AccessTier
where
    I: IntoIterator<Item = &'a RoleTag>,
{
    if roles.into_iter().any(RoleTag::is_superior) {
        AccessTier::Superior
    } else {
        AccessTier::Scoped
    }
}

// ==========================================
// Caller - 已认证的调用方
// ==========================================

/// 已认证的调用方（身份由上游认证层提供）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub person_id: String,
    pub roles: BTreeSet<RoleTag>,
}

impl Caller {
    pub fn new(person_id: impl Into<String>, roles: impl IntoIterator<Item = RoleTag>) -> Self {
        Self {
            person_id: person_id.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn tier(&self) -> AccessTier {
        classify(&self.roles)
    }

    pub fn is_superior(&self) -> bool {
        self.tier() == AccessTier::Superior
    }
}
