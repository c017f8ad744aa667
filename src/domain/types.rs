// ==========================================
// 教会社区管理 - 领域类型定义
// ==========================================
// 角色标签 / 访问层级 / 同步模式 / 小组成员角色
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 角色标签 (Role Tag)
// ==========================================
// 存储格式: kebab-case (与 person_roles.role_tag 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleTag {
    Admin,           // 管理员
    Pastor,          // 牧师
    DirectorGeneral, // 总主任
    DirectorEtapa,   // 阶段主任
    Lider,           // 小组长
    Miembro,         // 成员
}

impl RoleTag {
    /// 数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RoleTag::Admin => "admin",
            RoleTag::Pastor => "pastor",
            RoleTag::DirectorGeneral => "director-general",
            RoleTag::DirectorEtapa => "director-etapa",
            RoleTag::Lider => "lider",
            RoleTag::Miembro => "miembro",
        }
    }

    /// 宽松解析：大小写不敏感，`_` 与 `-` 等价
    ///
    /// 无法识别的标签返回 None（由调用方忽略）
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "admin" => Some(RoleTag::Admin),
            "pastor" => Some(RoleTag::Pastor),
            "director-general" => Some(RoleTag::DirectorGeneral),
            "director-etapa" => Some(RoleTag::DirectorEtapa),
            "lider" => Some(RoleTag::Lider),
            "miembro" => Some(RoleTag::Miembro),
            _ => None,
        }
    }

    /// 是否属于上级角色 (admin / pastor / director-general)
    pub fn is_superior(&self) -> bool {
        matches!(
            self,
            RoleTag::Admin | RoleTag::Pastor | RoleTag::DirectorGeneral
        )
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 访问层级 (Access Tier)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessTier {
    Superior, // 完全访问
    Scoped,   // 仅限本人分配范围
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessTier::Superior => write!(f, "SUPERIOR"),
            AccessTier::Scoped => write!(f, "SCOPED"),
        }
    }
}

// ==========================================
// 同步模式 (modo)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// 增量: agregar/quitar 相对当前状态
    #[default]
    Merge,
    /// 全量: agregar 即为完整目标集合
    Replace,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Merge => "merge",
            SyncMode::Replace => "replace",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 小组成员角色 (Membership Role)
// ==========================================
// 存储格式: 原样中文/西文标签 ("Líder" / "Colíder" / "Miembro")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipRole {
    Lider,
    Colider,
    Miembro,
}

impl MembershipRole {
    /// 解析数据库中的角色字符串（去重音、大小写不敏感）
    ///
    /// "Colíder" 与 "Líder" 严格区分
    pub fn parse(raw: &str) -> Option<Self> {
        match crate::engine::name::fold_accents(raw).as_str() {
            "lider" => Some(MembershipRole::Lider),
            "colider" => Some(MembershipRole::Colider),
            "miembro" => Some(MembershipRole::Miembro),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MembershipRole::Lider => "Líder",
            MembershipRole::Colider => "Colíder",
            MembershipRole::Miembro => "Miembro",
        }
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
