// ==========================================
// 教会社区管理 - 姓名与标签规范化
// ==========================================
// 显示名: trim(名 + " " + 姓) → 邮箱 → "(Sin nombre)"
// 去重音: NFD 分解后丢弃组合符号，小写
// ==========================================

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 无姓名、无邮箱时的占位显示名
pub const SIN_NOMBRE: &str = "(Sin nombre)";

/// 计算人员显示名
pub fn display_name(first: Option<&str>, last: Option<&str>, email: Option<&str>) -> String {
    let full = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    let full = full.trim();
    if !full.is_empty() {
        return full.to_string();
    }

    match email.map(str::trim) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => SIN_NOMBRE.to_string(),
    }
}

/// 去重音 + 小写 + trim，用于标签比较（"Líder" == "lider"）
pub fn fold_accents(raw: &str) -> String {
    raw.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_full() {
        assert_eq!(display_name(Some("Ana"), Some("Pérez"), None), "Ana Pérez");
        assert_eq!(display_name(Some("  Ana "), None, Some("a@x.org")), "Ana");
        assert_eq!(display_name(None, Some("Pérez"), None), "Pérez");
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(display_name(None, None, Some(" ana@iglesia.org ")), "ana@iglesia.org");
        assert_eq!(display_name(Some(" "), Some(""), Some("")), SIN_NOMBRE);
        assert_eq!(display_name(None, None, None), "(Sin nombre)");
    }

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("Líder"), "lider");
        assert_eq!(fold_accents(" COLÍDER "), "colider");
        assert_eq!(fold_accents("Pingüino Ñandú"), "pinguino nandu");
    }
}
