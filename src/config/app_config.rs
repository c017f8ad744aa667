// ==========================================
// 教会社区管理 - 应用配置
// ==========================================
// 来源: 环境变量；非法值回退默认值并记录 warn!
// ==========================================

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub mod env_keys {
    pub const DB_PATH: &str = "IGLESIA_GRUPOS_DB_PATH";
    pub const BIND: &str = "IGLESIA_GRUPOS_BIND";
    pub const LOCALE: &str = "IGLESIA_GRUPOS_LOCALE";
    pub const REQUEST_TIMEOUT_SECS: &str = "IGLESIA_GRUPOS_REQUEST_TIMEOUT_SECS";
}

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_LOCALE: &str = "es";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const SUPPORTED_LOCALES: [&str; 2] = ["es", "en"];
const DB_FILE_NAME: &str = "iglesia_grupos.db";

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub locale: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（便于测试，不依赖进程环境）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = value(env_keys::DB_PATH).unwrap_or_else(get_default_db_path);

        let bind_addr = match value(env_keys::BIND) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "监听地址无效，使用默认值 {}", DEFAULT_BIND);
                default_bind()
            }),
            None => default_bind(),
        };

        let locale = match value(env_keys::LOCALE) {
            Some(raw) if SUPPORTED_LOCALES.contains(&raw.to_ascii_lowercase().as_str()) => {
                raw.to_ascii_lowercase()
            }
            Some(raw) => {
                warn!(value = %raw, "不支持的语言，使用默认值 {}", DEFAULT_LOCALE);
                DEFAULT_LOCALE.to_string()
            }
            None => DEFAULT_LOCALE.to_string(),
        };

        let timeout_secs = match value(env_keys::REQUEST_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(value = %raw, "请求超时配置无效，使用默认值 {}s", DEFAULT_REQUEST_TIMEOUT_SECS);
                    DEFAULT_REQUEST_TIMEOUT_SECS
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Self {
            db_path,
            bind_addr,
            locale,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// 默认数据库路径: 用户数据目录下的 iglesia-grupos/iglesia_grupos.db
///
/// 拿不到数据目录时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("iglesia-grupos");
        // 确保目录存在
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(config.locale, "es");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.db_path.ends_with(DB_FILE_NAME));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (env_keys::DB_PATH, " /tmp/grupos.db "),
            (env_keys::BIND, "0.0.0.0:9000"),
            (env_keys::LOCALE, "EN"),
            (env_keys::REQUEST_TIMEOUT_SECS, "5"),
        ]);
        assert_eq!(config.db_path, "/tmp/grupos.db");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.locale, "en");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = load(&[
            (env_keys::BIND, "not-an-address"),
            (env_keys::LOCALE, "fr"),
            (env_keys::REQUEST_TIMEOUT_SECS, "0"),
        ]);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(config.locale, "es");
        assert_eq!(config.request_timeout.as_secs(), DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
