//! 应用配置
//!
//! 构建时通过环境变量注入（Trunk 构建时 `option_env!` 读取），
//! 后端地址可被 LocalStorage 中保存的值覆盖。

use std::sync::OnceLock;
use std::time::Duration;

use crate::web::LocalStorage;

pub const STORAGE_API_BASE_KEY: &str = "codesage_api_base";

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
const DEFAULT_AUTH_ORIGIN: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_TOKEN_ORIGIN: &str = "https://securetoken.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    pub api_key: String,
    /// 账户接口 (`accounts:signInWithPassword` 等)
    pub auth_origin: String,
    /// 令牌刷新接口
    pub token_origin: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub identity: IdentityConfig,
    pub request_timeout: Duration,
    pub log_level: log::LevelFilter,
}

/// 构建时可见的原始配置值
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    pub api_base: Option<&'static str>,
    pub identity_api_key: Option<&'static str>,
    pub identity_auth_origin: Option<&'static str>,
    pub identity_token_origin: Option<&'static str>,
    pub request_timeout_secs: Option<&'static str>,
    pub log: Option<&'static str>,
}

impl BuildEnv {
    pub fn capture() -> Self {
        Self {
            api_base: option_env!("CODESAGE_API_BASE"),
            identity_api_key: option_env!("CODESAGE_IDENTITY_API_KEY"),
            identity_auth_origin: option_env!("CODESAGE_IDENTITY_AUTH_ORIGIN"),
            identity_token_origin: option_env!("CODESAGE_IDENTITY_TOKEN_ORIGIN"),
            request_timeout_secs: option_env!("CODESAGE_REQUEST_TIMEOUT_SECS"),
            log: option_env!("CODESAGE_LOG"),
        }
    }
}

fn origin(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

impl AppConfig {
    /// 合并构建时配置与用户保存的后端地址
    pub fn resolve(env: &BuildEnv, stored_api_base: Option<String>) -> Self {
        let default_base = origin(env.api_base, DEFAULT_API_BASE);
        let api_base = origin(stored_api_base.as_deref(), &default_base);

        let request_timeout = env
            .request_timeout_secs
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let default_level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        let log_level = env
            .log
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default_level);

        Self {
            api_base,
            identity: IdentityConfig {
                api_key: env.identity_api_key.unwrap_or_default().trim().to_string(),
                auth_origin: origin(env.identity_auth_origin, DEFAULT_AUTH_ORIGIN),
                token_origin: origin(env.identity_token_origin, DEFAULT_TOKEN_ORIGIN),
            },
            request_timeout,
            log_level,
        }
    }
}

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 获取全局配置，首次调用时解析
pub fn get() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        AppConfig::resolve(&BuildEnv::capture(), LocalStorage::get(STORAGE_API_BASE_KEY))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(&BuildEnv::default(), None);
        assert_eq!(config.api_base, "http://127.0.0.1:8000");
        assert_eq!(config.identity.auth_origin, DEFAULT_AUTH_ORIGIN);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_stored_origin_wins_and_is_trimmed() {
        let env = BuildEnv {
            api_base: Some("https://api.codesage.dev"),
            ..Default::default()
        };
        let config = AppConfig::resolve(&env, Some("http://localhost:9000/".to_string()));
        assert_eq!(config.api_base, "http://localhost:9000");

        let config = AppConfig::resolve(&env, Some("   ".to_string()));
        assert_eq!(config.api_base, "https://api.codesage.dev");
    }

    #[test]
    fn test_timeout_and_log_overrides() {
        let env = BuildEnv {
            request_timeout_secs: Some("5"),
            log: Some("warn"),
            ..Default::default()
        };
        let config = AppConfig::resolve(&env, None);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, log::LevelFilter::Warn);

        let env = BuildEnv {
            request_timeout_secs: Some("0"),
            log: Some("loud"),
            ..Default::default()
        };
        let config = AppConfig::resolve(&env, None);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
