/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, CORS 許可、email 検証ポリシーなど)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - ALLOWED_EMAIL_DOMAINS は起動時ではなく初回リクエスト時に読む (EnvDomainSource)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::gate::{DomainSource, VerifiedEmailPolicy};

pub const ALLOWED_DOMAINS_VAR: &str = "ALLOWED_EMAIL_DOMAINS";
// Shorter name accepted when the primary one is unset.
pub const ALLOWED_DOMAINS_FALLBACK_VAR: &str = "ALLOWED_DOMAINS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub email_policy: VerifiedEmailPolicy,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let email_policy = std::env::var("REQUIRE_VERIFIED_EMAIL")
            .map(|v| parse_email_policy(&v))
            .unwrap_or_default();

        let request_timeout_seconds = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let request_body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            email_policy,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

/// Reads the domain list from the process environment each time it is asked.
///
/// `DomainAllowlist` stops asking once a usable list has been published.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvDomainSource;

impl DomainSource for EnvDomainSource {
    fn load(&self) -> Option<String> {
        pick_domains(
            std::env::var(ALLOWED_DOMAINS_VAR).ok(),
            std::env::var(ALLOWED_DOMAINS_FALLBACK_VAR).ok(),
        )
    }
}

// A set primary wins even when blank; the fallback only fills an unset one.
fn pick_domains(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary.or(fallback)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_email_policy(value: &str) -> VerifiedEmailPolicy {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => VerifiedEmailPolicy::Require,
        _ => VerifiedEmailPolicy::Accept,
    }
}
