use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://smartpicks-88709.web.app",
    "https://smartpicks-88709.firebaseapp.com",
    "http://localhost:9000",
];

/// ~5 MiB of binary once base64 expanded.
pub const DEFAULT_AVATAR_MAX_BYTES: usize = 7 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub enum StorageConfig {
    Local {
        upload_dir: String,
        public_base_url: String,
    },
    S3(S3Config),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub avatar_max_bytes: usize,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode=require",
                env_or("DB_USER", "postgres"),
                env_or("DB_PASSWORD", ""),
                env_or("DB_HOST", "localhost"),
                env_or("DB_PORT", "5432"),
                env_or("DB_NAME", "smartpicks"),
            ),
        };

        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("APP_PORT"))
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect());

        let storage = match env_or("STORAGE_BACKEND", "local").as_str() {
            "local" => StorageConfig::Local {
                upload_dir: env_or("UPLOAD_DIR", "./uploads"),
                public_base_url: env_or("PUBLIC_BASE_URL", ""),
            },
            "s3" => StorageConfig::S3(S3Config {
                region: std::env::var("AWS_REGION")
                    .context("AWS_REGION is required for s3 storage")?,
                bucket: std::env::var("AWS_BUCKET_NAME")
                    .context("AWS_BUCKET_NAME is required for s3 storage")?,
                endpoint: std::env::var("AWS_ENDPOINT_URL").ok(),
                access_key: std::env::var("AWS_ACCESS_KEY_ID").ok(),
                secret_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
                public_base_url: std::env::var("S3_PUBLIC_BASE_URL").ok(),
            }),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}, expected local or s3"),
        };

        Ok(Self {
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: env_or("APP_HOST", "0.0.0.0"),
            port,
            allowed_origins,
            avatar_max_bytes: std::env::var("AVATAR_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_AVATAR_MAX_BYTES),
            storage,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
