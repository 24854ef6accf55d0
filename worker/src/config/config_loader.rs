use anyhow::Result;

use super::config_model::{Database, DotEnvyConfig, Reconcile, Supabase, WorkerServer};

const DEFAULT_INTERVAL_SECS: u64 = 900;
const DEFAULT_STALE_AFTER_MINUTES: i64 = 60;
const DEFAULT_BATCH_LIMIT: i64 = 100;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let mut warnings = Vec::new();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .expect("SERVER_PORT_WORKER is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let project_url = std::env::var("SUPABASE_PROJECT_URL")
        .expect("SUPABASE_PROJECT_URL is invalid")
        .trim_end_matches('/')
        .to_string();

    let supabase = Supabase {
        s3_endpoint: optional_env("SUPABASE_S3_ENDPOINT")
            .unwrap_or_else(|| format!("{}/storage/v1/s3", project_url)),
        project_url,
        s3_region: optional_env("SUPABASE_S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        s3_access_key: required_or_warn("SUPABASE_S3_ACCESS_KEY", &mut warnings),
        s3_secret_key: required_or_warn("SUPABASE_S3_SECRET_KEY", &mut warnings),
        public_bucket: optional_env("SUPABASE_PUBLIC_BUCKET")
            .unwrap_or_else(|| "products".to_string()),
        secure_bucket: optional_env("SUPABASE_SECURE_BUCKET")
            .unwrap_or_else(|| "secure-products".to_string()),
    };

    let internal_token = optional_env("INTERNAL_RECONCILE_TOKEN");
    if internal_token.is_none() {
        warnings.push(
            "INTERNAL_RECONCILE_TOKEN is not set; the reconcile endpoint is disabled".to_string(),
        );
    }

    let reconcile = Reconcile {
        interval_secs: parse_or_warn("RECONCILE_INTERVAL_SECS", DEFAULT_INTERVAL_SECS, &mut warnings)
            .max(1),
        stale_after_minutes: parse_or_warn(
            "RECONCILE_STALE_AFTER_MINUTES",
            DEFAULT_STALE_AFTER_MINUTES,
            &mut warnings,
        )
        .max(0),
        batch_limit: Some(
            parse_or_warn("RECONCILE_BATCH_LIMIT", DEFAULT_BATCH_LIMIT, &mut warnings),
        )
        .filter(|limit| *limit > 0),
        internal_token,
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        supabase,
        reconcile,
        warnings,
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required_or_warn(key: &str, warnings: &mut Vec<String>) -> String {
    optional_env(key).unwrap_or_else(|| {
        warnings.push(format!("{key} is not set; storage deletes will fail"));
        String::new()
    })
}

fn parse_or_warn<T>(key: &str, default: T, warnings: &mut Vec<String>) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let Some(raw) = optional_env(key) else {
        return default;
    };
    raw.parse::<T>().unwrap_or_else(|_| {
        warnings.push(format!("{key} is invalid (value: {raw}); defaulting to {default}"));
        default
    })
}
