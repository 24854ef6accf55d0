use anyhow::Result;
use offszn::domain::value_objects::checkout::{
    DEFAULT_MIN_UNIT_PRICE_COP, DEFAULT_USD_TO_COP_RATE,
};

use super::config_model::{
    BackendServer, Checkout, Cloudinary, Database, DotEnvyConfig, MercadoPago, Supabase,
};

const DEFAULT_PUBLIC_BUCKET: &str = "products";
const DEFAULT_SECURE_BUCKET: &str = "secure-products";
const DEFAULT_S3_REGION: &str = "us-east-1";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let mut warnings = Vec::new();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
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
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
        s3_region: optional_env("SUPABASE_S3_REGION")
            .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
        s3_access_key: required_or_warn("SUPABASE_S3_ACCESS_KEY", &mut warnings),
        s3_secret_key: required_or_warn("SUPABASE_S3_SECRET_KEY", &mut warnings),
        public_bucket: optional_env("SUPABASE_PUBLIC_BUCKET")
            .unwrap_or_else(|| DEFAULT_PUBLIC_BUCKET.to_string()),
        secure_bucket: optional_env("SUPABASE_SECURE_BUCKET")
            .unwrap_or_else(|| DEFAULT_SECURE_BUCKET.to_string()),
    };

    let mercadopago = MercadoPago {
        access_token: required_or_warn("MERCADOPAGO_ACCESS_TOKEN", &mut warnings),
        webhook_secret: required_or_warn("MERCADOPAGO_WEBHOOK_SECRET", &mut warnings),
        notification_url: optional_env("MERCADOPAGO_NOTIFICATION_URL"),
        success_url: optional_env("MERCADOPAGO_SUCCESS_URL").unwrap_or_default(),
        failure_url: optional_env("MERCADOPAGO_FAILURE_URL").unwrap_or_default(),
        pending_url: optional_env("MERCADOPAGO_PENDING_URL").unwrap_or_default(),
    };

    let cloudinary = Cloudinary {
        cloud_name: required_or_warn("CLOUDINARY_CLOUD_NAME", &mut warnings),
        api_key: required_or_warn("CLOUDINARY_API_KEY", &mut warnings),
        api_secret: required_or_warn("CLOUDINARY_API_SECRET", &mut warnings),
    };

    let checkout = Checkout {
        usd_to_cop_rate: parse_or_warn(
            "CHECKOUT_USD_TO_COP_RATE",
            DEFAULT_USD_TO_COP_RATE,
            &mut warnings,
        ),
        min_unit_price_cop: parse_or_warn(
            "CHECKOUT_MIN_UNIT_PRICE_COP",
            DEFAULT_MIN_UNIT_PRICE_COP,
            &mut warnings,
        ),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        mercadopago,
        cloudinary,
        checkout,
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
    match optional_env(key) {
        Some(value) => value,
        None => {
            warnings.push(format!("{key} is not set; features depending on it will fail"));
            String::new()
        }
    }
}

fn parse_or_warn<T>(key: &str, default: T, warnings: &mut Vec<String>) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match optional_env(key) {
        None => default,
        Some(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warnings.push(format!("{key} is invalid (value: {raw}); defaulting to {default}"));
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_optional_values_fall_back_with_warning() {
        unsafe {
            std::env::set_var("OFFSZN_TEST_RATE", "not-a-number");
        }
        let mut warnings = Vec::new();

        let rate = parse_or_warn("OFFSZN_TEST_RATE", 4200.0, &mut warnings);

        assert_eq!(rate, 4200.0);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("OFFSZN_TEST_RATE"));
    }

    #[test]
    fn missing_credentials_are_reported() {
        unsafe {
            std::env::remove_var("OFFSZN_TEST_MISSING_KEY");
        }
        let mut warnings = Vec::new();

        let value = required_or_warn("OFFSZN_TEST_MISSING_KEY", &mut warnings);

        assert!(value.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
