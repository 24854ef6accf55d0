#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub mercadopago: MercadoPago,
    pub cloudinary: Cloudinary,
    pub checkout: Checkout,
    /// Problems found while loading, reported once tracing is up.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub project_url: String,
    pub jwt_secret: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub public_bucket: String,
    pub secure_bucket: String,
}

#[derive(Debug, Clone)]
pub struct MercadoPago {
    pub access_token: String,
    pub webhook_secret: String,
    pub notification_url: Option<String>,
    pub success_url: String,
    pub failure_url: String,
    pub pending_url: String,
}

#[derive(Debug, Clone)]
pub struct Cloudinary {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub usd_to_cop_rate: f64,
    pub min_unit_price_cop: i64,
}
