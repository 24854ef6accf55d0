#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub supabase: Supabase,
    pub reconcile: Reconcile,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub project_url: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub public_bucket: String,
    pub secure_bucket: String,
}

#[derive(Debug, Clone)]
pub struct Reconcile {
    /// Seconds between sweeps of the background loop.
    pub interval_secs: u64,
    /// Intents younger than this are left alone.
    pub stale_after_minutes: i64,
    pub batch_limit: Option<i64>,
    /// Bearer token for the internal trigger; the route answers 503 without it.
    pub internal_token: Option<String>,
}
