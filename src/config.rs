use clap::Parser;

/// Process configuration. Every knob reads from the environment and can be
/// overridden on the command line; the optional outbound services (Redis,
/// SMTP, the asset host) degrade to local stand-ins when unset.
#[derive(Debug, Clone, Parser)]
#[command(name = "inkpot", about = "Content platform backend")]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Frontend origin allowed by CORS, credentials included.
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// Base URL put into mailed links.
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:3000")]
    pub public_url: String,

    #[arg(long, env = "MONGO_URI", default_value = "mongodb://127.0.0.1:27017")]
    pub mongo_uri: String,

    #[arg(long, env = "MONGO_DB", default_value = "inkpot")]
    pub mongo_db: String,

    /// Response cache; caching is skipped entirely when unset.
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long, env = "CACHE_TTL_SECONDS", default_value_t = 60)]
    pub cache_ttl_seconds: u64,

    #[arg(long, env = "JWT_SECRET", default_value = "dev-secret-change-me")]
    pub jwt_secret: String,

    #[arg(long, env = "JWT_TTL_HOURS", default_value_t = 24)]
    pub jwt_ttl_hours: i64,

    /// SMTP relay host; mail is logged instead of sent when unset.
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_USERNAME", default_value = "")]
    pub smtp_username: String,

    #[arg(long, env = "SMTP_PASSWORD", default_value = "")]
    pub smtp_password: String,

    #[arg(long, env = "MAIL_FROM", default_value = "Inkpot <no-reply@localhost>")]
    pub mail_from: String,

    /// Asset host cloud name; uploads get fake in-memory refs when unset.
    #[arg(long, env = "ASSET_CLOUD_NAME")]
    pub asset_cloud_name: Option<String>,

    #[arg(long, env = "ASSET_API_KEY", default_value = "")]
    pub asset_api_key: String,

    #[arg(long, env = "ASSET_API_SECRET", default_value = "")]
    pub asset_api_secret: String,
}
