/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the chat credentials, which have no safe default and fail fast when
/// missing.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Bot token for the chat platform's Web API.
    pub chat_bot_token: String,
    /// Signing secret for verifying inbound chat requests.
    pub chat_signing_secret: String,
    /// Base URL of the chat platform's Web API (default: `https://slack.com/api`).
    pub chat_api_base: String,
    /// Public base URL of this service, used to build browser editor links.
    pub editor_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CHAT_BOT_TOKEN`       | (required)                 |
    /// | `CHAT_SIGNING_SECRET`  | (required)                 |
    /// | `CHAT_API_BASE`        | `https://slack.com/api`    |
    /// | `EDITOR_BASE_URL`      | `http://localhost:3000`    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let chat_bot_token =
            std::env::var("CHAT_BOT_TOKEN").expect("CHAT_BOT_TOKEN must be set");
        let chat_signing_secret =
            std::env::var("CHAT_SIGNING_SECRET").expect("CHAT_SIGNING_SECRET must be set");
        let chat_api_base =
            std::env::var("CHAT_API_BASE").unwrap_or_else(|_| "https://slack.com/api".into());
        let editor_base_url =
            std::env::var("EDITOR_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            chat_bot_token,
            chat_signing_secret,
            chat_api_base,
            editor_base_url,
        }
    }
}
