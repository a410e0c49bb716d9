use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_TIMEOUT_SECS: u64 = 60;

/// HTTP method used to pull the admin list from the workflow webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMethod {
    #[default]
    Get,
    Post,
}

/// Optional header attached to every outbound webhook call.
#[derive(Debug, Clone)]
pub struct WebhookAuth {
    pub header: String,
    pub token: String,
}

#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    pub request_url: Option<String>,
    pub list_url: Option<String>,
    pub list_method: ListMethod,
    pub action_url: Option<String>,
    pub auth: Option<WebhookAuth>,
}

/// Where the spreadsheet rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    Csv(String),
    Values(String),
}

#[derive(Debug, Clone, Default)]
pub struct SheetConfig {
    pub source: Option<SheetSource>,
    pub api_key: Option<String>,
}

/// Admin credentials as configured. The plain password variant is hashed at startup.
#[derive(Debug, Clone)]
pub enum AdminSecret {
    Hash(String),
    Plain(String),
    Missing,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub admin_username: String,
    pub admin_secret: AdminSecret,
    pub webhook: WebhookConfig,
    pub sheet: SheetConfig,
    pub upstream_timeout: Duration,
    pub sync_interval: Option<Duration>,
}

impl AppConfig {
    /// Load from the process environment, honouring a `.env` file when present.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let admin_secret = match (get("ADMIN_PASSWORD_HASH"), get("ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminSecret::Hash(hash),
            (None, Some(plain)) => AdminSecret::Plain(plain),
            (None, None) => AdminSecret::Missing,
        };

        let list_method = match get("WEBHOOK_LIST_METHOD").as_deref() {
            None => ListMethod::Get,
            Some(m) if m.eq_ignore_ascii_case("get") => ListMethod::Get,
            Some(m) if m.eq_ignore_ascii_case("post") => ListMethod::Post,
            Some(other) => {
                log::warn!("Unknown WEBHOOK_LIST_METHOD '{}', using GET", other);
                ListMethod::Get
            }
        };

        let auth = match (get("WEBHOOK_AUTH_HEADER"), get("WEBHOOK_AUTH_TOKEN")) {
            (Some(header), Some(token)) => Some(WebhookAuth { header, token }),
            (None, Some(token)) => Some(WebhookAuth {
                header: "Authorization".to_string(),
                token,
            }),
            _ => None,
        };

        // CSV export wins when both are configured
        let sheet_source = match (get("SHEET_CSV_URL"), get("SHEET_VALUES_URL")) {
            (Some(url), _) => Some(SheetSource::Csv(url)),
            (None, Some(url)) => Some(SheetSource::Values(url)),
            (None, None) => None,
        };

        let timeout_secs = parse_u64(get("UPSTREAM_TIMEOUT_SECS"), "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .clamp(1, MAX_TIMEOUT_SECS);
        let sync_secs = parse_u64(get("SYNC_INTERVAL_SECS"), "SYNC_INTERVAL_SECS", 0);

        AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_key: get("SESSION_KEY"),
            cookie_secure: matches!(get("COOKIE_SECURE").as_deref(), Some("true" | "1")),
            admin_username: get("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_secret,
            webhook: WebhookConfig {
                request_url: get("WEBHOOK_REQUEST_URL"),
                list_url: get("WEBHOOK_LIST_URL"),
                list_method,
                action_url: get("WEBHOOK_ACTION_URL"),
                auth,
            },
            sheet: SheetConfig {
                source: sheet_source,
                api_key: get("SHEET_API_KEY"),
            },
            upstream_timeout: Duration::from_secs(timeout_secs),
            sync_interval: (sync_secs > 0).then(|| Duration::from_secs(sync_secs)),
        }
    }
}

fn parse_u64(value: Option<String>, key: &str, default: u64) -> u64 {
    match value {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            log::warn!("Invalid {} '{}', using {}", key, v, default);
            default
        }),
    }
}
