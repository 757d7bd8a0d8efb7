use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MessageConfig {
    pub common: core_config::Config,
    pub store: StoreSettings,
}

/// Everything the store connector needs to open a handle. Passed explicitly
/// on every connect; nothing here is read from process state at call time.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub credentials: Credentials,
    /// Namespace inside the store (the MongoDB database name).
    pub project_id: String,
    pub collection: String,
    pub connect_timeout_ms: u64,
    pub app_name: String,
}

#[derive(Debug, Clone)]
pub enum Credentials {
    /// Connection string carrying the credentials inline.
    Uri(Secret<String>),
    /// File whose contents are the connection string.
    File(PathBuf),
}

fn default_collection() -> String {
    "messages".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_app_name() -> String {
    "message-service".to_string()
}

impl Credentials {
    /// Resolve to a connection string, reading the credential file if needed.
    pub async fn resolve(&self) -> std::io::Result<Secret<String>> {
        match self {
            Credentials::Uri(uri) => Ok(uri.clone()),
            Credentials::File(path) => {
                let contents = tokio::fs::read_to_string(path).await?;
                let uri = contents.trim();
                if uri.is_empty() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("credential file {} is empty", path.display()),
                    ));
                }
                Ok(Secret::new(uri.to_string()))
            }
        }
    }
}

impl StoreSettings {
    pub fn new(credentials: Credentials, project_id: impl Into<String>) -> Self {
        Self {
            credentials,
            project_id: project_id.into(),
            collection: default_collection(),
            connect_timeout_ms: default_connect_timeout_ms(),
            app_name: default_app_name(),
        }
    }
}

impl MessageConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let credentials = match (env::var("STORE_URI"), env::var("STORE_CREDENTIALS_FILE")) {
            (Ok(uri), _) => Credentials::Uri(Secret::new(uri)),
            (Err(_), Ok(path)) => Credentials::File(PathBuf::from(path)),
            (Err(_), Err(_)) => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "either STORE_URI or STORE_CREDENTIALS_FILE must be set"
                )))
            }
        };

        Ok(MessageConfig {
            common: common_config,
            store: StoreSettings {
                credentials,
                project_id: get_env("STORE_PROJECT_ID", Some("messages_db"), is_prod)?,
                collection: get_env("STORE_COLLECTION", Some("messages"), is_prod)?,
                connect_timeout_ms: get_env("STORE_CONNECT_TIMEOUT_MS", Some("10000"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "STORE_CONNECT_TIMEOUT_MS is not a valid integer: {}",
                            e
                        ))
                    })?,
                app_name: get_env("STORE_APP_NAME", Some("message-service"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Mask the password portion of a connection string for logging.
pub fn redact_uri(uri: &Secret<String>) -> String {
    let uri = uri.expose_secret();
    let Some(at_pos) = uri.rfind('@') else {
        return uri.clone();
    };
    let scheme_end = uri.find("://").map(|i| i + 3).unwrap_or(0);
    // A scheme separator after the last '@' means the string is malformed.
    let Some(userinfo) = uri.get(scheme_end..at_pos) else {
        return "****".to_string();
    };
    match userinfo.find(':') {
        Some(colon) => {
            let colon_pos = scheme_end + colon;
            format!("{}****{}", &uri[..=colon_pos], &uri[at_pos..])
        }
        None => uri.clone(),
    }
}
