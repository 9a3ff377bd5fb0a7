use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Yandex Cloud IAM token.
pub const ENV_IAM_TOKEN: &str = "iam_token";
/// Environment variable holding the Yandex Cloud folder (catalog) id.
pub const ENV_FOLDER_ID: &str = "catalog_id";
/// Environment variable holding the Imgur client id.
pub const ENV_IMGUR_CLIENT_ID: &str = "imgur_client_id";

/// Top-level configuration for the vision gateway.
///
/// Loaded once at process start and shared read-only by every request.
/// Credentials usually come from the environment (see [`Config::apply_env`]);
/// endpoint URLs and server settings come from the JSON file or defaults.
///
/// # Loading
///
/// ```rust,no_run
/// use yc_vision_api::config::Config;
///
/// let mut config = Config::load(Some("config.json".as_ref())).unwrap();
/// config.apply_env();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Yandex Cloud credentials and endpoints.
    pub yandex: YandexConfig,
    /// Imgur upload settings for annotated images.
    pub imgur: ImgurConfig,
    /// Listener address and request defaults.
    pub server: ServerConfig,
}

/// Yandex Cloud OCR and Vision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexConfig {
    pub iam_token: String,
    pub folder_id: String,
    pub ocr_url: String,
    pub vision_url: String,
    /// Value of the `x-data-logging-enabled` header sent to the OCR endpoint.
    pub data_logging: bool,
}

/// Imgur anonymous upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgurConfig {
    pub client_id: String,
    pub upload_url: String,
    /// Description attached to every uploaded image.
    pub description: String,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Image analysed when a request omits `url_image`.
    pub default_image_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yandex: YandexConfig {
                iam_token: String::new(),
                folder_id: String::new(),
                ocr_url: "https://ocr.api.cloud.yandex.net/ocr/v1/recognizeText".to_string(),
                vision_url: "https://vision.api.cloud.yandex.net/vision/v1/batchAnalyze"
                    .to_string(),
                data_logging: true,
            },
            imgur: ImgurConfig {
                client_id: String::new(),
                upload_url: "https://api.imgur.com/3/image".to_string(),
                description: "face detection (lab work for cloud technology)".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                default_image_url:
                    "https://yastat.net/s3/cloud/www/static/freeze/en/assets/img/vision.0bf4996d.png"
                        .to_string(),
            },
        }
    }
}

impl Config {
    /// `config.json` next to the running binary.
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Cannot locate the running binary")?;
        let dir = exe.parent().context("Binary path has no parent directory")?;
        Ok(dir.join("config.json"))
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Read the gateway settings from `path` (or [`Config::default_path`]).
    ///
    /// The file is optional. Without one the gateway runs on built-in
    /// endpoints, and tokens must come from [`Config::apply_env`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve(path)?;
        if !config_path.exists() {
            log::warn!(
                "No config at {}, using built-in endpoints",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read {}", config_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid gateway config in {}", config_path.display()))
    }

    /// Write these settings as pretty JSON, e.g. to seed a config with `--init`.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = Self::resolve(path)?;
        let contents = serde_json::to_string_pretty(self).context("Cannot serialize config")?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("Cannot write {}", config_path.display()))?;
        log::info!("Gateway config written to {}", config_path.display());
        Ok(())
    }

    /// Override credentials from the process environment (and `.env`, if present).
    pub fn apply_env(&mut self) {
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Override credentials using an arbitrary variable lookup.
    ///
    /// Unset or empty variables leave the current value untouched. Nothing is
    /// validated here: a missing token only shows up as an auth failure from
    /// the remote API.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = non_empty(ENV_IAM_TOKEN) {
            self.yandex.iam_token = token;
        }
        if let Some(folder) = non_empty(ENV_FOLDER_ID) {
            self.yandex.folder_id = folder;
        }
        if let Some(client_id) = non_empty(ENV_IMGUR_CLIENT_ID) {
            self.imgur.client_id = client_id;
        }
    }

    /// Names of credentials that are still empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.yandex.iam_token.is_empty() {
            missing.push(ENV_IAM_TOKEN);
        }
        if self.yandex.folder_id.is_empty() {
            missing.push(ENV_FOLDER_ID);
        }
        if self.imgur.client_id.is_empty() {
            missing.push(ENV_IMGUR_CLIENT_ID);
        }
        missing
    }
}
