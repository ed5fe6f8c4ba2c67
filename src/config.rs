use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetProvider {
    Cloudinary,
    Local,
}

impl AssetProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cloudinary" => Some(AssetProvider::Cloudinary),
            "local" => Some(AssetProvider::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_asset_provider")]
    pub provider: AssetProvider,
    /// Folder namespace every upload is stored under
    #[serde(default = "default_asset_folder")]
    pub folder: String,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    /// Base URL handed out for locally stored assets
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_cloudinary_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_max_upload_mb() -> usize {
    20
}

fn default_metadata_path() -> String {
    "metadata.csv".to_string()
}

fn default_asset_provider() -> AssetProvider {
    AssetProvider::Cloudinary
}

fn default_asset_folder() -> String {
    "wardrobe".to_string()
}

fn default_local_path() -> String {
    "data/assets".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8501/assets".to_string()
}

fn default_cloudinary_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_openrouter_model() -> String {
    "meta-llama/llama-3.1-8b-instruct:free".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_referer() -> String {
    "http://localhost:8501".to_string()
}

fn default_title() -> String {
    "Virtual Wardrobe".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: default_metadata_path(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            provider: default_asset_provider(),
            folder: default_asset_folder(),
            local_path: default_local_path(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_base: default_cloudinary_api_base(),
        }
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openrouter_base_url(),
            model: default_openrouter_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// Flat key/value secrets, read from `secrets.toml` with the process
/// environment as fallback.
#[derive(Debug, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    pub fn load() -> anyhow::Result<Self> {
        let secret_paths = ["secrets.toml", ".secrets/secrets.toml", "data/secrets.toml"];

        for path in secret_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let secrets = Self::from_toml(&content)?;
                tracing::info!("Loaded {} secret(s) from {}", secrets.values.len(), path);
                return Ok(secrets);
            }
        }

        tracing::debug!("No secrets file found, falling back to environment");
        Ok(Self::default())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let values = table
            .into_iter()
            .filter_map(|(k, v)| match v {
                toml::Value::String(s) => Some((k, s)),
                toml::Value::Integer(i) => Some((k, i.to_string())),
                _ => None,
            })
            .collect();
        Ok(Self { values })
    }

    /// Look up a secret, falling back to the environment
    pub fn get(&self, key: &str) -> Option<String> {
        let present = |v: &String| !v.trim().is_empty();
        self.values
            .get(key)
            .filter(|v| present(v))
            .cloned()
            .or_else(|| env::var(key).ok().filter(present))
    }
}

impl Config {
    /// Load configuration from file, environment variables and secrets
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        let secrets = Secrets::load()?;
        config.apply_secrets(&secrets);
        config.validate()?;
        config.ensure_directories()?;
        tracing::info!(
            "Assets: provider={:?}, folder={}; model={}",
            config.assets.provider,
            config.assets.folder,
            config.openrouter.model
        );
        Ok(config)
    }

    /// Load configuration from wardrobe.toml or config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["wardrobe.toml", "config.toml", "data/wardrobe.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: WARDROBE_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("WARDROBE_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("WARDROBE_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        if let Ok(val) = env::var("WARDROBE_CONF_SERVER_MAX_UPLOAD_MB") {
            if let Ok(mb) = val.parse() {
                self.server.max_upload_mb = mb;
            }
        }

        if let Ok(val) = env::var("WARDROBE_CONF_METADATA_PATH") {
            self.metadata.path = val;
        }

        if let Ok(val) = env::var("WARDROBE_CONF_ASSETS_PROVIDER") {
            match AssetProvider::from_str(&val) {
                Some(provider) => self.assets.provider = provider,
                None => tracing::warn!("Ignoring unknown asset provider '{}'", val),
            }
        }
        if let Ok(val) = env::var("WARDROBE_CONF_ASSETS_FOLDER") {
            self.assets.folder = val;
        }
        if let Ok(val) = env::var("WARDROBE_CONF_ASSETS_LOCAL_PATH") {
            self.assets.local_path = val;
        }
        if let Ok(val) = env::var("WARDROBE_CONF_ASSETS_PUBLIC_BASE_URL") {
            self.assets.public_base_url = val;
        }

        if let Ok(val) = env::var("WARDROBE_CONF_CLOUDINARY_API_BASE") {
            self.cloudinary.api_base = val;
        }

        if let Ok(val) = env::var("WARDROBE_CONF_OPENROUTER_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.openrouter.temperature = t;
            }
        }
        if let Ok(val) = env::var("WARDROBE_CONF_OPENROUTER_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                self.openrouter.max_tokens = n;
            }
        }
        if let Ok(val) = env::var("WARDROBE_CONF_OPENROUTER_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.openrouter.timeout_secs = n;
            }
        }
    }

    /// Fill credentials from the secrets store
    fn apply_secrets(&mut self, secrets: &Secrets) {
        if let Some(v) = secrets.get("CLOUDINARY_CLOUD_NAME") {
            self.cloudinary.cloud_name = v;
        }
        if let Some(v) = secrets.get("CLOUDINARY_API_KEY") {
            self.cloudinary.api_key = v;
        }
        if let Some(v) = secrets.get("CLOUDINARY_API_SECRET") {
            self.cloudinary.api_secret = v;
        }
        if let Some(v) = secrets.get("OPENROUTER_API_KEY") {
            self.openrouter.api_key = v;
        }
        if let Some(v) = secrets.get("OPENROUTER_BASE_URL") {
            self.openrouter.base_url = v;
        }
        if let Some(v) = secrets.get("OPENROUTER_MODEL") {
            self.openrouter.model = v;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.assets.provider == AssetProvider::Cloudinary {
            let c = &self.cloudinary;
            if c.cloud_name.is_empty() || c.api_key.is_empty() || c.api_secret.is_empty() {
                anyhow::bail!(
                    "Cloudinary credentials missing: set CLOUDINARY_CLOUD_NAME, \
                     CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET"
                );
            }
        }
        let temperature = self.openrouter.temperature;
        if temperature.is_nan() || temperature <= 0.0 {
            anyhow::bail!("openrouter.temperature must be greater than 0, got {}", temperature);
        }
        if self.openrouter.api_key.is_empty() {
            tracing::warn!("OPENROUTER_API_KEY is not set; outfit suggestions will fail");
        }
        Ok(())
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.metadata.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if self.assets.provider == AssetProvider::Local {
            fs::create_dir_all(&self.assets.local_path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.metadata.path, "metadata.csv");
        assert_eq!(config.assets.folder, "wardrobe");
        assert_eq!(config.assets.provider, AssetProvider::Cloudinary);
        assert_eq!(config.openrouter.model, "meta-llama/llama-3.1-8b-instruct:free");
        assert_eq!(config.openrouter.max_tokens, 4096);
        assert_eq!(config.cloudinary.api_base, "https://api.cloudinary.com/v1_1");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [assets]
            provider = "local"

            [openrouter]
            model = "openai/gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.provider, AssetProvider::Local);
        assert_eq!(config.assets.folder, "wardrobe");
        assert_eq!(config.openrouter.model, "openai/gpt-4o-mini");
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn test_secrets_file_takes_precedence() {
        let secrets = Secrets::from_toml(
            r#"
            CLOUDINARY_CLOUD_NAME = "demo"
            CLOUDINARY_API_KEY = 1234
            CLOUDINARY_API_SECRET = "shh"
            OPENROUTER_MODEL = ""
            "#,
        )
        .unwrap();
        let mut config = Config::default();
        config.apply_secrets(&secrets);
        assert_eq!(config.cloudinary.cloud_name, "demo");
        assert_eq!(config.cloudinary.api_key, "1234");
        assert_eq!(config.cloudinary.api_secret, "shh");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cloudinary_requires_credentials() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.assets.provider = AssetProvider::Local;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_temperature_must_be_positive() {
        let mut config = Config::default();
        config.assets.provider = AssetProvider::Local;

        for bad in [0.0, -0.5, f32::NAN] {
            config.openrouter.temperature = bad;
            assert!(config.validate().is_err(), "accepted {}", bad);
        }

        config.openrouter.temperature = 0.2;
        assert!(config.validate().is_ok());
    }
}
