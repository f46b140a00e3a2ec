//! Application configuration module / 应用配置模块
//!
//! Default Cloud Files settings loaded from cumulus.json
//! Every storage instance starts from these and may override single fields / 存储实例可覆盖单个字段

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Rackspace US auth endpoint / 美国区认证地址
pub const US_AUTHURL: &str = "https://auth.api.rackspacecloud.com/v1.0";
/// Rackspace UK auth endpoint / 英国区认证地址
pub const UK_AUTHURL: &str = "https://lon.auth.api.rackspacecloud.com/v1.0";

/// Cloud Files default settings / Cloud Files 默认配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CumulusSettings {
    pub username: String,
    pub api_key: String,
    /// Auth endpoint, or one of `us_authurl` / `uk_authurl` / 认证地址
    pub auth_url: String,
    /// Container name / 容器名称
    pub container: String,
    /// Request timeout in seconds / 请求超时（秒）
    pub timeout: u64,
    /// Use the internal ServiceNet network / 使用内网
    pub servicenet: bool,
    /// Public URI -> alias host / 公开地址别名表
    pub cnames: HashMap<String, String>,
    /// CDN TTL applied when publishing the container / CDN 缓存时间（秒）
    pub ttl: u32,
    /// Hand out the SSL CDN URI / 使用 HTTPS CDN 地址
    pub use_ssl: bool,
}

impl Default for CumulusSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            api_key: String::new(),
            auth_url: US_AUTHURL.to_string(),
            container: String::new(),
            timeout: 5,
            servicenet: false,
            cnames: HashMap::new(),
            ttl: 600,
            use_ssl: false,
        }
    }
}

impl CumulusSettings {
    /// Resolve the `us_authurl` / `uk_authurl` aliases / 解析认证地址别名
    pub fn resolved_auth_url(&self) -> String {
        resolve_auth_url(&self.auth_url)
    }

    /// Apply CUMULUS_* environment overrides / 应用环境变量覆盖
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CUMULUS_USERNAME") {
            self.username = v;
        }
        if let Some(v) = lookup("CUMULUS_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = lookup("CUMULUS_CONTAINER") {
            self.container = v;
        }
    }
}

pub fn resolve_auth_url(auth_url: &str) -> String {
    match auth_url {
        "us_authurl" | "" => US_AUTHURL.to_string(),
        "uk_authurl" => UK_AUTHURL.to_string(),
        other => other.to_string(),
    }
}

/// Default config file path / 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("cumulus.json")
}

/// Load settings from file (defaults if missing), then apply env / 加载配置文件
pub fn load_config(path: &Path) -> Result<CumulusSettings, String> {
    let mut settings = if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let settings: CumulusSettings = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", path);
        settings
    } else {
        tracing::info!("No configuration at {:?}, using defaults", path);
        CumulusSettings::default()
    };

    settings.apply_env();
    Ok(settings)
}

/// Save settings to file / 保存配置到文件
pub fn save_config(path: &Path, settings: &CumulusSettings) -> Result<(), String> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
