//! Cloud Files驱动配置

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 额外的连接参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    /// 自定义 User-Agent
    pub user_agent: Option<String>,
    /// 每个请求附带的额外请求头
    pub extra_headers: HashMap<String, String>,
    /// 跳过TLS证书验证
    pub tls_insecure_skip_verify: bool,
}

/// 单个存储实例的覆盖项，未设置的字段使用全局配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub container: Option<String>,
    /// 超时（秒）
    pub timeout: Option<u64>,
    pub connection_options: Option<ConnectionOptions>,
}

/// 可序列化的存储状态（不含连接）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageState {
    pub username: String,
    pub api_key: String,
    pub auth_url: String,
    pub container_name: String,
    pub timeout: u64,
    pub use_servicenet: bool,
    #[serde(default)]
    pub connection_options: ConnectionOptions,
}
