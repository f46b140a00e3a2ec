use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use anyhow::{anyhow, Result};
use serde_json::Value;

use super::Storage;

pub type StorageBox = Arc<dyn Storage>;

/// Storage factory trait / 存储工厂 trait
pub trait StorageFactory: Send + Sync {
    /// Storage type name / 存储类型名称
    fn storage_type(&self) -> &'static str;

    /// Build a storage from its JSON config / 根据 JSON 配置创建存储实例
    fn create_storage(&self, config: Value) -> Result<StorageBox>;
}

/// Storage manager (named storage instances) / 存储管理器
#[derive(Clone)]
pub struct StorageManager {
    storages: Arc<RwLock<HashMap<String, StorageBox>>>,
    factories: Arc<RwLock<HashMap<String, Arc<dyn StorageFactory>>>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self {
            storages: Arc::new(RwLock::new(HashMap::new())),
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register storage factory / 注册存储工厂
    pub async fn register_factory(&self, factory: Box<dyn StorageFactory>) -> Result<()> {
        let storage_type = factory.storage_type().to_string();

        let mut factories = self.factories.write().await;
        factories.insert(storage_type.clone(), Arc::from(factory));

        tracing::info!("Storage factory registered: {}", storage_type);
        Ok(())
    }

    /// Create a storage instance; no remote call is made here / 创建存储实例
    pub async fn create_storage(&self, id: &str, storage_type: &str, config: Value) -> Result<StorageBox> {
        let factory = {
            let factories = self.factories.read().await;
            factories.get(storage_type)
                .cloned()
                .ok_or_else(|| anyhow!("Storage type not found: {}", storage_type))?
        };

        let storage = factory.create_storage(config).map_err(|e| {
            tracing::error!("Storage creation failed: {} ({}) - {}", id, storage_type, e);
            e
        })?;

        let mut storages = self.storages.write().await;
        storages.insert(id.to_string(), storage.clone());
        tracing::info!("Storage created: {} ({})", id, storage_type);

        Ok(storage)
    }

    /// Get storage instance / 获取存储实例
    pub async fn get_storage(&self, id: &str) -> Option<StorageBox> {
        let storages = self.storages.read().await;
        storages.get(id).cloned()
    }

    /// Remove storage instance / 移除存储实例
    pub async fn remove_storage(&self, id: &str) -> Result<()> {
        let mut storages = self.storages.write().await;
        storages.remove(id)
            .ok_or_else(|| anyhow!("Storage not found: {}", id))?;

        tracing::info!("Storage removed: {}", id);
        Ok(())
    }

    /// List all storage ids / 列出所有存储
    pub async fn list_storages(&self) -> Vec<String> {
        let storages = self.storages.read().await;
        let mut ids: Vec<String> = storages.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// List all available storage types / 列出所有可用的存储类型
    pub async fn list_storage_types(&self) -> Vec<String> {
        let factories = self.factories.read().await;
        let mut types: Vec<String> = factories.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
