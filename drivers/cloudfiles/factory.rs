//! Cloud Files存储工厂

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::config::CumulusSettings;
use crate::storage::{StorageBox, StorageFactory};
use super::config::StorageOptions;
use super::driver::CloudFilesStorage;

/// Cloud Files存储工厂，持有全局默认配置
pub struct CloudFilesStorageFactory {
    settings: CumulusSettings,
}

impl CloudFilesStorageFactory {
    pub fn new(settings: CumulusSettings) -> Self {
        Self { settings }
    }
}

impl StorageFactory for CloudFilesStorageFactory {
    fn storage_type(&self) -> &'static str {
        "cloudfiles"
    }

    fn create_storage(&self, config: Value) -> Result<StorageBox> {
        let options: StorageOptions = if config.is_null() {
            StorageOptions::default()
        } else {
            serde_json::from_value(config)
                .map_err(|e| anyhow!("配置解析失败: {}", e))?
        };
        Ok(Arc::new(CloudFilesStorage::new(&self.settings, options)))
    }
}
