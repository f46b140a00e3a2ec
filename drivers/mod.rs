// Driver package / 驱动包
pub mod cloudfiles;

use crate::config::CumulusSettings;
use crate::storage::StorageManager;

/// Register all drivers to StorageManager / 注册所有驱动
pub async fn register_all(manager: &StorageManager, settings: &CumulusSettings) -> anyhow::Result<()> {
    // Register Cloud Files driver / 注册Cloud Files驱动
    manager.register_factory(Box::new(cloudfiles::CloudFilesStorageFactory::new(settings.clone()))).await?;
    Ok(())
}
