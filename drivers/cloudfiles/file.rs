//! Cloud Files 只读文件句柄
//!
//! 游标由本地维护，每次读取都是一次带 Range 的请求

use async_trait::async_trait;
use bytes::Bytes;

use crate::storage::{Result, Storage, StorageFile};
use super::client::ObjectInfo;
use super::driver::CloudFilesStorage;

/// 远端对象的文件句柄
pub struct CloudFilesFile {
    storage: CloudFilesStorage,
    name: String,
    pos: u64,
    size: Option<u64>,
    /// 首次读取时绑定的远端对象；None 即为 closed
    file: Option<ObjectInfo>,
}

impl CloudFilesFile {
    pub fn new(storage: CloudFilesStorage, name: &str) -> Self {
        Self {
            storage,
            name: name.to_string(),
            pos: 0,
            size: None,
            file: None,
        }
    }

    /// 覆盖缓存的大小
    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    /// 已绑定的远端对象
    pub fn object(&self) -> Option<&ObjectInfo> {
        self.file.as_ref()
    }

    /// 解除绑定，句柄回到 closed
    pub fn detach(&mut self) {
        self.file = None;
    }

    async fn bind(&mut self) -> Result<()> {
        if self.file.is_none() {
            let obj = self.storage.get_cloud_obj(&self.name).await?;
            self.file = Some(obj);
        }
        Ok(())
    }
}

#[async_trait]
impl StorageFile for CloudFilesFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self, num_bytes: Option<usize>) -> Result<Bytes> {
        self.bind().await?;
        let len = num_bytes.filter(|n| *n > 0).map(|n| n as u64);
        let data = self.storage.read_object(&self.name, self.pos, len).await?;
        self.pos += data.len() as u64;
        Ok(data)
    }

    fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    fn open(&mut self) {
        self.pos = 0;
    }

    fn close(&mut self) {
        self.pos = 0;
    }

    fn closed(&self) -> bool {
        self.file.is_none()
    }

    async fn size(&mut self) -> Result<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let size = self.storage.size(&self.name).await?;
        self.size = Some(size);
        Ok(size)
    }
}
