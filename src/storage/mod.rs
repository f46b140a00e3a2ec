use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

pub mod error;
pub mod manager;

pub use error::{Result, StorageError};
pub use manager::{StorageBox, StorageFactory, StorageManager};

use crate::utils::conflict_name;

/// Attributes of the stream underneath a [`Content`] / 底层数据流属性
#[derive(Debug, Clone, Default)]
pub struct StreamMeta {
    /// Size reported by the stream itself / 数据流自身报告的大小
    pub size: Option<u64>,
    /// Content type carried by the stream / 数据流携带的内容类型
    pub content_type: Option<String>,
}

/// Content handed to [`Storage::save`] / 待保存内容
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub data: Bytes,
    pub file: StreamMeta,
    /// Content type set on the wrapper / 包装层内容类型
    pub content_type: Option<String>,
}

impl Content {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn with_stream_meta(mut self, size: Option<u64>, content_type: Option<String>) -> Self {
        self.file = StreamMeta { size, content_type };
        self
    }

    /// Size of the buffered payload / 缓冲数据大小
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Drain a reader into memory / 读取整个数据流
    pub async fn from_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(Self::new(buf))
    }

    /// Read a local file; the stream size comes from file metadata / 读取本地文件
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(data).with_stream_meta(Some(size), None))
    }
}

/// Directory listing result / 目录列表结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

/// File-like view over a stored object / 存储对象的类文件视图
#[async_trait]
pub trait StorageFile: Send {
    fn name(&self) -> &str;

    /// Read from the cursor; `None` reads everything remaining / 从游标处读取
    async fn read(&mut self, num_bytes: Option<usize>) -> Result<Bytes>;

    fn seek(&mut self, pos: u64);

    fn tell(&self) -> u64;

    fn open(&mut self);

    fn close(&mut self);

    fn closed(&self) -> bool;

    async fn size(&mut self) -> Result<u64>;
}

/// Storage interface consumed by the host application / 宿主应用使用的存储接口
#[async_trait]
pub trait Storage: Send + Sync {
    /// Storage name / 存储名称
    fn name(&self) -> &str;

    /// Open a handle; no remote call is made / 打开文件句柄（不访问远端）
    fn open(&self, name: &str) -> Box<dyn StorageFile>;

    /// Write content under `name`, returns the stored name / 保存内容
    async fn save(&self, name: &str, content: Content) -> Result<String>;

    /// Delete; missing objects are not an error / 删除（幂等）
    async fn delete(&self, name: &str) -> Result<()>;

    async fn exists(&self, name: &str) -> Result<bool>;

    /// Quick listing: files only / 快速列表
    async fn listdir(&self, path: &str) -> Result<Listing>;

    /// Listing with directories / 包含目录的完整列表
    async fn full_listdir(&self, path: &str) -> Result<Listing> {
        self.listdir(path).await
    }

    async fn size(&self, name: &str) -> Result<u64>;

    /// Public URL for `name` / 公开访问地址
    async fn url(&self, name: &str) -> Result<String>;

    /// First free name: `name`, then `stem (1).ext`, `stem (2).ext`, ... / 获取可用文件名
    async fn get_available_name(&self, name: &str) -> Result<String> {
        if !self.exists(name).await? {
            return Ok(name.to_string());
        }
        for i in 1..10000 {
            let candidate = conflict_name(name, i);
            if !self.exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        // 极端情况：使用时间戳
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Ok(conflict_name(name, timestamp as u64))
    }

    /// Save without overwriting / 不覆盖地保存
    async fn save_available(&self, name: &str, content: Content) -> Result<String> {
        let name = self.get_available_name(name).await?;
        self.save(&name, content).await
    }
}
