//! 对象存储客户端抽象
//!
//! Connection/Container 两层，对应 Cloud Files 的账号与容器

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::storage::Result;

pub type ConnectionBox = Arc<dyn Connection>;
pub type ContainerBox = Arc<dyn Container>;

/// 远端对象元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// 上传请求
#[derive(Debug, Clone)]
pub struct ObjectUpload {
    /// 声明的对象大小
    pub size: u64,
    /// None 时由传输层使用 application/octet-stream
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// 已认证的账号连接
#[async_trait]
pub trait Connection: Send + Sync {
    /// 获取容器；不存在时返回 NoSuchContainer
    async fn get_container(&self, name: &str) -> Result<ContainerBox>;
}

/// 容器内对象操作
#[async_trait]
pub trait Container: Send + Sync {
    fn name(&self) -> &str;

    /// CDN 是否已开启
    async fn is_public(&self) -> Result<bool>;

    async fn make_public(&self, ttl: u32) -> Result<()>;

    /// CDN 公开地址，`ssl` 选择 HTTPS 地址
    async fn public_uri(&self, ssl: bool) -> Result<String>;

    /// 创建或覆盖对象
    async fn create_object(&self, name: &str, upload: ObjectUpload) -> Result<ObjectInfo>;

    /// 对象元数据；不存在时返回 NoSuchObject
    async fn get_object(&self, name: &str) -> Result<ObjectInfo>;

    /// 从 offset 读取，len 为 None 时读到末尾
    async fn read_object(&self, name: &str, offset: u64, len: Option<u64>) -> Result<Bytes>;

    async fn delete_object(&self, name: &str) -> Result<()>;

    /// 列出以 prefix 开头的全部对象名（按名称排序）
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>>;
}
