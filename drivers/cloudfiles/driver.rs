//! Cloud Files存储核心实现
//!
//! 设计原则：
//! - 连接、容器、公开地址均为首次使用时创建并缓存
//! - 容器在缓存前确保已公开（CDN）
//! - 不做重试，远端错误原样返回

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::config::{resolve_auth_url, CumulusSettings};
use crate::storage::{Content, Listing, Result, Storage, StorageError, StorageFile};
use crate::utils::{dir_prefix, encode_object_path};
use super::client::{ConnectionBox, ContainerBox, ObjectInfo, ObjectUpload};
use super::config::{ConnectionOptions, StorageOptions, StorageState};
use super::file::CloudFilesFile;
use super::listing::{full_listing, quick_listing};
use super::swift::{ConnectionParams, SwiftConnection};

struct Inner {
    username: String,
    api_key: String,
    auth_url: String,
    container_name: String,
    timeout: u64,
    use_servicenet: bool,
    connection_options: ConnectionOptions,
    cnames: HashMap<String, String>,
    ttl: u32,
    use_ssl: bool,
    connection: Mutex<Option<ConnectionBox>>,
    container: Mutex<Option<ContainerBox>>,
    public_uri: RwLock<Option<String>>,
}

/// Cloud Files 存储；克隆后共享连接与缓存
#[derive(Clone)]
pub struct CloudFilesStorage {
    inner: Arc<Inner>,
}

impl CloudFilesStorage {
    /// 以全局配置为默认值创建，不访问远端
    pub fn new(settings: &CumulusSettings, options: StorageOptions) -> Self {
        let state = StorageState {
            username: options.username.unwrap_or_else(|| settings.username.clone()),
            api_key: options.api_key.unwrap_or_else(|| settings.api_key.clone()),
            auth_url: settings.resolved_auth_url(),
            container_name: options.container.unwrap_or_else(|| settings.container.clone()),
            timeout: options.timeout.unwrap_or(settings.timeout),
            use_servicenet: settings.servicenet,
            connection_options: options.connection_options.unwrap_or_default(),
        };
        Self::from_state(settings, state)
    }

    /// 从序列化状态恢复；CNAME、TTL、SSL 取自全局配置
    pub fn from_state(settings: &CumulusSettings, state: StorageState) -> Self {
        Self {
            inner: Arc::new(Inner {
                username: state.username,
                api_key: state.api_key,
                auth_url: resolve_auth_url(&state.auth_url),
                container_name: state.container_name,
                timeout: state.timeout,
                use_servicenet: state.use_servicenet,
                connection_options: state.connection_options,
                cnames: settings.cnames.clone(),
                ttl: settings.ttl,
                use_ssl: settings.use_ssl,
                connection: Mutex::new(None),
                container: Mutex::new(None),
                public_uri: RwLock::new(None),
            }),
        }
    }

    /// 可序列化状态（不含连接）
    pub fn state(&self) -> StorageState {
        let inner = &self.inner;
        StorageState {
            username: inner.username.clone(),
            api_key: inner.api_key.clone(),
            auth_url: inner.auth_url.clone(),
            container_name: inner.container_name.clone(),
            timeout: inner.timeout,
            use_servicenet: inner.use_servicenet,
            connection_options: inner.connection_options.clone(),
        }
    }

    pub fn container_name(&self) -> &str {
        &self.inner.container_name
    }

    /// 获取连接，首次调用时认证
    pub async fn connection(&self) -> Result<ConnectionBox> {
        let mut guard = self.inner.connection.lock().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let params = ConnectionParams {
            username: self.inner.username.clone(),
            api_key: self.inner.api_key.clone(),
            auth_url: self.inner.auth_url.clone(),
            timeout: Duration::from_secs(self.inner.timeout),
            servicenet: self.inner.use_servicenet,
            options: self.inner.connection_options.clone(),
        };
        let conn: ConnectionBox = Arc::new(SwiftConnection::connect(&params).await?);

        *guard = Some(conn.clone());
        Ok(conn)
    }

    pub async fn set_connection(&self, connection: ConnectionBox) {
        *self.inner.connection.lock().await = Some(connection);
    }

    /// 获取容器，首次调用时按名称获取并确保公开
    pub async fn container(&self) -> Result<ContainerBox> {
        let mut guard = self.inner.container.lock().await;
        if let Some(ref container) = *guard {
            return Ok(container.clone());
        }

        let conn = self.connection().await?;
        let container = conn.get_container(&self.inner.container_name).await?;
        self.publish(&container).await?;

        *self.inner.public_uri.write() = None;
        *guard = Some(container.clone());
        Ok(container)
    }

    /// 替换容器：确保公开并清除公开地址缓存
    pub async fn set_container(&self, container: ContainerBox) -> Result<()> {
        self.publish(&container).await?;

        let mut guard = self.inner.container.lock().await;
        *self.inner.public_uri.write() = None;
        *guard = Some(container);
        Ok(())
    }

    async fn publish(&self, container: &ContainerBox) -> Result<()> {
        if !container.is_public().await? {
            tracing::info!("Cloud Files 容器开启CDN: {} (ttl={})", container.name(), self.inner.ttl);
            container.make_public(self.inner.ttl).await?;
        }
        Ok(())
    }

    /// 容器公开地址，命中 CNAME 表时替换为别名
    pub async fn container_url(&self) -> Result<String> {
        let cached = self.inner.public_uri.read().clone();
        if let Some(uri) = cached {
            return Ok(uri);
        }

        let container = self.container().await?;
        let uri = container.public_uri(self.inner.use_ssl).await?;
        let uri = match self.inner.cnames.get(&uri) {
            Some(alias) => alias.trim_end_matches('/').to_string(),
            None => uri,
        };

        *self.inner.public_uri.write() = Some(uri.clone());
        Ok(uri)
    }

    /// 获取对象元数据
    pub(crate) async fn get_cloud_obj(&self, name: &str) -> Result<ObjectInfo> {
        self.container().await?.get_object(name).await
    }

    pub(crate) async fn read_object(&self, name: &str, offset: u64, len: Option<u64>) -> Result<Bytes> {
        self.container().await?.read_object(name, offset, len).await
    }

    async fn list_names(&self, prefix: &str) -> Result<Vec<String>> {
        self.container().await?.list_objects(prefix).await
    }
}

/// 按扩展名猜测内容类型
fn guess_content_type(name: &str) -> Option<String> {
    mime_guess::from_path(name).first().map(|m| m.to_string())
}

#[async_trait]
impl Storage for CloudFilesStorage {
    fn name(&self) -> &str {
        "CloudFiles"
    }

    fn open(&self, name: &str) -> Box<dyn StorageFile> {
        Box::new(CloudFilesFile::new(self.clone(), name))
    }

    async fn save(&self, name: &str, content: Content) -> Result<String> {
        let container = self.container().await?;

        let size = content.file.size.unwrap_or_else(|| content.size());
        let content_type = content.file.content_type
            .or(content.content_type)
            .or_else(|| guess_content_type(name));

        tracing::debug!("Cloud Files 保存: {} ({} 字节, {:?})", name, size, content_type);

        container.create_object(name, ObjectUpload {
            size,
            content_type,
            data: content.data,
        }).await?;

        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let container = self.container().await?;
        match container.delete_object(name).await {
            Err(e) if e.is_not_found() => {
                tracing::warn!("Cloud Files 删除的对象不存在: {}", name);
                Ok(())
            }
            other => other,
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        match self.get_cloud_obj(name).await {
            Ok(_) => Ok(true),
            Err(StorageError::NoSuchObject(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn listdir(&self, path: &str) -> Result<Listing> {
        let prefix = dir_prefix(path);
        let names = self.list_names(&prefix).await?;
        Ok(quick_listing(&prefix, names))
    }

    async fn full_listdir(&self, path: &str) -> Result<Listing> {
        let prefix = dir_prefix(path);
        let names = self.list_names(&prefix).await?;
        Ok(full_listing(&prefix, names))
    }

    async fn size(&self, name: &str) -> Result<u64> {
        Ok(self.get_cloud_obj(name).await?.size)
    }

    async fn url(&self, name: &str) -> Result<String> {
        let base = self.container_url().await?;
        Ok(format!("{}/{}", base, encode_object_path(name)))
    }
}
