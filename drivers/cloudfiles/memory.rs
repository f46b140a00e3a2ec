//! 内存实现的对象存储，用作测试传输层
//!
//! 记录每类请求的调用次数，并支持注入下一次请求的错误状态码

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::storage::{Result, StorageError};
use super::client::{Connection, Container, ContainerBox, ObjectInfo, ObjectUpload};

/// 内存连接
#[derive(Default)]
pub struct MemoryConnection {
    containers: Mutex<HashMap<String, Arc<MemoryContainer>>>,
    container_fetches: AtomicUsize,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, container: Arc<MemoryContainer>) -> Self {
        self.containers.lock().insert(container.name.clone(), container);
        self
    }

    /// get_container 被调用的次数
    pub fn container_fetches(&self) -> usize {
        self.container_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn get_container(&self, name: &str) -> Result<ContainerBox> {
        self.container_fetches.fetch_add(1, Ordering::SeqCst);
        let container = self.containers.lock().get(name).cloned();
        match container {
            Some(c) => Ok(c),
            None => Err(StorageError::NoSuchContainer(name.to_string())),
        }
    }
}

struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
}

#[derive(Default)]
struct ContainerState {
    public: bool,
    ttl: Option<u32>,
    objects: BTreeMap<String, StoredObject>,
    fail_next: Option<u16>,
}

/// 内存容器
pub struct MemoryContainer {
    name: String,
    cdn_uri: String,
    state: Mutex<ContainerState>,
    metadata_fetches: AtomicUsize,
    publish_calls: AtomicUsize,
}

impl MemoryContainer {
    pub fn new(name: &str, cdn_uri: &str) -> Self {
        Self {
            name: name.to_string(),
            cdn_uri: cdn_uri.to_string(),
            state: Mutex::new(ContainerState::default()),
            metadata_fetches: AtomicUsize::new(0),
            publish_calls: AtomicUsize::new(0),
        }
    }

    pub fn public(self) -> Self {
        self.state.lock().public = true;
        self
    }

    /// 直接写入对象，不经过请求计数
    pub fn insert(&self, name: &str, data: impl Into<Bytes>) {
        self.state.lock().objects.insert(name.to_string(), StoredObject {
            data: data.into(),
            content_type: None,
        });
    }

    pub fn content_type_of(&self, name: &str) -> Option<String> {
        self.state.lock().objects.get(name).and_then(|o| o.content_type.clone())
    }

    pub fn is_public_now(&self) -> bool {
        self.state.lock().public
    }

    pub fn ttl(&self) -> Option<u32> {
        self.state.lock().ttl
    }

    /// 下一次请求返回指定状态码的错误
    pub fn fail_next(&self, status: u16) {
        self.state.lock().fail_next = Some(status);
    }

    /// get_object 被调用的次数
    pub fn metadata_fetches(&self) -> usize {
        self.metadata_fetches.load(Ordering::SeqCst)
    }

    /// make_public 被调用的次数
    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }

    fn take_failure(state: &mut ContainerState) -> Result<()> {
        match state.fail_next.take() {
            Some(status) => Err(StorageError::Response {
                status,
                reason: "injected".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Container for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_public(&self) -> Result<bool> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        Ok(state.public)
    }

    async fn make_public(&self, ttl: u32) -> Result<()> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        state.public = true;
        state.ttl = Some(ttl);
        Ok(())
    }

    async fn public_uri(&self, ssl: bool) -> Result<String> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        if !state.public {
            return Err(StorageError::InvalidResponse(format!("container {} is not public", self.name)));
        }
        if ssl {
            Ok(self.cdn_uri.replacen("http://", "https://", 1))
        } else {
            Ok(self.cdn_uri.clone())
        }
    }

    async fn create_object(&self, name: &str, upload: ObjectUpload) -> Result<ObjectInfo> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        let size = upload.data.len() as u64;
        state.objects.insert(name.to_string(), StoredObject {
            data: upload.data,
            content_type: upload.content_type.clone(),
        });
        Ok(ObjectInfo {
            name: name.to_string(),
            size,
            content_type: upload.content_type,
            etag: None,
            last_modified: None,
        })
    }

    async fn get_object(&self, name: &str) -> Result<ObjectInfo> {
        self.metadata_fetches.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        state.objects.get(name)
            .map(|o| ObjectInfo {
                name: name.to_string(),
                size: o.data.len() as u64,
                content_type: o.content_type.clone(),
                etag: None,
                last_modified: None,
            })
            .ok_or_else(|| StorageError::NoSuchObject(name.to_string()))
    }

    async fn read_object(&self, name: &str, offset: u64, len: Option<u64>) -> Result<Bytes> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        let object = state.objects.get(name)
            .ok_or_else(|| StorageError::NoSuchObject(name.to_string()))?;

        let total = object.data.len();
        let start = (offset as usize).min(total);
        let end = match len {
            Some(n) if n > 0 => start.saturating_add(n as usize).min(total),
            _ => total,
        };
        Ok(object.data.slice(start..end))
    }

    async fn delete_object(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        match state.objects.remove(name) {
            Some(_) => Ok(()),
            None => Err(StorageError::Response {
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock();
        Self::take_failure(&mut state)?;
        Ok(state.objects.keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
