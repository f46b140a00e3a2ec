//! Cloud Files (Swift v1.0) HTTP 客户端
//!
//! 使用reqwest实现认证、存储与CDN接口

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::storage::{Result, StorageError};
use crate::utils::encode_object_path;
use super::client::{Connection, Container, ContainerBox, ObjectInfo, ObjectUpload};
use super::config::ConnectionOptions;

/// 单页列表最大条数
const LIST_LIMIT: usize = 10000;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 建立连接所需参数
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub username: String,
    pub api_key: String,
    pub auth_url: String,
    pub timeout: Duration,
    pub servicenet: bool,
    pub options: ConnectionOptions,
}

/// 认证后的会话，连接与容器共享
struct Session {
    client: Client,
    token: String,
    storage_url: String,
    cdn_url: Option<String>,
}

/// Cloud Files 连接
pub struct SwiftConnection {
    session: Arc<Session>,
}

impl SwiftConnection {
    /// 认证并创建连接
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        let client = build_client(params)?;

        tracing::debug!("Cloud Files 认证: {} (用户: {})", params.auth_url, params.username);

        let response = client
            .get(&params.auth_url)
            .header("X-Auth-User", &params.username)
            .header("X-Auth-Key", &params.api_key)
            .send()
            .await?;

        check_auth(response.status())?;

        let headers = response.headers();
        let token = required_header(headers, "x-auth-token")?;
        let mut storage_url = required_header(headers, "x-storage-url")?;
        let cdn_url = header_string(headers, "x-cdn-management-url");

        if params.servicenet {
            storage_url = servicenet_url(&storage_url)?;
        }

        tracing::info!("Cloud Files 认证成功, storage_url={}", storage_url);

        Ok(Self {
            session: Arc::new(Session {
                client,
                token,
                storage_url: storage_url.trim_end_matches('/').to_string(),
                cdn_url: cdn_url.map(|u| u.trim_end_matches('/').to_string()),
            }),
        })
    }
}

#[async_trait]
impl Connection for SwiftConnection {
    async fn get_container(&self, name: &str) -> Result<ContainerBox> {
        let container = SwiftContainer {
            session: self.session.clone(),
            name: name.to_string(),
        };

        let url = container.container_url();
        tracing::debug!("Cloud Files HEAD 容器: {}", url);

        let response = self.session.client
            .head(&url)
            .header("X-Auth-Token", &self.session.token)
            .send()
            .await?;

        check_container(name, response.status())?;
        Ok(Arc::new(container))
    }
}

/// Cloud Files 容器
pub struct SwiftContainer {
    session: Arc<Session>,
    name: String,
}

/// CDN 状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CdnInfo {
    enabled: bool,
    uri: Option<String>,
    ssl_uri: Option<String>,
}

/// 列表接口返回的对象条目
#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
}

impl SwiftContainer {
    fn container_url(&self) -> String {
        format!("{}/{}", self.session.storage_url, urlencoding::encode(&self.name))
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/{}", self.container_url(), encode_object_path(name))
    }

    fn cdn_container_url(&self) -> Result<String> {
        let cdn = self.session.cdn_url.as_ref()
            .ok_or_else(|| StorageError::Config("account has no CDN management URL".to_string()))?;
        Ok(format!("{}/{}", cdn, urlencoding::encode(&self.name)))
    }

    async fn cdn_info(&self) -> Result<CdnInfo> {
        let url = self.cdn_container_url()?;
        tracing::debug!("Cloud Files HEAD CDN: {}", url);

        let response = self.session.client
            .head(&url)
            .header("X-Auth-Token", &self.session.token)
            .send()
            .await?;

        match response.status() {
            // 从未开启过CDN
            StatusCode::NOT_FOUND => Ok(CdnInfo::default()),
            status if status.is_success() => Ok(parse_cdn_headers(response.headers())),
            status => Err(StorageError::response(status)),
        }
    }
}

#[async_trait]
impl Container for SwiftContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_public(&self) -> Result<bool> {
        Ok(self.cdn_info().await?.enabled)
    }

    async fn make_public(&self, ttl: u32) -> Result<()> {
        let url = self.cdn_container_url()?;
        tracing::debug!("Cloud Files 开启CDN: {} (ttl={})", url, ttl);

        let response = self.session.client
            .put(&url)
            .header("X-Auth-Token", &self.session.token)
            .header("X-TTL", ttl.to_string())
            .header("X-CDN-Enabled", "True")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::response(response.status()));
        }
        Ok(())
    }

    async fn public_uri(&self, ssl: bool) -> Result<String> {
        let info = self.cdn_info().await?;
        if !info.enabled {
            return Err(StorageError::InvalidResponse(format!("container {} is not public", self.name)));
        }
        let uri = if ssl { info.ssl_uri } else { info.uri };
        uri.map(|u| u.trim_end_matches('/').to_string())
            .ok_or_else(|| StorageError::InvalidResponse("missing CDN URI header".to_string()))
    }

    async fn create_object(&self, name: &str, upload: ObjectUpload) -> Result<ObjectInfo> {
        let url = self.object_url(name);
        let content_type = upload.content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let actual = upload.data.len() as u64;
        if upload.size != actual {
            tracing::warn!("Cloud Files 上传大小不一致: {} 声明={} 实际={}", name, upload.size, actual);
        }

        tracing::debug!("Cloud Files PUT: {} ({} 字节, {})", url, actual, content_type);

        let response = self.session.client
            .put(&url)
            .header("X-Auth-Token", &self.session.token)
            .header("Content-Type", &content_type)
            .body(upload.data)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::response(response.status()));
        }

        Ok(ObjectInfo {
            name: name.to_string(),
            size: actual,
            content_type: Some(content_type),
            etag: header_string(response.headers(), "etag"),
            last_modified: header_string(response.headers(), "last-modified"),
        })
    }

    async fn get_object(&self, name: &str) -> Result<ObjectInfo> {
        let url = self.object_url(name);
        tracing::debug!("Cloud Files HEAD: {}", url);

        let response = self.session.client
            .head(&url)
            .header("X-Auth-Token", &self.session.token)
            .send()
            .await?;

        check_object(name, response.status())?;
        object_info_from_headers(name, response.headers())
    }

    async fn read_object(&self, name: &str, offset: u64, len: Option<u64>) -> Result<Bytes> {
        let url = self.object_url(name);
        let range = range_header(offset, len);
        tracing::debug!("Cloud Files GET: {} (范围: {:?})", url, range);

        let mut request = self.session.client
            .get(&url)
            .header("X-Auth-Token", &self.session.token);
        if let Some(ref r) = range {
            request = request.header("Range", r);
        }

        let response = request.send().await?;

        if check_read(name, response.status())? {
            Ok(response.bytes().await?)
        } else {
            Ok(Bytes::new())
        }
    }

    async fn delete_object(&self, name: &str) -> Result<()> {
        let url = self.object_url(name);
        tracing::debug!("Cloud Files DELETE: {}", url);

        let response = self.session.client
            .delete(&url)
            .header("X-Auth-Token", &self.session.token)
            .send()
            .await?;

        check_delete(response.status())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let url = self.container_url();
        let limit = LIST_LIMIT.to_string();
        let mut names = Vec::new();
        let mut marker = String::new();

        loop {
            tracing::debug!("Cloud Files 列表: {} (prefix={}, marker={})", url, prefix, marker);

            let response = self.session.client
                .get(&url)
                .header("X-Auth-Token", &self.session.token)
                .query(&[
                    ("format", "json"),
                    ("prefix", prefix),
                    ("limit", limit.as_str()),
                    ("marker", marker.as_str()),
                ])
                .send()
                .await?;

            let page: Vec<ListedObject> = if check_listing(&self.name, response.status())? {
                response.json().await?
            } else {
                Vec::new()
            };

            let page_len = page.len();
            names.extend(page.into_iter().map(|o| o.name));

            match next_marker(&names, page_len, LIST_LIMIT) {
                Some(last) => marker = last,
                None => break,
            }
        }

        Ok(names)
    }
}

fn build_client(params: &ConnectionParams) -> Result<Client> {
    let options = &params.options;

    let mut headers = HeaderMap::new();
    for (key, value) in &options.extra_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| StorageError::Config(format!("invalid header name {}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| StorageError::Config(format!("invalid header value for {}: {}", key, e)))?;
        headers.insert(name, value);
    }

    let mut builder = Client::builder()
        .timeout(params.timeout)
        .danger_accept_invalid_certs(options.tls_insecure_skip_verify)
        .default_headers(headers);
    if let Some(ref agent) = options.user_agent {
        builder = builder.user_agent(agent.clone());
    }

    Ok(builder.build()?)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String> {
    header_string(headers, name)
        .ok_or_else(|| StorageError::InvalidResponse(format!("missing header {}", name)))
}

/// ServiceNet 内网地址：主机名加 snet- 前缀
fn servicenet_url(storage_url: &str) -> Result<String> {
    let mut url = Url::parse(storage_url)
        .map_err(|e| StorageError::InvalidResponse(format!("invalid storage url {}: {}", storage_url, e)))?;
    let host = url.host_str()
        .ok_or_else(|| StorageError::InvalidResponse(format!("storage url has no host: {}", storage_url)))?
        .to_string();
    url.set_host(Some(&format!("snet-{}", host)))
        .map_err(|e| StorageError::InvalidResponse(format!("invalid servicenet host: {}", e)))?;
    Ok(url.to_string())
}

/// 认证响应：401 为凭据错误
fn check_auth(status: StatusCode) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(StorageError::Authentication {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        });
    }
    if !status.is_success() {
        return Err(StorageError::response(status));
    }
    Ok(())
}

fn check_container(name: &str, status: StatusCode) -> Result<()> {
    match status {
        StatusCode::NOT_FOUND => Err(StorageError::NoSuchContainer(name.to_string())),
        status if status.is_success() => Ok(()),
        status => Err(StorageError::response(status)),
    }
}

/// 对象 HEAD：404 即对象不存在
fn check_object(name: &str, status: StatusCode) -> Result<()> {
    match status {
        StatusCode::NOT_FOUND => Err(StorageError::NoSuchObject(name.to_string())),
        status if status.is_success() => Ok(()),
        status => Err(StorageError::response(status)),
    }
}

/// 对象 GET：返回是否需要读取响应体，416 表示游标已在末尾
fn check_read(name: &str, status: StatusCode) -> Result<bool> {
    match status {
        StatusCode::RANGE_NOT_SATISFIABLE => Ok(false),
        status => check_object(name, status).map(|_| true),
    }
}

/// 对象 DELETE：404 保留为普通响应错误，由调用方决定是否忽略
fn check_delete(status: StatusCode) -> Result<()> {
    if !status.is_success() {
        return Err(StorageError::response(status));
    }
    Ok(())
}

/// 列表 GET：返回是否有 JSON 响应体，204 为空容器
fn check_listing(container: &str, status: StatusCode) -> Result<bool> {
    match status {
        StatusCode::NO_CONTENT => Ok(false),
        status => check_container(container, status).map(|_| true),
    }
}

/// 满页时以最后一个名字作为下一页的 marker
fn next_marker(names: &[String], page_len: usize, limit: usize) -> Option<String> {
    match names.last() {
        Some(last) if page_len >= limit => Some(last.clone()),
        _ => None,
    }
}

fn range_header(offset: u64, len: Option<u64>) -> Option<String> {
    match len {
        Some(n) if n > 0 => match offset.checked_add(n - 1) {
            Some(end) => Some(format!("bytes={}-{}", offset, end)),
            // 越界的末端交给服务端判断
            None => Some(format!("bytes={}-", offset)),
        },
        _ if offset > 0 => Some(format!("bytes={}-", offset)),
        _ => None,
    }
}

fn parse_cdn_headers(headers: &HeaderMap) -> CdnInfo {
    let enabled = header_string(headers, "x-cdn-enabled")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    CdnInfo {
        enabled,
        uri: header_string(headers, "x-cdn-uri"),
        ssl_uri: header_string(headers, "x-cdn-ssl-uri"),
    }
}

fn object_info_from_headers(name: &str, headers: &HeaderMap) -> Result<ObjectInfo> {
    let size = required_header(headers, "content-length")?
        .parse::<u64>()
        .map_err(|e| StorageError::InvalidResponse(format!("invalid content-length: {}", e)))?;

    Ok(ObjectInfo {
        name: name.to_string(),
        size,
        content_type: header_string(headers, "content-type"),
        etag: header_string(headers, "etag"),
        last_modified: header_string(headers, "last-modified"),
    })
}
