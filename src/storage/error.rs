//! Storage error types / 存储错误类型

use thiserror::Error;

/// Errors surfaced by storage operations / 存储操作错误
#[derive(Error, Debug)]
pub enum StorageError {
    /// Object does not exist in the container / 对象不存在
    #[error("no such object: {0}")]
    NoSuchObject(String),

    /// Container does not exist / 容器不存在
    #[error("no such container: {0}")]
    NoSuchContainer(String),

    /// Credentials rejected by the auth endpoint / 认证失败
    #[error("authentication failed: {status} {reason}")]
    Authentication { status: u16, reason: String },

    /// Any other non-success response from the service / 服务端错误响应
    #[error("response error: {status} {reason}")]
    Response { status: u16, reason: String },

    /// Response was missing a header or had an unparseable body / 响应格式错误
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid adapter configuration / 配置错误
    #[error("config error: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether the error means "the object is not there" / 是否为对象不存在
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NoSuchObject(_) => true,
            StorageError::Response { status, .. } => *status == 404,
            _ => false,
        }
    }

    pub(crate) fn response(status: reqwest::StatusCode) -> Self {
        StorageError::Response {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(StorageError::NoSuchObject("a.txt".into()).is_not_found());
        assert!(StorageError::Response { status: 404, reason: "Not Found".into() }.is_not_found());
        assert!(!StorageError::Response { status: 500, reason: "Internal Server Error".into() }.is_not_found());
        assert!(!StorageError::NoSuchContainer("media".into()).is_not_found());
    }

    #[test]
    fn test_response_from_status() {
        let err = StorageError::response(reqwest::StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "response error: 403 Forbidden");
    }
}
