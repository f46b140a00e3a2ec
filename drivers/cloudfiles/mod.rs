//! Rackspace Cloud Files 存储驱动
//!
//! 将 Cloud Files 容器适配为通用存储接口：
//! - 保存、打开、删除、存在性、大小、公开地址
//! - 由对象名前缀重建一层虚拟目录

pub mod client;
pub mod config;
pub mod driver;
pub mod factory;
pub mod file;
pub mod listing;
#[cfg(test)]
pub mod memory;
pub mod swift;

pub use client::{Connection, ConnectionBox, Container, ContainerBox, ObjectInfo, ObjectUpload};
pub use config::{ConnectionOptions, StorageOptions, StorageState};
pub use driver::CloudFilesStorage;
pub use factory::CloudFilesStorageFactory;
pub use file::CloudFilesFile;
pub use swift::{ConnectionParams, SwiftConnection, SwiftContainer};
