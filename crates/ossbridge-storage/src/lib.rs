//! Ossbridge Storage Library
//!
//! The narrow storage interface the tools consume ([`ObjectStorage`]) and its
//! `object_store`-backed implementation for Aliyun OSS and Volcengine TOS.
//! Both backends speak the S3 dialect, so a single client configured for
//! virtual-hosted-style requests serves them.
//!
//! Connections are built per call from [`ossbridge_core::StorageCredentials`]
//! through a [`StorageFactory`], so nothing is cached between requests.

pub mod factory;
pub mod s3;
pub mod traits;

pub use factory::{MemoryStorageFactory, S3StorageFactory, StorageFactory};
pub use s3::ObjectStoreStorage;
pub use traits::{ObjectMetadata, ObjectStorage, StorageError, StorageResult};
