//! Permission strings: wire codec, outbound source, per-user cache and scope resolution.

pub mod cache;
pub mod scope;
pub mod source;
pub mod string;

pub use cache::{PermissionStringCache, PermissionStringCacheEntry};
pub use scope::{PermissionScopeResolver, ScopeResult};
pub use source::{
    decode_all, FetchResult, HttpPermissionSource, PermissionSourceError, PermissionStringSource,
};
pub use string::{PermissionString, PermissionStringError};
