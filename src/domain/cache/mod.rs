//! Cache domain - key-value store abstraction and key contract

mod key;
mod repository;

pub use key::{manifest_key, repo_list_key, MANIFEST_PREFIX, REPO_LIST_PREFIX};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
