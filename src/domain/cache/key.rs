//! Cache key construction
//!
//! Key shapes are part of the storage contract: entries written by one
//! deployment must be readable by the next, so these formats never change.

/// Prefix of the per-user display card list namespace
pub const REPO_LIST_PREFIX: &str = "repos_";

/// Prefix of the per-repository manifest namespace
pub const MANIFEST_PREFIX: &str = "project_json_";

/// Key of the cached display card list for a user: `repos_<username>`
pub fn repo_list_key(username: &str) -> String {
    format!("{}{}", REPO_LIST_PREFIX, username)
}

/// Key of the cached manifest for one repository:
/// `project_json_<username>_<repo>`
pub fn manifest_key(username: &str, repo: &str) -> String {
    format!("{}{}_{}", MANIFEST_PREFIX, username, repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_list_key() {
        assert_eq!(repo_list_key("alice"), "repos_alice");
    }

    #[test]
    fn test_manifest_key() {
        assert_eq!(manifest_key("alice", "site"), "project_json_alice_site");
    }

    #[test]
    fn test_keys_keep_original_casing() {
        assert_eq!(repo_list_key("Alice"), "repos_Alice");
        assert_eq!(
            manifest_key("Alice", "My-Repo"),
            "project_json_Alice_My-Repo"
        );
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        assert_ne!(repo_list_key("alice"), manifest_key("alice", ""));
        assert!(manifest_key("alice", "site").starts_with(MANIFEST_PREFIX));
        assert!(repo_list_key("alice").starts_with(REPO_LIST_PREFIX));
    }
}
