/// Identity Resolver - search term to decoded key set
use crate::{
    directory::Directory,
    error::{GatewayResult, ResolutionError},
    keyring,
};
use sequoia_openpgp::Cert;
use std::sync::Arc;
use tracing::debug;

/// Resolves a search term to exactly one directory identity and decodes all
/// of that identity's key records into one ordered key set.
pub struct KeyResolver {
    directory: Arc<dyn Directory>,
}

impl KeyResolver {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Resolve `search` and fetch the matching identity's keys.
    ///
    /// A search matching anything other than exactly one user is an error:
    /// zero matches and ambiguous matches are both invariant violations, not
    /// legitimate empty results. An empty key set after a clean resolution
    /// is `Ok(vec![])`; the caller decides how to report it. Any record that
    /// fails to decode aborts the whole lookup.
    pub async fn resolve_and_fetch(&self, search: &str) -> GatewayResult<Vec<Cert>> {
        let users = self.directory.search_users(search).await?;

        let user = match users.as_slice() {
            [user] => user,
            [] => {
                return Err(ResolutionError::NoMatch {
                    search: search.to_string(),
                }
                .into())
            }
            _ => {
                return Err(ResolutionError::Ambiguous {
                    search: search.to_string(),
                    count: users.len(),
                    candidates: users.iter().map(|u| u.describe()).collect(),
                }
                .into())
            }
        };

        let records = self.directory.list_gpg_keys(user.id).await?;

        let mut keys = Vec::new();
        for record in &records {
            debug!(record = record.id, created_at = %record.created_at, "decoding key record");
            keys.extend(keyring::decode_armored(&record.key)?);
        }

        Ok(keys)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::directory::{DirectoryUser, KeyRecord};
    use crate::error::GatewayError;
    use crate::keyring::tests::{armored, test_cert};
    use async_trait::async_trait;
    use chrono::Utc;

    /// In-memory directory for tests: fixed users, fixed key records
    pub(crate) struct FakeDirectory {
        pub users: Vec<DirectoryUser>,
        pub keys: Vec<KeyRecord>,
    }

    pub(crate) fn user(id: u64, username: &str) -> DirectoryUser {
        DirectoryUser {
            id,
            name: format!("{} Example", username),
            username: username.to_string(),
            web_url: format!("https://gitlab.example.com/{}", username),
        }
    }

    pub(crate) fn record(id: u64, key: String) -> KeyRecord {
        KeyRecord {
            id,
            key,
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl Directory for FakeDirectory {
        async fn search_users(&self, _search: &str) -> GatewayResult<Vec<DirectoryUser>> {
            Ok(self.users.clone())
        }

        async fn list_gpg_keys(&self, _user_id: u64) -> GatewayResult<Vec<KeyRecord>> {
            Ok(self.keys.clone())
        }
    }

    fn resolver(users: Vec<DirectoryUser>, keys: Vec<KeyRecord>) -> KeyResolver {
        KeyResolver::new(Arc::new(FakeDirectory { users, keys }))
    }

    #[tokio::test]
    async fn test_single_match_yields_all_records() {
        let alice = test_cert("Alice Example <alice@example.com>");
        let bob = test_cert("Bob Example <bob@example.com>");
        let resolver = resolver(
            vec![user(7, "alice")],
            vec![record(1, armored(&alice)), record(2, armored(&bob))],
        );

        let keys = resolver.resolve_and_fetch("alice").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].fingerprint(), alice.fingerprint());
        assert_eq!(keys[1].fingerprint(), bob.fingerprint());
    }

    #[tokio::test]
    async fn test_zero_matches_is_a_resolution_error() {
        let resolver = resolver(vec![], vec![]);

        let err = resolver.resolve_and_fetch("nobody").await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Resolution(ResolutionError::NoMatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_ambiguous_match_names_count_and_candidates() {
        let resolver = resolver(vec![user(1, "bob"), user(2, "bobby")], vec![]);

        let err = resolver.resolve_and_fetch("bob").await.unwrap_err();
        match err {
            GatewayError::Resolution(ResolutionError::Ambiguous {
                count, candidates, ..
            }) => {
                assert_eq!(count, 2);
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].starts_with("bob "));
                assert!(candidates[1].starts_with("bobby "));
            }
            other => panic!("expected ambiguous resolution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_key_list_is_not_an_error() {
        let resolver = resolver(vec![user(7, "alice")], vec![]);

        let keys = resolver.resolve_and_fetch("alice").await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_one_bad_record_fails_the_whole_lookup() {
        let alice = test_cert("Alice Example <alice@example.com>");
        let resolver = resolver(
            vec![user(7, "alice")],
            vec![
                record(1, armored(&alice)),
                record(2, "not armored at all".to_string()),
            ],
        );

        let err = resolver.resolve_and_fetch("alice").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
