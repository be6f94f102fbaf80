//! API key lifecycle integration tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures;
    use crate::{assert_err, assert_ok};
    use artistsaid_integrations::{
        ApiKeyStatus, IntegrationError, IssueApiKeyRequest, Permission, Resource,
    };
    use chrono::{Duration, Utc};
    use futures::future::join_all;
    use secrecy::ExposeSecret;

    /// Issue, validate, revoke: the full lifecycle from the outside
    #[tokio::test]
    async fn test_api_key_lifecycle() {
        let integrations = fixtures::integrations();
        let keys = integrations.api_keys();

        let issued = assert_ok!(
            keys.issue(
                "Stripe Sync",
                "stripe",
                vec![Permission::Read(Resource::Donations)],
            )
            .await
        );
        let raw = issued.raw_key.expose_secret().to_string();
        assert_eq!(raw.len(), 64);

        assert!(assert_ok!(keys.validate(&raw, &issued.api_key).await));
        assert!(!assert_ok!(keys.validate("not-the-key", &issued.api_key).await));

        let stored = assert_ok!(keys.get_key(issued.api_key.id()).await).unwrap();
        assert_eq!(stored.usage_count, 1);

        let revoked = assert_ok!(keys.revoke(issued.api_key.id(), "admin", "rotation").await);
        assert_eq!(revoked.status, ApiKeyStatus::Revoked);
        assert_eq!(revoked.key_hash, issued.api_key.key_hash);
        assert!(!assert_ok!(keys.validate(&raw, &issued.api_key).await));

        let again = assert_ok!(keys.revoke(issued.api_key.id(), "admin", "rotation").await);
        assert_eq!(again.revocation, revoked.revocation);
    }

    /// N concurrent validations leave the counter at exactly N
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_validations_do_not_lose_updates() {
        const N: u64 = 100;

        let integrations = fixtures::integrations();
        let keys = integrations.api_keys().clone();
        let issued = assert_ok!(keys.issue("Concurrent", "stripe", vec![]).await);
        let raw = issued.raw_key.expose_secret().to_string();

        let tasks = (0..N).map(|_| {
            let keys = keys.clone();
            let record = issued.api_key.clone();
            let raw = raw.clone();
            tokio::spawn(async move { keys.validate(&raw, &record).await })
        });
        let results = join_all(tasks).await;
        assert!(results.into_iter().all(|r| matches!(r, Ok(Ok(true)))));

        let stored = assert_ok!(keys.get_key(issued.api_key.id()).await).unwrap();
        assert_eq!(stored.usage_count, N);
    }

    /// Revocation racing validations never credits a use after the revoke
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_revocation_races_validation() {
        let integrations = fixtures::integrations();
        let keys = integrations.api_keys().clone();
        let issued = assert_ok!(keys.issue("Racy", "stripe", vec![]).await);
        let raw = issued.raw_key.expose_secret().to_string();

        let validations = (0..50).map(|_| {
            let keys = keys.clone();
            let record = issued.api_key.clone();
            let raw = raw.clone();
            tokio::spawn(async move { keys.validate(&raw, &record).await })
        });
        let revoke = {
            let keys = keys.clone();
            let id = issued.api_key.id();
            tokio::spawn(async move { keys.revoke(id, "admin", "race").await })
        };

        let accepted = join_all(validations)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(true))))
            .count() as u64;
        assert!(revoke.await.unwrap().is_ok());

        let stored = assert_ok!(keys.get_key(issued.api_key.id()).await).unwrap();
        assert_eq!(stored.status, ApiKeyStatus::Revoked);
        assert_eq!(stored.usage_count, accepted);
        assert!(!assert_ok!(keys.validate(&raw, &issued.api_key).await));
    }

    /// Unknown, expired and revoked keys produce the same rejection
    #[tokio::test]
    async fn test_rejections_are_indistinguishable() {
        let integrations = fixtures::integrations();
        let keys = integrations.api_keys();

        let expired = assert_ok!(
            keys.issue_with_options(IssueApiKeyRequest {
                name: "Expired".to_string(),
                provider: "stripe".to_string(),
                expires_at: Some(Utc::now() - Duration::seconds(1)),
                ..Default::default()
            })
            .await
        );
        let revoked = assert_ok!(keys.issue("Revoked", "stripe", vec![]).await);
        assert_ok!(keys.revoke(revoked.api_key.id(), "admin", "test").await);

        let unknown = assert_err!(keys.require("no-such-key").await);
        let expired = assert_err!(keys.require(expired.raw_key.expose_secret()).await);
        let revoked = assert_err!(keys.require(revoked.raw_key.expose_secret()).await);

        assert!(matches!(unknown, IntegrationError::Unauthorized(_)));
        assert_eq!(unknown.to_string(), expired.to_string());
        assert_eq!(unknown.to_string(), revoked.to_string());
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let integrations = fixtures::integrations();
        let err = assert_err!(integrations.api_keys().issue(" ", "stripe", vec![]).await);
        assert!(matches!(err, IntegrationError::Validation(_)));
    }
}
