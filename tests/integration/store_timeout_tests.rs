//! Store timeout integration tests
//!
//! A store that answers slower than `StoreConfig::timeout_ms` must surface
//! as a retryable `StoreUnavailable` error, never as a rejected credential.

#[cfg(test)]
mod tests {
    use crate::assert_err;
    use crate::common::SlowStore;
    use crate::common::fixtures::WebhookRequestFactory;
    use artistsaid_integrations::{Config, IntegrationError, Integrations};
    use std::sync::Arc;
    use std::time::Duration;

    fn slow_integrations() -> Integrations {
        let mut config = Config::default();
        config.store.timeout_ms = 20;
        Integrations::new(config, Arc::new(SlowStore::new(Duration::from_millis(500))))
            .expect("valid config")
    }

    #[tokio::test]
    async fn test_slow_store_fails_issue() {
        let integrations = slow_integrations();
        let err = assert_err!(integrations.api_keys().issue("Key", "stripe", vec![]).await);

        assert!(matches!(err, IntegrationError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_slow_store_fails_authentication() {
        let integrations = slow_integrations();
        let err = assert_err!(integrations.api_keys().authenticate("candidate").await);
        assert!(matches!(err, IntegrationError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_store_fails_webhook_lookup() {
        let integrations = slow_integrations();

        let err = assert_err!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(
                    "https://hooks.example.com/x",
                    &["payout.sent"],
                ))
                .await
        );
        assert!(matches!(err, IntegrationError::StoreUnavailable(_)));

        let err = assert_err!(
            integrations
                .webhooks()
                .find_active_webhooks_for_event("payout.sent")
                .await
        );
        assert!(matches!(err, IntegrationError::StoreUnavailable(_)));
    }

    /// A store call dropped on timeout leaves no partial write behind
    #[tokio::test]
    async fn test_timed_out_insert_is_not_applied() {
        let mut config = Config::default();
        config.store.timeout_ms = 20;
        let store = Arc::new(SlowStore::new(Duration::from_millis(200)));
        let integrations = Integrations::new(config, store.clone()).expect("valid config");

        assert_err!(integrations.api_keys().issue("Key", "stripe", vec![]).await);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.inner.api_key_count().await, 0);
    }
}
