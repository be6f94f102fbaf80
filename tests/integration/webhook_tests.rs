//! Webhook registration integration tests

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::fixtures::{self, WebhookRequestFactory};
    use artistsaid_integrations::webhooks::{WebhookStatus, events};
    use artistsaid_integrations::{sign, verify};

    const URL: &str = "https://hooks.example.com/artistsaid";

    /// Lookup returns each active subscriber exactly once, in a stable order
    #[tokio::test]
    async fn test_lookup_is_stable_and_complete() {
        let integrations = fixtures::integrations();
        let webhooks = integrations.webhooks();

        let mut expected = Vec::new();
        for _ in 0..10 {
            let webhook = assert_ok!(
                webhooks
                    .create_webhook(WebhookRequestFactory::create(
                        URL,
                        &[events::DONATION_COMPLETED, events::DONATION_REFUNDED],
                    ))
                    .await
            );
            expected.push(webhook.id());
        }

        let first: Vec<_> = assert_ok!(
            webhooks
                .find_active_webhooks_for_event(events::DONATION_COMPLETED)
                .await
        )
        .iter()
        .map(|w| w.id())
        .collect();
        let second: Vec<_> = assert_ok!(
            webhooks
                .find_active_webhooks_for_event(events::DONATION_COMPLETED)
                .await
        )
        .iter()
        .map(|w| w.id())
        .collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), expected.len());
        for id in &expected {
            assert_eq!(first.iter().filter(|f| *f == id).count(), 1);
        }
    }

    /// Only the secret a webhook was created with verifies its signatures
    #[tokio::test]
    async fn test_signature_uses_webhook_secret() {
        let integrations = fixtures::integrations();
        let webhooks = integrations.webhooks();

        let a = assert_ok!(
            webhooks
                .create_webhook(WebhookRequestFactory::create(URL, &[events::PAYOUT_SENT]))
                .await
        );
        let b = assert_ok!(
            webhooks
                .create_webhook(WebhookRequestFactory::create(URL, &[events::PAYOUT_SENT]))
                .await
        );

        let body = br#"{"type":"payout.sent"}"#;
        let signature = assert_ok!(webhooks.sign_payload(&a, body));
        assert_eq!(signature, assert_ok!(sign(body, a.secret.expose())));
        assert!(assert_ok!(verify(&signature, body, a.secret.expose())));
        assert!(!assert_ok!(verify(&signature, body, b.secret.expose())));

        let mut tampered = body.to_vec();
        tampered[2] ^= 0x01;
        assert!(!assert_ok!(webhooks.verify_payload(&a, &tampered, &signature)));
    }

    /// The secret survives edits and status changes untouched
    #[tokio::test]
    async fn test_secret_is_stable_across_lifecycle() {
        let integrations = fixtures::integrations();
        let webhooks = integrations.webhooks();

        let webhook = assert_ok!(
            webhooks
                .create_webhook(WebhookRequestFactory::create(URL, &[events::PAYOUT_SENT]))
                .await
        );
        assert_ok!(webhooks.disable(webhook.id(), "admin").await);
        let enabled = assert_ok!(webhooks.enable(webhook.id(), "admin").await);

        assert_eq!(enabled.status, WebhookStatus::Active);
        assert_eq!(enabled.secret.expose(), webhook.secret.expose());
    }

    /// Listing is scoped to one integration
    #[tokio::test]
    async fn test_list_by_integration() {
        let integrations = fixtures::integrations();
        let webhooks = integrations.webhooks();

        assert_ok!(
            webhooks
                .create_webhook(WebhookRequestFactory::create(URL, &[events::PAYOUT_SENT]))
                .await
        );
        let mut other = WebhookRequestFactory::create(URL, &[events::PAYOUT_SENT]);
        other.integration_id = "other".to_string();
        assert_ok!(webhooks.create_webhook(other).await);

        let listed = assert_ok!(webhooks.list_webhooks("integration-test").await);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].integration_id, "integration-test");
    }

    /// Secrets never appear in Debug output
    #[tokio::test]
    async fn test_debug_output_is_redacted() {
        let integrations = fixtures::integrations();
        let webhook = assert_ok!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(URL, &[events::PAYOUT_SENT]))
                .await
        );
        assert!(!format!("{:?}", webhook).contains(webhook.secret.expose()));
    }
}
