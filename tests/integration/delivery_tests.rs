//! Signed delivery integration tests against a local receiver

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::fixtures::{self, WebhookRequestFactory};
    use artistsaid_integrations::webhooks::{
        RetryDecision, WebhookEvent, WebhookFilter, WebhookStatus, events,
    };
    use artistsaid_integrations::{Config, Integrations, verify};
    use std::collections::HashMap;
    use std::time::Duration;
    use uuid::Uuid;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn receiver(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    fn hook_url(server: &MockServer) -> String {
        format!("{}/hook", server.uri())
    }

    /// The receiver gets the exact signed bytes plus the protocol headers
    #[tokio::test]
    async fn test_delivery_is_signed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("X-ArtistsAid-Event", events::DONATION_COMPLETED))
            .and(header("X-ArtistsAid-Webhook-Version", "v1"))
            .and(header("content-type", "application/json"))
            .and(header_exists("X-ArtistsAid-Delivery"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let integrations = fixtures::local_integrations();
        let mut request =
            WebhookRequestFactory::create(&hook_url(&server), &[events::DONATION_COMPLETED]);
        request.headers = HashMap::from([
            ("X-Partner-Id".to_string(), "partner-7".to_string()),
            ("X-ArtistsAid-Signature".to_string(), "forged".to_string()),
        ]);
        let webhook = assert_ok!(integrations.webhooks().create_webhook(request).await);

        let event = events::donation_completed("d-1", "a-1", 2500, "usd");
        let reports = assert_ok!(integrations.dispatcher().dispatch(&event).await);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert!(report.success);
        assert_eq!(report.status_code, Some(200));
        assert_eq!(report.decision, RetryDecision::Delivered);
        assert_eq!(report.webhook_status, WebhookStatus::Active);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let delivered = &received[0];

        let signatures: Vec<_> = delivered
            .headers
            .get_all("X-ArtistsAid-Signature")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(signatures.len(), 1);
        assert!(assert_ok!(verify(
            &signatures[0],
            &delivered.body,
            webhook.secret.expose()
        )));

        let delivery_id = delivered
            .headers
            .get("X-ArtistsAid-Delivery")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(Uuid::parse_str(delivery_id).unwrap(), report.delivery_id);
        assert_eq!(
            delivered.headers.get("X-Partner-Id").unwrap().to_str().unwrap(),
            "partner-7"
        );

        let body: WebhookEvent = serde_json::from_slice(&delivered.body).unwrap();
        assert_eq!(body, event);

        let stored = assert_ok!(integrations.webhooks().get_webhook(webhook.id()).await);
        assert_eq!(stored.success_count, 1);
        assert!(stored.last_success_at.is_some());
    }

    /// A non-2xx answer is a failed attempt with a retry decision
    #[tokio::test]
    async fn test_failed_delivery_schedules_retry() {
        let server = receiver(500).await;
        let integrations = fixtures::local_integrations();
        let webhook = assert_ok!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(
                    &hook_url(&server),
                    &[events::PAYOUT_SENT],
                ))
                .await
        );

        let reports = assert_ok!(
            integrations
                .dispatcher()
                .send_event(events::PAYOUT_SENT, serde_json::json!({"payout_id": "p-1"}))
                .await
        );
        let report = &reports[0];
        assert!(!report.success);
        assert_eq!(report.status_code, Some(500));
        assert!(report.error.is_some());
        assert_eq!(
            report.decision,
            RetryDecision::RetryAfter(Duration::from_millis(1000))
        );

        let event = WebhookEvent::new(events::PAYOUT_SENT, serde_json::json!({}));
        let last = assert_ok!(integrations.dispatcher().redeliver(webhook.id(), &event, 3).await);
        assert_eq!(last.decision, RetryDecision::GiveUp);

        let stored = assert_ok!(integrations.webhooks().get_webhook(webhook.id()).await);
        assert_eq!(stored.failure_count, 2);
        assert_eq!(stored.consecutive_failures, 2);
    }

    /// Consecutive failures past the threshold stop further deliveries
    #[tokio::test]
    async fn test_error_threshold_stops_delivery() {
        let server = receiver(503).await;
        let mut config = Config::default();
        config.webhooks.allow_private_urls = true;
        config.webhooks.error_threshold = 2;
        let integrations = assert_ok!(Integrations::in_memory(config));

        let webhook = assert_ok!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(
                    &hook_url(&server),
                    &[events::PAYOUT_SENT],
                ))
                .await
        );
        let event = events::payout_sent("p-1", "a-1", 10_000, "usd");

        let first = assert_ok!(integrations.dispatcher().dispatch(&event).await);
        assert_eq!(first[0].webhook_status, WebhookStatus::Active);

        let second = assert_ok!(integrations.dispatcher().dispatch(&event).await);
        assert_eq!(second[0].webhook_status, WebhookStatus::Error);
        assert_eq!(second[0].decision, RetryDecision::GiveUp);

        let third = assert_ok!(integrations.dispatcher().dispatch(&event).await);
        assert!(third.is_empty());
        assert_eq!(server.received_requests().await.unwrap().len(), 2);

        let reactivated = assert_ok!(integrations.webhooks().reactivate(webhook.id(), "ops").await);
        assert_eq!(reactivated.status, WebhookStatus::Active);
        assert_eq!(
            assert_ok!(integrations.dispatcher().dispatch(&event).await).len(),
            1
        );
    }

    /// Filters decide per webhook whether an event is sent at all
    #[tokio::test]
    async fn test_filters_select_webhooks() {
        let server = receiver(200).await;
        let integrations = fixtures::local_integrations();

        let mut matching = WebhookRequestFactory::create(&hook_url(&server), &[events::CAMPAIGN_GOAL_REACHED]);
        matching.filters = vec![WebhookFilter {
            field: "campaign_id".to_string(),
            equals: serde_json::json!("c-1"),
        }];
        let matching = assert_ok!(integrations.webhooks().create_webhook(matching).await);

        let mut other = WebhookRequestFactory::create(&hook_url(&server), &[events::CAMPAIGN_GOAL_REACHED]);
        other.filters = vec![WebhookFilter {
            field: "campaign_id".to_string(),
            equals: serde_json::json!("c-2"),
        }];
        assert_ok!(integrations.webhooks().create_webhook(other).await);

        let event = events::campaign_goal_reached("c-1", "a-1", 50_000, 52_500);
        let reports = assert_ok!(integrations.dispatcher().dispatch(&event).await);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].webhook_id, matching.id());
    }

    /// A connection failure is reported, not raised
    #[tokio::test]
    async fn test_unreachable_receiver() {
        let integrations = fixtures::local_integrations();
        assert_ok!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(
                    "http://127.0.0.1:1/hook",
                    &[events::PAYOUT_SENT],
                ))
                .await
        );

        let reports = assert_ok!(
            integrations
                .dispatcher()
                .send_event(events::PAYOUT_SENT, serde_json::json!({}))
                .await
        );
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].success);
        assert!(reports[0].status_code.is_none());
        assert!(matches!(reports[0].decision, RetryDecision::RetryAfter(_)));
    }

    /// Deleting one subscriber mid-flight keeps every other report
    #[tokio::test]
    async fn test_delete_during_delivery_keeps_reports() {
        let fast = receiver(200).await;
        let slow = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&slow)
            .await;

        let integrations = fixtures::local_integrations();
        let kept = assert_ok!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(
                    &hook_url(&fast),
                    &[events::PAYOUT_SENT],
                ))
                .await
        );
        let removed = assert_ok!(
            integrations
                .webhooks()
                .create_webhook(WebhookRequestFactory::create(
                    &hook_url(&slow),
                    &[events::PAYOUT_SENT],
                ))
                .await
        );

        let (reports, deleted) = tokio::join!(
            integrations
                .dispatcher()
                .send_event(events::PAYOUT_SENT, serde_json::json!({"payout_id": "p-9"})),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                integrations.webhooks().delete_webhook(removed.id()).await
            }
        );
        assert_ok!(deleted);
        let reports = assert_ok!(reports);
        assert_eq!(reports.len(), 2);

        let kept_report = reports.iter().find(|r| r.webhook_id == kept.id()).unwrap();
        assert!(kept_report.success);
        assert!(kept_report.record_error.is_none());
        assert_eq!(kept_report.decision, RetryDecision::Delivered);

        let removed_report = reports
            .iter()
            .find(|r| r.webhook_id == removed.id())
            .unwrap();
        assert!(removed_report.success);
        assert_eq!(removed_report.status_code, Some(200));
        assert!(removed_report.record_error.is_some());

        let stored = assert_ok!(integrations.webhooks().get_webhook(kept.id()).await);
        assert_eq!(stored.success_count, 1);
        assert_eq!(slow.received_requests().await.unwrap().len(), 1);
    }

    /// No subscribers means no requests and no error
    #[tokio::test]
    async fn test_dispatch_without_subscribers() {
        let integrations = fixtures::local_integrations();
        let reports = assert_ok!(
            integrations
                .dispatcher()
                .send_event("artist.created", serde_json::json!({}))
                .await
        );
        assert!(reports.is_empty());
    }
}
