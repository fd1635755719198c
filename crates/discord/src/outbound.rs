use std::{sync::Arc, time::Duration};

use {
    relay_channels::{DeliveryPayload, DeliverySink},
    tracing::{debug, error, info, warn},
};

use crate::error::{Error, Result};

/// Webhook URLs carry their token in the path; logs only show this prefix.
const LOGGED_URL_CHARS: usize = 30;

/// Delivers relayed messages by POSTing them to Discord-compatible webhooks.
///
/// Cloning is cheap: all clones share one connection pool.
#[derive(Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
}

impl WebhookSink {
    /// Build a sink whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST `payload` as JSON to `url` and wait for the response.
    pub async fn post(&self, url: &str, payload: &DeliveryPayload) -> Result<()> {
        let resp = self.http.post(url).json(payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rejected { status, body });
        }
        Ok(())
    }
}

impl DeliverySink for WebhookSink {
    fn deliver(&self, target: &str, payload: Arc<DeliveryPayload>) {
        let webhook = redact_url(target);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(webhook = %webhook, "no async runtime available, dropping delivery");
            return;
        };

        let sink = self.clone();
        let url = target.to_string();
        runtime.spawn(async move {
            debug!(webhook = %webhook, "sending to webhook");
            match sink.post(&url, &payload).await {
                Ok(()) => info!(webhook = %webhook, "successfully sent to webhook"),
                Err(e) => warn!(webhook = %webhook, error = %e, "failed to send to webhook"),
            }
        });
    }
}

/// Shorten a webhook URL for logging.
pub fn redact_url(url: &str) -> String {
    let mut chars = url.chars();
    let prefix: String = chars.by_ref().take(LOGGED_URL_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher, serde_json::json};

    fn sink() -> WebhookSink {
        WebhookSink::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_content_and_embeds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/webhooks/1/token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "content": "Bot Foo has successfully claimed",
                "embeds": [{ "title": "Drop" }]
            })))
            .with_status(204)
            .create_async()
            .await;

        let payload = DeliveryPayload::new("Bot Foo has successfully claimed", vec![
            json!({ "title": "Drop" }),
        ]);
        let url = format!("{}/api/webhooks/1/token", server.url());
        sink().post(&url, &payload).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn absent_parts_are_omitted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(Matcher::Json(json!({ "embeds": [{ "description": "d" }] })))
            .with_status(200)
            .create_async()
            .await;

        let payload = DeliveryPayload::new("", vec![json!({ "description": "d" })]);
        sink()
            .post(&format!("{}/hook", server.url()), &payload)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(400)
            .with_body("{\"message\": \"Cannot send an empty message\"}")
            .create_async()
            .await;

        let err = sink()
            .post(
                &format!("{}/hook", server.url()),
                &DeliveryPayload::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Rejected { status, .. } if status.as_u16() == 400));
        assert!(err.to_string().contains("empty message"));
    }

    #[tokio::test]
    async fn unreachable_target_hides_the_url() {
        let err = sink()
            .post(
                "http://127.0.0.1:1/api/webhooks/1/secret-token",
                &DeliveryPayload::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert!(!err.to_string().contains("secret-token"));
    }

    #[tokio::test]
    async fn deliver_does_not_wait_for_the_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let url = format!("{}/hook", server.url());
        let payload = Arc::new(DeliveryPayload::new("hi", Vec::new()));
        let sink = sink();
        sink.deliver(&url, Arc::clone(&payload));
        sink.deliver(&url, payload);

        for _ in 0..100 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
    }

    #[test]
    fn deliver_outside_a_runtime_is_dropped() {
        sink().deliver("http://127.0.0.1:1/hook", Arc::new(DeliveryPayload::default()));
    }

    #[test]
    fn urls_are_shortened_for_logs() {
        assert_eq!(redact_url("https://x.example"), "https://x.example");
        let long = "https://discord.com/api/webhooks/123456/secret-token";
        let shown = redact_url(long);
        assert_eq!(shown, "https://discord.com/api/webhoo...");
        assert!(!shown.contains("secret"));
    }
}
