use std::sync::Arc;

use serde::Serialize;

// ── Inbound ─────────────────────────────────────────────────────────────────

/// A single `name: value` pair inside a rich-content block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichField {
    pub name: String,
    pub value: String,
}

/// Structured sub-part of an inbound message (a Discord embed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichContent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub footer_text: Option<String>,
    pub author_name: Option<String>,
    pub fields: Vec<RichField>,
}

impl RichContent {
    /// Text candidates of this block: description, title, footer, author,
    /// then each field's name followed by its value.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        [
            self.description.as_deref(),
            self.title.as_deref(),
            self.footer_text.as_deref(),
            self.author_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(
            self.fields
                .iter()
                .flat_map(|field| [field.name.as_str(), field.value.as_str()]),
        )
    }
}

/// One message observed by the ingress adapter.
///
/// Built per event, consumed by the router, then dropped.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub channel_id: u64,
    /// Authored by the relay's own bot identity.
    pub author_is_self: bool,
    /// Display name of the author, for logs only.
    pub author_name: String,
    pub content: String,
    pub rich: Vec<RichContent>,
    /// Forwarded verbatim to every matched target.
    pub payload: Arc<DeliveryPayload>,
}

impl InboundEvent {
    /// Ordered, non-empty text fragments to search for an identifier.
    /// Primary content always comes first.
    pub fn text_fragments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.content.as_str())
            .chain(self.rich.iter().flat_map(|block| block.fragments()))
            .filter(|text| !text.is_empty())
    }
}

// ── Outbound ────────────────────────────────────────────────────────────────

/// Webhook request body: the original message text and its embeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<serde_json::Value>>,
}

impl DeliveryPayload {
    /// Build a payload, mapping empty text and an empty embed list to absent.
    pub fn new(content: &str, embeds: Vec<serde_json::Value>) -> Self {
        Self {
            content: (!content.is_empty()).then(|| content.to_string()),
            embeds: (!embeds.is_empty()).then_some(embeds),
        }
    }
}

/// Send a relayed message to one webhook target.
///
/// `deliver` must return without waiting for the outcome: failures are the
/// sink's to report, and never affect sibling deliveries or routing.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, target: &str, payload: Arc<DeliveryPayload>);
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str, rich: Vec<RichContent>) -> InboundEvent {
        InboundEvent {
            channel_id: 1,
            author_is_self: false,
            author_name: "tester".into(),
            content: content.into(),
            rich,
            payload: Arc::new(DeliveryPayload::default()),
        }
    }

    #[test]
    fn fragments_follow_priority_order() {
        let block = RichContent {
            title: Some("title".into()),
            description: Some("description".into()),
            footer_text: Some("footer".into()),
            author_name: Some("author".into()),
            fields: vec![
                RichField {
                    name: "f1".into(),
                    value: "v1".into(),
                },
                RichField {
                    name: "f2".into(),
                    value: "v2".into(),
                },
            ],
        };
        let ev = event("content", vec![block]);
        let fragments: Vec<&str> = ev.text_fragments().collect();
        assert_eq!(
            fragments,
            vec![
                "content",
                "description",
                "title",
                "footer",
                "author",
                "f1",
                "v1",
                "f2",
                "v2"
            ]
        );
    }

    #[test]
    fn empty_fragments_are_skipped() {
        let block = RichContent {
            title: Some(String::new()),
            footer_text: Some("footer".into()),
            ..Default::default()
        };
        let ev = event("", vec![block]);
        let fragments: Vec<&str> = ev.text_fragments().collect();
        assert_eq!(fragments, vec!["footer"]);
    }

    #[test]
    fn payload_omits_absent_parts() {
        let payload = DeliveryPayload::new("", Vec::new());
        assert_eq!(serde_json::to_string(&payload).unwrap(), "{}");

        let payload = DeliveryPayload::new("hi", vec![serde_json::json!({"title": "t"})]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["content"], "hi");
        assert_eq!(json["embeds"][0]["title"], "t");
    }
}
