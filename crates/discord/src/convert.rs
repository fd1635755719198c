//! Serenity message → [`InboundEvent`].

use std::sync::Arc;

use {
    relay_channels::{DeliveryPayload, InboundEvent, RichContent, RichField},
    serenity::all::Embed,
    tracing::warn,
};

/// Build the relay's view of a Discord message.
///
/// Embeds are kept twice: as structured text for name extraction, and as raw
/// JSON so webhooks receive them exactly as Discord sent them.
pub fn inbound_event(
    channel_id: u64,
    author_is_self: bool,
    author_name: &str,
    content: &str,
    embeds: &[Embed],
) -> InboundEvent {
    InboundEvent {
        channel_id,
        author_is_self,
        author_name: author_name.to_string(),
        content: content.to_string(),
        rich: embeds.iter().map(rich_content).collect(),
        payload: Arc::new(DeliveryPayload::new(content, embed_values(embeds))),
    }
}

pub fn rich_content(embed: &Embed) -> RichContent {
    RichContent {
        title: embed.title.clone(),
        description: embed.description.clone(),
        footer_text: embed.footer.as_ref().map(|footer| footer.text.clone()),
        author_name: embed.author.as_ref().map(|author| author.name.clone()),
        fields: embed
            .fields
            .iter()
            .map(|field| RichField {
                name: field.name.clone(),
                value: field.value.clone(),
            })
            .collect(),
    }
}

fn embed_values(embeds: &[Embed]) -> Vec<serde_json::Value> {
    embeds
        .iter()
        .filter_map(|embed| match serde_json::to_value(embed) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "failed to serialize embed, dropping it from the payload");
                None
            },
        })
        .collect()
}
