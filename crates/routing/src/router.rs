use std::{collections::BTreeSet, sync::Arc};

use {
    relay_channels::{DeliverySink, InboundEvent, SourceFilter},
    tracing::{debug, info, trace, warn},
};

use crate::{extract::find_token, registry::Registry};

/// What happened to one inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Lowercased name found in the message, if any.
    pub token: Option<String>,
    /// Every destination whose identifier set contains the token.
    pub matched: BTreeSet<String>,
    /// Matched destinations that got at least one delivery attempt.
    pub delivered: BTreeSet<String>,
}

/// Routes admitted events to every matching destination.
pub struct Router {
    filter: SourceFilter,
    registry: Registry,
    sink: Arc<dyn DeliverySink>,
}

impl Router {
    pub fn new(filter: SourceFilter, registry: Registry, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            filter,
            registry,
            sink,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn source_channel_id(&self) -> u64 {
        self.filter.channel_id()
    }

    /// Route one event.
    ///
    /// Events from other channels or from the relay itself are dropped before
    /// any text is inspected. Deliveries are handed to the sink in registry
    /// order, then target order, and are never awaited.
    pub fn route(&self, event: &InboundEvent) -> RouteOutcome {
        if !self.filter.admits(event) {
            trace!(
                channel_id = event.channel_id,
                from_self = event.author_is_self,
                "dropping message outside the source channel"
            );
            return RouteOutcome::default();
        }

        info!(
            author = %event.author_name,
            preview = %preview(&event.content),
            "processing message"
        );

        let Some(token) = find_token(event.text_fragments()) else {
            return RouteOutcome::default();
        };
        let token = token.to_lowercase();
        debug!(token = %token, "extracted bot name");

        let mut outcome = RouteOutcome {
            token: Some(token.clone()),
            ..RouteOutcome::default()
        };

        for rule in self.registry.iter().filter(|rule| rule.matches(&token)) {
            info!(destination = %rule.name(), token = %token, "match found");
            outcome.matched.insert(rule.name().to_string());

            if !rule.is_deliverable() {
                warn!(
                    destination = %rule.name(),
                    "match found but no webhook URL configured"
                );
                continue;
            }

            for target in rule.targets() {
                self.sink.deliver(target, Arc::clone(&event.payload));
            }
            outcome.delivered.insert(rule.name().to_string());
        }

        if outcome.matched.is_empty() {
            info!(token = %token, "bot name not found in any destination list");
        }

        outcome
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
