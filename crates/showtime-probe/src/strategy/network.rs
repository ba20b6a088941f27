use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams, RequestId, ResourceType,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};
use crate::error::ProbeError;
use crate::heuristic::Evidence;
use crate::page::{current_url, visible_text};
use crate::text::{json_text, normalize};
use super::{ExtractionStrategy, StrategyContext};

/// Load the film page while recording the XHR/fetch JSON responses it makes;
/// client-rendered listings usually arrive that way before reaching the DOM.
pub struct NetworkStrategy {
    max_bodies: usize,
    max_body_bytes: usize,
}

impl Default for NetworkStrategy {
    fn default() -> Self {
        Self {
            max_bodies: 40,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

struct CapturedResponse {
    request_id: RequestId,
    url: String,
}

/// Only successful JSON answers to script-initiated requests are worth reading
pub fn is_candidate_response(resource_type: &ResourceType, mime_type: &str, status: i64) -> bool {
    matches!(resource_type, ResourceType::Xhr | ResourceType::Fetch)
        && mime_type.to_ascii_lowercase().contains("json")
        && (200..300).contains(&status)
}

#[async_trait]
impl ExtractionStrategy for NetworkStrategy {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn collect(&self, page: &Page, ctx: &mut StrategyContext<'_>) -> Result<Evidence, ProbeError> {
        let mut events = page.event_listener::<EventResponseReceived>().await?;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let response = &event.response;
                if is_candidate_response(&event.r#type, &response.mime_type, response.status) {
                    let _ = tx.send(CapturedResponse {
                        request_id: event.request_id.clone(),
                        url: response.url.clone(),
                    });
                }
            }
        });

        let film_url = ctx.target.film_url.clone();
        let opened = ctx.open(page, &film_url, "film_page_network").await;
        listener.abort();
        let consent_dismissed = opened?;

        let mut captured = Vec::new();
        while let Ok(response) = rx.try_recv() {
            captured.push(response);
        }
        info!("Intercepted {} candidate JSON responses", captured.len());

        let mut bodies = Vec::new();
        for response in captured.into_iter().take(self.max_bodies) {
            let Some(body) = self.read_body(page, &response).await else {
                continue;
            };
            if ctx.matcher.mentions_film_or_venue(&normalize(&json_text(&body))) {
                debug!("Response {} mentions the film or venue", response.url);
                bodies.push(body);
            }
        }

        Ok(Evidence {
            film_implied: true,
            consent_dismissed,
            film_page_url: current_url(page).await.or(Some(film_url)),
            texts: vec![visible_text(page).await?],
            network_bodies: bodies,
            ..Default::default()
        })
    }
}

impl NetworkStrategy {
    async fn read_body(&self, page: &Page, response: &CapturedResponse) -> Option<String> {
        let params = GetResponseBodyParams::new(response.request_id.clone());
        match page.execute(params).await {
            Ok(reply) => {
                if reply.result.base64_encoded {
                    debug!("Skipping binary body of {}", response.url);
                    return None;
                }
                if reply.result.body.len() > self.max_body_bytes {
                    debug!("Skipping oversized body of {} ({} bytes)", response.url, reply.result.body.len());
                    return None;
                }
                Some(reply.result.body.clone())
            }
            Err(e) => {
                // Bodies of evicted or redirected requests are gone
                debug!("No body for {}: {}", response.url, e);
                None
            }
        }
    }
}
