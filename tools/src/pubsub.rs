//! Pub/Sub REST transport.
//!
//! One `topics.publish` call per message. The payload is base64 encoded
//! and the ordering key travels with it; sequencing per key is handled
//! upstream by `OrderedPublisher`.

use anyhow::{bail, Context};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use txgen_core::{
    transport::{OutboundMessage, Transport, TransportError},
    types::MessageId,
};

pub const DEFAULT_TOPIC: &str = "fraud-example-transactions";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// `https://<region>-pubsub.googleapis.com`
pub fn regional_endpoint(region: &str) -> String {
    format!("https://{region}-pubsub.googleapis.com")
}

/// Google-hosted endpoints refuse unauthenticated publishes; emulators
/// and local overrides accept them.
pub fn requires_token(endpoint: &Url) -> bool {
    endpoint
        .host_str()
        .is_some_and(|host| host == "googleapis.com" || host.ends_with(".googleapis.com"))
}

pub fn topic_path(project_id: &str, topic: &str) -> String {
    format!("projects/{project_id}/topics/{topic}")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PubsubMessage<'a> {
    data:         String,
    ordering_key: &'a str,
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    messages: Vec<PubsubMessage<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

fn request_body(message: &OutboundMessage) -> PublishRequest<'_> {
    PublishRequest {
        messages: vec![PubsubMessage {
            data:         STANDARD.encode(message.data.as_bytes()),
            ordering_key: &message.ordering_key,
        }],
    }
}

/// The bearer token is sent as given and never refreshed. A run that
/// outlives the token starts getting 401 rejections.
pub struct PubSubTransport {
    client:      Client,
    publish_url: String,
    token:       Option<String>,
}

impl PubSubTransport {
    pub fn new(endpoint: &str, topic_path: &str, token: Option<String>) -> anyhow::Result<Self> {
        let parsed = Url::parse(endpoint).with_context(|| format!("invalid endpoint {endpoint}"))?;
        if token.is_none() && requires_token(&parsed) {
            bail!(
                "{endpoint} requires a bearer token; set PUBSUB_ACCESS_TOKEN \
                 (e.g. from `gcloud auth print-access-token`) or PUBSUB_EMULATOR_HOST"
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            publish_url: format!("{}/v1/{topic_path}:publish", endpoint.trim_end_matches('/')),
            token,
        })
    }

    pub fn publish_url(&self) -> &str {
        &self.publish_url
    }
}

#[async_trait]
impl Transport for PubSubTransport {
    fn name(&self) -> &'static str {
        "pubsub"
    }

    async fn publish(&self, message: OutboundMessage) -> Result<MessageId, TransportError> {
        let mut request = self.client.post(&self.publish_url).json(&request_body(&message));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected { status: status.as_u16(), body });
        }

        let parsed: PublishResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        parsed
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Http("response carried no message id".into()))
    }
}
