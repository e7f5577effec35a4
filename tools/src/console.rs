//! Dry-run transport: one JSON line per message on stdout.

use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use txgen_core::{
    transport::{OutboundMessage, Transport, TransportError},
    types::MessageId,
};
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsoleLine<'a> {
    topic:        &'a str,
    message_id:   &'a str,
    ordering_key: &'a str,
    data:         serde_json::Value,
}

pub struct ConsoleTransport {
    topic_path: String,
}

impl ConsoleTransport {
    pub fn new(topic_path: String) -> Self {
        Self { topic_path }
    }

    fn render(&self, message_id: &str, message: &OutboundMessage) -> Result<String, TransportError> {
        let data = serde_json::from_str(&message.data)
            .unwrap_or_else(|_| serde_json::Value::String(message.data.clone()));
        let line = ConsoleLine {
            topic: &self.topic_path,
            message_id,
            ordering_key: &message.ordering_key,
            data,
        };
        serde_json::to_string(&line).map_err(|e| TransportError::Io(e.to_string()))
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn publish(&self, message: OutboundMessage) -> Result<MessageId, TransportError> {
        let message_id = Uuid::new_v4().to_string();
        let line = self.render(&message_id, &message)?;
        {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{line}").map_err(|e| TransportError::Io(e.to_string()))?;
        }
        Ok(message_id)
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        std::io::stdout().flush().map_err(|e| TransportError::Io(e.to_string()))
    }
}
