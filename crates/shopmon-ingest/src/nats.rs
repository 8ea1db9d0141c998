//! NATS pub/sub integration for presence intake.
//!
//! Shop-floor sensors publish raw presence payloads
//! (`<epoch_secs>,<sensorID>,<area>`) on a single subject. The intake
//! subscribes to that subject and forwards each payload, untouched, into
//! the pipeline's inbound channel; parsing happens in the ingest loop.

use futures::StreamExt as _;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::error::IngestError;

/// NATS client wrapper for the presence intake.
///
/// Manages a single NATS connection and provides the subscription and
/// the payload pump feeding the inbound channel.
pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Nats`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, IngestError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| IngestError::Nats(format!("failed to connect to {url}: {e}")))?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Subscribe to the presence subject.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Nats`] if the subscription fails.
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber, IngestError> {
        debug!(subject = subject, "subscribing to presence subject");
        let subscriber = self
            .client
            .subscribe(subject.to_owned())
            .await
            .map_err(|e| IngestError::Nats(format!("failed to subscribe to {subject}: {e}")))?;
        info!(subject = subject, "subscribed to presence subject");
        Ok(subscriber)
    }

    /// Pump message payloads from a subscription into the inbound channel.
    ///
    /// Runs until the subscription ends (server gone) or the receiving
    /// side of the channel is dropped. Payloads are forwarded verbatim;
    /// the wire contract is enforced downstream by the ingest loop.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Payload`] if a payload is not valid UTF-8
    /// -- a contract violation treated the same as any malformed record.
    pub async fn forward_payloads(
        mut subscriber: async_nats::Subscriber,
        outbound: UnboundedSender<String>,
    ) -> Result<(), IngestError> {
        while let Some(message) = subscriber.next().await {
            let payload = Self::decode_payload(&message.payload)?;
            if outbound.send(payload).is_err() {
                // The ingest loop is gone; its exit is already being
                // surfaced elsewhere.
                info!("inbound channel closed, intake ending");
                return Ok(());
            }
        }

        info!("NATS subscription ended");
        Ok(())
    }

    /// Decode a raw message payload into a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Payload`] if the bytes are not valid UTF-8.
    pub fn decode_payload(data: &[u8]) -> Result<String, IngestError> {
        String::from_utf8(data.to_vec())
            .map_err(|e| IngestError::Payload(format!("payload is not valid UTF-8: {e}")))
    }
}

impl std::fmt::Debug for NatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsClient")
            .field("connected", &true)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_payload() {
        let payload = NatsClient::decode_payload(b"1700000000,HotMetals-2,Hot Metals").unwrap();
        assert_eq!(payload, "1700000000,HotMetals-2,Hot Metals");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let result = NatsClient::decode_payload(&[0xff, 0xfe, 0x2c]);
        assert!(matches!(result, Err(IngestError::Payload(_))));
    }

    // Integration tests that require a live NATS server are marked #[ignore].
    #[tokio::test]
    #[ignore = "requires live NATS server (docker compose up -d)"]
    async fn connect_and_subscribe() {
        let client = NatsClient::connect("nats://localhost:4222").await;
        assert!(client.is_ok());

        if let Ok(client) = client {
            let subscriber = client.subscribe("shopmon.presence").await;
            assert!(subscriber.is_ok());
        }
    }
}
