//! HTTP ingestion sender
//!
//! Posts batches to the ingestion endpoint's `v2.1/track` API using reqwest.
//! Automatic redirect following is disabled: 307/308 answers are reported back to
//! the exporter as [`SendOutcome::Redirect`] so it can count them and move the
//! endpoint itself.

use super::traits::{SendOutcome, Sender, TransportFault};
use crate::config::ExporterConfig;
use crate::domain::{Batch, CourierError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

const TRACK_PATH: &str = "v2.1/track";

/// reqwest-backed [`Sender`]
///
/// # Example
///
/// ```no_run
/// use courier::adapters::sender::{HttpSender, Sender};
/// use courier::config::ExporterConfig;
/// use courier::domain::{Batch, Envelope};
///
/// # async fn example() -> courier::domain::Result<()> {
/// let config = ExporterConfig::default();
/// let sender = HttpSender::new(&config)?;
/// let outcome = sender.send(&Batch::new(vec![Envelope::new("evt")])).await;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct HttpSender {
    /// HTTP client for making requests
    client: Client,
    /// Current ingestion endpoint; replaced on permanent redirect
    endpoint: RwLock<Url>,
    /// Optional bearer token
    auth_token: Option<crate::config::SecretString>,
    closed: AtomicBool,
}

impl HttpSender {
    /// Create a new sender from exporter configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ExporterConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint_url).map_err(|e| {
            CourierError::Configuration(format!(
                "Invalid exporter endpoint_url '{}': {e}",
                config.endpoint_url
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .redirect(Policy::none())
            .build()
            .map_err(|e| CourierError::Sender(format!("Failed to create HTTP client: {e}")))?;

        tracing::debug!(endpoint = %endpoint, "HTTP sender initialized");

        Ok(Self {
            client,
            endpoint: RwLock::new(endpoint),
            auth_token: config.auth_token.clone(),
            closed: AtomicBool::new(false),
        })
    }

    /// Current ingestion endpoint
    pub fn endpoint(&self) -> Result<Url> {
        self.endpoint
            .read()
            .map(|url| url.clone())
            .map_err(|_| CourierError::Sender("endpoint lock poisoned".to_string()))
    }

    fn track_url(&self) -> Result<String> {
        let endpoint = self.endpoint()?;
        Ok(format!(
            "{}/{}",
            endpoint.as_str().trim_end_matches('/'),
            TRACK_PATH
        ))
    }

    fn fault_from(error: reqwest::Error) -> TransportFault {
        let fault = if error.is_connect() || error.is_timeout() || error.is_request() {
            TransportFault::network(error.to_string())
        } else {
            TransportFault::other(error.to_string())
        };

        match error.status() {
            Some(status) => fault.with_status(status.as_u16()),
            None => fault,
        }
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, batch: &Batch) -> SendOutcome {
        if self.closed.load(Ordering::SeqCst) {
            return SendOutcome::Fault(TransportFault::other("sender is shut down"));
        }

        let url = match self.track_url() {
            Ok(url) => url,
            Err(e) => return SendOutcome::Fault(TransportFault::other(e.to_string())),
        };

        tracing::debug!(url = %url, envelope_count = batch.len(), "Sending batch");

        let mut request = self.client.post(&url).json(batch);
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return SendOutcome::Fault(Self::fault_from(e)),
        };

        let status = response.status().as_u16();
        if status == 307 || status == 308 {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            return SendOutcome::Redirect { status, location };
        }

        let body = match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(status = status, error = %e, "Failed to read response body");
                None
            }
        };

        SendOutcome::Response { status, body }
    }

    fn handle_permanent_redirect(&self, location: &str) -> Result<()> {
        let mut endpoint = self
            .endpoint
            .write()
            .map_err(|_| CourierError::Sender("endpoint lock poisoned".to_string()))?;

        let target = endpoint.join(location).map_err(|e| {
            CourierError::Sender(format!("Invalid redirect location '{location}': {e}"))
        })?;

        let origin = target.origin();
        if !origin.is_tuple() {
            return Err(CourierError::Sender(format!(
                "Redirect location '{location}' has no usable origin"
            )));
        }

        let new_endpoint = Url::parse(&origin.ascii_serialization()).map_err(|e| {
            CourierError::Sender(format!("Invalid redirect origin for '{location}': {e}"))
        })?;

        tracing::info!(
            from = %endpoint.as_str(),
            to = %new_endpoint.as_str(),
            "Updating ingestion endpoint"
        );
        *endpoint = new_endpoint;
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!("HTTP sender shut down");
        Ok(())
    }
}
