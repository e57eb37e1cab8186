//! reqwest-backed transport.
//!
//! Routes are resolved against `http://<host>:<port>/`. Sequenced commands
//! carry the sequence in a `sequence` request header.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use robolink_core::{Command, ControlResponse, Endpoint, StatusSnapshot};
use serde::de::DeserializeOwned;

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::{Transport, TransportFactory};

/// Name of the request header carrying the command sequence.
pub const SEQUENCE_HEADER: &str = "sequence";

const HEARTBEAT_PATH: &str = "heartbeat";
const STATUS_PATH: &str = "is_moving";

/// HTTP transport bound to one robot endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Endpoint,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidEndpoint` if the endpoint does not form
    /// a valid URL, or `TransportError::Connection` if the HTTP client cannot
    /// be built.
    pub fn new(endpoint: Endpoint, config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::Connection(format!("failed to build HTTP client: {e}")))?;

        Self::with_client(client, endpoint)
    }

    /// Create a transport with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidEndpoint` if the endpoint does not form
    /// a valid URL.
    pub fn with_client(client: Client, endpoint: Endpoint) -> Result<Self> {
        let base_url = Url::parse(&endpoint.base_url())
            .map_err(|e| TransportError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            base_url,
        })
    }

    /// The base URL routes are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for `path`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidEndpoint` if the path cannot be joined.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}{path}: {e}", self.base_url)))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        command: Option<&Command>,
    ) -> Result<reqwest::Response> {
        let url = self.url_for(path)?;
        let mut request = self.client.request(method, url);
        if let Some(sequence) = command.and_then(|c| c.sequence) {
            request = request.header(SEQUENCE_HEADER, sequence.get());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::warn!(
                endpoint = %self.endpoint,
                path = path,
                status = %status,
                "Robot rejected request"
            );
            Err(TransportError::Protocol {
                status: status.as_u16(),
            })
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(TransportError::EmptyBody("response body is empty".to_string()));
        }
        serde_json::from_slice(&body).map_err(|e| TransportError::EmptyBody(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn send_command(&self, command: &Command) -> Result<ControlResponse> {
        let path = command.path();
        let response = self.execute(Method::GET, &path, Some(command)).await?;
        let body: ControlResponse = Self::read_json(response).await?;

        tracing::debug!(
            endpoint = %self.endpoint,
            command = %command.kind,
            sequence = ?command.sequence.map(robolink_core::Sequence::get),
            status = %body.status,
            "Robot acknowledged command"
        );
        Ok(body)
    }

    async fn heartbeat(&self) -> Result<()> {
        self.execute(Method::POST, HEARTBEAT_PATH, None).await?;
        Ok(())
    }

    async fn status(&self) -> Result<StatusSnapshot> {
        let response = self.execute(Method::GET, STATUS_PATH, None).await?;
        Self::read_json(response).await
    }
}

/// Builds an [`HttpTransport`] per connection session.
#[derive(Debug, Clone, Default)]
pub struct HttpTransportFactory {
    config: TransportConfig,
}

impl HttpTransportFactory {
    /// Create a factory that applies `config` to every transport.
    #[must_use]
    pub const fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// The configuration applied to new transports.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>> {
        let transport = HttpTransport::new(endpoint.clone(), &self.config)?;
        tracing::debug!(base_url = %transport.base_url(), "Built HTTP transport");
        Ok(Arc::new(transport))
    }
}
