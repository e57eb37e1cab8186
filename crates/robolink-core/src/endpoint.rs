//! The remote robot server address.

use std::fmt;
use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Host used until an operator enters another one.
pub const DEFAULT_HOST: &str = "192.168.1.103";

/// Port the robot server listens on by default.
pub const DEFAULT_PORT: u16 = 5000;

/// Host/port pair identifying the remote robot server.
///
/// Endpoints are immutable values. Switching robots means connecting with a
/// new `Endpoint`, which invalidates every background task bound to the old
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint, trimming surrounding whitespace from the host.
    ///
    /// IPv6 literals are accepted with or without brackets and stored bare.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidEndpoint` if the host is empty, contains
    /// whitespace or a path separator, carries a colon without being an IPv6
    /// literal, or the port is 0.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let raw = host.into();
        let trimmed = raw.trim();
        let unbracketed = trimmed
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(trimmed);
        let host = unbracketed.to_string();

        let reason = if host.is_empty() {
            Some("host is empty")
        } else if host.contains(char::is_whitespace) || host.contains('/') {
            Some("host must be a bare name or address")
        } else if host.contains(':') && host.parse::<Ipv6Addr>().is_err() {
            Some("host must not carry a port")
        } else if port == 0 {
            Some("port must be non-zero")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidEndpoint {
                host: raw,
                port,
                reason,
            }),
            None => Ok(Self { host, port }),
        }
    }

    /// The host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Base URL every robot route is resolved against, with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{self}/")
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_base_url_with_trailing_slash() {
        let endpoint = Endpoint::new("10.0.0.5", 6000).unwrap();
        assert_eq!(endpoint.base_url(), "http://10.0.0.5:6000/");
    }

    #[test]
    fn brackets_ipv6_literals() {
        let endpoint = Endpoint::new("::1", 5000).unwrap();
        assert_eq!(endpoint.host(), "::1");
        assert_eq!(endpoint.to_string(), "[::1]:5000");
        assert_eq!(endpoint.base_url(), "http://[::1]:5000/");

        let bracketed = Endpoint::new(" [fe80::2] ", 5000).unwrap();
        assert_eq!(bracketed.host(), "fe80::2");
        assert_eq!(bracketed.base_url(), "http://[fe80::2]:5000/");
    }

    #[test]
    fn rejects_host_with_port() {
        assert!(matches!(
            Endpoint::new("10.0.0.5:5000", 5000),
            Err(CoreError::InvalidEndpoint { reason: "host must not carry a port", .. })
        ));
        assert!(Endpoint::new("[]", 5000).is_err());
    }

    #[test]
    fn trims_host_whitespace() {
        // Hosts typed into a settings field often carry trailing spaces.
        let endpoint = Endpoint::new("192.168.1.132  ", 5000).unwrap();
        assert_eq!(endpoint.host(), "192.168.1.132");
        assert_eq!(endpoint.to_string(), "192.168.1.132:5000");
    }

    #[test]
    fn rejects_unusable_pairs() {
        assert!(matches!(
            Endpoint::new("", 5000),
            Err(CoreError::InvalidEndpoint { reason: "host is empty", .. })
        ));
        assert!(Endpoint::new("10.0.0.5", 0).is_err());
        assert!(Endpoint::new("robot local", 5000).is_err());
        assert!(Endpoint::new("10.0.0.5/api", 5000).is_err());
    }

    #[test]
    fn default_endpoint() {
        let endpoint = Endpoint::default();
        assert_eq!(endpoint.host(), DEFAULT_HOST);
        assert_eq!(endpoint.port(), DEFAULT_PORT);
    }
}
