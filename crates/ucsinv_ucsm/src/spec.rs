//! Connection settings, session state and error types.

use std::fmt;

/// Default request timeout in seconds.
pub const N_TIMEOUT_SECS_DEFAULT: u64 = 120;
/// XML API endpoint path on the UCS Manager.
pub const C_XML_API_PATH: &str = "/nuova";

/// Where and how to reach one UCS Manager.
#[derive(Clone, PartialEq, Eq)]
pub struct SpecUcsmConnection {
    /// Hostname or IP address.
    pub host: String,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// TCP port; defaults to 443 (secure) or 80.
    pub port: Option<u16>,
    /// Use https.
    pub secure: bool,
    /// Verify the server certificate. UCS Manager ships a self-signed one.
    pub verify_tls: bool,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl SpecUcsmConnection {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            port: None,
            secure: true,
            verify_tls: false,
            timeout_secs: N_TIMEOUT_SECS_DEFAULT,
        }
    }

    /// Full XML API URI, e.g. `https://ucsm:443/nuova`.
    pub fn uri(&self) -> String {
        let (c_scheme, n_port_default) = if self.secure {
            ("https", 443)
        } else {
            ("http", 80)
        };
        let n_port = self.port.unwrap_or(n_port_default);
        format!("{c_scheme}://{}:{n_port}{C_XML_API_PATH}", self.host)
    }
}

impl fmt::Debug for SpecUcsmConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecUcsmConnection")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("verify_tls", &self.verify_tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Live session returned by `aaaLogin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecUcsmSession {
    /// Session cookie sent with every later request.
    pub cookie: String,
    /// Seconds until the cookie must be refreshed.
    pub refresh_period: Option<u64>,
    /// Comma-separated privileges granted to the user.
    pub privileges: Option<String>,
    /// Manager version string.
    pub version: Option<String>,
}

/// UCS Manager XML API failures.
#[derive(Debug, thiserror::Error)]
pub enum UcsmError {
    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("request to {uri} failed: {source}")]
    Http {
        /// Endpoint URI.
        uri: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Non-success HTTP status.
    #[error("{uri} answered HTTP {status}")]
    Status {
        /// Endpoint URI.
        uri: String,
        /// HTTP status code.
        status: u16,
    },
    /// The manager answered with `errorCode`/`errorDescr`.
    #[error("{method} rejected: [{code}] {descr}")]
    Api {
        /// XML API method name.
        method: String,
        /// `errorCode` attribute.
        code: String,
        /// `errorDescr` attribute.
        descr: String,
    },
    /// Response body is not the expected XML document.
    #[error("malformed {method} response: {message}")]
    Xml {
        /// XML API method name.
        method: String,
        /// Parser or shape error text.
        message: String,
    },
    /// Login succeeded at HTTP level but returned no session cookie.
    #[error("aaaLogin response carried no outCookie")]
    MissingCookie,
    /// A query was attempted without a session.
    #[error("not logged in")]
    NotLoggedIn,
}
