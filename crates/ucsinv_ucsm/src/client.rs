//! Blocking UCS Manager XML API client.

use std::time::Duration;

use tracing::{debug, info};
use ucsinv_io_xlsx::{InventorySource, Record};

use crate::spec::{SpecUcsmConnection, SpecUcsmSession, UcsmError};
use crate::xml::{
    C_METHOD_LOGIN, C_METHOD_LOGOUT, C_METHOD_RESOLVE_CLASS, create_login_request,
    create_logout_request, create_resolve_class_request, parse_login_response, parse_response,
    parse_resolve_class_response,
};

/// One UCS Manager handle: connection settings plus the current session.
pub struct UcsmClient {
    spec: SpecUcsmConnection,
    uri: String,
    client: reqwest::blocking::Client,
    session: Option<SpecUcsmSession>,
}

impl UcsmClient {
    pub fn new(spec: SpecUcsmConnection) -> Result<Self, UcsmError> {
        let uri = spec.uri();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(spec.timeout_secs))
            .danger_accept_invalid_certs(!spec.verify_tls)
            .user_agent(concat!("ucsinv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| UcsmError::Http {
                uri: uri.clone(),
                source,
            })?;

        Ok(Self {
            spec,
            uri,
            client,
            session: None,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session with `aaaLogin`.
    pub fn login(&mut self) -> Result<&SpecUcsmSession, UcsmError> {
        let body = create_login_request(&self.spec.username, &self.spec.password);
        let response = self.post(C_METHOD_LOGIN, body)?;
        let session = parse_login_response(&response)?;
        info!(
            uri = %self.uri,
            username = %self.spec.username,
            version = session.version.as_deref().unwrap_or("unknown"),
            "logged in"
        );
        Ok(self.session.insert(session))
    }

    /// Close the session with `aaaLogout`. No-op without a session.
    pub fn logout(&mut self) -> Result<(), UcsmError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let response = self.post(C_METHOD_LOGOUT, create_logout_request(&session.cookie))?;
        parse_response(&response, C_METHOD_LOGOUT)?;
        info!(uri = %self.uri, "logged out");
        Ok(())
    }

    /// All objects of `class_id` via `configResolveClass`.
    pub fn query_classid(&mut self, class_id: &str) -> Result<Vec<Record>, UcsmError> {
        let session = self.session.as_ref().ok_or(UcsmError::NotLoggedIn)?;
        let body = create_resolve_class_request(&session.cookie, class_id);
        let response = self.post(C_METHOD_RESOLVE_CLASS, body)?;
        let l_records = parse_resolve_class_response(&response)?;
        debug!(class_id, n_records = l_records.len(), "class resolved");
        Ok(l_records)
    }

    fn post(&self, method: &str, body: String) -> Result<String, UcsmError> {
        debug!(uri = %self.uri, method, "posting request");
        let response = self
            .client
            .post(&self.uri)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .map_err(|source| UcsmError::Http {
                uri: self.uri.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UcsmError::Status {
                uri: self.uri.clone(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| UcsmError::Http {
            uri: self.uri.clone(),
            source,
        })
    }
}

impl InventorySource for UcsmClient {
    type Error = UcsmError;

    fn query_class(&mut self, class_id: &str) -> Result<Vec<Record>, Self::Error> {
        self.query_classid(class_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_without_session_fails_before_any_request() {
        let spec = SpecUcsmConnection::new("127.0.0.1", "admin", "pw");
        let mut client = UcsmClient::new(spec).expect("client");

        assert!(!client.is_logged_in());
        assert_eq!(client.uri(), "https://127.0.0.1:443/nuova");
        assert!(matches!(
            client.query_class("computeBlade"),
            Err(UcsmError::NotLoggedIn)
        ));
        client.logout().expect("logout without session is a no-op");
    }
}
