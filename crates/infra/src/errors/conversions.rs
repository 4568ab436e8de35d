//! Conversions from external infrastructure errors into domain errors.

use pitwall_domain::PitwallError;
use reqwest::Error as HttpError;

use crate::api::errors::ApiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PitwallError);

impl From<InfraError> for PitwallError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PitwallError> for InfraError {
    fn from(value: PitwallError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPitwallError {
    fn into_pitwall(self) -> PitwallError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PitwallError */
/* -------------------------------------------------------------------------- */

impl IntoPitwallError for HttpError {
    fn into_pitwall(self) -> PitwallError {
        if self.is_builder() {
            return PitwallError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return PitwallError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PitwallError::Network("HTTP connection failure".into());
        }

        if self.is_decode() || self.is_body() {
            return PitwallError::Internal(format!("failed to read HTTP body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 | 419 => PitwallError::Auth(message),
                400..=499 => PitwallError::InvalidInput(message),
                _ => PitwallError::Network(message),
            };
        }

        PitwallError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_pitwall())
    }
}

/* -------------------------------------------------------------------------- */
/* InfraError → ApiError */
/* -------------------------------------------------------------------------- */

impl From<InfraError> for ApiError {
    fn from(value: InfraError) -> Self {
        match value.0 {
            PitwallError::Config(message) => ApiError::Config(message),
            PitwallError::Internal(message) => ApiError::Decode(message),
            PitwallError::Network(message)
            | PitwallError::Auth(message)
            | PitwallError::InvalidInput(message) => ApiError::Network(message),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_419_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(419))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: PitwallError = InfraError::from(error).into();
        match mapped {
            PitwallError::Auth(msg) => assert!(msg.contains("419")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn http_status_404_maps_to_invalid_input() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::NOT_FOUND))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: PitwallError = InfraError::from(error).into();
        assert!(matches!(mapped, PitwallError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_api_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped = ApiError::from(InfraError::from(error));
        match mapped {
            ApiError::Network(msg) => assert!(msg.to_lowercase().contains("http")),
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[test]
    fn config_errors_stay_config_errors() {
        let mapped = ApiError::from(InfraError(PitwallError::Config("bad origin".into())));
        assert!(matches!(mapped, ApiError::Config(msg) if msg == "bad origin"));
    }
}
