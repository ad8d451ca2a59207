//! Stateless HTTP request builder and response parser for the Clients API.
//!
//! # Design
//! `ClientManager` holds only a base URL and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::credential::Credential;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::RequestOptions;
use crate::types::{Client, ClientList};

const CLIENTS: &str = "clients";
const CREDENTIALS: &str = "credentials";

/// Synchronous, stateless client for the `clients` resource.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct ClientManager {
    base_url: Url,
}

impl ClientManager {
    /// `base_url` is the API root, e.g. `https://tenant.example.com/api/v2`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("cannot carry path segments".to_string()));
        }
        Ok(Self { base_url: url })
    }

    /// Management API of a tenant domain, served over https under `/api/v2`.
    pub fn for_domain(domain: &str) -> Result<Self, ApiError> {
        Self::new(&format!("https://{}/api/v2", domain.trim_end_matches('/')))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn build_create(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = json_body(client)?;
        Ok(self.request(HttpMethod::Post, &[CLIENTS], options, Some(body)))
    }

    pub fn build_read(&self, id: &str, options: &RequestOptions) -> HttpRequest {
        self.request(HttpMethod::Get, &[CLIENTS, id], options, None)
    }

    /// List clients. Applies `per_page=50` and `include_totals=true` unless
    /// `options` overrides them.
    pub fn build_list(&self, options: &RequestOptions) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &[CLIENTS],
            &options.with_list_defaults(),
            None,
        )
    }

    /// Only the fields set on `client` are sent.
    pub fn build_update(
        &self,
        id: &str,
        client: &Client,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = json_body(client)?;
        Ok(self.request(HttpMethod::Patch, &[CLIENTS, id], options, Some(body)))
    }

    pub fn build_rotate_secret(&self, id: &str, options: &RequestOptions) -> HttpRequest {
        self.request(HttpMethod::Post, &[CLIENTS, id, "rotate-secret"], options, None)
    }

    /// Deletes the client and everything attached to it.
    pub fn build_delete(&self, id: &str, options: &RequestOptions) -> HttpRequest {
        self.request(HttpMethod::Delete, &[CLIENTS, id], options, None)
    }

    pub fn build_create_credential(
        &self,
        client_id: &str,
        credential: &Credential,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = json_body(credential)?;
        Ok(self.request(
            HttpMethod::Post,
            &[CLIENTS, client_id, CREDENTIALS],
            options,
            Some(body),
        ))
    }

    /// Update a credential's expiry. Every other field of `credential` is
    /// left out of the request body.
    pub fn build_update_credential(
        &self,
        client_id: &str,
        credential_id: &str,
        credential: &Credential,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = json_body(&credential.expiry_patch())?;
        Ok(self.request(
            HttpMethod::Patch,
            &[CLIENTS, client_id, CREDENTIALS, credential_id],
            options,
            Some(body),
        ))
    }

    pub fn build_list_credentials(&self, client_id: &str, options: &RequestOptions) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &[CLIENTS, client_id, CREDENTIALS],
            &options.with_list_defaults(),
            None,
        )
    }

    pub fn build_get_credential(
        &self,
        client_id: &str,
        credential_id: &str,
        options: &RequestOptions,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &[CLIENTS, client_id, CREDENTIALS, credential_id],
            options,
            None,
        )
    }

    pub fn build_delete_credential(
        &self,
        client_id: &str,
        credential_id: &str,
        options: &RequestOptions,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            &[CLIENTS, client_id, CREDENTIALS, credential_id],
            options,
            None,
        )
    }

    /// The created client as echoed by the server, with `client_id` and
    /// `client_secret` assigned.
    pub fn parse_create(&self, response: HttpResponse) -> Result<Client, ApiError> {
        decode(response)
    }

    pub fn parse_read(&self, response: HttpResponse) -> Result<Client, ApiError> {
        decode(response)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<ClientList, ApiError> {
        decode(response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Client, ApiError> {
        decode(response)
    }

    pub fn parse_rotate_secret(&self, response: HttpResponse) -> Result<Client, ApiError> {
        decode(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_create_credential(&self, response: HttpResponse) -> Result<Credential, ApiError> {
        decode(response)
    }

    /// Refresh `credential` in place from the server's partial echo.
    ///
    /// On error `credential` is left unchanged.
    pub fn parse_update_credential(
        &self,
        response: HttpResponse,
        credential: &mut Credential,
    ) -> Result<(), ApiError> {
        let echoed: Credential = decode(response)?;
        credential.refresh_from(echoed);
        Ok(())
    }

    pub fn parse_list_credentials(&self, response: HttpResponse) -> Result<Vec<Credential>, ApiError> {
        decode(response)
    }

    pub fn parse_get_credential(&self, response: HttpResponse) -> Result<Credential, ApiError> {
        decode(response)
    }

    pub fn parse_delete_credential(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
        options: &RequestOptions,
        body: Option<String>,
    ) -> HttpRequest {
        let url = self.uri(segments, options);
        log::debug!("{method} {url}");
        let headers = match body {
            Some(_) => vec![("content-type".to_string(), "application/json".to_string())],
            None => Vec::new(),
        };
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Append escaped path segments to the base URL.
    fn uri(&self, segments: &[&str], options: &RequestOptions) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        options.apply(&mut url);
        url
    }
}

fn json_body<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(ApiError::Serialization)
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    log::warn!("management API returned HTTP {}", response.status);
    Err(ApiError::from_status(response.status, &response.body))
}
