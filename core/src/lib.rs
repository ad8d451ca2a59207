//! Synchronous client core for the identity-management Clients API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, adding authentication and any retry policy.
//!
//! # Design
//! - `ClientManager` is stateless; it holds only the API base URL.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Every DTO field is optional and omitted when unset, so partial updates
//!   never overwrite server state by accident.
//! - `jwt_configuration.lifetime_in_seconds` is accepted as a number or a
//!   string and always written back as a number (see [`jwt`]).

pub mod client;
pub mod credential;
pub mod error;
pub mod http;
pub mod jwt;
pub mod options;
pub mod types;

pub use client::ClientManager;
pub use credential::Credential;
pub use error::{ApiError, DecodeError, MalformedFieldError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use jwt::ClientJwtConfiguration;
pub use options::RequestOptions;
pub use types::{
    Client, ClientAuthenticationMethods, ClientList, ClientMobile, ClientMobileAndroid,
    ClientMobileIos, ClientNativeSocialLogin, ClientRefreshToken, OidcBackchannelLogout,
    PrivateKeyJwt, SupportEnabled,
};
