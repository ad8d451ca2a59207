//! Client (application registration) DTOs.
//!
//! # Design
//! Every field is an `Option` skipped on serialization, so a field the caller
//! never set is not sent on update, while `Some(vec![])` or `Some(false)` is.
//! Unknown keys in server responses are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::credential::Credential;
use crate::jwt::ClientJwtConfiguration;

/// An application or SSO integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free text description, at most 140 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// `native`, `spa`, `regular_web`, `non_interactive`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_first_party: Option<bool>,

    /// Trust `auth0-forwarded-for` as the end user IP on the token endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_token_endpoint_ip_header_trusted: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_conformant: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,

    /// Origins allowed for the web message response mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_origins: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_aliases: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_clients: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_logout_urls: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_configuration: Option<ClientJwtConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_keys: Option<Vec<BTreeMap<String, String>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_disabled: Option<bool>,

    #[serde(
        rename = "cross_origin_authentication",
        skip_serializing_if = "Option::is_none"
    )]
    pub cross_origin_auth: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_types: Option<Vec<String>>,

    /// Page that performs cross-origin verification when login is hosted
    /// outside the universal login page.
    #[serde(rename = "cross_origin_loc", skip_serializing_if = "Option::is_none")]
    pub cross_origin_location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_login_page_on: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_login_page: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_login_page_preview: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_template: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub addons: Option<Map<String, Value>>,

    /// `none`, `client_secret_post` or `client_secret_basic`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint_auth_method: Option<String>,

    /// String-valued metadata. A `null` value removes the key on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_metadata: Option<Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<ClientMobile>,

    /// Must be https and cannot contain a fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiate_login_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_social_login: Option<ClientNativeSocialLogin>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<ClientRefreshToken>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_usage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_require_behavior: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_authentication_methods: Option<ClientAuthenticationMethods>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_pushed_authorization_requests: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_backchannel_logout: Option<OidcBackchannelLogout>,
}

/// Mobile app settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMobile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<ClientMobileAndroid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios: Option<ClientMobileIos>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMobileAndroid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_package_name: Option<String>,
    #[serde(
        rename = "sha256_cert_fingerprints",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_hashes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMobileIos {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(
        rename = "app_bundle_identifier",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_id: Option<String>,
}

/// Native social login support per connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientNativeSocialLogin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple: Option<SupportEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<SupportEnabled>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportEnabled {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Refresh token rotation and expiry policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRefreshToken {
    /// `rotating` or `non-rotating`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_type: Option<String>,

    /// `expiring` or `non-expiring`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_type: Option<String>,

    /// Seconds during which the previous token may still be exchanged
    /// without triggering breach detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leeway: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_lifetime: Option<i64>,

    /// When false, `token_lifetime` should be set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infinite_token_lifetime: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infinite_idle_token_lifetime: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_token_lifetime: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAuthenticationMethods {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_jwt: Option<PrivateKeyJwt>,
}

/// Settings of the `private_key_jwt` authentication method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKeyJwt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<Credential>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcBackchannelLogout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backchannel_logout_urls: Option<Vec<String>>,
}

/// One page of clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClientListWire")]
pub struct ClientList {
    pub start: u64,
    pub limit: u64,
    pub length: u64,
    pub total: u64,
    /// Checkpoint for the next page, when the server paginates by checkpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub clients: Vec<Client>,
}

impl ClientList {
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
            || self.start.saturating_add(self.length) < self.total
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClientListWire {
    Page {
        #[serde(default)]
        start: u64,
        #[serde(default)]
        limit: u64,
        #[serde(default)]
        length: u64,
        #[serde(default)]
        total: u64,
        #[serde(default)]
        next: Option<String>,
        clients: Vec<Client>,
    },
    /// Returned when totals are not requested.
    Bare(Vec<Client>),
}

impl From<ClientListWire> for ClientList {
    fn from(wire: ClientListWire) -> Self {
        match wire {
            ClientListWire::Page {
                start,
                limit,
                length,
                total,
                next,
                clients,
            } => ClientList {
                start,
                limit,
                length,
                total,
                next,
                clients,
            },
            ClientListWire::Bare(clients) => ClientList {
                length: clients.len() as u64,
                clients,
                ..Default::default()
            },
        }
    }
}
