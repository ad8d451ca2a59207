//! Signing credentials attached to a client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client credential: a public key or certificate used for
/// `private_key_jwt` authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Key identifier.
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,

    /// PEM-formatted public key or X509 certificate. Never echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pem: Option<String>,

    #[serde(rename = "alg", skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Ask the server to take the expiry from the certificate in `pem`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_expiry_from_cert: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// The body of an update request. The API only accepts `expires_at`.
    pub fn expiry_patch(&self) -> Credential {
        Credential {
            expires_at: self.expires_at,
            ..Default::default()
        }
    }

    /// Overwrite the fields the server echoes after an update.
    ///
    /// `pem` and `parse_expiry_from_cert` are never returned, so they keep
    /// whatever the caller submitted.
    pub fn refresh_from(&mut self, echoed: Credential) {
        self.id = echoed.id;
        self.name = echoed.name;
        self.credential_type = echoed.credential_type;
        self.key_id = echoed.key_id;
        self.algorithm = echoed.algorithm;
        self.created_at = echoed.created_at;
        self.updated_at = echoed.updated_at;
        self.expires_at = echoed.expires_at;
    }
}
