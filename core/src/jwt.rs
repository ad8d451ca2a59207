//! JWT settings of a client, including the tolerant `lifetime_in_seconds` codec.
//!
//! # Design
//! Older tenants send `lifetime_in_seconds` as a JSON string, newer ones as a
//! number. Decoding goes through `RawJwtConfiguration`, which captures that one
//! field as an untyped `serde_json::Value` next to its typed siblings; the
//! `TryFrom` conversion applies the type switch. Encoding always emits the
//! canonical numeric form, so a legacy value is normalized on write-back.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DecodeError, MalformedFieldError};

/// Wire name of the field with two possible JSON representations.
pub const LIFETIME_IN_SECONDS: &str = "lifetime_in_seconds";

/// JWT settings of a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawJwtConfiguration")]
pub struct ClientJwtConfiguration {
    /// How long an issued JWT stays valid (drives the `exp` claim).
    pub lifetime_in_seconds: Option<i64>,

    /// Whether the client secret is base64 encoded.
    pub secret_encoded: Option<bool>,

    pub scopes: Option<BTreeMap<String, String>>,

    /// Signing algorithm, `HS256` or `RS256`.
    pub algorithm: Option<String>,
}

#[derive(Deserialize)]
struct RawJwtConfiguration {
    #[serde(default, deserialize_with = "capture_present")]
    lifetime_in_seconds: Option<Value>,
    #[serde(default)]
    secret_encoded: Option<bool>,
    #[serde(default)]
    scopes: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "alg")]
    algorithm: Option<String>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it is told apart from
/// an absent key.
fn capture_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawJwtConfiguration> for ClientJwtConfiguration {
    type Error = MalformedFieldError;

    fn try_from(raw: RawJwtConfiguration) -> Result<Self, Self::Error> {
        Ok(Self {
            lifetime_in_seconds: decode_lifetime(raw.lifetime_in_seconds.as_ref())?,
            secret_encoded: raw.secret_encoded,
            scopes: raw.scopes,
            algorithm: raw.algorithm,
        })
    }
}

impl Serialize for ClientJwtConfiguration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self).serialize(serializer)
    }
}

/// Convert the raw `lifetime_in_seconds` value.
///
/// Numbers are truncated toward zero, strings must hold a base-10 integer,
/// everything else (including `null`) is malformed. An absent value stays unset.
pub fn decode_lifetime(raw: Option<&Value>) -> Result<Option<i64>, MalformedFieldError> {
    let malformed = || MalformedFieldError {
        field: LIFETIME_IN_SECONDS,
    };
    match raw {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(malformed),
        Some(Value::String(s)) => {
            let value = s.parse::<i64>().map_err(|_| malformed())?;
            log::debug!("normalized string {LIFETIME_IN_SECONDS} {s:?} to {value}");
            Ok(Some(value))
        }
        Some(_) => Err(malformed()),
    }
}

/// Decode a raw JWT configuration object, keeping a malformed lifetime typed.
pub fn decode(raw: Value) -> Result<ClientJwtConfiguration, DecodeError> {
    let raw: RawJwtConfiguration = serde_json::from_value(raw)?;
    Ok(ClientJwtConfiguration::try_from(raw)?)
}

/// Encode a JWT configuration. Unset fields are omitted and the lifetime is
/// always a JSON number.
pub fn encode(config: &ClientJwtConfiguration) -> Value {
    let mut object = Map::new();
    if let Some(lifetime) = config.lifetime_in_seconds {
        object.insert(LIFETIME_IN_SECONDS.to_string(), Value::from(lifetime));
    }
    if let Some(secret_encoded) = config.secret_encoded {
        object.insert("secret_encoded".to_string(), Value::Bool(secret_encoded));
    }
    if let Some(scopes) = &config.scopes {
        let scopes = scopes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        object.insert("scopes".to_string(), Value::Object(scopes));
    }
    if let Some(algorithm) = &config.algorithm {
        object.insert("alg".to_string(), Value::String(algorithm.clone()));
    }
    Value::Object(object)
}
