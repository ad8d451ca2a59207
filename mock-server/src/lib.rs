use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Runtime switches of the mock tenant.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// Emit `jwt_configuration.lifetime_in_seconds` as a JSON string, the way
    /// older tenants do.
    pub legacy_lifetime_strings: bool,
}

impl Config {
    /// Reads `LEGACY_LIFETIME_STRINGS` (`1` or `true` enables it).
    pub fn from_env() -> Self {
        let legacy = std::env::var("LEGACY_LIFETIME_STRINGS")
            .map(|v| matches!(v.as_str(), "1" | "true"))
            .unwrap_or(false);
        Self {
            legacy_lifetime_strings: legacy,
        }
    }
}

/// A credential as stored by the server. `pem` is never echoed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub credential_type: String,
    pub kid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(skip_serializing, default)]
    pub pem: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreateCredential {
    pub name: Option<String>,
    pub credential_type: String,
    pub pem: String,
    pub alg: Option<String>,
    pub parse_expiry_from_cert: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub include_totals: Option<bool>,
}

#[derive(Default)]
struct StoredClient {
    fields: Map<String, Value>,
    credentials: BTreeMap<String, Credential>,
}

#[derive(Clone)]
struct AppState {
    db: Arc<RwLock<HashMap<String, StoredClient>>>,
    config: Config,
}

type Failure = (StatusCode, Json<Value>);
type ApiResult<T> = Result<T, Failure>;

pub fn app() -> Router {
    app_with(Config::default())
}

pub fn app_with(config: Config) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        config,
    };
    let api = Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).patch(update_client).delete(delete_client),
        )
        .route("/clients/{id}/rotate-secret", post(rotate_secret))
        .route(
            "/clients/{id}/credentials",
            get(list_credentials).post(create_credential),
        )
        .route(
            "/clients/{id}/credentials/{credential_id}",
            get(get_credential)
                .patch(update_credential)
                .delete(delete_credential),
        );
    Router::new().nest("/api/v2", api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Config::default()).await
}

pub async fn run_with(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn failure(status: StatusCode, message: &str) -> Failure {
    let error = status.canonical_reason().unwrap_or("Error");
    (
        status,
        Json(json!({"statusCode": status.as_u16(), "error": error, "message": message})),
    )
}

fn not_found() -> Failure {
    failure(StatusCode::NOT_FOUND, "The client does not exist")
}

fn new_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Numbers only: the server itself never accepts the legacy string form.
fn validate_jwt_configuration(fields: &Map<String, Value>) -> ApiResult<()> {
    match fields
        .get("jwt_configuration")
        .and_then(|jwt| jwt.get("lifetime_in_seconds"))
    {
        None | Some(Value::Number(_)) => Ok(()),
        Some(_) => Err(failure(
            StatusCode::BAD_REQUEST,
            "jwt_configuration.lifetime_in_seconds must be an integer",
        )),
    }
}

fn render(fields: &Map<String, Value>, config: Config) -> Value {
    let mut fields = fields.clone();
    if config.legacy_lifetime_strings {
        let legacy = fields
            .get("jwt_configuration")
            .and_then(|jwt| jwt.get("lifetime_in_seconds"))
            .and_then(|lifetime| match lifetime {
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        if let Some(text) = legacy {
            fields["jwt_configuration"]["lifetime_in_seconds"] = Value::String(text);
        }
    }
    Value::Object(fields)
}

fn into_object(body: Value) -> ApiResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(failure(StatusCode::BAD_REQUEST, "Payload must be an object")),
    }
}

async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let db = state.db.read().await;
    let mut ids: Vec<&String> = db.keys().collect();
    ids.sort();

    let per_page = params.per_page.unwrap_or(50).max(1);
    let start = params.page.unwrap_or(0).saturating_mul(per_page);
    let clients: Vec<Value> = ids
        .iter()
        .skip(start)
        .take(per_page)
        .map(|id| render(&db[*id].fields, state.config))
        .collect();

    if params.include_totals.unwrap_or(false) {
        Json(json!({
            "start": start,
            "limit": per_page,
            "length": clients.len(),
            "total": ids.len(),
            "clients": clients,
        }))
    } else {
        Json(Value::Array(clients))
    }
}

async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut fields = into_object(body)?;
    if !fields.get("name").is_some_and(Value::is_string) {
        return Err(failure(StatusCode::BAD_REQUEST, "Missing required property: name"));
    }
    validate_jwt_configuration(&fields)?;

    let id = Uuid::new_v4().simple().to_string();
    fields.insert("client_id".to_string(), Value::String(id.clone()));
    fields.insert("client_secret".to_string(), Value::String(new_secret()));
    let rendered = render(&fields, state.config);

    log::info!("created client {id}");
    state.db.write().await.insert(
        id,
        StoredClient {
            fields,
            ..Default::default()
        },
    );
    Ok((StatusCode::CREATED, Json(rendered)))
}

async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    let client = db.get(&id).ok_or_else(not_found)?;
    Ok(Json(render(&client.fields, state.config)))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let patch = into_object(body)?;
    if patch.contains_key("client_id") {
        return Err(failure(StatusCode::BAD_REQUEST, "client_id cannot be updated"));
    }
    validate_jwt_configuration(&patch)?;

    let mut db = state.db.write().await;
    let client = db.get_mut(&id).ok_or_else(not_found)?;
    for (key, value) in patch {
        match value {
            Value::Object(changes) if key == "client_metadata" => {
                merge_metadata(&mut client.fields, changes);
            }
            value => {
                client.fields.insert(key, value);
            }
        }
    }
    log::info!("updated client {id}");
    Ok(Json(render(&client.fields, state.config)))
}

/// Keys set to `null` are removed, the rest are added or replaced.
fn merge_metadata(fields: &mut Map<String, Value>, changes: Map<String, Value>) {
    let metadata = fields
        .entry("client_metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(metadata) = metadata {
        for (key, value) in changes {
            if value.is_null() {
                metadata.remove(&key);
            } else {
                metadata.insert(key, value);
            }
        }
    }
}

async fn rotate_secret(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let client = db.get_mut(&id).ok_or_else(not_found)?;
    client
        .fields
        .insert("client_secret".to_string(), Value::String(new_secret()));
    log::info!("rotated secret of client {id}");
    Ok(Json(render(&client.fields, state.config)))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut db = state.db.write().await;
    db.remove(&id).ok_or_else(not_found)?;
    log::info!("deleted client {id}");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_credentials(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Credential>>> {
    let db = state.db.read().await;
    let client = db.get(&id).ok_or_else(not_found)?;
    Ok(Json(client.credentials.values().cloned().collect()))
}

async fn create_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateCredential>,
) -> ApiResult<(StatusCode, Json<Credential>)> {
    if input.pem.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "pem must not be empty"));
    }
    if input.parse_expiry_from_cert == Some(true) && input.expires_at.is_some() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "expires_at cannot be combined with parse_expiry_from_cert",
        ));
    }

    let mut db = state.db.write().await;
    let client = db.get_mut(&id).ok_or_else(not_found)?;
    let now = Utc::now();
    let credential = Credential {
        id: format!("cred_{}", Uuid::new_v4().simple()),
        name: input.name,
        credential_type: input.credential_type,
        kid: Uuid::new_v4().simple().to_string(),
        alg: input.alg,
        pem: input.pem,
        created_at: now,
        updated_at: now,
        expires_at: input.expires_at,
    };
    client
        .credentials
        .insert(credential.id.clone(), credential.clone());
    log::info!("created credential {} for client {id}", credential.id);
    Ok((StatusCode::CREATED, Json(credential)))
}

async fn get_credential(
    State(state): State<AppState>,
    Path((id, credential_id)): Path<(String, String)>,
) -> ApiResult<Json<Credential>> {
    let db = state.db.read().await;
    let client = db.get(&id).ok_or_else(not_found)?;
    client
        .credentials
        .get(&credential_id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

/// Only `expires_at` may change; any other property is rejected.
async fn update_credential(
    State(state): State<AppState>,
    Path((id, credential_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Credential>> {
    let mut patch = into_object(body)?;
    if let Some(key) = patch.keys().find(|k| k.as_str() != "expires_at") {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            &format!("Additional properties not allowed: {key}"),
        ));
    }
    let expires_at: Option<DateTime<Utc>> = match patch.remove("expires_at") {
        Some(raw) => serde_json::from_value(raw)
            .map_err(|_| failure(StatusCode::BAD_REQUEST, "expires_at must be a date-time"))?,
        None => None,
    };

    let mut db = state.db.write().await;
    let client = db.get_mut(&id).ok_or_else(not_found)?;
    let credential = client
        .credentials
        .get_mut(&credential_id)
        .ok_or_else(not_found)?;
    credential.expires_at = expires_at;
    credential.updated_at = Utc::now();
    log::info!("updated credential {credential_id} of client {id}");
    Ok(Json(credential.clone()))
}

async fn delete_credential(
    State(state): State<AppState>,
    Path((id, credential_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut db = state.db.write().await;
    let client = db.get_mut(&id).ok_or_else(not_found)?;
    client
        .credentials
        .remove(&credential_id)
        .ok_or_else(not_found)?;
    log::info!("deleted credential {credential_id} of client {id}");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_keeps_numeric_lifetime_by_default() {
        let fields = json!({"jwt_configuration": {"lifetime_in_seconds": 3600}});
        let rendered = render(fields.as_object().unwrap(), Config::default());
        assert_eq!(rendered, fields);
    }

    #[test]
    fn render_stringifies_lifetime_for_legacy_tenants() {
        let fields = json!({"jwt_configuration": {"lifetime_in_seconds": 3600, "alg": "RS256"}});
        let config = Config {
            legacy_lifetime_strings: true,
        };
        let rendered = render(fields.as_object().unwrap(), config);
        assert_eq!(
            rendered,
            json!({"jwt_configuration": {"lifetime_in_seconds": "3600", "alg": "RS256"}})
        );
    }

    #[test]
    fn string_lifetime_is_rejected_on_write() {
        let fields = json!({"jwt_configuration": {"lifetime_in_seconds": "3600"}});
        let err = validate_jwt_configuration(fields.as_object().unwrap()).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn credential_never_serializes_pem() {
        let now = Utc::now();
        let credential = Credential {
            id: "cred_1".to_string(),
            name: None,
            credential_type: "public_key".to_string(),
            kid: "kid".to_string(),
            alg: Some("RS256".to_string()),
            pem: "PEM".to_string(),
            created_at: now,
            updated_at: now,
            expires_at: None,
        };
        let json = serde_json::to_value(&credential).unwrap();
        assert!(json.get("pem").is_none());
        assert_eq!(json["kid"], "kid");
    }

    #[test]
    fn failure_body_matches_api_shape() {
        let (status, Json(body)) = failure(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"statusCode": 400, "error": "Bad Request", "message": "nope"})
        );
    }
}
