use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use friendtracker_shared::{Contact, ContactFilter, ContactPatch, NewContact};
use friendtracker_store::Database;

use crate::access::require_access_token;
use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        }
    }
}

/// Open the database selected by `config`.
pub fn open_database(config: &ServerConfig) -> friendtracker_store::Result<Database> {
    if config.is_in_memory() {
        return Database::open_in_memory();
    }
    match &config.database_path {
        Some(path) => Database::open_at(path),
        None => Database::new(),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let contacts = Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).patch(update_contact).delete(delete_contact),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .merge(contacts)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ServerInfoResponse {
    name: String,
    version: &'static str,
    access_token_required: bool,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        access_token_required: state.config.access_token.is_some(),
    })
}

async fn list_contacts(
    State(state): State<AppState>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<Contact>>, ServerError> {
    let contacts = state.db.lock().await.list_contacts(&filter)?;
    tracing::debug!(archived = ?filter.archived, count = contacts.len(), "Listed contacts");
    Ok(Json(contacts))
}

async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, ServerError> {
    let contact = state.db.lock().await.get_contact(id)?;
    Ok(Json(contact))
}

async fn create_contact(
    State(state): State<AppState>,
    Json(new_contact): Json<NewContact>,
) -> Result<(StatusCode, Json<Contact>), ServerError> {
    let contact = state.db.lock().await.insert_contact(&new_contact)?;
    info!(id = contact.id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ContactPatch>,
) -> Result<Json<Contact>, ServerError> {
    let contact = state.db.lock().await.update_contact(id, &patch)?;
    info!(id, archived = contact.archived, "Contact updated");
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.db.lock().await.delete_contact(id)?;
    info!(id, "Contact deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(state, listener).await
}

/// Serve the API on an already bound listener.
pub async fn serve_on(state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn app_with(config: ServerConfig) -> Router {
        build_router(AppState::new(Database::open_in_memory().unwrap(), config))
    }

    fn app() -> Router {
        app_with(ServerConfig::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = app_with(ServerConfig {
            access_token: Some("s3cret".into()),
            ..ServerConfig::default()
        });
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/contacts",
            Some(json!({ "name": "Ada", "birthday": null })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().unwrap() > 0);
        assert_eq!(body["archived"], false);
        assert_eq!(body["birthday"], Value::Null);

        let (_, list) = send(&app, "GET", "/contacts?archived=false", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_with_blank_name_is_bad_request() {
        let (status, body) =
            send(&app(), "POST", "/contacts", Some(json!({ "name": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Name is required"));
    }

    #[tokio::test]
    async fn archive_filter_hides_archived_rows() {
        let app = app();
        let (_, ada) = send(&app, "POST", "/contacts", Some(json!({ "name": "Ada" }))).await;
        send(&app, "POST", "/contacts", Some(json!({ "name": "Bob" }))).await;
        let id = ada["id"].as_i64().unwrap();

        let (status, archived) = send(
            &app,
            "PATCH",
            &format!("/contacts/{id}"),
            Some(json!({ "archived": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(archived["archived"], true);
        assert_eq!(archived["name"], "Ada");

        let (_, active) = send(&app, "GET", "/contacts?archived=false", None).await;
        let names: Vec<&str> = active
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Bob"]);

        let (_, all) = send(&app, "GET", "/contacts", None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn patch_merges_and_normalizes_birthday() {
        let app = app();
        let (_, ada) = send(
            &app,
            "POST",
            "/contacts",
            Some(json!({ "name": "Ada", "email": "ada@example.com" })),
        )
        .await;
        let id = ada["id"].as_i64().unwrap();

        let (status, updated) = send(
            &app,
            "PATCH",
            &format!("/contacts/{id}"),
            Some(json!({ "birthday": "1815-12-10T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["birthday"], "1815-12-10");
        assert_eq!(updated["email"], "ada@example.com");

        let (_, fetched) = send(&app, "GET", &format!("/contacts/{id}"), None).await;
        let contact: Contact = serde_json::from_value(fetched).unwrap();
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1815, 12, 10));
    }

    #[tokio::test]
    async fn missing_contact_is_not_found() {
        let app = app();
        let (status, _) = send(
            &app,
            "PATCH",
            "/contacts/999",
            Some(json!({ "name": "Nobody" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", "/contacts/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/contacts/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let app = app();
        let (_, ada) = send(&app, "POST", "/contacts", Some(json!({ "name": "Ada" }))).await;
        let id = ada["id"].as_i64().unwrap();

        let (status, _) = send(&app, "DELETE", &format!("/contacts/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, all) = send(&app, "GET", "/contacts", None).await;
        assert!(all.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn access_token_guards_contacts() {
        let app = app_with(ServerConfig {
            access_token: Some("s3cret".into()),
            ..ServerConfig::default()
        });

        let (status, body) = send(&app, "GET", "/contacts", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let request = Request::builder()
            .uri("/contacts")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
