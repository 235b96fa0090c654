// Campus Content Backend - Web Server
// REST read API with Axum: localized lists, org trees, aggregates, downloads

use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::error;

use campus_content::{
    compose, find_aggregate, get_active_records, get_primary_record, get_record_by_id,
    setup_database, AppConfig, ChildCollection, ComposeError, ContentRecord, Language,
    LanguageResolver, Localize,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    config: Arc<AppConfig>,
}

// ============================================================================
// Response Shapes
// ============================================================================

/// List endpoint envelope
#[derive(Serialize)]
struct ResultsResponse {
    results: Vec<Value>,
}

/// Error envelope for 404/500 responses
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

fn not_found(message: impl Into<String>) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message))).into_response()
}

fn storage_error(err: anyhow::Error) -> Response {
    error!("storage error: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("storage unavailable")),
    )
        .into_response()
}

// ============================================================================
// Language Extraction
// ============================================================================

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Resolve the display language for one request: explicit `lang` query
/// parameter first, then the Accept-Language header, then the configured
/// default. Every handler goes through this - nothing resolves ad hoc.
fn request_language(state: &AppState, query: &LangQuery, headers: &HeaderMap) -> Language {
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());

    LanguageResolver::new(state.config.default_language).resolve(query.lang.as_deref(), accept)
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "success": true, "version": campus_content::VERSION }))
}

/// GET /api/content/:kind - All active records of a kind, localized
async fn list_content(
    State(state): State<AppState>,
    Path(kind_token): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = campus_content::ContentKind::parse(&kind_token) else {
        return not_found(format!("unknown content kind '{kind_token}'"));
    };
    let lang = request_language(&state, &query, &headers);
    let conn = state.db.lock().unwrap();

    match get_active_records(&conn, kind) {
        Ok(records) => {
            let results = records
                .iter()
                .map(|record| Value::Object(record.localized_json(lang)))
                .collect();
            (StatusCode::OK, Json(ResultsResponse { results })).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// GET /api/content/:kind/:id - One active record, localized
async fn get_content_record(
    State(state): State<AppState>,
    Path((kind_token, id)): Path<(String, String)>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = campus_content::ContentKind::parse(&kind_token) else {
        return not_found(format!("unknown content kind '{kind_token}'"));
    };
    let lang = request_language(&state, &query, &headers);
    let conn = state.db.lock().unwrap();

    match get_record_by_id(&conn, &id) {
        Ok(Some(record)) if record.kind == kind => {
            (StatusCode::OK, Json(Value::Object(record.localized_json(lang)))).into_response()
        }
        Ok(_) => not_found(format!("no active {kind_token} record '{id}'")),
        Err(err) => storage_error(err),
    }
}

/// GET /api/tree/:kind - Nested parent/children tree for hierarchical kinds
async fn get_tree(
    State(state): State<AppState>,
    Path(kind_token): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = campus_content::ContentKind::parse(&kind_token) else {
        return not_found(format!("unknown content kind '{kind_token}'"));
    };
    if !kind.is_hierarchical() {
        return not_found(format!("content kind '{kind_token}' is not hierarchical"));
    }
    let lang = request_language(&state, &query, &headers);
    let conn = state.db.lock().unwrap();

    // One batch fetch; tree shape and ordering are built in memory
    match get_active_records(&conn, kind) {
        Ok(records) => {
            let trees = campus_content::assemble(records);
            let json = campus_content::localized_tree_json(&trees, lang);
            (StatusCode::OK, Json(Value::Array(json))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// GET /api/aggregate/:name - One primary record plus gated child collections
async fn get_aggregate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(def) = find_aggregate(&name) else {
        return not_found(format!("unknown aggregate '{name}'"));
    };
    let lang = request_language(&state, &query, &headers);
    let conn = state.db.lock().unwrap();

    let primary = match get_primary_record(&conn, def.primary) {
        Ok(primary) => primary,
        Err(err) => return storage_error(err),
    };

    // Gates come off the primary's flags, uniformly per child spec;
    // disabled collections are never fetched
    let mut children = Vec::with_capacity(def.children.len());
    if let Some(primary) = &primary {
        for spec in def.children {
            let enabled = primary.flags.enabled(spec.flag);
            let records = if enabled {
                match get_active_records(&conn, spec.kind) {
                    Ok(records) => records,
                    Err(err) => return storage_error(err),
                }
            } else {
                Vec::new()
            };
            children.push(ChildCollection::new(spec.name, enabled, records));
        }
    }

    match compose(&name, primary.as_ref(), children, lang) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err @ ComposeError::PrimaryNotFound { .. }) => not_found(err.to_string()),
    }
}

// ============================================================================
// File Downloads
// ============================================================================

/// Download filename: canonical record name plus the stored file's
/// extension, falling back to the record id for nameless records.
fn derived_filename(record: &ContentRecord, file_path: &str) -> String {
    let name = record.canonical_name().trim();
    let stem = if name.is_empty() {
        record.id.clone()
    } else {
        name.replace(char::is_whitespace, "_")
    };

    match FsPath::new(file_path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// GET /api/files/:id - Stream a downloadable record's media file
async fn download_file(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    // Decode URL-encoded id
    let id = urlencoding::decode(&raw_id)
        .unwrap_or_else(|_| raw_id.clone().into())
        .into_owned();

    let (record, path) = {
        let conn = state.db.lock().unwrap();
        let record = match get_record_by_id(&conn, &id) {
            Ok(Some(record)) if record.kind.is_downloadable() => record,
            Ok(_) => return not_found(format!("no downloadable record '{id}'")),
            Err(err) => return storage_error(err),
        };
        let Some(file_path) = record.file_path.clone() else {
            return not_found(format!("record '{id}' has no file attached"));
        };
        let path: PathBuf = state.config.media_dir.join(&file_path);
        (record, path)
    };

    let file_path = record.file_path.as_deref().unwrap_or_default();
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(_) => return not_found(format!("file for record '{id}' is missing")),
    };

    let filename = derived_filename(&record, file_path);
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&filename)
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let config_path = std::env::var_os("CAMPUS_CONTENT_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).expect("Failed to load configuration");

    println!("🌐 Campus Content Backend - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = Connection::open(&config.database_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to initialize database");
    println!("✓ Database opened: {:?}", config.database_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        config: Arc::new(config.clone()),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/content/:kind", get(list_content))
        .route("/content/:kind/:id", get(get_content_record))
        .route("/tree/:kind", get(get_tree))
        .route("/aggregate/:name", get(get_aggregate))
        .route("/files/:id", get(download_file))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   Lists:      /api/content/partner?lang=en");
    println!("   Trees:      /api/tree/org-unit");
    println!("   Aggregates: /api/aggregate/about");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
