//! Report Forge - LLM report extraction, preview and deployment server.

mod config;
mod contract;
mod defaults;
mod deploy;
mod error;
mod extractor;
mod literal;
mod openrouter;
mod payload;
mod retry;
mod schema;
mod shape;
mod theme;

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use config::ServiceConfig;
use deploy::template::TemplateBundle;
use deploy::{project_name, VercelClient};
use error::ApiError;
use extractor::{ExtractRequest, ExtractionService};
use openrouter::OpenRouterClient;
use serde_json::{json, Value};
use std::sync::Arc;
use theme::ReportTheme;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<ServiceConfig>,
    /// Absent when no LLM API key is configured.
    extractor: Option<ExtractionService>,
    /// Absent when no deploy token is configured.
    deployer: Option<VercelClient>,
}

impl AppState {
    fn from_config(config: ServiceConfig) -> Self {
        let extractor = match OpenRouterClient::from_config(&config) {
            Ok(client) => {
                info!("OpenRouter client initialized (model={})", config.model);
                Some(ExtractionService::new(Arc::new(client)))
            }
            Err(e) => {
                warn!("Extraction disabled: {e}");
                None
            }
        };
        let deployer = match VercelClient::from_config(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Deployment disabled: {e}");
                None
            }
        };
        Self {
            config: Arc::new(config),
            extractor,
            deployer,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "report_forge=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load()?;
    info!("Configuration: {:?}", config);

    let bind_addr = config.bind_addr.clone();
    let app = router(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/defaults", get(get_defaults))
        .route("/api/theme", get(get_theme))
        .route("/api/extract", post(extract_report))
        .route("/api/preview", post(preview_report))
        .route("/api/deploy", post(deploy_report))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The fallback report every extraction is merged onto.
async fn get_defaults() -> Json<Value> {
    Json(defaults::defaults_value().clone())
}

#[derive(serde::Deserialize)]
struct ThemeQuery {
    theme: Option<String>,
}

/// Palette for a report theme: page tokens, the item cycle and item colors.
/// Unknown or missing themes resolve to food.
async fn get_theme(Query(query): Query<ThemeQuery>) -> Json<Value> {
    let token = query.theme.as_deref().unwrap_or_default();
    let report_theme = ReportTheme::from_token(token).unwrap_or_default();

    let items: serde_json::Map<String, Value> = theme::ITEM_THEME_TOKENS
        .iter()
        .map(|token| {
            let entry = json!({
                "colors": theme::item_theme_colors(token),
                "highlight": theme::highlight_class(token),
            });
            (token.to_string(), entry)
        })
        .collect();

    Json(json!({
        "theme": report_theme.as_str(),
        "category": theme::category_theme_for(token),
        "cycle": report_theme.cycle().map(|t| t.as_str()),
        "links": report_theme.link_colors(),
        "items": items,
    }))
}

/// Extract a report from free text and return it as a data module.
async fn extract_report(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let service = state
        .extractor
        .as_ref()
        .ok_or_else(|| ApiError::misconfigured("OPENROUTER_API_KEY"))?;

    let request = ExtractRequest::from_body(&body)?;
    let extraction = service.extract(&request).await?;

    Ok(Json(json!({
        "success": true,
        "dataTs": extraction.data_ts,
        "requestId": extraction.request_id,
        "contentHash": extraction.content_hash,
        "violations": extraction.violations,
    })))
}

fn data_ts_field(body: &Value) -> Option<&str> {
    body.get("dataTs")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Parse a data module into the complete report the dashboard would render.
async fn preview_report(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let data_ts = data_ts_field(&body).ok_or_else(|| ApiError::bad_request("Missing required field: dataTs"))?;

    let report = payload::parse_report(data_ts).map_err(|e| ApiError::from(e).with_raw(data_ts))?;
    let violations = schema::validate(&report);

    Ok(Json(json!({
        "success": true,
        "data": report,
        "violations": violations,
    })))
}

/// Deploy a data module with the dashboard template.
async fn deploy_report(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (Some(data_ts), Some(metadata)) = (data_ts_field(&body), body.get("metadata").filter(|m| m.is_object())) else {
        return Err(ApiError::bad_request("Missing required fields: dataTs, metadata"));
    };
    let handle = metadata
        .get("handle")
        .and_then(Value::as_str)
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required metadata field: handle"))?;

    let deployer = state
        .deployer
        .as_ref()
        .ok_or_else(|| ApiError::misconfigured("VERCEL_DEPLOY_TOKEN"))?;

    // Never ship a data module the dashboard could not load: the deployed
    // module is the merged report, not the request text.
    let report = payload::parse_report(data_ts).map_err(|e| ApiError::from(e).with_raw(data_ts))?;
    let data_module = payload::render_report(&report).map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Data module could not be rendered: {e}"),
        )
    })?;
    let theme = metadata
        .get("theme")
        .and_then(Value::as_str)
        .and_then(ReportTheme::from_token)
        .unwrap_or(report.report_theme);

    let project = project_name(theme, handle);
    let bundle = TemplateBundle::load(&state.config.template_dir).await?;
    let deployment = deployer
        .deploy(&project, &bundle.files(theme, &data_module))
        .await?;

    Ok(Json(json!({
        "success": true,
        "deploymentUrl": deployment.deployment_url,
        "projectName": deployment.project_name,
    })))
}
