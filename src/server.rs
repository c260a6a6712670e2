//! HTTP surface: axum router, handlers and CORS policy

use crate::config::AppConfig;
use crate::error::{Result, ServiceError};
use crate::metrics::{MetricsReporter, PredictionMetrics};
use crate::models::inference::InferenceEngine;
use crate::types::patient::PatientFeatures;
use crate::types::prediction::PredictionReport;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<PredictionMetrics>,
    pub environment: String,
}

/// Root endpoint payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub status: String,
    pub docs: String,
}

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
}

/// Error payload for rejected or failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Build the application router with the environment-gated CORS policy
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
        .layer(cors_policy(config))
}

/// Permissive CORS in development, configured origin list in production
fn cors_policy(config: &AppConfig) -> CorsLayer {
    if config.is_production() {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| {
                        warn!(origin = %origin, "Ignoring unparsable allowed origin");
                    })
                    .ok()
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Bind the configured address and serve until the process exits
pub async fn serve(config: AppConfig, engine: Arc<InferenceEngine>) -> Result<()> {
    let metrics = Arc::new(PredictionMetrics::new());
    let state = AppState {
        engine,
        metrics: Arc::clone(&metrics),
        environment: config.environment.clone(),
    };

    let app = create_router(state, &config);

    // Periodic metrics summary while serving
    tokio::spawn(async move {
        MetricsReporter::new(metrics, 60).start().await;
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            ServiceError::Config(config::ConfigError::Message(format!(
                "invalid listen address: {}",
                e
            )))
        })?;

    info!(addr = %addr, environment = %config.environment, "Starting HeartScan API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET / - API status
async fn root_handler() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "HeartScan API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        docs: "/docs".to_string(),
    })
}

/// GET /health - monitoring probe.
///
/// A serving process always reports both artifacts loaded: a load failure
/// is fatal at startup, so this handler is unreachable without them.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: true,
        scaler_loaded: true,
        environment: state.environment.clone(),
        timestamp: Utc::now(),
    })
}

/// POST /predict - run the frozen pipeline for one patient.
///
/// Schema violations (missing/malformed fields, out-of-range values) are
/// rejected with 422 before inference; inference failures surface as a
/// generic 500 with the stringified cause.
async fn predict_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PatientFeatures>, JsonRejection>,
) -> std::result::Result<Json<PredictionReport>, (StatusCode, Json<ErrorBody>)> {
    let Json(patient) = payload.map_err(|rejection| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                detail: rejection.body_text(),
            }),
        )
    })?;

    patient.validate().map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                detail: e.to_string(),
            }),
        )
    })?;

    let start = Instant::now();
    match state.engine.predict(&patient) {
        Ok(report) => {
            state
                .metrics
                .record_prediction(start.elapsed(), report.probability, report.risk_level);
            Ok(Json(report))
        }
        Err(e) => {
            state.metrics.record_failure();
            error!(error = %e, "Prediction failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    detail: format!("Prediction failed: {}", e),
                }),
            ))
        }
    }
}
