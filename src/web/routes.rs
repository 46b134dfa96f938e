use axum::extract::{FromRequest, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::analysis::{AnalysisRequest, Comment, CommentSummary, DetailedCommentAnalysis};
use super::error::ApiError;
use super::state::AppState;

/// JSON body extractor whose rejections use the `{ error, detail }` shape.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// POST /api/comment/analyze
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalysisRequest>,
) -> Result<Json<CommentSummary>, ApiError> {
    info!("Analysis request with {} comments received", request.comments.len());

    let summary = state
        .analyzer
        .analyze_comments(&request.comments)
        .await
        .map_err(|e| ApiError::new("Error Parsing Comments", e))?;
    Ok(Json(summary))
}

/// POST /api/comment/summary
pub async fn summary(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .analyzer
        .generate_simple_summary(&request.comments)
        .await
        .map_err(|e| ApiError::new("Error Generating Summary", e))?;
    Ok(Json(json!({ "summary": summary })))
}

/// POST /api/comment/detailed
pub async fn detailed(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalysisRequest>,
) -> Json<Vec<DetailedCommentAnalysis>> {
    Json(state.analyzer.analyze_detailed(&request.comments).await)
}

/// GET /api/comment/sample
pub async fn sample() -> Json<Vec<Comment>> {
    Json(sample_comments(Utc::now()))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    timestamp: DateTime<Utc>,
    ollama: &'static str,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// GET /api/comment/health
///
/// Probes the chat backend instead of assuming it is up.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.analyzer.model().to_string();

    match state.analyzer.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                message: "API آماده است",
                timestamp: Utc::now(),
                ollama: "connected",
                model,
                detail: None,
            }),
        ),
        Err(e) => {
            warn!("Health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    message: "Ollama در دسترس نیست",
                    timestamp: Utc::now(),
                    ollama: "unreachable",
                    model,
                    detail: Some(format!("{:#}", e)),
                }),
            )
        }
    }
}

fn sample_comments(now: DateTime<Utc>) -> Vec<Comment> {
    let samples = [
        (
            "علی احمدی",
            "محصول فوق‌العاده‌ای بود. کیفیت ساخت عالی و قیمت مناسب. پیشنهاد می‌کنم حتماً بخرید.",
            5,
        ),
        (
            "مریم رضایی",
            "خوب بود اما بسته‌بندی ضعیف بود و محصول کمی آسیب دیده رسید. در کل راضی هستم.",
            4,
        ),
        (
            "حسین کریمی",
            "اصلا راضی نیستم. کیفیت پایین و قیمت بالا. ارزش خرید نداره.",
            2,
        ),
        (
            "فاطمه محمدی",
            "محصول خوبی هست. مطابق با توضیحات. ارسال سریع بود و راضی هستم.",
            5,
        ),
        (
            "رضا نوری",
            "قیمت نسبت به کیفیت مناسب نیست. انتظار بیشتری داشتم.",
            3,
        ),
        (
            "سارا حسینی",
            "عالی! بهترین خرید امسالم. کیفیت فوق‌العاده و قیمت مناسب. ممنون از فروشنده.",
            5,
        ),
    ];

    let count = samples.len() as i64;
    samples
        .into_iter()
        .zip(1..)
        .map(|((author, text, rating), id)| Comment {
            id,
            author: author.to_string(),
            text: text.to_string(),
            rating,
            created_at: now - Duration::days(count - i64::from(id)),
        })
        .collect()
}
