use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::calendar::MonthCalendar;
use crate::generator::{LessonPlanGenerator, DOWNLOAD_PREFIX};
use crate::html;
use crate::types::{GenerateResponse, LessonRequest, MonthValueRequest, MonthValueResponse};

/// Application state shared across requests
pub struct AppState {
    pub generator: LessonPlanGenerator,
    pub calendar: MonthCalendar,
}

pub fn router(state: Arc<AppState>) -> Router {
    let downloads = ServeDir::new(state.generator.output_dir());

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(|| async { "OK" }))
        .route("/api/get-month-value", post(month_value_handler))
        .route("/api/generate-lesson-plan", post(generate_handler))
        .nest_service(DOWNLOAD_PREFIX, downloads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        url = %format!("http://{}", listener.local_addr()?),
        output = %state.generator.output_dir().display(),
        "Server running"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the lesson plan form
async fn index_handler() -> Html<String> {
    Html(html::render_page().into_string())
}

/// Look up the value of the month for a date
async fn month_value_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MonthValueRequest>, JsonRejection>,
) -> (StatusCode, Json<MonthValueResponse>) {
    let date = match body {
        Ok(Json(body)) => body.date,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(MonthValueResponse::Error {
                    error: rejection.body_text(),
                }),
            )
        }
    };

    match state.calendar.value_for(&date) {
        Ok(value) => (
            StatusCode::OK,
            Json(MonthValueResponse::Value {
                value: value.to_string(),
            }),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(MonthValueResponse::Error {
                error: e.to_string(),
            }),
        ),
    }
}

/// Run the generation pipeline for a submitted form
async fn generate_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LessonRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    if let Err(e) = request.validate() {
        warn!(error = %e, "Rejected lesson plan request");
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    info!(
        grade = %request.grade,
        subject = %request.subject,
        topic = %request.topic,
        "Generating lesson plan"
    );
    let response = state.generator.generate_complete_package(&request).await;
    let status = match response {
        GenerateResponse::Success { .. } => StatusCode::OK,
        GenerateResponse::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(response)).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(GenerateResponse::Error { message })).into_response()
}
