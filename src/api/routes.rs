use base64::{engine::general_purpose::STANDARD, Engine as _};
use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
    http::header,
    response::{Html, IntoResponse},
};
use tower_http::cors::{CorsLayer, Any};
use chrono::Utc;
use tracing::{info, warn, error};

use crate::error::{Result, AppError};
use crate::api::models::{
    DocumentInfo, ExportRequest, GenerateRequest, OptionsResponse, RecipeResponse, SliderBounds,
};
use crate::api::response;
use crate::export::export_pdf;
use crate::llm::call_completion;
use crate::markdown;
use crate::prompt;
use crate::recipe::{
    DietaryTag, Language, COOK_TIME_RANGE, DEFAULT_COOK_TIME, DEFAULT_PREP_TIME, PREP_TIME_RANGE,
};
use crate::sections::classify;
use crate::share;
use crate::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/recipe", post(recipe_handler))
        .route("/api/recipe/pdf", post(pdf_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn options_handler() -> impl IntoResponse {
    response::success(OptionsResponse {
        dietary_tags: DietaryTag::ALL.to_vec(),
        languages: Language::ALL.to_vec(),
        prep_time: SliderBounds {
            min: PREP_TIME_RANGE.0,
            max: PREP_TIME_RANGE.1,
            default: DEFAULT_PREP_TIME,
        },
        cook_time: SliderBounds {
            min: COOK_TIME_RANGE.0,
            max: COOK_TIME_RANGE.1,
            default: DEFAULT_COOK_TIME,
        },
    })
}

async fn recipe_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    info!(craving = %req.recipe.craving, language = req.recipe.language.name(), "processing recipe request");
    let start_time = std::time::Instant::now();

    let result = tokio::time::timeout(
        state.config.request_timeout,
        process_recipe_request(&state, &req),
    )
    .await
    .unwrap_or(Err(AppError::Timeout));

    let elapsed = start_time.elapsed();
    match result {
        Ok(response_data) => {
            info!(?elapsed, pages = response_data.document.page_count, "recipe ready");
            response::success(response_data)
        }
        Err(err) => {
            if err.is_warning() {
                warn!("{}", err);
            } else {
                error!(?elapsed, "{}", err);
            }
            response::failure(&err)
        }
    }
}

/// Runs the whole pipeline. Nothing downstream of a failing stage is
/// produced.
async fn process_recipe_request(state: &AppState, req: &GenerateRequest) -> Result<RecipeResponse> {
    let recipe_req = &req.recipe;
    recipe_req.validate()?;

    let prompts = prompt::compose(recipe_req);
    let llm_start = std::time::Instant::now();
    let recipe = call_completion(&state.http, &state.config.llm, &prompts).await?;
    info!(elapsed = ?llm_start.elapsed(), chars = recipe.len(), "completion received");

    let sections = classify(&recipe, recipe_req.language);
    let document = export_pdf(
        &recipe,
        req.export_style,
        recipe_req.language,
        &state.config.export_dir,
    )?;
    let share_links = share::build(&recipe, req.share_mode);

    Ok(RecipeResponse {
        recipe_html: markdown::to_html(&recipe),
        recipe,
        sections,
        document: DocumentInfo {
            file_name: document.file_name.to_string(),
            page_count: document.page_count,
            replaced_chars: document.replaced_chars,
            content_base64: STANDARD.encode(&document.bytes),
        },
        share_links,
        language: recipe_req.language,
        generated_at: Utc::now(),
    })
}

/// Re-exports posted recipe text as a PDF download. The generate endpoint
/// already returns the document of its own completion; this serves clients
/// that edited or kept the text and want a fresh export.
async fn pdf_handler(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<impl IntoResponse> {
    if req.recipe.trim().is_empty() {
        return Err(AppError::Validation("recipe text is empty".to_string()));
    }

    let document = export_pdf(&req.recipe, req.export_style, req.language, &state.config.export_dir)?;
    info!(pages = document.page_count, bytes = document.bytes.len(), "serving recipe document");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.bytes,
    ))
}
