use crate::config::Config;
use crate::errors::{AppError, ErrorEnvelope, ResultExt};
use crate::llm_client::LlmClient;
use crate::metadata::CatalogKind;
use crate::models::{NutritionProfile, TipsProfile, WorkoutProfile};
use crate::prompts::{build_nutrition_prompt, build_tips_prompt, build_workout_prompt, Prompt};
use crate::response_schema::{ResponseSchema, NUTRITION_SCHEMA, TIPS_SCHEMA, WORKOUT_SCHEMA};
use crate::response_validator::validate_shape;
use crate::validation::ValidatedJson;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub const SERVICE_NAME: &str = "universe-api";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the hosted language model.
    pub llm: LlmClient,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient) -> Self {
        Self { config, llm }
    }
}

/// Welcome message pointing at the docs.
#[utoipa::path(get, path = "/", tag = "service", responses((status = 200, description = "Welcome message")))]
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Universe API: AI-generated workouts, nutrition plans and wellness tips",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
        "health": "/health"
    }))
}

/// Health check endpoint.
///
/// Returns the service status, version and current server time.
#[utoipa::path(get, path = "/health", tag = "service", responses((status = 200, description = "Service is healthy")))]
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

/// POST /api/v1/fitness/workout
///
/// Generates one training session for a validated workout profile.
#[utoipa::path(
    post,
    path = "/api/v1/fitness/workout",
    tag = "fitness",
    request_body = WorkoutProfile,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Generated workout plan", body = serde_json::Value),
        (status = 401, description = "Missing or invalid X-API-Key", body = ErrorEnvelope),
        (status = 422, description = "Invalid profile", body = ErrorEnvelope),
        (status = 500, description = "Model output unusable", body = ErrorEnvelope),
        (status = 503, description = "Model provider unavailable", body = ErrorEnvelope)
    )
)]
pub async fn generate_workout(
    State(state): State<Arc<AppState>>,
    ValidatedJson(profile): ValidatedJson<WorkoutProfile>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(
        "POST /fitness/workout - level: {:?}, goal: {:?}",
        profile.fitness_level,
        profile.primary_goal
    );
    let prompt = build_workout_prompt(&profile);
    generate(&state, prompt, &WORKOUT_SCHEMA).await
}

/// POST /api/v1/nutrition/plan
///
/// Generates a daily meal plan with weekly prep and a shopping list.
#[utoipa::path(
    post,
    path = "/api/v1/nutrition/plan",
    tag = "nutrition",
    request_body = NutritionProfile,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Generated nutrition plan", body = serde_json::Value),
        (status = 401, description = "Missing or invalid X-API-Key", body = ErrorEnvelope),
        (status = 422, description = "Invalid profile", body = ErrorEnvelope),
        (status = 500, description = "Model output unusable", body = ErrorEnvelope),
        (status = 503, description = "Model provider unavailable", body = ErrorEnvelope)
    )
)]
pub async fn generate_nutrition_plan(
    State(state): State<Arc<AppState>>,
    ValidatedJson(profile): ValidatedJson<NutritionProfile>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(
        "POST /nutrition/plan - goal: {:?}, restrictions: {}",
        profile.nutrition_goal,
        profile.dietary_restrictions.len()
    );
    let prompt = build_nutrition_prompt(&profile);
    generate(&state, prompt, &NUTRITION_SCHEMA).await
}

/// POST /api/v1/tips/generate
#[utoipa::path(
    post,
    path = "/api/v1/tips/generate",
    tag = "tips",
    request_body = TipsProfile,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Generated tips", body = serde_json::Value),
        (status = 401, description = "Missing or invalid X-API-Key", body = ErrorEnvelope),
        (status = 422, description = "Invalid profile", body = ErrorEnvelope),
        (status = 500, description = "Model output unusable", body = ErrorEnvelope),
        (status = 503, description = "Model provider unavailable", body = ErrorEnvelope)
    )
)]
pub async fn generate_tips(
    State(state): State<Arc<AppState>>,
    ValidatedJson(profile): ValidatedJson<TipsProfile>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(
        "POST /tips/generate - domain: {:?}, format: {:?}",
        profile.domain,
        profile.format_preference
    );
    let prompt = build_tips_prompt(&profile);
    generate(&state, prompt, &TIPS_SCHEMA).await
}

/// Runs one generation inside a span tagged with a fresh request id.
async fn generate(
    state: &AppState,
    prompt: Prompt,
    schema: &'static ResponseSchema,
) -> Result<Json<Value>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generation", %request_id, domain = schema.domain);
    run_generation(state, prompt, schema).instrument(span).await
}

async fn run_generation(
    state: &AppState,
    prompt: Prompt,
    schema: &'static ResponseSchema,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Generating {} (prompt {})", schema.domain, prompt.fingerprint());

    let reply = state
        .llm
        .invoke(&prompt, schema.invoke_options())
        .await
        .context(format!("Failed to generate {}", schema.domain))?;

    let attempts = reply.attempts();
    let reply = validate_shape(reply, schema)?;

    tracing::info!("✓ Generated {} in {} attempt(s)", schema.domain, attempts);
    Ok(Json(reply.into_value()))
}

// ============ Metadata ============

fn catalog_response(kind: CatalogKind) -> Json<Value> {
    tracing::debug!("Serving {} catalog", kind.list_name());
    Json(kind.to_json())
}

macro_rules! catalog_handler {
    ($name:ident, $path:literal, $kind:expr) => {
        #[utoipa::path(
            get,
            path = $path,
            tag = "metadata",
            responses((status = 200, description = "Option list", body = serde_json::Value))
        )]
        pub async fn $name() -> Json<Value> {
            catalog_response($kind)
        }
    };
}

catalog_handler!(fitness_levels, "/api/v1/metadata/fitness/fitness-levels", CatalogKind::FitnessLevels);
catalog_handler!(fitness_equipment, "/api/v1/metadata/fitness/equipment", CatalogKind::Equipment);
catalog_handler!(fitness_goals, "/api/v1/metadata/fitness/goals", CatalogKind::FitnessGoals);
catalog_handler!(
    dietary_preferences,
    "/api/v1/metadata/nutrition/dietary-preferences",
    CatalogKind::DietaryPreferences
);
catalog_handler!(
    activity_levels,
    "/api/v1/metadata/nutrition/activity-levels",
    CatalogKind::ActivityLevels
);
catalog_handler!(nutrition_goals, "/api/v1/metadata/nutrition/goals", CatalogKind::NutritionGoals);
catalog_handler!(
    tips_fitness_levels,
    "/api/v1/metadata/tips/fitness-levels",
    CatalogKind::FitnessLevels
);
catalog_handler!(tips_challenges, "/api/v1/metadata/tips/challenges", CatalogKind::Challenges);
catalog_handler!(tips_activities, "/api/v1/metadata/tips/activities", CatalogKind::Activities);
catalog_handler!(
    tips_health_conditions,
    "/api/v1/metadata/tips/health-conditions",
    CatalogKind::HealthConditions
);
catalog_handler!(tips_domains, "/api/v1/metadata/tips/domains", CatalogKind::TipsDomains);
catalog_handler!(tips_formats, "/api/v1/metadata/tips/formats", CatalogKind::TipsFormats);
