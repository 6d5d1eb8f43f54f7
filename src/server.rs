//! Router assembly and the OpenAPI document.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_api_key;
use crate::errors::ErrorEnvelope;
use crate::handlers::{self, AppState};
use crate::models::{
    ActivityLevel, AgeRange, Complexity, DietaryRestriction, Equipment, FitnessGoal, FitnessLevel,
    Gender, NutritionGoal, NutritionProfile, TipsDomain, TipsFormat, TipsProfile, WorkoutProfile,
};
use crate::validation::FieldIssue;

/// Profiles are small; anything above this is rejected before parsing.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Universe API",
        description = "AI-generated workout plans, nutrition plans and wellness tips"
    ),
    paths(
        handlers::root,
        handlers::health,
        handlers::generate_workout,
        handlers::generate_nutrition_plan,
        handlers::generate_tips,
        handlers::fitness_levels,
        handlers::fitness_equipment,
        handlers::fitness_goals,
        handlers::dietary_preferences,
        handlers::activity_levels,
        handlers::nutrition_goals,
        handlers::tips_fitness_levels,
        handlers::tips_challenges,
        handlers::tips_activities,
        handlers::tips_health_conditions,
        handlers::tips_domains,
        handlers::tips_formats,
    ),
    components(schemas(
        WorkoutProfile,
        NutritionProfile,
        TipsProfile,
        Gender,
        FitnessLevel,
        FitnessGoal,
        Equipment,
        ActivityLevel,
        NutritionGoal,
        DietaryRestriction,
        TipsDomain,
        TipsFormat,
        Complexity,
        AgeRange,
        ErrorEnvelope,
        FieldIssue,
    )),
    modifiers(&ApiKeyScheme),
    tags(
        (name = "service", description = "Liveness and welcome"),
        (name = "fitness", description = "Workout generation"),
        (name = "nutrition", description = "Meal plan generation"),
        (name = "tips", description = "Wellness tips generation"),
        (name = "metadata", description = "Option catalogs for client forms")
    )
)]
pub struct ApiDoc;

struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// Generation endpoints, gated by the shared-secret check.
fn generation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/fitness/workout", post(handlers::generate_workout))
        .route("/api/v1/nutrition/plan", post(handlers::generate_nutrition_plan))
        .route("/api/v1/tips/generate", post(handlers::generate_tips))
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}

fn metadata_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/metadata/fitness/fitness-levels", get(handlers::fitness_levels))
        .route("/api/v1/metadata/fitness/equipment", get(handlers::fitness_equipment))
        .route("/api/v1/metadata/fitness/goals", get(handlers::fitness_goals))
        .route(
            "/api/v1/metadata/nutrition/dietary-preferences",
            get(handlers::dietary_preferences),
        )
        .route(
            "/api/v1/metadata/nutrition/activity-levels",
            get(handlers::activity_levels),
        )
        .route("/api/v1/metadata/nutrition/goals", get(handlers::nutrition_goals))
        .route(
            "/api/v1/metadata/tips/fitness-levels",
            get(handlers::tips_fitness_levels),
        )
        .route("/api/v1/metadata/tips/challenges", get(handlers::tips_challenges))
        .route("/api/v1/metadata/tips/activities", get(handlers::tips_activities))
        .route(
            "/api/v1/metadata/tips/health-conditions",
            get(handlers::tips_health_conditions),
        )
        .route("/api/v1/metadata/tips/domains", get(handlers::tips_domains))
        .route("/api/v1/metadata/tips/formats", get(handlers::tips_formats))
}

fn assemble(state: Arc<AppState>, generation: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(metadata_routes())
        .merge(generation)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Full application router without rate limiting.
pub fn build_router(state: Arc<AppState>) -> Router {
    let generation = generation_routes(state.clone());
    assemble(state, generation)
}

/// Same as [`build_router`] with a per-IP limit on the generation routes.
///
/// The client IP comes from forwarding headers or the peer address, so the
/// router must be served with connect info.
pub fn build_rate_limited_router(
    state: Arc<AppState>,
    per_second: u64,
    burst_size: u32,
) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit: {}/s, burst {}", per_second, burst_size))?,
    );

    let generation = generation_routes(state.clone()).layer(ServiceBuilder::new().layer(GovernorLayer {
        config: governor_conf,
    }));

    Ok(assemble(state, generation))
}
