use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::models::dto::{
    MicroclimatePlanDto, PlanPatternDto, RemoteResponse, ThemeDto, TopicInfoDto, UserDto,
};
use crate::services::{plan_pattern, plans, topics};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

type Reply<T> = Result<(StatusCode, Json<RemoteResponse<T>>), ApiError>;

fn ok<T>(message: &str, results: Vec<T>) -> Reply<T> {
    Ok((StatusCode::OK, Json(RemoteResponse::ok(message, results))))
}

fn created<T>(message: &str, result: T) -> Reply<T> {
    Ok((StatusCode::CREATED, Json(RemoteResponse::ok(message, vec![result]))))
}

/// Decode a JSON body, reporting the path of the first offending field.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let de = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(de)
        .map_err(|e| ApiError::InvalidData(format!("Malformed request body at '{}': {}", e.path(), e.inner())))
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::InvalidData(format!("Invalid id '{}'", raw)))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plan-pattern", post(create_plan_pattern).get(list_plan_patterns))
        .route(
            "/plan-pattern/{id}",
            get(get_plan_pattern).put(update_plan_pattern).delete(delete_plan_pattern),
        )
        .route("/themes", post(create_theme).get(list_themes))
        .route("/themes/{id}/topics", get(list_topics_for_theme))
        .route("/topics", post(create_topic))
        .route("/topics/{id}", get(get_topic))
        .route("/users", post(create_user))
        .route("/microclimate-plans", post(create_microclimate_plan))
        .route("/microclimate-plans/{id}", get(get_microclimate_plan))
        .with_state(state)
}

async fn create_plan_pattern(State(state): State<AppState>, body: Bytes) -> Reply<PlanPatternDto> {
    let dto: PlanPatternDto = decode(&body)?;
    let saved = state.with_store(move |store| plan_pattern::create(store, dto)).await?;
    created("Plan pattern has been created successfully", saved)
}

async fn update_plan_pattern(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Reply<PlanPatternDto> {
    let id = parse_id(&id)?;
    let dto: PlanPatternDto = decode(&body)?;
    let saved = state.with_store(move |store| plan_pattern::update(store, id, dto)).await?;
    ok("Plan pattern has been updated successfully", vec![saved])
}

async fn delete_plan_pattern(State(state): State<AppState>, Path(id): Path<String>) -> Reply<PlanPatternDto> {
    let id = parse_id(&id)?;
    state.with_store(move |store| plan_pattern::delete(store, id)).await?;
    ok("Plan pattern has been deleted successfully", Vec::new())
}

async fn get_plan_pattern(State(state): State<AppState>, Path(id): Path<String>) -> Reply<PlanPatternDto> {
    let id = parse_id(&id)?;
    let found = state.with_store(move |store| plan_pattern::get_by_id(store, id)).await?;
    ok("Plan pattern has been found", vec![found])
}

async fn list_plan_patterns(State(state): State<AppState>) -> Reply<PlanPatternDto> {
    let all = state.with_store(|store| plan_pattern::get_all(store)).await?;
    ok("Plan patterns have been found", all)
}

async fn create_theme(State(state): State<AppState>, body: Bytes) -> Reply<ThemeDto> {
    let dto: ThemeDto = decode(&body)?;
    let saved = state.with_store(move |store| topics::create_theme(store, dto)).await?;
    created("Theme has been created successfully", saved)
}

async fn list_themes(State(state): State<AppState>) -> Reply<ThemeDto> {
    let all = state.with_store(|store| topics::list_themes(store)).await?;
    ok("Themes have been found", all)
}

async fn list_topics_for_theme(State(state): State<AppState>, Path(id): Path<String>) -> Reply<TopicInfoDto> {
    let id = parse_id(&id)?;
    let all = state.with_store(move |store| topics::list_topics_for_theme(store, id)).await?;
    ok("Topics have been found", all)
}

async fn create_topic(State(state): State<AppState>, body: Bytes) -> Reply<TopicInfoDto> {
    let dto: TopicInfoDto = decode(&body)?;
    let saved = state.with_store(move |store| topics::create_topic(store, dto)).await?;
    created("Topic has been created successfully", saved)
}

async fn get_topic(State(state): State<AppState>, Path(id): Path<String>) -> Reply<TopicInfoDto> {
    let id = parse_id(&id)?;
    let found = state.with_store(move |store| topics::get_topic(store, id)).await?;
    ok("Topic has been found", vec![found])
}

async fn create_user(State(state): State<AppState>, body: Bytes) -> Reply<UserDto> {
    let dto: UserDto = decode(&body)?;
    let saved = state.with_store(move |store| plans::create_user(store, dto)).await?;
    created("User has been created successfully", saved)
}

async fn create_microclimate_plan(State(state): State<AppState>, body: Bytes) -> Reply<MicroclimatePlanDto> {
    let dto: MicroclimatePlanDto = decode(&body)?;
    let saved = state
        .with_store(move |store| plans::create_microclimate_plan(store, dto))
        .await?;
    created("Microclimate plan has been created successfully", saved)
}

async fn get_microclimate_plan(State(state): State<AppState>, Path(id): Path<String>) -> Reply<MicroclimatePlanDto> {
    let id = parse_id(&id)?;
    let found = state.with_store(move |store| plans::get_microclimate_plan(store, id)).await?;
    ok("Microclimate plan has been found", vec![found])
}
