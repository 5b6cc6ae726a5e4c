use super::handlers::{
    handle_generate_content, handle_generate_quiz, handle_generate_roadmap, handle_health,
    handle_rejection,
};
use super::middleware::{json_body, rate_limited};
use super::rate_limit::RateLimiter;
use super::AppState;
use std::sync::Arc;
use warp::Filter;

pub fn create_routes(
    state: Arc<AppState>,
    limiter: Arc<dyn RateLimiter>,
) -> impl warp::Filter<Extract = impl warp::Reply> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let roadmap = warp::path!("api" / "generate-roadmap")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(handle_generate_roadmap);

    let content = warp::path!("api" / "generate-content")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(handle_generate_content);

    let quiz = warp::path!("api" / "generate-quiz")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(handle_generate_quiz);

    let health = warp::path!("health").and(warp::get()).and_then(handle_health);

    rate_limited(limiter)
        .and(roadmap.or(content).or(quiz).or(health))
        .recover(handle_rejection)
        .with(warp::trace::request())
}
