use super::AppState;
use crate::common::error::AppError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

const DEFAULT_QUESTION_COUNT: i64 = 5;
const MAX_QUESTION_COUNT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    pub course_title: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub topic: Option<String>,
    pub level: Option<String>,
    pub user_profile: Option<Value>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub topic: Option<String>,
    pub level: Option<String>,
    pub user_profile: Option<Value>,
    pub count: Option<Value>,
}

fn reject(err: impl Into<AppError>) -> Rejection {
    warp::reject::custom(err.into())
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, Rejection> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(reject(AppError::MissingFields(name.to_string()))),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Maps `user_profile.education_level` to a difficulty.
pub fn level_from_profile(profile: &Value) -> &'static str {
    let Some(education) = profile.get("education_level").and_then(Value::as_str) else {
        return "Intermediate";
    };
    let education = education.to_lowercase().replace('.', "");
    let tokens: Vec<&str> = education
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if education.contains("phd") || education.contains("doctorate") {
        "Advanced"
    } else if education.contains("master")
        || education.contains("bachelor")
        || tokens.iter().any(|t| matches!(*t, "be" | "btech" | "bsc" | "msc" | "mtech"))
    {
        "Intermediate"
    } else {
        "Beginner"
    }
}

/// Question count: default 5, values below 1 fall back to the default, capped at 20.
pub fn question_count(raw: Option<&Value>) -> Result<u32, AppError> {
    let requested = match raw {
        None | Some(Value::Null) => DEFAULT_QUESTION_COUNT,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(DEFAULT_QUESTION_COUNT),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidInput(format!("count must be a number, got '{}'", s)))?,
        Some(other) => {
            return Err(AppError::InvalidInput(format!("count must be a number, got {}", other)))
        }
    };
    let count = if requested < 1 {
        DEFAULT_QUESTION_COUNT
    } else {
        requested.min(MAX_QUESTION_COUNT)
    };
    Ok(count as u32)
}

pub async fn handle_generate_roadmap(
    request: RoadmapRequest,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let started = Instant::now();
    let course_title = require(&request.course_title, "course_title")?;
    let level = require(&request.level, "level")?;
    tracing::info!("Generating roadmap for course: '{}', level: '{}'", course_title, level);

    let roadmap = state
        .generator
        .roadmap(course_title, level)
        .await
        .map_err(reject)?;

    tracing::info!("Successfully generated roadmap in {:.2}s", started.elapsed().as_secs_f64());
    Ok(warp::reply::json(&roadmap))
}

pub async fn handle_generate_content(
    request: ContentRequest,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let started = Instant::now();
    let topic = require(&request.topic, "topic")?;
    let level = match (non_blank(&request.level), &request.user_profile) {
        (Some(level), _) => level.to_string(),
        (None, Some(profile)) => level_from_profile(profile).to_string(),
        (None, None) => return Err(reject(AppError::MissingFields("level".to_string()))),
    };
    let format_type = non_blank(&request.format).unwrap_or("tutorial").to_lowercase();
    tracing::info!("Generating {} content for topic: '{}', level: '{}'", format_type, topic, level);

    let body = if format_type == "markdown" {
        let content = state
            .generator
            .tutorial_markdown(topic, &level)
            .await
            .map_err(reject)?;
        let query = format!("{} tutorial", topic);
        let youtube_links = match state.videos.search(&query, state.video_results).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("Video lookup failed for '{}': {}", query, e);
                Vec::new()
            }
        };
        json!({ "content": content, "youtube_links": youtube_links })
    } else {
        state
            .generator
            .tutorial(topic, &level, &format_type)
            .await
            .map_err(reject)?
    };

    tracing::info!(
        "Successfully generated tutorial content in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(warp::reply::json(&body))
}

pub async fn handle_generate_quiz(
    request: QuizRequest,
    state: Arc<AppState>,
) -> Result<impl Reply, Rejection> {
    let started = Instant::now();
    let topic = require(&request.topic, "topic")?;
    let count = question_count(request.count.as_ref()).map_err(reject)?;
    let level = match (non_blank(&request.level), &request.user_profile) {
        (Some(level), _) => level.to_string(),
        (None, Some(profile)) => level_from_profile(profile).to_string(),
        (None, None) => "Intermediate".to_string(),
    };
    tracing::info!("Generating quiz on '{}', level: '{}', questions: {}", topic, level, count);

    let quiz = state
        .generator
        .quiz(topic, &level, count)
        .await
        .map_err(reject)?;

    tracing::info!("Successfully generated quiz in {:.2}s", started.elapsed().as_secs_f64());
    Ok(warp::reply::json(&quiz))
}

pub async fn handle_health() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    })))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, error_type, message, retry_after) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found", "Not Found".to_string(), None)
    } else if let Some(e) = err.find::<AppError>() {
        match e {
            AppError::Generation(inner) => tracing::error!("Generation failed: {}", inner),
            other => tracing::warn!("Request rejected: {}", other),
        }
        let retry_after = match e {
            AppError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };
        (e.status(), e.code(), e.message(), retry_after)
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        tracing::warn!("Body deserialization error: {}", e);
        (
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "Invalid JSON in request body".to_string(),
            None,
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Payload too large".to_string(),
            None,
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        (
            StatusCode::BAD_REQUEST,
            "invalid_json",
            "Invalid JSON in request body".to_string(),
            None,
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Method not allowed".to_string(),
            None,
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "server_error",
            "An unexpected error occurred. Please try again later.".to_string(),
            None,
        )
    };

    let mut body = json!({
        "error": error_type,
        "message": message
    });
    if let Some(seconds) = retry_after {
        body["retry_after"] = json!(seconds);
    }

    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}
