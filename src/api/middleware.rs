use super::rate_limit::RateLimiter;
use crate::common::error::AppError;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Client identity for rate limiting: the remote IP.
pub fn client_id() -> impl Filter<Extract = (String,), Error = std::convert::Infallible> + Clone {
    warp::addr::remote().map(|addr: Option<SocketAddr>| {
        addr.map(|a| a.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

pub fn rate_limited(
    limiter: Arc<dyn RateLimiter>,
) -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    client_id()
        .and(warp::any().map(move || limiter.clone()))
        .and_then(|client: String, limiter: Arc<dyn RateLimiter>| async move {
            limiter
                .check(&client)
                .await
                .map_err(|e| warp::reject::custom(AppError::RateLimited { retry_after: e.retry_after }))
        })
        .untuple_one()
}
