use course_gen::api::rate_limit::SlidingWindowLimiter;
use course_gen::api::routes::create_routes;
use course_gen::api::AppState;
use course_gen::config::Config;
use course_gen::core::retry::RetryPolicy;
use course_gen::provider::{GeminiClient, NoVideoSearch, VideoSearch, YouTubeClient};
use course_gen::CourseGenerator;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    let provider = Arc::new(GeminiClient::new(&config.provider).map_err(|e| {
        tracing::error!("Cannot create generation client: {}", e);
        e
    })?);

    let videos: Arc<dyn VideoSearch> = match YouTubeClient::new(&config.videos) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!("Video lookup disabled: {}", e);
            Arc::new(NoVideoSearch)
        }
    };

    let generator = CourseGenerator::new(provider, RetryPolicy::from(&config.retry))
        .with_code_example_limit(config.content.max_code_example_len);

    let state = Arc::new(AppState {
        generator,
        videos,
        video_results: config.videos.max_results,
    });
    let limiter = Arc::new(SlidingWindowLimiter::from(&config.rate_limit));

    let routes = create_routes(state, limiter);

    tracing::info!("Server listening on http://{}:{}", config.server.host, config.server.port);
    warp::serve(routes)
        .run((config.server.host, config.server.port))
        .await;

    Ok(())
}
