use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use school_scheduler::api::router;
use school_scheduler::boundary;
use school_scheduler::clock::SystemClock;
use school_scheduler::config::AppConfig;
use school_scheduler::scheduling::{
    HttpSchedulingRequestClient, NoopSchedulingRequestClient, SchedulingRequestClient,
};
use school_scheduler::services::{CourseService, Notifier, forward_to_log};
use school_scheduler::state::AppState;
use school_scheduler::store::InMemoryCourseStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new_from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "school_scheduler=debug,notifications=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = match &config.seed_path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            let courses = boundary::courses_from_json(&raw, config.utc_offset)?;
            info!("loaded {} course(s) from {}", courses.len(), path.display());
            InMemoryCourseStore::with_courses(courses)
        }
        None => InMemoryCourseStore::new(),
    };

    let scheduling: Arc<dyn SchedulingRequestClient> = match &config.scheduling_api_url {
        Some(url) => {
            info!("scheduling requests go to {}", url);
            Arc::new(HttpSchedulingRequestClient::new(url.clone())?)
        }
        None => {
            info!("SCHEDULING_API_URL not set; scheduling requests are accepted locally");
            Arc::new(NoopSchedulingRequestClient)
        }
    };

    let (notifier, notifications) = Notifier::channel();
    tokio::spawn(forward_to_log(notifications));

    let courses = CourseService::new(Arc::new(store), scheduling, notifier, config.grade_policy);
    let state = AppState {
        courses: Arc::new(courses),
        clock: Arc::new(SystemClock::new(config.utc_offset)),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
