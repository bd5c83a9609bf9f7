pub mod handlers;
pub mod templates;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::locations::LocationDirectory;
use crate::posts::PostRepository;
use crate::speech::SpeechSynthesizer;
use crate::web::templates::Templates;

/// Everything a request handler needs. Built once at startup and shared
/// read-only between requests.
pub struct AppState {
    pub posts: PostRepository,
    pub locations: LocationDirectory,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub templates: Templates,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/dashboard", get(handlers::dashboard))
        .route("/events", get(handlers::events))
        .route("/events/all_in_one/{category}", get(handlers::events_by_category))
        .route("/eventDetail", get(handlers::event_detail))
        .route("/clubs", get(handlers::clubs))
        .route(
            "/clubs/all_in_one_clubs/{category}",
            get(handlers::clubs_by_category),
        )
        .route("/clubDetails", get(handlers::club_details))
        .route("/find_location/{location}", get(handlers::find_location))
        .route(
            "/chatbot",
            get(handlers::chatbot_page).post(handlers::chatbot_submit),
        )
        .with_state(state)
}
