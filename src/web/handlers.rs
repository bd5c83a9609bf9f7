use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::response::Html;
use minijinja::context;
use serde::Deserialize;
use tracing::{debug, info};

use crate::chatbot::{self, MENU_QUESTION};
use crate::error::SiteResult;
use crate::web::AppState;

type Page = SiteResult<Html<String>>;

#[derive(Debug, Deserialize)]
pub struct EventDetailQuery {
    pub title: Option<String>,
    pub date: Option<String>,
    pub des: Option<String>,
    pub image: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClubDetailQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatbotForm {
    /// A missing field is treated like an empty selection.
    #[serde(default)]
    pub user_input: String,
}

pub async fn index(State(state): State<Arc<AppState>>) -> Page {
    let posts_dict = state.posts.event_posts().await?;
    let html = state
        .templates
        .render("dashboard.html", context! { posts_dict })?;
    Ok(Html(html))
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Page {
    Ok(Html(state.templates.render("dashboard.html", context! {})?))
}

pub async fn events(State(state): State<Arc<AppState>>) -> Page {
    Ok(Html(state.templates.render("events.html", context! {})?))
}

pub async fn events_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Page {
    let posts_dict = state.posts.event_posts().await?;
    let posts = posts_dict.get(&category).cloned().unwrap_or_default();
    debug!("Listing {} '{}' events", posts.len(), category);

    let html = state.templates.render(
        "all_in_one.html",
        context! { posts_dict, posts, category },
    )?;
    Ok(Html(html))
}

/// Rendered straight from the query string; nothing is looked up.
pub async fn event_detail(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventDetailQuery>,
) -> Page {
    let html = state.templates.render(
        "eventDetails.html",
        context! {
            title => query.title,
            date => query.date,
            des => query.des,
            image => query.image,
            host => query.host,
        },
    )?;
    Ok(Html(html))
}

pub async fn clubs(State(state): State<Arc<AppState>>) -> Page {
    Ok(Html(state.templates.render("clubs.html", context! {})?))
}

pub async fn clubs_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Page {
    let posts_dict = state.posts.club_posts().await?;
    let posts = posts_dict.get(&category).cloned().unwrap_or_default();
    debug!("Listing {} '{}' clubs", posts.len(), category);

    let html = state.templates.render(
        "all_in_one_clubs.html",
        context! { posts_dict, posts, category },
    )?;
    Ok(Html(html))
}

pub async fn club_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClubDetailQuery>,
) -> Page {
    let posts_dict = state.posts.club_posts().await?;
    let club = query.name.as_deref().and_then(|name| {
        posts_dict
            .values()
            .flatten()
            .find(|club| club.title == name)
            .cloned()
    });
    if club.is_none() {
        debug!("No club matches {:?}", query.name);
    }

    let html = state.templates.render(
        "clubDetails.html",
        context! { name => query.name, club, posts_dict },
    )?;
    Ok(Html(html))
}

pub async fn find_location(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
) -> Page {
    let entry = state.locations.resolve(&location).await?;
    debug!("Location '{}' resolved to '{}'", location, entry.key);

    let html = state
        .templates
        .render("find_location.html", context! { location => entry })?;
    Ok(Html(html))
}

fn questionnaire() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![(MENU_QUESTION, chatbot::menu_labels())]
}

pub async fn chatbot_page(State(state): State<Arc<AppState>>) -> Page {
    let speech = chatbot::greet(state.speech.as_ref()).await?;

    let html = state.templates.render(
        "chatbot.html",
        context! {
            questionnaire => questionnaire(),
            greeting => chatbot::GREETING,
            speech => speech.data_uri(),
        },
    )?;
    Ok(Html(html))
}

pub async fn chatbot_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChatbotForm>,
) -> Page {
    let reply = chatbot::dispatch(state.speech.as_ref(), &form.user_input).await?;
    info!("Chatbot answered: {}", reply.response_text);

    let html = state.templates.render(
        "chatbot.html",
        context! {
            questionnaire => questionnaire(),
            user_input => form.user_input,
            response_text => reply.response_text,
            redirect_link => reply.redirect.as_ref().map(|r| r.href()),
            redirect_text => reply.redirect_label,
            response_audio => reply.audio.data_uri(),
        },
    )?;
    Ok(Html(html))
}
