use serde::Serialize;
use tracing::info;

use crate::error::SiteResult;
use crate::posts::EventCategory;
use crate::speech::{synthesize, SpeechClip, SpeechSynthesizer};

pub const MENU_QUESTION: &str = "What would you like to do?";

pub const GREETING: &str =
    "Hello, I am RVCE's chatbot, at your service. How can I help you today?";

pub const FALLBACK_REPLY: &str = "Sorry, I don't understand. Please try again.";

/// Older pages submitted this text for the canteen option.
const LEGACY_CANTEEN_LABEL: &str = "Find canteen";

/// A page on this site that a reply can link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Route {
    Events,
    EventsByCategory(EventCategory),
    FindLocation(&'static str),
}

impl Route {
    /// Path as mounted by the web router.
    pub fn path(&self) -> String {
        match self {
            Route::Events => "/events".to_string(),
            Route::EventsByCategory(category) => format!("/events/all_in_one/{}", category),
            Route::FindLocation(location) => format!("/find_location/{}", location),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Redirect {
    Internal(Route),
    External(&'static str),
}

impl Redirect {
    pub fn href(&self) -> String {
        match self {
            Redirect::Internal(route) => route.path(),
            Redirect::External(url) => (*url).to_string(),
        }
    }
}

/// The fixed answer for one menu option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedReply {
    pub message: &'static str,
    pub redirect: Redirect,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuOption {
    UpcomingEvents,
    OngoingEvents,
    CompletedEvents,
    EventsPage,
    OfficialWebsite,
    PlacementStatistics,
    AdminBlock,
    Canteen,
    HostelFacilities,
    Library,
    AdmissionProcess,
    Auditorium,
}

impl MenuOption {
    /// Menu order.
    pub const ALL: [MenuOption; 12] = [
        MenuOption::UpcomingEvents,
        MenuOption::OngoingEvents,
        MenuOption::CompletedEvents,
        MenuOption::EventsPage,
        MenuOption::OfficialWebsite,
        MenuOption::PlacementStatistics,
        MenuOption::AdminBlock,
        MenuOption::Canteen,
        MenuOption::HostelFacilities,
        MenuOption::Library,
        MenuOption::AdmissionProcess,
        MenuOption::Auditorium,
    ];

    /// Text shown in the menu and submitted by the form.
    pub fn label(self) -> &'static str {
        match self {
            MenuOption::UpcomingEvents => "See upcoming events",
            MenuOption::OngoingEvents => "See ongoing events",
            MenuOption::CompletedEvents => "See completed events",
            MenuOption::EventsPage => "Visit the events page",
            MenuOption::OfficialWebsite => "Visit the official RVCE website",
            MenuOption::PlacementStatistics => "Get Placement Statistics",
            MenuOption::AdminBlock => "Find the admin block",
            MenuOption::Canteen => "Find the canteen",
            MenuOption::HostelFacilities => "Enquire about hostel facilities",
            MenuOption::Library => "Find the library",
            MenuOption::AdmissionProcess => "Enquire about the admission process",
            MenuOption::Auditorium => "Find the auditorium",
        }
    }

    /// Exact, case-sensitive match against the menu labels.
    pub fn parse(input: &str) -> Option<Self> {
        if input == LEGACY_CANTEEN_LABEL {
            return Some(MenuOption::Canteen);
        }
        Self::ALL.into_iter().find(|option| option.label() == input)
    }

    pub fn canned(self) -> CannedReply {
        let (message, redirect, label) = match self {
            MenuOption::UpcomingEvents => (
                "You chose option 1: See upcoming events.",
                Redirect::Internal(Route::EventsByCategory(EventCategory::Upcoming)),
                "View upcoming events",
            ),
            MenuOption::OngoingEvents => (
                "You chose option 2: See ongoing events.",
                Redirect::Internal(Route::EventsByCategory(EventCategory::Ongoing)),
                "View ongoing events",
            ),
            MenuOption::CompletedEvents => (
                "You chose option 3: See completed events.",
                Redirect::Internal(Route::EventsByCategory(EventCategory::Completed)),
                "View completed events",
            ),
            MenuOption::EventsPage => (
                "You chose option 4: Visit the events page.",
                Redirect::Internal(Route::Events),
                "Visit the events page",
            ),
            MenuOption::OfficialWebsite => (
                "You chose option 5: Visit the official RVCE website.",
                Redirect::External("https://www.rvce.edu.in/"),
                "Visit the official RVCE website",
            ),
            MenuOption::PlacementStatistics => (
                "You chose option 6: Get Placement Statistics.",
                Redirect::External("https://rvce.edu.in/placement-statistics"),
                "Get Placement Statistics",
            ),
            MenuOption::AdminBlock => (
                "You chose option 7: Find the admin block.",
                Redirect::Internal(Route::FindLocation("admin")),
                "Find the admin block",
            ),
            MenuOption::Canteen => (
                "You chose option 8: Find canteen.",
                Redirect::Internal(Route::FindLocation("canteen")),
                "Find the canteen",
            ),
            MenuOption::HostelFacilities => (
                "You chose option 9: Enquire about hostel facilities.",
                Redirect::Internal(Route::FindLocation("hostel")),
                "Enquire about hostel facilities",
            ),
            MenuOption::Library => (
                "You chose option 10: Find the library.",
                Redirect::Internal(Route::FindLocation("library")),
                "Find the library",
            ),
            MenuOption::AdmissionProcess => (
                "You chose option 11: Enquire about the admission process.",
                Redirect::Internal(Route::FindLocation("admission")),
                "Enquire about the admission process",
            ),
            MenuOption::Auditorium => (
                "You chose option 12: Find the auditorium.",
                Redirect::Internal(Route::FindLocation("auditorium")),
                "Find the auditorium",
            ),
        };
        CannedReply {
            message,
            redirect,
            label,
        }
    }
}

/// Menu labels in display order.
pub fn menu_labels() -> Vec<&'static str> {
    MenuOption::ALL.iter().map(|o| o.label()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatbotReply {
    pub response_text: String,
    pub redirect: Option<Redirect>,
    pub redirect_label: Option<String>,
    pub audio: SpeechClip,
}

/// What gets read aloud for a reply.
pub fn spoken_reply(response_text: &str) -> String {
    format!(
        "{} Opening the link for you. \
         If not redirected automatically, please click the link below. \
         If you would like to choose another option, please select it from the dropdown menu given above.",
        response_text
    )
}

/// Answer a menu selection. Unknown input gets the fallback reply; audio is
/// synthesized for every call, fallback included.
pub async fn dispatch(synth: &dyn SpeechSynthesizer, selected: &str) -> SiteResult<ChatbotReply> {
    let option = MenuOption::parse(selected);
    info!("Chatbot selection {:?} -> {:?}", selected, option);

    let (response_text, redirect, redirect_label) = match option.map(MenuOption::canned) {
        Some(canned) => (
            canned.message,
            Some(canned.redirect),
            Some(canned.label.to_string()),
        ),
        None => (FALLBACK_REPLY, None, None),
    };

    let audio = synthesize(synth, &spoken_reply(response_text)).await?;

    Ok(ChatbotReply {
        response_text: response_text.to_string(),
        redirect,
        redirect_label,
        audio,
    })
}

pub async fn greet(synth: &dyn SpeechSynthesizer) -> SiteResult<SpeechClip> {
    synthesize(synth, GREETING).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteError;
    use crate::speech::looks_like_mp3;
    use crate::speech::testing::{FailingSynthesizer, StubSynthesizer};
    use std::collections::HashSet;

    const EXPECTED: [(&str, &str, &str, &str); 12] = [
        (
            "See upcoming events",
            "You chose option 1: See upcoming events.",
            "/events/all_in_one/upcoming",
            "View upcoming events",
        ),
        (
            "See ongoing events",
            "You chose option 2: See ongoing events.",
            "/events/all_in_one/ongoing",
            "View ongoing events",
        ),
        (
            "See completed events",
            "You chose option 3: See completed events.",
            "/events/all_in_one/completed",
            "View completed events",
        ),
        (
            "Visit the events page",
            "You chose option 4: Visit the events page.",
            "/events",
            "Visit the events page",
        ),
        (
            "Visit the official RVCE website",
            "You chose option 5: Visit the official RVCE website.",
            "https://www.rvce.edu.in/",
            "Visit the official RVCE website",
        ),
        (
            "Get Placement Statistics",
            "You chose option 6: Get Placement Statistics.",
            "https://rvce.edu.in/placement-statistics",
            "Get Placement Statistics",
        ),
        (
            "Find the admin block",
            "You chose option 7: Find the admin block.",
            "/find_location/admin",
            "Find the admin block",
        ),
        (
            "Find the canteen",
            "You chose option 8: Find canteen.",
            "/find_location/canteen",
            "Find the canteen",
        ),
        (
            "Enquire about hostel facilities",
            "You chose option 9: Enquire about hostel facilities.",
            "/find_location/hostel",
            "Enquire about hostel facilities",
        ),
        (
            "Find the library",
            "You chose option 10: Find the library.",
            "/find_location/library",
            "Find the library",
        ),
        (
            "Enquire about the admission process",
            "You chose option 11: Enquire about the admission process.",
            "/find_location/admission",
            "Enquire about the admission process",
        ),
        (
            "Find the auditorium",
            "You chose option 12: Find the auditorium.",
            "/find_location/auditorium",
            "Find the auditorium",
        ),
    ];

    #[tokio::test]
    async fn test_every_menu_option_has_its_reply() {
        let synth = StubSynthesizer::default();
        for (input, message, href, label) in EXPECTED {
            let reply = dispatch(&synth, input).await.unwrap();
            assert_eq!(reply.response_text, message);
            assert_eq!(reply.redirect.unwrap().href(), href);
            assert_eq!(reply.redirect_label.as_deref(), Some(label));
            assert!(!reply.audio.is_empty());
        }
    }

    #[tokio::test]
    async fn test_upcoming_events_scenario() {
        let synth = StubSynthesizer::default();
        let reply = dispatch(&synth, "See upcoming events").await.unwrap();

        assert_eq!(reply.response_text, "You chose option 1: See upcoming events.");
        assert_eq!(
            reply.redirect,
            Some(Redirect::Internal(Route::EventsByCategory(
                EventCategory::Upcoming
            )))
        );
        assert_eq!(reply.redirect_label.as_deref(), Some("View upcoming events"));
    }

    #[tokio::test]
    async fn test_unknown_input_falls_back_without_redirect() {
        let synth = StubSynthesizer::default();
        for input in ["gibberish", "", "see upcoming events", "SEE UPCOMING EVENTS", " Find the library"] {
            let reply = dispatch(&synth, input).await.unwrap();
            assert_eq!(reply.response_text, FALLBACK_REPLY);
            assert_eq!(reply.redirect, None);
            assert_eq!(reply.redirect_label, None);
        }
    }

    #[tokio::test]
    async fn test_speech_is_synthesized_for_every_call() {
        let synth = StubSynthesizer::default();
        dispatch(&synth, "Find the library").await.unwrap();
        let fallback = dispatch(&synth, "gibberish").await.unwrap();

        let spoken = synth.spoken();
        assert_eq!(spoken.len(), 2);
        assert!(spoken[0].starts_with("You chose option 10: Find the library. Opening the link for you."));
        assert!(spoken[1].starts_with(FALLBACK_REPLY));
        assert!(looks_like_mp3(&fallback.audio.decode().unwrap()));
    }

    #[tokio::test]
    async fn test_speech_failure_fails_the_reply() {
        let err = dispatch(&FailingSynthesizer, "Find the library")
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::ExternalService { .. }));
    }

    #[tokio::test]
    async fn test_greeting_speaks_greeting_text() {
        let synth = StubSynthesizer::default();
        let clip = greet(&synth).await.unwrap();
        assert!(!clip.is_empty());
        assert_eq!(synth.spoken(), vec![GREETING.to_string()]);
    }

    #[test]
    fn test_labels_are_unique_and_parse_back() {
        let labels: HashSet<_> = menu_labels().into_iter().collect();
        assert_eq!(labels.len(), MenuOption::ALL.len());
        for option in MenuOption::ALL {
            assert_eq!(MenuOption::parse(option.label()), Some(option));
        }
    }

    #[test]
    fn test_legacy_canteen_label_still_matches() {
        assert_eq!(MenuOption::parse("Find canteen"), Some(MenuOption::Canteen));
    }
}
