use minijinja::Environment;
use serde::Serialize;

use crate::error::SiteResult;

// Templates are compiled into the binary.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("events.html", include_str!("../../templates/events.html")),
    ("all_in_one.html", include_str!("../../templates/all_in_one.html")),
    ("eventDetails.html", include_str!("../../templates/eventDetails.html")),
    ("clubs.html", include_str!("../../templates/clubs.html")),
    (
        "all_in_one_clubs.html",
        include_str!("../../templates/all_in_one_clubs.html"),
    ),
    ("clubDetails.html", include_str!("../../templates/clubDetails.html")),
    ("find_location.html", include_str!("../../templates/find_location.html")),
    ("chatbot.html", include_str!("../../templates/chatbot.html")),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> SiteResult<String> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}
