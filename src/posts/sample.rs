//! Built-in posts served when the document store is disabled.

use std::collections::BTreeMap;

use super::{EventCategory, PostRecord, PostsByCategory};

fn post(
    title: &str,
    date: &str,
    description: &str,
    image: &str,
    host: &str,
    category: &str,
) -> PostRecord {
    PostRecord {
        title: title.to_string(),
        date: Some(date.to_string()),
        description: Some(description.to_string()),
        image: Some(image.to_string()),
        host: Some(host.to_string()),
        category: category.to_string(),
        extra: BTreeMap::new(),
    }
}

pub fn events() -> PostsByCategory {
    let upcoming = EventCategory::Upcoming.as_str();
    let ongoing = EventCategory::Ongoing.as_str();
    let completed = EventCategory::Completed.as_str();

    let mut grouped = PostsByCategory::new();
    grouped.insert(
        upcoming.to_string(),
        vec![
            post(
                "Code Sprint 2024",
                "2024-12-14",
                "A 24-hour hackathon open to all branches. Teams of up to four.",
                "/static/images/events/code_sprint.jpg",
                "Coding Club",
                upcoming,
            ),
            post(
                "Robotics Workshop",
                "2024-12-20",
                "Hands-on session on building and programming line-follower robots.",
                "/static/images/events/robotics_workshop.jpg",
                "Robotics Club",
                upcoming,
            ),
        ],
    );
    grouped.insert(
        ongoing.to_string(),
        vec![post(
            "Photography Exhibition",
            "2024-11-28",
            "Student photographs from around the campus, on display in the library foyer.",
            "/static/images/events/photo_exhibition.jpg",
            "Photography Club",
            ongoing,
        )],
    );
    grouped.insert(
        completed.to_string(),
        vec![
            post(
                "8th Mile Cultural Fest",
                "2024-05-03",
                "The annual cultural festival with music, dance and drama competitions.",
                "/static/images/events/8th_mile.jpg",
                "Cultural Committee",
                completed,
            ),
            post(
                "Alumni Talk: Careers in AI",
                "2024-09-12",
                "Alumni working in industry shared their experience of building AI products.",
                "/static/images/events/alumni_talk.jpg",
                "Placement Cell",
                completed,
            ),
        ],
    );
    grouped
}

pub fn clubs() -> PostsByCategory {
    let mut grouped = PostsByCategory::new();
    grouped.insert(
        "technical".to_string(),
        vec![
            post(
                "Coding Club",
                "2010-08-01",
                "Weekly contests, interview preparation and open-source projects.",
                "/static/images/clubs/coding.jpg",
                "Department of CSE",
                "technical",
            ),
            post(
                "Robotics Club",
                "2012-08-01",
                "Builds robots for national competitions and runs beginner workshops.",
                "/static/images/clubs/robotics.jpg",
                "Department of ECE",
                "technical",
            ),
        ],
    );
    grouped.insert(
        "cultural".to_string(),
        vec![post(
            "Dance Club",
            "2008-08-01",
            "Classical and contemporary dance troupes that perform at 8th Mile.",
            "/static/images/clubs/dance.jpg",
            "Cultural Committee",
            "cultural",
        )],
    );
    grouped.insert(
        "sports".to_string(),
        vec![post(
            "Chess Club",
            "2015-08-01",
            "Casual games every evening and inter-college tournaments.",
            "/static/images/clubs/chess.jpg",
            "Physical Education Department",
            "sports",
        )],
    );
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_cover_every_category() {
        let events = events();
        for category in EventCategory::ALL {
            let posts = &events[category.as_str()];
            assert!(!posts.is_empty());
            assert!(posts.iter().all(|p| p.category == category.as_str()));
        }
    }

    #[test]
    fn test_club_posts_are_filed_under_their_category() {
        for (category, posts) in clubs() {
            assert!(posts.iter().all(|p| p.category == category));
        }
    }
}
