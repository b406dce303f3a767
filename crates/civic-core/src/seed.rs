//! Demonstration dataset loaded by `civic serve` when demo seeding is on.

use crate::types::{Category, EventId, EventRecord, EventStatus};
use chrono::{DateTime, Duration, Utc};

struct Demo {
    title: &'static str,
    description: &'static str,
    category: Category,
    location: &'static str,
    day: i64,
    start_hour: i64,
    end_hour: i64,
    requires_registration: bool,
    max_attendees: u32,
    contact: &'static str,
    image: &'static str,
}

const DEMOS: &[Demo] = &[
    Demo {
        title: "Community Clean-Up Drive",
        description: "Join us for a city-wide cleanup initiative. Bring your family and help make Durban cleaner. Refreshments provided.",
        category: Category::Community,
        location: "Durban Beachfront",
        day: 7,
        start_hour: 8,
        end_hour: 12,
        requires_registration: true,
        max_attendees: 200,
        contact: "cleanup@durban.gov.za",
        image: "/images/cleanup.jpg",
    },
    Demo {
        title: "Water Conservation Workshop",
        description: "Learn practical tips to reduce water usage at home. Expert speakers and hands-on demonstrations.",
        category: Category::Education,
        location: "City Hall Auditorium",
        day: 10,
        start_hour: 14,
        end_hour: 16,
        requires_registration: true,
        max_attendees: 150,
        contact: "water@durban.gov.za",
        image: "/images/water-workshop.jpg",
    },
    Demo {
        title: "Road Safety Awareness Campaign",
        description: "Free road safety training for drivers and pedestrians. Learn about traffic rules and safe driving practices.",
        category: Category::Other,
        location: "Moses Mabhida Stadium Parking",
        day: 5,
        start_hour: 9,
        end_hour: 15,
        requires_registration: false,
        max_attendees: 0,
        contact: "traffic@durban.gov.za",
        image: "/images/road-safety.jpg",
    },
    Demo {
        title: "Municipal Budget Public Hearing",
        description: "Attend the public hearing for the municipal budget. Your voice matters in city planning.",
        category: Category::Government,
        location: "Durban City Hall",
        day: 14,
        start_hour: 10,
        end_hour: 13,
        requires_registration: false,
        max_attendees: 0,
        contact: "budget@durban.gov.za",
        image: "/images/budget-hearing.jpg",
    },
    Demo {
        title: "Youth Sports Tournament",
        description: "Annual youth sports competition featuring soccer, netball, and athletics. Open to ages 12-18.",
        category: Category::Recreation,
        location: "Kings Park Stadium",
        day: 21,
        start_hour: 8,
        end_hour: 17,
        requires_registration: true,
        max_attendees: 500,
        contact: "sports@durban.gov.za",
        image: "/images/sports-tournament.jpg",
    },
    Demo {
        title: "Heritage Day Celebration",
        description: "Celebrate South African heritage with traditional music, dance, and food. Free entry for all.",
        category: Category::Community,
        location: "Blue Lagoon Park",
        day: 45,
        start_hour: 10,
        end_hour: 18,
        requires_registration: false,
        max_attendees: 0,
        contact: "culture@durban.gov.za",
        image: "/images/heritage-day.jpg",
    },
    Demo {
        title: "Free Health Screening",
        description: "Free blood pressure, diabetes, and HIV testing. Nurses and doctors available for consultation.",
        category: Category::Health,
        location: "Umlazi Community Centre",
        day: 3,
        start_hour: 8,
        end_hour: 14,
        requires_registration: false,
        max_attendees: 0,
        contact: "health@durban.gov.za",
        image: "/images/health-screening.jpg",
    },
    Demo {
        title: "Small Business Development Workshop",
        description: "Learn how to start and grow your business. Topics include funding, marketing, and legal compliance.",
        category: Category::Other,
        location: "ICC Durban",
        day: 12,
        start_hour: 9,
        end_hour: 16,
        requires_registration: true,
        max_attendees: 100,
        contact: "business@durban.gov.za",
        image: "/images/business-workshop.jpg",
    },
    Demo {
        title: "Recycling Awareness Day",
        description: "Learn about recycling and waste management. Drop off recyclables and get free reusable bags.",
        category: Category::Environment,
        location: "Durban Solid Waste Depot",
        day: 8,
        start_hour: 7,
        end_hour: 13,
        requires_registration: false,
        max_attendees: 0,
        contact: "waste@durban.gov.za",
        image: "/images/recycling.jpg",
    },
    Demo {
        title: "Digital Skills Training",
        description: "Free computer training for beginners. Learn basic office software and internet skills.",
        category: Category::Education,
        location: "Durban Central Library",
        day: 15,
        start_hour: 9,
        end_hour: 13,
        requires_registration: true,
        max_attendees: 30,
        contact: "library@durban.gov.za",
        image: "/images/digital-skills.jpg",
    },
    Demo {
        title: "Fire Safety Demonstration",
        description: "Learn how to prevent and respond to fires. Demonstrations of fire extinguisher use and evacuation procedures.",
        category: Category::PublicSafety,
        location: "Durban Fire Station",
        day: 18,
        start_hour: 10,
        end_hour: 12,
        requires_registration: false,
        max_attendees: 0,
        contact: "fire@durban.gov.za",
        image: "/images/fire-safety.jpg",
    },
    Demo {
        title: "Community Garden Launch",
        description: "Join the launch of our new community garden project. Learn about urban farming and get free seedlings.",
        category: Category::Community,
        location: "Phoenix Community Park",
        day: 9,
        start_hour: 8,
        end_hour: 11,
        requires_registration: false,
        max_attendees: 0,
        contact: "parks@durban.gov.za",
        image: "/images/garden.jpg",
    },
    Demo {
        title: "Youth Leadership Summit",
        description: "Empowering young leaders. Guest speakers, workshops, and networking opportunities for ages 16-25.",
        category: Category::Education,
        location: "University of KwaZulu-Natal",
        day: 30,
        start_hour: 8,
        end_hour: 17,
        requires_registration: true,
        max_attendees: 250,
        contact: "youth@durban.gov.za",
        image: "/images/leadership.jpg",
    },
    Demo {
        title: "Emergency Preparedness Training",
        description: "Learn how to prepare for natural disasters and emergencies. First aid training included.",
        category: Category::PublicSafety,
        location: "Chatsworth Community Hall",
        day: 20,
        start_hour: 9,
        end_hour: 15,
        requires_registration: true,
        max_attendees: 80,
        contact: "emergency@durban.gov.za",
        image: "/images/emergency.jpg",
    },
    Demo {
        title: "Local Market & Craft Fair",
        description: "Support local vendors and artists. Fresh produce, handmade crafts, and live entertainment.",
        category: Category::Community,
        location: "Victoria Street Market",
        day: 11,
        start_hour: 7,
        end_hour: 14,
        requires_registration: false,
        max_attendees: 0,
        contact: "markets@durban.gov.za",
        image: "/images/market.jpg",
    },
    Demo {
        title: "Women in Business Conference",
        description: "Empowering women entrepreneurs. Networking, mentorship, and access to funding opportunities.",
        category: Category::Other,
        location: "Durban ICC",
        day: 25,
        start_hour: 8,
        end_hour: 17,
        requires_registration: true,
        max_attendees: 300,
        contact: "women.business@durban.gov.za",
        image: "/images/women-business.jpg",
    },
];

/// Builds the demo events, scheduled relative to midnight (UTC) of `now`.
pub fn demo_events(now: DateTime<Utc>) -> Vec<EventRecord> {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |naive| naive.and_utc());
    DEMOS
        .iter()
        .map(|demo| {
            let day = midnight + Duration::days(demo.day);
            EventRecord {
                id: EventId::generate(),
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                location: demo.location.to_string(),
                category: demo.category,
                starts_at: day + Duration::hours(demo.start_hour),
                ends_at: Some(day + Duration::hours(demo.end_hour)),
                status: EventStatus::Published,
                media_urls: vec![demo.image.to_string()],
                contact_info: Some(demo.contact.to_string()),
                max_attendees: demo.max_attendees,
                requires_registration: demo.requires_registration,
                created_at: now,
                updated_at: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStore;

    #[test]
    fn demo_events_are_in_the_future() {
        let now = Utc::now();
        let events = demo_events(now);
        assert_eq!(events.len(), DEMOS.len());
        assert!(events.iter().all(|event| event.starts_at > now));
        assert!(events.iter().all(|event| event.ends_at >= Some(event.starts_at)));
    }

    #[test]
    fn seeded_store_covers_demo_categories() {
        let store = EventStore::new();
        store.seed(demo_events(Utc::now()));
        assert_eq!(store.len(), DEMOS.len());
        assert_eq!(store.upcoming_events(100).len(), DEMOS.len());
        assert_eq!(
            store.categories(),
            vec![
                "Community",
                "Government",
                "PublicSafety",
                "Health",
                "Education",
                "Recreation",
                "Environment",
                "Other"
            ]
        );
    }
}
