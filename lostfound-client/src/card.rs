use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::post::{Category, Post, Status};
use crate::time_ago;

/// The contact area at the bottom of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardContact {
    /// "Contact Owner" with the real contact info behind it.
    Reveal(String),
    /// Contact info is masked for signed-out viewers.
    SignInPrompt,
    /// Resolved and closed posts take no contact.
    Hidden,
}

/// Everything a front-end needs to draw one post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category_badge: String,
    pub is_lost: bool,
    pub status_badge: Option<String>,
    pub poster: Option<String>,
    pub location: Option<String>,
    pub posted: String,
    pub lost_found_on: Option<String>,
    pub contact: CardContact,
    pub can_delete: bool,
}

impl PostCard {
    pub fn new(post: &Post, viewer: Option<Uuid>, now: DateTime<Utc>) -> Self {
        let is_lost = post.category == Category::Lost;

        let contact = match (post.status, post.is_contact_masked()) {
            (Status::Active, false) => CardContact::Reveal(post.contact_info.clone()),
            (Status::Active, true) => CardContact::SignInPrompt,
            _ => CardContact::Hidden,
        };

        let lost_found_on = post.date_lost_found.map(|date| {
            format!(
                "{} on {}/{}/{}",
                if is_lost { "Lost" } else { "Found" },
                date.month(),
                date.day(),
                date.year()
            )
        });

        Self {
            id: post.id,
            title: post.title.clone(),
            description: post.description.clone(),
            image_url: post.image_url.clone().filter(|url| !url.is_empty()),
            category_badge: post.category.to_string().to_uppercase(),
            is_lost,
            status_badge: (post.status != Status::Active)
                .then(|| post.status.to_string().to_uppercase()),
            poster: post.poster_name().map(str::to_owned),
            location: post.location.clone().filter(|l| !l.trim().is_empty()),
            posted: format!("Posted {} ago", time_ago::distance(post.date_posted, now)),
            lost_found_on,
            contact,
            can_delete: post.is_owned_by(viewer),
        }
    }
}
