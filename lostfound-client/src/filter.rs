use derive_more::Display;
use std::str::FromStr;

use crate::error::LostFoundError;
use crate::post::{Category, Post, Status};

/// A filter choice that is either the wildcard `all` or one concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Selection<T> {
    #[display("all")]
    All,
    #[display("{_0}")]
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr<Err = LostFoundError>,
{
    type Err = LostFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

/// The three predicates of the filter bar, applied in conjunction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub search: String,
    pub category: Selection<Category>,
    pub status: Selection<Status>,
}

impl PostFilter {
    pub fn new(search: impl Into<String>, category: Selection<Category>, status: Selection<Status>) -> Self {
        Self {
            search: search.into(),
            category,
            status,
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_category(&mut self, category: Selection<Category>) {
        self.category = category;
    }

    pub fn set_status(&mut self, status: Selection<Status>) {
        self.status = status;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.category.is_all() || !self.status.is_all()
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.matches_search(post)
            && self.category.admits(&post.category)
            && self.status.admits(&post.status)
    }

    fn matches_search(&self, post: &Post) -> bool {
        let needle = self.search.to_lowercase();
        post.title.to_lowercase().contains(&needle)
            || post.description.to_lowercase().contains(&needle)
    }

    /// Keeps the posts that satisfy every predicate, preserving feed order.
    pub fn apply<'a, I>(&self, posts: I) -> Vec<&'a Post>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        posts.into_iter().filter(|post| self.matches(post)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn post(title: &str, description: &str, category: Category, status: Status) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            category,
            status,
            contact_info: "owner@example.com".into(),
            location: None,
            image_url: None,
            date_posted: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            date_lost_found: None,
            user_id: Uuid::new_v4(),
            profiles: None,
        }
    }

    fn feed() -> Vec<Post> {
        vec![
            post("Lost iPhone 14", "Black case near the library", Category::Lost, Status::Active),
            post("Found car keys", "Toyota key fob with a red tag", Category::Found, Status::Active),
            post("Lost wallet", "Brown leather, has a PHONE card", Category::Lost, Status::Resolved),
            post("Found umbrella", "Blue, left on bus 12", Category::Found, Status::Closed),
        ]
    }

    fn titles(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn default_filter_keeps_everything() {
        let posts = feed();
        let filter = PostFilter::default();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&posts).len(), posts.len());
    }

    #[test]
    fn search_matches_title_or_description_ignoring_case() {
        let posts = feed();
        let filter = PostFilter::new("phone", Selection::All, Selection::All);
        assert_eq!(
            titles(&filter.apply(&posts)),
            vec!["Lost iPhone 14", "Lost wallet"]
        );
    }

    #[test]
    fn predicates_are_conjunctive() {
        let posts = feed();
        let filter = PostFilter::new("lost", Selection::Only(Category::Lost), Selection::Only(Status::Resolved));
        assert_eq!(titles(&filter.apply(&posts)), vec!["Lost wallet"]);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let posts = feed();
        let filter = PostFilter::new("o", Selection::Only(Category::Found), Selection::All);
        let once = filter.apply(&posts);
        let twice = filter.apply(once.iter().copied());
        assert_eq!(titles(&once), titles(&twice));
    }

    #[test]
    fn predicate_order_does_not_matter() {
        let posts = feed();
        let by_category = PostFilter::new("", Selection::Only(Category::Lost), Selection::All);
        let by_status = PostFilter::new("", Selection::All, Selection::Only(Status::Active));

        let category_then_status = by_status.apply(by_category.apply(&posts));
        let status_then_category = by_category.apply(by_status.apply(&posts));
        assert_eq!(titles(&category_then_status), titles(&status_then_category));
        assert_eq!(titles(&category_then_status), vec!["Lost iPhone 14"]);
    }

    #[test]
    fn clearing_restores_the_full_feed() {
        let posts = feed();
        let mut filter = PostFilter::default();
        filter.set_search("umbrella");
        filter.set_category(Selection::Only(Category::Found));
        filter.set_status(Selection::Only(Status::Closed));
        assert!(filter.is_active());
        assert_eq!(filter.apply(&posts).len(), 1);

        filter.clear();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&posts).len(), posts.len());
    }

    #[test]
    fn selection_parses_wildcard_and_values() {
        assert_eq!("all".parse::<Selection<Category>>().unwrap(), Selection::All);
        assert_eq!(
            "found".parse::<Selection<Category>>().unwrap(),
            Selection::Only(Category::Found)
        );
        assert_eq!(
            "Closed".parse::<Selection<Status>>().unwrap(),
            Selection::Only(Status::Closed)
        );
        assert!("maybe".parse::<Selection<Status>>().is_err());
        assert_eq!(Selection::Only(Status::Active).to_string(), "active");
        assert_eq!(Selection::<Status>::All.to_string(), "all");
    }
}
