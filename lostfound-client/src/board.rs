use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::card::{CardContact, PostCard};
use crate::contact::ContactAction;
use crate::draft::{ImageFile, PostDraft};
use crate::filter::PostFilter;
use crate::notice::Notice;
use crate::post::Post;
use crate::LostFoundClientTrait;

/// Shown in place of the grid when no post passes the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub message: &'static str,
    /// Offer a "Post First Item" action.
    pub offer_first_post: bool,
}

/// What to show instead of the grid, given the feed size and how many
/// posts passed the filters.
pub fn empty_state(total: usize, visible: usize, signed_in: bool) -> Option<EmptyState> {
    if visible > 0 {
        return None;
    }
    let feed_is_empty = total == 0;
    Some(EmptyState {
        title: "No items found",
        message: if feed_is_empty {
            "Be the first to post a lost or found item!"
        } else {
            "Try adjusting your search filters."
        },
        offer_first_post: feed_is_empty && signed_in,
    })
}

/// Uploads the optional image, then inserts the post.
///
/// The two steps are sequential: if the upload fails nothing is inserted.
/// Validation runs first so a bad form never leaves an orphaned object in
/// the bucket.
#[instrument(skip(client, draft, image), fields(has_image = image.is_some()))]
pub async fn publish<C>(
    client: &mut C,
    draft: PostDraft,
    image: Option<&ImageFile>,
    epoch_millis: i64,
) -> Result<Notice, Notice>
where
    C: LostFoundClientTrait + ?Sized,
{
    let Some(user_id) = client.session().map(|s| s.user_id()) else {
        return Err(Notice::sign_in_required());
    };

    draft
        .validate()
        .map_err(|e| Notice::destructive("Missing information", e.user_message()))?;

    let image_url = match image {
        Some(image) => {
            let path = image.object_path(user_id, epoch_millis);
            match client.upload_image(&path, image).await {
                Ok(url) => Some(url),
                Err(e) => {
                    error!(%path, "image upload failed: {}", e);
                    return Err(Notice::upload_failed());
                }
            }
        }
        None => None,
    };

    let new_post = draft
        .into_new_post(user_id, image_url)
        .map_err(|e| Notice::destructive("Missing information", e.user_message()))?;

    match client.create_post(new_post).await {
        Ok(()) => {
            info!(%user_id, "post created");
            Ok(Notice::created())
        }
        Err(e) => {
            error!("failed to create post: {}", e);
            Err(Notice::for_create_error(&e))
        }
    }
}

/// The feed: owns the loaded posts and the filter bar state.
pub struct Board<C> {
    client: C,
    posts: Vec<Post>,
    filter: PostFilter,
}

impl<C> Board<C>
where
    C: LostFoundClientTrait,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            posts: Vec::new(),
            filter: PostFilter::default(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn filter(&self) -> &PostFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut PostFilter {
        &mut self.filter
    }

    pub fn viewer(&self) -> Option<Uuid> {
        self.client.session().map(|s| s.user_id())
    }

    pub fn visible(&self) -> Vec<&Post> {
        self.filter.apply(&self.posts)
    }

    pub fn cards(&self, now: DateTime<Utc>) -> Vec<PostCard> {
        let viewer = self.viewer();
        self.visible()
            .into_iter()
            .map(|post| PostCard::new(post, viewer, now))
            .collect()
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        empty_state(self.posts.len(), self.visible().len(), self.viewer().is_some())
    }

    /// Re-fetches the whole feed. On failure the previously loaded posts stay.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<usize, Notice> {
        match self.client.list_posts().await {
            Ok(posts) => {
                info!(count = posts.len(), "posts loaded");
                self.posts = posts;
                Ok(self.posts.len())
            }
            Err(e) => {
                error!("error fetching posts: {}", e);
                Err(Notice::load_failed())
            }
        }
    }

    /// Publishes a draft and reloads the feed on success.
    pub async fn submit(
        &mut self,
        draft: PostDraft,
        image: Option<&ImageFile>,
        epoch_millis: i64,
    ) -> Result<Notice, Notice> {
        let notice = publish(&mut self.client, draft, image, epoch_millis).await?;
        if let Err(reload) = self.refresh().await {
            warn!("post created but the feed could not be reloaded: {}", reload);
        }
        Ok(notice)
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: Uuid) -> Result<Notice, Notice> {
        let viewer = self.viewer().ok_or_else(Notice::sign_in_required)?;

        if let Some(post) = self.posts.iter().find(|p| p.id == id) {
            if post.user_id != viewer {
                return Err(Notice::delete_failed("You can only delete your own posts."));
            }
        }

        match self.client.delete_post(id).await {
            Ok(()) => {
                self.posts.retain(|p| p.id != id);
                info!(post_id = %id, "post deleted");
                Ok(Notice::deleted())
            }
            Err(e) => {
                error!(post_id = %id, "failed to delete post: {}", e);
                Err(Notice::for_delete_error(&e))
            }
        }
    }

    /// Resolves the contact action for a loaded post.
    pub fn contact(&self, id: Uuid) -> Result<ContactAction, Notice> {
        let post = self
            .posts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Notice::destructive("Post not found", format!("No post with id {id}.")))?;

        match PostCard::new(post, self.viewer(), Utc::now()).contact {
            CardContact::Reveal(info) => Ok(ContactAction::classify(&info)),
            CardContact::SignInPrompt => Err(Notice::sign_in_required()),
            CardContact::Hidden => Err(Notice::destructive(
                "Contact unavailable",
                format!("This item is {}.", post.status),
            )),
        }
    }
}
