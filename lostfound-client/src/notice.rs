use derive_more::Display;
use thiserror::Error;

use crate::error::LostFoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NoticeKind {
    #[display("info")]
    Info,
    #[display("destructive")]
    Destructive,
}

/// A transient, user-facing notification (a toast).
///
/// Every fallible flow of the board ends in one of these. Failures carry
/// [`NoticeKind::Destructive`] and also work as errors, so front-ends can
/// propagate them with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{title}: {description}")]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.kind == NoticeKind::Destructive
    }

    pub fn load_failed() -> Self {
        Self::destructive("Failed to load posts", "Please try refreshing the page.")
    }

    pub fn file_too_large() -> Self {
        Self::destructive("File too large", "Please choose an image smaller than 10MB.")
    }

    pub fn upload_failed() -> Self {
        Self::destructive(
            "Image upload failed",
            "Please try uploading a different image.",
        )
    }

    pub fn create_failed(message: impl Into<String>) -> Self {
        Self::destructive("Failed to create post", message)
    }

    pub fn created() -> Self {
        Self::info(
            "Post created successfully!",
            "Your item has been posted to the community.",
        )
    }

    pub fn unexpected() -> Self {
        Self::destructive("An error occurred", "Please try again later.")
    }

    pub fn sign_in_required() -> Self {
        Self::destructive("Sign in required", "Please sign in to continue.")
    }

    pub fn contact_copied() -> Self {
        Self::info(
            "Contact info copied",
            "Contact information has been copied to your clipboard.",
        )
    }

    pub fn deleted() -> Self {
        Self::info("Post deleted", "Your post has been removed.")
    }

    pub fn delete_failed(message: impl Into<String>) -> Self {
        Self::destructive("Failed to delete post", message)
    }

    /// Notice for a failed insert.
    pub fn for_create_error(err: &LostFoundError) -> Self {
        Self::for_failure(err, |msg| Self::create_failed(msg))
    }

    /// Notice for a failed delete.
    pub fn for_delete_error(err: &LostFoundError) -> Self {
        Self::for_failure(err, |msg| Self::delete_failed(msg))
    }

    // Сбои сети и разбора не показываем пользователю как ответ сервера
    fn for_failure(err: &LostFoundError, on_backend_error: fn(String) -> Notice) -> Self {
        match err {
            LostFoundError::Transport(_) | LostFoundError::Io(_) | LostFoundError::Json(_) => {
                Self::unexpected()
            }
            #[cfg(feature = "http")]
            LostFoundError::RequestError(_) => Self::unexpected(),
            other => on_backend_error(other.user_message()),
        }
    }
}

/// Notices on screen, each under an id that is never handed out twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeQueue {
    next_id: u64,
    items: Vec<(u64, Notice)>,
}

impl NoticeQueue {
    pub fn push(&mut self, notice: Notice) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push((id, notice));
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|(shown, _)| *shown != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &Notice)> {
        self.items.iter().map(|(id, notice)| (*id, notice))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismissed_ids_are_not_reused() {
        let mut queue = NoticeQueue::default();
        let first = queue.push(Notice::deleted());
        let second = queue.push(Notice::contact_copied());
        queue.dismiss(second);

        let third = queue.push(Notice::created());
        assert_ne!(third, second);
        assert_ne!(third, first);

        // A late timer for the dismissed notice must not remove the new one.
        queue.dismiss(second);
        let titles: Vec<_> = queue.iter().map(|(_, n)| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Post deleted", "Post created successfully!"]);
    }

    #[test]
    fn transport_failures_read_as_unexpected() {
        let err = LostFoundError::Transport("NetworkError when attempting to fetch".into());
        assert_eq!(Notice::for_delete_error(&err), Notice::unexpected());
        assert_eq!(Notice::for_create_error(&err), Notice::unexpected());
    }

    #[test]
    fn backend_rejections_keep_their_message() {
        let err = LostFoundError::Http {
            status: 403,
            message: "permission denied for table posts".into(),
        };
        assert_eq!(
            Notice::for_delete_error(&err),
            Notice::delete_failed("permission denied for table posts")
        );
        assert_eq!(
            Notice::for_create_error(&err),
            Notice::create_failed("permission denied for table posts")
        );
    }
}
