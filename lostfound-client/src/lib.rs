use async_trait::async_trait;
use uuid::Uuid;

pub mod board;
pub mod card;
pub mod config;
pub mod contact;
pub mod draft;
pub mod error;
pub mod filter;
pub mod notice;
pub mod post;
pub mod session;
pub mod time_ago;

#[cfg(feature = "http")]
mod http_client;

pub use board::{Board, EmptyState, empty_state, publish};
pub use card::{CardContact, PostCard};
pub use config::ClientConfig;
pub use contact::ContactAction;
pub use draft::{ImageFile, PostDraft};
pub use error::LostFoundError;
pub use filter::{PostFilter, Selection};
pub use notice::{Notice, NoticeKind, NoticeQueue};
pub use post::{Category, MASKED_CONTACT, NewPost, Post, Profile, Status};
pub use session::{AuthUser, NavState, Session};

#[cfg(feature = "http")]
pub use http_client::LostFoundClientHttp;

/// The backend as the board sees it: row access to `posts`, an image bucket
/// and a session-based auth service.
#[async_trait(?Send)]
pub trait LostFoundClientTrait {
    /// Current session, if the user is signed in.
    fn session(&self) -> Option<&Session>;

    async fn sign_in(&mut self, email: String, password: String)
    -> Result<Session, LostFoundError>;

    /// Returns `None` when the backend requires e-mail confirmation before
    /// the first sign-in.
    async fn sign_up(
        &mut self,
        email: String,
        password: String,
        full_name: Option<String>,
    ) -> Result<Option<Session>, LostFoundError>;

    async fn sign_out(&mut self) -> Result<(), LostFoundError>;

    /// All posts, newest first, joined with the poster's profile name.
    async fn list_posts(&mut self) -> Result<Vec<Post>, LostFoundError>;

    async fn create_post(&mut self, post: NewPost) -> Result<(), LostFoundError>;

    async fn delete_post(&mut self, id: Uuid) -> Result<(), LostFoundError>;

    /// Stores the image at `path` inside the bucket and returns its public URL.
    async fn upload_image(&mut self, path: &str, image: &ImageFile)
    -> Result<String, LostFoundError>;
}
