use crate::LostFoundClientTrait;
use crate::config::ClientConfig;
use crate::draft::ImageFile;
use crate::error::LostFoundError;
use crate::post::{NewPost, Post};
use crate::session::Session;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const POSTS_SELECT: &str = "*,profiles(full_name)";

#[derive(Clone)]
pub struct LostFoundClientHttp {
    client: Arc<Client>,
    config: ClientConfig,
    session: Option<Session>,
}

impl LostFoundClientHttp {
    /// Builds the client and picks up a session saved by an earlier sign-in.
    pub async fn connect(config: ClientConfig) -> Result<Self, LostFoundError> {
        let session = match fs::read_to_string(&config.session_file) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(path = %config.session_file.display(), "ignoring unreadable session file: {}", e);
                    None
                }
            },
            Err(_) => None,
        };

        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_session(&mut self, session: Session) -> Result<(), LostFoundError> {
        fs::write(&self.config.session_file, serde_json::to_string(&session)?)?;
        self.session = Some(session);
        Ok(())
    }

    pub fn clear_session(&mut self) -> Result<(), LostFoundError> {
        self.session = None;
        match fs::remove_file(&self.config.session_file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// `apikey` always carries the anon key; the bearer is the user's access
    /// token when signed in and the anon key otherwise.
    fn headers(&self) -> Result<HeaderMap, LostFoundError> {
        match &self.session {
            Some(session) => self.headers_with(&session.authorization()),
            None => self.headers_with(&format!("Bearer {}", self.config.anon_key)),
        }
    }

    fn headers_with(&self, bearer: &str) -> Result<HeaderMap, LostFoundError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.config.anon_key)
                .map_err(|_| LostFoundError::InvalidRequest("anon key is not a valid header".into()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(bearer).map_err(|_| LostFoundError::Unauthorized)?,
        );
        Ok(headers)
    }

    fn request(&self, builder: RequestBuilder) -> Result<RequestBuilder, LostFoundError> {
        Ok(builder.headers(self.headers()?))
    }

    async fn check(response: Response) -> Result<Response, LostFoundError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(LostFoundError::from_status(status.as_u16(), &text))
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, LostFoundError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Exchanges the stored refresh token for a new session and saves it.
    #[instrument(skip(self))]
    pub async fn refresh_session(&mut self) -> Result<Session, LostFoundError> {
        let refresh_token = self
            .session
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(LostFoundError::Unauthorized)?;

        let url = self.config.auth_url("token?grant_type=refresh_token");
        let anon = format!("Bearer {}", self.config.anon_key);
        let request = self
            .client
            .post(url)
            .headers(self.headers_with(&anon)?)
            .json(&json!({ "refresh_token": refresh_token }));

        let session: Session = Self::send(request).await?;
        self.set_session(session.clone())?;
        info!(user_id = %session.user.id, "session refreshed");
        Ok(session)
    }

    /// Sends a request built from the current session. An expired session is
    /// refreshed once; if that fails the session is dropped and the request
    /// goes out again with the anon key.
    async fn execute<F>(&mut self, build: F) -> Result<Response, LostFoundError>
    where
        F: Fn(&Self) -> Result<RequestBuilder, LostFoundError>,
    {
        let response = build(self)?.send().await?;
        if response.status() != StatusCode::UNAUTHORIZED || self.session.is_none() {
            return Self::check(response).await;
        }

        if let Err(e) = self.refresh_session().await {
            warn!("session refresh failed, continuing signed out: {}", e);
            self.clear_session()?;
        }
        Self::check(build(self)?.send().await?).await
    }
}

#[async_trait(?Send)]
impl LostFoundClientTrait for LostFoundClientHttp {
    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&mut self, email: String, password: String) -> Result<Session, LostFoundError> {
        let url = self.config.auth_url("token?grant_type=password");
        let request = self.request(self.client.post(url))?.json(&json!({
            "email": email.trim(),
            "password": password,
        }));

        let session: Session = Self::send(request).await?;
        self.set_session(session.clone())?;
        info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &mut self,
        email: String,
        password: String,
        full_name: Option<String>,
    ) -> Result<Option<Session>, LostFoundError> {
        let url = self.config.auth_url("signup");
        let request = self.request(self.client.post(url))?.json(&json!({
            "email": email.trim(),
            "password": password,
            "data": { "full_name": full_name },
        }));

        let body: serde_json::Value = Self::send(request).await?;
        if body.get("access_token").is_none() {
            info!("sign-up pending e-mail confirmation");
            return Ok(None);
        }

        let session: Session = serde_json::from_value(body)?;
        self.set_session(session.clone())?;
        Ok(Some(session))
    }

    async fn sign_out(&mut self) -> Result<(), LostFoundError> {
        if self.session.is_some() {
            let url = self.config.auth_url("logout");
            let result = match self.request(self.client.post(url)) {
                Ok(request) => match request.send().await {
                    Ok(response) => Self::check(response).await.map(|_| ()),
                    Err(e) => Err(e.into()),
                },
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!("remote sign-out failed, clearing the local session anyway: {}", e);
            }
        }
        self.clear_session()
    }

    #[instrument(skip(self))]
    async fn list_posts(&mut self) -> Result<Vec<Post>, LostFoundError> {
        let response = self
            .execute(|me| {
                Ok(me
                    .request(me.client.get(me.config.rest_url("posts")))?
                    .query(&[("select", POSTS_SELECT), ("order", "date_posted.desc")]))
            })
            .await?;

        Ok(response.json().await?)
    }

    #[instrument(skip(self, post), fields(title = %post.title))]
    async fn create_post(&mut self, post: NewPost) -> Result<(), LostFoundError> {
        if self.session.is_none() {
            return Err(LostFoundError::Unauthorized);
        }

        self.execute(|me| {
            Ok(me
                .request(me.client.post(me.config.rest_url("posts")))?
                .header(CONTENT_TYPE, "application/json")
                .header("Prefer", "return=minimal")
                .json(&[&post]))
        })
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_post(&mut self, id: Uuid) -> Result<(), LostFoundError> {
        if self.session.is_none() {
            return Err(LostFoundError::Unauthorized);
        }

        let response = self
            .execute(|me| {
                Ok(me
                    .request(me.client.delete(me.config.rest_url("posts")))?
                    .query(&[("id", format!("eq.{id}"))])
                    .header("Prefer", "return=representation"))
            })
            .await?;

        // Row-level security turns a foreign or missing row into zero deletions.
        let deleted: Vec<serde_json::Value> = response.json().await?;
        if deleted.is_empty() {
            return Err(LostFoundError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, image), fields(bytes = image.bytes.len()))]
    async fn upload_image(&mut self, path: &str, image: &ImageFile) -> Result<String, LostFoundError> {
        if self.session.is_none() {
            return Err(LostFoundError::Unauthorized);
        }

        self.execute(|me| {
            Ok(me
                .request(me.client.post(me.config.upload_url(path)))?
                .header(CONTENT_TYPE, image.content_type().to_string())
                .body(image.bytes.clone()))
        })
        .await?;
        Ok(self.config.public_url(path))
    }
}
