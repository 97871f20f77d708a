use crate::error::transport;
use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_storage::{LocalStorage, Storage};
use lostfound_client::{
    ClientConfig, ImageFile, LostFoundClientTrait, LostFoundError, NewPost, Post, Session,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

pub const SESSION_KEY: &str = "lostfound_session";

#[derive(Clone)]
pub struct LostFoundClientWeb {
    pub config: ClientConfig,
    pub session: Option<Session>,
}

impl LostFoundClientWeb {
    pub fn new(config: ClientConfig, session: Option<Session>) -> Self {
        Self { config, session }
    }

    pub fn stored_session() -> Option<Session> {
        LocalStorage::get::<Session>(SESSION_KEY).ok()
    }

    fn set_session(&mut self, session: Session) {
        if let Err(e) = LocalStorage::set(SESSION_KEY, &session) {
            tracing::warn!("session not saved, it will be lost on reload: {}", e);
        }
        self.session = Some(session);
    }

    fn clear_session(&mut self) {
        LocalStorage::delete(SESSION_KEY);
        self.session = None;
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = match &self.session {
            Some(session) => session.authorization(),
            None => format!("Bearer {}", self.config.anon_key),
        };
        builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", &bearer)
    }

    async fn refresh_session(&mut self) -> Result<Session, LostFoundError> {
        let refresh_token = self
            .session
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(LostFoundError::Unauthorized)?;

        let url = self.config.auth_url("token?grant_type=refresh_token");
        let anon = format!("Bearer {}", self.config.anon_key);
        let request = Request::post(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", &anon)
            .json(&json!({ "refresh_token": refresh_token }))
            .map_err(transport)?;

        let session: Session = Self::send(request).await?;
        self.set_session(session.clone());
        Ok(session)
    }

    /// Просроченная сессия обновляется один раз, иначе запрос уходит анонимно
    async fn execute<F>(&mut self, build: F) -> Result<Response, LostFoundError>
    where
        F: Fn(&Self) -> Result<Request, LostFoundError>,
    {
        let response = build(self)?.send().await.map_err(transport)?;
        if response.status() != 401 || self.session.is_none() {
            return Self::check(response).await;
        }

        if let Err(e) = self.refresh_session().await {
            tracing::warn!("session refresh failed, continuing signed out: {}", e);
            self.clear_session();
        }
        Self::check(build(self)?.send().await.map_err(transport)?).await
    }

    async fn check(response: Response) -> Result<Response, LostFoundError> {
        if response.ok() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(LostFoundError::from_status(status, &text))
        }
    }

    // Универсальная отправка запроса
    async fn send<T: DeserializeOwned>(request: Request) -> Result<T, LostFoundError> {
        let response = Self::check(request.send().await.map_err(transport)?).await?;
        response.json().await.map_err(transport)
    }
}

#[async_trait(?Send)]
impl LostFoundClientTrait for LostFoundClientWeb {
    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    async fn sign_in(&mut self, email: String, password: String) -> Result<Session, LostFoundError> {
        let url = self.config.auth_url("token?grant_type=password");
        let body = json!({ "email": email.trim(), "password": password });

        let request = self.authorized(Request::post(&url)).json(&body).map_err(transport)?;
        let session: Session = Self::send(request).await?;
        self.set_session(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &mut self,
        email: String,
        password: String,
        full_name: Option<String>,
    ) -> Result<Option<Session>, LostFoundError> {
        let url = self.config.auth_url("signup");
        let body = json!({
            "email": email.trim(),
            "password": password,
            "data": { "full_name": full_name },
        });

        let request = self.authorized(Request::post(&url)).json(&body).map_err(transport)?;
        let reply: serde_json::Value = Self::send(request).await?;
        if reply.get("access_token").is_none() {
            return Ok(None);
        }
        let session: Session = serde_json::from_value(reply)?;
        self.set_session(session.clone());
        Ok(Some(session))
    }

    async fn sign_out(&mut self) -> Result<(), LostFoundError> {
        if self.session.is_some() {
            let url = self.config.auth_url("logout");
            if let Ok(response) = self.authorized(Request::post(&url)).send().await {
                if let Err(e) = Self::check(response).await {
                    tracing::warn!("remote sign-out failed: {}", e);
                }
            }
        }
        self.clear_session();
        Ok(())
    }

    async fn list_posts(&mut self) -> Result<Vec<Post>, LostFoundError> {
        let url = self.config.rest_url("posts");
        let response = self
            .execute(|me| {
                me.authorized(Request::get(&url))
                    .query([("select", "*,profiles(full_name)"), ("order", "date_posted.desc")])
                    .header("Accept", "application/json")
                    .build()
                    .map_err(transport)
            })
            .await?;

        response.json().await.map_err(transport)
    }

    async fn create_post(&mut self, post: NewPost) -> Result<(), LostFoundError> {
        if self.session.is_none() {
            return Err(LostFoundError::Unauthorized);
        }

        let url = self.config.rest_url("posts");
        self.execute(|me| {
            me.authorized(Request::post(&url))
                .header("Content-Type", "application/json")
                .header("Prefer", "return=minimal")
                .json(&[&post])
                .map_err(transport)
        })
        .await?;
        Ok(())
    }

    async fn delete_post(&mut self, id: Uuid) -> Result<(), LostFoundError> {
        if self.session.is_none() {
            return Err(LostFoundError::Unauthorized);
        }

        let url = self.config.rest_url("posts");
        let filter = format!("eq.{id}");
        let response = self
            .execute(|me| {
                me.authorized(Request::delete(&url))
                    .query([("id", filter.as_str())])
                    .header("Prefer", "return=representation")
                    .build()
                    .map_err(transport)
            })
            .await?;

        let deleted: Vec<serde_json::Value> = response.json().await.map_err(transport)?;
        if deleted.is_empty() {
            return Err(LostFoundError::NotFound);
        }
        Ok(())
    }

    async fn upload_image(&mut self, path: &str, image: &ImageFile) -> Result<String, LostFoundError> {
        if self.session.is_none() {
            return Err(LostFoundError::Unauthorized);
        }

        let url = self.config.upload_url(path);
        let content_type = image.content_type();
        self.execute(|me| {
            me.authorized(Request::post(&url))
                .header("Content-Type", content_type.as_ref())
                .body(js_sys::Uint8Array::from(image.bytes.as_slice()))
                .map_err(transport)
        })
        .await?;
        Ok(self.config.public_url(path))
    }
}
