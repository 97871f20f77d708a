use std::path::PathBuf;

use crate::draft::IMAGE_BUCKET;

const DEFAULT_SESSION_FILE: &str = ".lostfound_session.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    pub anon_key: String,
    pub bucket: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.into().trim().to_string(),
            bucket: IMAGE_BUCKET.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }

    #[cfg(feature = "http")]
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| anyhow::anyhow!("SUPABASE_URL must be set"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY must be set"))?;
        if url.trim().is_empty() {
            anyhow::bail!("SUPABASE_URL must not be empty");
        }

        let mut config = Self::new(url, anon_key);
        if let Ok(bucket) = std::env::var("LOSTFOUND_BUCKET") {
            if !bucket.trim().is_empty() {
                config.bucket = bucket.trim().to_string();
            }
        }
        if let Ok(path) = std::env::var("LOSTFOUND_SESSION_FILE") {
            if !path.trim().is_empty() {
                config.session_file = PathBuf::from(path.trim());
            }
        }

        Ok(config)
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.url, endpoint)
    }

    pub fn upload_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.url,
            self.bucket,
            encode_path(path)
        )
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url,
            self.bucket,
            encode_path(path)
        )
    }
}

/// Percent-encodes every segment of an object key, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
