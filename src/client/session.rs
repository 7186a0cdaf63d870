use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::ApiError;

/// Fixed key the signed-in user id is stored under.
pub const USER_ID_KEY: &str = "userId";
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
}

/// Small JSON key/value file standing in for browser local storage.
/// Keys other than the session's own are preserved on write.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Session>, ApiError> {
        let entries = self.read_entries().await?;
        let user_id = entries
            .get(USER_ID_KEY)
            .and_then(|raw| raw.parse::<Uuid>().ok());
        let access_token = entries.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty());

        Ok(match (user_id, access_token) {
            (Some(user_id), Some(token)) => Some(Session {
                user_id,
                access_token: token.clone(),
            }),
            _ => None,
        })
    }

    pub async fn save(&self, session: &Session) -> Result<(), ApiError> {
        let mut entries = self.read_entries().await?;
        entries.insert(USER_ID_KEY.to_string(), session.user_id.to_string());
        entries.insert(ACCESS_TOKEN_KEY.to_string(), session.access_token.clone());
        self.write_entries(&entries).await
    }

    pub async fn clear(&self) -> Result<(), ApiError> {
        let mut entries = self.read_entries().await?;
        let had_user = entries.remove(USER_ID_KEY).is_some();
        let had_token = entries.remove(ACCESS_TOKEN_KEY).is_some();
        if !had_user && !had_token {
            return Ok(());
        }
        self.write_entries(&entries).await
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, ApiError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}
