use crate::core::client::ApiClient;
use crate::domain::model::{Credentials, SignupRequest};
use crate::domain::ports::{RawJson, TokenStore};
use crate::utils::error::{DashError, Result};

/// 登入狀態：保存 token 並維護 client 的 Authorization header
pub struct AuthSession<S: TokenStore> {
    client: ApiClient,
    store: S,
}

impl<S: TokenStore> AuthSession<S> {
    pub fn new(client: ApiClient, store: S) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.auth_token().is_some()
    }

    /// 啟動時把之前存下的 token 裝回 header，回傳是否有 token
    ///
    /// 讀不到 token（檔案損毀等）只記警告，以未登入狀態繼續。
    pub async fn restore(&self) -> Result<bool> {
        match self.store.load().await {
            Ok(Some(token)) => {
                self.client.set_auth_token(&token);
                tracing::debug!("Restored saved bearer token");
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable saved token: {}", e);
                Ok(false)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let response = self.client.login(credentials).await?;
        if response.access_token.trim().is_empty() {
            return Err(DashError::AuthError {
                message: "backend returned an empty access token".to_string(),
            });
        }

        self.store.save(&response.access_token).await?;
        self.client.set_auth_token(&response.access_token);
        tracing::info!("🔑 Logged in as {}", credentials.username);
        Ok(response.access_token)
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<RawJson> {
        let body = self.client.signup(request).await?;
        tracing::info!("Created user {}", request.username);
        Ok(body)
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        self.client.clear_auth_token();
        tracing::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::token_store::{FileTokenStore, MemoryTokenStore};
    use tempfile::TempDir;

    fn session(store: MemoryTokenStore) -> AuthSession<MemoryTokenStore> {
        let client = ApiClient::new("http://127.0.0.1:9", "").unwrap();
        AuthSession::new(client, store)
    }

    #[tokio::test]
    async fn test_restore_installs_saved_token() {
        let session = session(MemoryTokenStore::with_token("saved"));
        assert!(!session.is_authenticated());

        assert!(session.restore().await.unwrap());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_without_token() {
        let session = session(MemoryTokenStore::new());
        assert!(!session.restore().await.unwrap());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_header() {
        let session = session(MemoryTokenStore::with_token("saved"));
        session.restore().await.unwrap();

        session.logout().await.unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.store().load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_with_corrupt_store_continues_logged_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"token": "abc""#).unwrap();

        let client = ApiClient::new("http://127.0.0.1:9", "").unwrap();
        let session = AuthSession::new(client, FileTokenStore::new(&path, "token"));

        assert!(!session.restore().await.unwrap());
        assert!(!session.is_authenticated());
    }
}
