use crate::config::token_store::FileTokenStore;
use crate::config::ClientConfig;
use crate::core::auth::AuthSession;
use crate::core::client::ApiClient;
use crate::core::dashboard::Dashboard;
use crate::domain::ports::{ConfigProvider, TokenStore};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// 組好的應用程式：同一個 client（共用 header）分給登入與儀表板使用
pub struct App<S: TokenStore> {
    pub client: ApiClient,
    pub session: AuthSession<S>,
    pub dashboard: Dashboard<ApiClient>,
}

impl<S: TokenStore> App<S> {
    /// 建立 client、裝上已保存的 token
    pub async fn bootstrap(config: &ClientConfig, store: S) -> Result<Self> {
        config.validate()?;

        let client = ApiClient::from_config(config)?;
        tracing::debug!(
            "API client ready: base={} prefix='{}'",
            client.base_url(),
            client.prefix()
        );

        let session = AuthSession::new(client.clone(), store);
        if session.restore().await? {
            tracing::info!("Using saved token");
        } else {
            tracing::debug!("No saved token, requests are sent without Authorization");
        }

        Ok(Self {
            dashboard: Dashboard::new(client.clone()),
            session,
            client,
        })
    }
}

impl App<FileTokenStore> {
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let store = FileTokenStore::new(config.token_file(), config.token_key());
        Self::bootstrap(config, store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::token_store::MemoryTokenStore;

    #[tokio::test]
    async fn test_bootstrap_restores_token_into_shared_client() {
        let config = ClientConfig::default();
        let app = App::bootstrap(&config, MemoryTokenStore::with_token("jwt-1"))
            .await
            .unwrap();

        assert!(app.session.is_authenticated());
        assert_eq!(app.dashboard.api().auth_token().as_deref(), Some("jwt-1"));
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_invalid_config() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(App::bootstrap(&config, MemoryTokenStore::new()).await.is_err());
    }
}
