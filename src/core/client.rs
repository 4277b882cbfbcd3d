use crate::domain::model::{Credentials, LoginResponse, SignupRequest};
use crate::domain::ports::{decode, ApiRequest, ConfigProvider, DashboardApi, RawJson};
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{validate_record_id, validate_url, Validate};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// 後端 REST API 的薄包裝，每個方法只發一次請求，不重試
///
/// Authorization header 由所有 clone 共用，登入後設定一次即可。
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    prefix: String,
    auth_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, prefix: &str) -> Result<Self> {
        Self::with_http_client(Client::new(), base_url, prefix)
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Self::with_http_client(builder.build()?, config.base_url(), config.api_prefix())
    }

    pub fn with_http_client(http: Client, base_url: &str, prefix: &str) -> Result<Self> {
        validate_url("api.base_url", base_url)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: normalize_prefix(prefix),
            auth_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 完整 URL：base + prefix + path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.prefix, path)
    }

    pub fn set_auth_token(&self, token: &str) {
        let mut slot = self
            .auth_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(token.to_string());
    }

    pub fn clear_auth_token(&self) {
        let mut slot = self
            .auth_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    pub fn auth_token(&self) -> Option<String> {
        self.auth_token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        tracing::debug!("Making API request: {} {}", method, url);

        let builder = self.http.request(method, url);
        match self.auth_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 非 2xx 轉成 `ApiStatusError`；成功時保留原始 JSON 文字
    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<RawJson> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status for {}: {}", path, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashError::ApiStatusError {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        decode(&self.call(ApiRequest::Login(credentials)).await?)
    }

    /// 後端回什麼就傳回什麼
    pub async fn signup(&self, request: &SignupRequest) -> Result<RawJson> {
        self.call(ApiRequest::Signup(request)).await
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn call(&self, request: ApiRequest<'_>) -> Result<RawJson> {
        let path = request.path();
        let builder = match request {
            ApiRequest::AccountSnapshot
            | ApiRequest::OpenPositions
            | ApiRequest::Orders
            | ApiRequest::ExecutedTrades
            | ApiRequest::IbStatus
            | ApiRequest::ActiveRunners => self.request(Method::GET, &path),
            ApiRequest::RunnerOrders(runner_id) | ApiRequest::RunnerTrades(runner_id) => {
                validate_record_id("runner_id", runner_id)?;
                self.request(Method::GET, &path)
            }
            ApiRequest::CreateRunner(runner) => {
                let runner = runner.clone().normalized();
                runner.validate()?;
                tracing::debug!("Sending runner payload: {:?}", runner);
                self.request(Method::POST, &path).json(&runner)
            }
            ApiRequest::DeleteRunners(ids) => {
                ids.validate()?;
                self.request(Method::DELETE, &path).json(ids)
            }
            ApiRequest::ActivateRunners(ids) | ApiRequest::DeactivateRunners(ids) => {
                ids.validate()?;
                self.request(Method::POST, &path).json(ids)
            }
            ApiRequest::Login(credentials) => {
                credentials.validate()?;
                self.request(Method::POST, &path).json(credentials)
            }
            ApiRequest::Signup(signup) => {
                signup.validate()?;
                self.request(Method::POST, &path).json(signup)
            }
        };
        self.execute(&path, builder).await
    }
}

/// `api`、`/api/`、`/api` 都變成 `/api`；空字串維持空字串
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RunnerIds;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/"), "/api");
        assert_eq!(normalize_prefix(" /api/v2 "), "/api/v2");
    }

    #[test]
    fn test_endpoint_joins_base_prefix_and_path() {
        let client = ApiClient::new("http://localhost:8000/", "api").unwrap();
        assert_eq!(
            client.endpoint("/account/snapshot"),
            "http://localhost:8000/api/account/snapshot"
        );

        let bare = ApiClient::new("http://localhost:8000", "").unwrap();
        assert_eq!(bare.endpoint("/orders"), "http://localhost:8000/orders");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(ApiClient::new("", "").is_err());
        assert!(ApiClient::new("ftp://host", "").is_err());
    }

    #[test]
    fn test_auth_token_is_shared_between_clones() {
        let client = ApiClient::new("http://localhost:8000", "").unwrap();
        let clone = client.clone();

        client.set_auth_token("abc");
        assert_eq!(clone.auth_token().as_deref(), Some("abc"));

        clone.clear_auth_token();
        assert_eq!(client.auth_token(), None);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_the_network() {
        // 沒有伺服器在這個 port 上，若真的送出請求會得到 HttpError
        let client = ApiClient::new("http://127.0.0.1:9", "").unwrap();

        let err = client.delete_runners(&RunnerIds::new(Vec::new())).await.unwrap_err();
        assert!(matches!(err, DashError::ValidationError { .. }));

        let err = client.fetch_runner_orders(0).await.unwrap_err();
        assert!(matches!(err, DashError::ValidationError { .. }));

        let err = client
            .login(&Credentials {
                username: String::new(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DashError::ValidationError { .. }));
    }
}
