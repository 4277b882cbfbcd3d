use crate::domain::model::{
    AccountSnapshot, ActivationOutcome, Credentials, DeleteOutcome, ExecutedTrade, IbStatus,
    NewRunner, OpenPosition, Order, Runner, RunnerIds, SignupRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

/// 後端回應的原始 JSON 文字，未經任何轉換
pub type RawJson = Box<RawValue>;

/// 本機 token 存放處（對應瀏覽器的 local storage）
pub trait TokenStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn save(&self, token: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn api_prefix(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
    fn token_file(&self) -> &str;
    fn token_key(&self) -> &str;
}

/// 後端的每一個 REST 呼叫
#[derive(Debug, Clone, Copy)]
pub enum ApiRequest<'a> {
    AccountSnapshot,
    OpenPositions,
    Orders,
    ExecutedTrades,
    IbStatus,
    CreateRunner(&'a NewRunner),
    DeleteRunners(&'a RunnerIds),
    ActivateRunners(&'a RunnerIds),
    DeactivateRunners(&'a RunnerIds),
    ActiveRunners,
    RunnerOrders(i64),
    RunnerTrades(i64),
    Login(&'a Credentials),
    Signup(&'a SignupRequest),
}

impl ApiRequest<'_> {
    /// 不含 prefix 的路徑
    pub fn path(&self) -> String {
        match self {
            ApiRequest::AccountSnapshot => "/account/snapshot".to_string(),
            ApiRequest::OpenPositions => "/account/positions".to_string(),
            ApiRequest::Orders => "/orders".to_string(),
            ApiRequest::ExecutedTrades => "/executed-trades".to_string(),
            ApiRequest::IbStatus => "/ib/status".to_string(),
            ApiRequest::CreateRunner(_) | ApiRequest::DeleteRunners(_) => "/runners".to_string(),
            ApiRequest::ActivateRunners(_) => "/runners/activate".to_string(),
            ApiRequest::DeactivateRunners(_) => "/runners/deactivate".to_string(),
            ApiRequest::ActiveRunners => "/runners/active".to_string(),
            ApiRequest::RunnerOrders(id) => format!("/runners/{}/orders", id),
            ApiRequest::RunnerTrades(id) => format!("/runners/{}/trades", id),
            ApiRequest::Login(_) => "/auth/login".to_string(),
            ApiRequest::Signup(_) => "/auth/signup".to_string(),
        }
    }
}

pub fn decode<T: DeserializeOwned>(raw: &RawValue) -> Result<T> {
    Ok(serde_json::from_str(raw.get())?)
}

/// 儀表板會用到的後端資源
///
/// 實作只需提供 `call`；型別化的方法都是解碼 `call` 的原始回應。
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn call(&self, request: ApiRequest<'_>) -> Result<RawJson>;

    async fn fetch_account_snapshot(&self) -> Result<AccountSnapshot> {
        decode(&self.call(ApiRequest::AccountSnapshot).await?)
    }

    async fn fetch_open_positions(&self) -> Result<Vec<OpenPosition>> {
        decode(&self.call(ApiRequest::OpenPositions).await?)
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>> {
        decode(&self.call(ApiRequest::Orders).await?)
    }

    async fn fetch_executed_trades(&self) -> Result<Vec<ExecutedTrade>> {
        decode(&self.call(ApiRequest::ExecutedTrades).await?)
    }

    /// `connected` 缺少或為 null 都算未連線
    async fn fetch_ib_status(&self) -> Result<bool> {
        let status: IbStatus = decode(&self.call(ApiRequest::IbStatus).await?)?;
        Ok(status.is_connected())
    }

    async fn create_runner(&self, runner: &NewRunner) -> Result<Runner> {
        decode(&self.call(ApiRequest::CreateRunner(runner)).await?)
    }

    async fn delete_runners(&self, ids: &RunnerIds) -> Result<DeleteOutcome> {
        decode(&self.call(ApiRequest::DeleteRunners(ids)).await?)
    }

    async fn activate_runners(&self, ids: &RunnerIds) -> Result<ActivationOutcome> {
        decode(&self.call(ApiRequest::ActivateRunners(ids)).await?)
    }

    async fn deactivate_runners(&self, ids: &RunnerIds) -> Result<ActivationOutcome> {
        decode(&self.call(ApiRequest::DeactivateRunners(ids)).await?)
    }

    async fn fetch_active_runners(&self) -> Result<Vec<Runner>> {
        decode(&self.call(ApiRequest::ActiveRunners).await?)
    }

    async fn fetch_runner_orders(&self, runner_id: i64) -> Result<Vec<Order>> {
        decode(&self.call(ApiRequest::RunnerOrders(runner_id)).await?)
    }

    async fn fetch_runner_trades(&self, runner_id: i64) -> Result<Vec<ExecutedTrade>> {
        decode(&self.call(ApiRequest::RunnerTrades(runner_id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_paths() {
        let ids = RunnerIds::new(vec![1]);
        assert_eq!(ApiRequest::AccountSnapshot.path(), "/account/snapshot");
        assert_eq!(ApiRequest::DeleteRunners(&ids).path(), "/runners");
        assert_eq!(ApiRequest::DeactivateRunners(&ids).path(), "/runners/deactivate");
        assert_eq!(ApiRequest::RunnerTrades(7).path(), "/runners/7/trades");
    }

    #[test]
    fn test_decode_keeps_typed_view_lenient() {
        let raw = RawValue::from_string(r#"{"connected":null}"#.to_string()).unwrap();
        let status: IbStatus = decode(&raw).unwrap();
        assert!(!status.is_connected());
    }
}
