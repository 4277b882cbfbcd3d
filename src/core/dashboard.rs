use crate::domain::model::{
    AccountSnapshot, ActivationOutcome, DeleteOutcome, ExecutedTrade, IbStatus, NewRunner,
    OpenPosition, Order, Runner, RunnerIds,
};
use crate::domain::ports::{decode, ApiRequest, DashboardApi, RawJson};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 一次刷新得到的所有面板，失敗的面板為 `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub snapshot: Option<AccountSnapshot>,
    pub positions: Option<Vec<OpenPosition>>,
    pub orders: Option<Vec<Order>>,
    pub trades: Option<Vec<ExecutedTrade>>,
    pub ib_connected: bool,
}

impl DashboardView {
    pub fn failed_panels(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if self.snapshot.is_none() {
            failed.push("snapshot");
        }
        if self.positions.is_none() {
            failed.push("positions");
        }
        if self.orders.is_none() {
            failed.push("orders");
        }
        if self.trades.is_none() {
            failed.push("trades");
        }
        failed
    }
}

/// 各面板的原始回應，序列化時原封不動嵌入
#[derive(Debug, Default, Serialize)]
pub struct RawDashboardView {
    pub snapshot: Option<RawJson>,
    pub positions: Option<RawJson>,
    pub orders: Option<RawJson>,
    pub trades: Option<RawJson>,
    pub ib_status: Option<RawJson>,
}

impl RawDashboardView {
    /// 解碼失敗的面板同樣記錄後視為失敗
    pub fn decoded(&self) -> DashboardView {
        DashboardView {
            snapshot: decode_panel("account snapshot", &self.snapshot),
            positions: decode_panel("open positions", &self.positions),
            orders: decode_panel("orders", &self.orders),
            trades: decode_panel("executed trades", &self.trades),
            ib_connected: decode_panel::<IbStatus>("IB status", &self.ib_status)
                .is_some_and(|status| status.is_connected()),
        }
    }
}

fn decode_panel<T: DeserializeOwned>(panel: &str, raw: &Option<RawJson>) -> Option<T> {
    let raw = raw.as_deref()?;
    masked(&format!("decoding {}", panel), decode(raw))
}

/// 儀表板層：錯誤一律記錄後轉成哨兵值，不往上拋
pub struct Dashboard<A: DashboardApi> {
    api: A,
}

fn masked<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(
                "❌ Error {}: {} (Category: {:?})",
                operation,
                e,
                e.category()
            );
            None
        }
    }
}

impl<A: DashboardApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn fetch_account_snapshot(&self) -> Option<AccountSnapshot> {
        masked(
            "fetching account snapshot",
            self.api.fetch_account_snapshot().await,
        )
    }

    pub async fn fetch_open_positions(&self) -> Option<Vec<OpenPosition>> {
        masked(
            "fetching open positions",
            self.api.fetch_open_positions().await,
        )
    }

    pub async fn fetch_orders(&self) -> Option<Vec<Order>> {
        masked("fetching orders", self.api.fetch_orders().await)
    }

    pub async fn fetch_executed_trades(&self) -> Option<Vec<ExecutedTrade>> {
        masked(
            "fetching executed trades",
            self.api.fetch_executed_trades().await,
        )
    }

    /// 取不到狀態時視為未連線
    pub async fn fetch_ib_status(&self) -> bool {
        masked("fetching IB status", self.api.fetch_ib_status().await).unwrap_or(false)
    }

    pub async fn create_runner(&self, runner: &NewRunner) -> Option<Runner> {
        masked("creating runner", self.api.create_runner(runner).await)
    }

    pub async fn delete_runners(&self, ids: &RunnerIds) -> Option<DeleteOutcome> {
        masked("deleting runners", self.api.delete_runners(ids).await)
    }

    pub async fn activate_runners(&self, ids: &RunnerIds) -> Option<ActivationOutcome> {
        masked("activating runners", self.api.activate_runners(ids).await)
    }

    pub async fn deactivate_runners(&self, ids: &RunnerIds) -> Option<ActivationOutcome> {
        masked(
            "deactivating runners",
            self.api.deactivate_runners(ids).await,
        )
    }

    pub async fn fetch_active_runners(&self) -> Option<Vec<Runner>> {
        masked(
            "fetching active runners",
            self.api.fetch_active_runners().await,
        )
    }

    pub async fn fetch_runner_orders(&self, runner_id: i64) -> Option<Vec<Order>> {
        masked(
            "fetching runner orders",
            self.api.fetch_runner_orders(runner_id).await,
        )
    }

    pub async fn fetch_runner_trades(&self, runner_id: i64) -> Option<Vec<ExecutedTrade>> {
        masked(
            "fetching runner trades",
            self.api.fetch_runner_trades(runner_id).await,
        )
    }

    /// 原始回應版本，失敗時為 `None`
    pub async fn call(&self, request: ApiRequest<'_>) -> Option<RawJson> {
        let operation = format!("calling {}", request.path());
        masked(&operation, self.api.call(request).await)
    }

    /// 五個面板同時發出請求，彼此獨立
    pub async fn refresh_raw(&self) -> RawDashboardView {
        tracing::info!("Refreshing dashboard...");

        let (snapshot, positions, orders, trades, ib_status) = tokio::join!(
            self.call(ApiRequest::AccountSnapshot),
            self.call(ApiRequest::OpenPositions),
            self.call(ApiRequest::Orders),
            self.call(ApiRequest::ExecutedTrades),
            self.call(ApiRequest::IbStatus),
        );

        RawDashboardView {
            snapshot,
            positions,
            orders,
            trades,
            ib_status,
        }
    }

    pub async fn refresh(&self) -> DashboardView {
        let view = self.refresh_raw().await.decoded();

        let failed = view.failed_panels();
        if failed.is_empty() {
            tracing::info!("✅ Dashboard refreshed");
        } else {
            tracing::warn!("Dashboard refreshed with failed panels: {}", failed.join(", "));
        }
        view
    }
}
