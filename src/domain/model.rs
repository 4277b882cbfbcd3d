use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_record_id, validate_strictly_positive, Validate,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 後端回傳的欄位若客戶端不認得，原封不動保留在 `extra`
pub type ExtraFields = Map<String, Value>;

/// 後端時間欄位可能是 naive ISO-8601 或帶時區的 RFC 3339，一律轉成 UTC naive
pub mod flexible_datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_utc());
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    }

    pub fn format(value: &NaiveDateTime) -> String {
        value.format(OUTPUT_FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid datetime value: {:?}", s))
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: Option<i64>,
    #[serde(default, with = "flexible_datetime")]
    pub timestamp: Option<NaiveDateTime>,
    pub account: Option<String>,
    pub total_cash_value: Option<f64>,
    pub net_liquidation: Option<f64>,
    pub available_funds: Option<f64>,
    pub buying_power: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    pub realized_pnl: Option<f64>,
    pub excess_liquidity: Option<f64>,
    pub gross_position_value: Option<f64>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub id: Option<i64>,
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
    pub account: Option<String>,
    #[serde(default, with = "flexible_datetime")]
    pub last_update: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<i64>,
    pub runner_id: Option<i64>,
    pub ibkr_perm_id: Option<i64>,
    pub symbol: String,
    pub action: String,
    pub order_type: String,
    pub quantity: f64,
    pub limit_price: Option<f64>,
    pub stop_price: Option<f64>,
    pub status: Option<String>,
    pub filled_quantity: Option<f64>,
    pub avg_fill_price: Option<f64>,
    pub account: Option<String>,
    #[serde(default, with = "flexible_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_datetime")]
    pub last_updated: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutedTrade {
    pub id: Option<i64>,
    pub perm_id: Option<i64>,
    pub symbol: Option<String>,
    pub action: Option<String>,
    pub order_type: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    #[serde(default, with = "flexible_datetime")]
    pub fill_time: Option<NaiveDateTime>,
    pub account: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Activation::Active => "active",
            Activation::Inactive => "inactive",
            Activation::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub id: i64,
    pub name: String,
    pub strategy: String,
    pub budget: f64,
    pub stock: String,
    pub time_frame: u32,
    pub stop_loss: f64,
    pub take_profit: f64,
    #[serde(default, with = "flexible_datetime")]
    pub time_range_from: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_datetime")]
    pub time_range_to: Option<NaiveDateTime>,
    pub commission_ratio: Option<f64>,
    pub exit_strategy: String,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default, with = "flexible_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "flexible_datetime")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `POST /runners` 的請求內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRunner {
    pub name: String,
    pub strategy: String,
    pub budget: f64,
    pub stock: String,
    pub time_frame: u32,
    /// 可以是負值
    pub stop_loss: f64,
    pub take_profit: f64,
    /// 後端自行解析時間字串，客戶端原樣送出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_ratio: Option<f64>,
    pub exit_strategy: String,
    #[serde(default)]
    pub activation: Activation,
}

impl NewRunner {
    /// 股票代號一律大寫，字串欄位去掉前後空白
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.strategy = self.strategy.trim().to_string();
        self.stock = self.stock.trim().to_uppercase();
        self.exit_strategy = self.exit_strategy.trim().to_string();
        self
    }
}

impl Validate for NewRunner {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("strategy", &self.strategy)?;
        validate_non_empty_string("stock", &self.stock)?;
        validate_non_empty_string("exit_strategy", &self.exit_strategy)?;
        validate_strictly_positive("budget", self.budget)?;
        validate_strictly_positive("time_frame", f64::from(self.time_frame))?;
        validate_strictly_positive("take_profit", self.take_profit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerIds {
    pub ids: Vec<i64>,
}

impl RunnerIds {
    pub fn new(ids: impl Into<Vec<i64>>) -> Self {
        Self { ids: ids.into() }
    }
}

impl Validate for RunnerIds {
    fn validate(&self) -> Result<()> {
        if self.ids.is_empty() {
            return Err(crate::utils::error::DashError::ValidationError {
                message: "at least one runner id is required".to_string(),
            });
        }
        for id in &self.ids {
            validate_record_id("ids", *id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationOutcome {
    pub updated: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbStatus {
    #[serde(default)]
    pub connected: Option<bool>,
}

impl IbStatus {
    /// 缺欄位或 null 都當作未連線
    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ib_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ib_password: Option<String>,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("email", &self.email)?;
        validate_non_empty_string("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_runner() -> NewRunner {
        NewRunner {
            name: " breakout ".to_string(),
            strategy: "momentum".to_string(),
            budget: 1000.0,
            stock: " aapl".to_string(),
            time_frame: 5,
            stop_loss: -2.5,
            take_profit: 4.0,
            time_range_from: None,
            time_range_to: None,
            commission_ratio: None,
            exit_strategy: "trailing".to_string(),
            activation: Activation::Active,
        }
    }

    #[test]
    fn test_parse_naive_and_rfc3339_datetimes() {
        let naive = flexible_datetime::parse("2024-05-01T13:00:00.123456").unwrap();
        let with_space = flexible_datetime::parse("2024-05-01 13:00:00").unwrap();
        let offset = flexible_datetime::parse("2024-05-01T15:00:00+02:00").unwrap();

        assert_eq!(with_space, offset);
        assert_eq!(naive.date(), offset.date());
        assert!(flexible_datetime::parse("yesterday").is_none());
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let position: OpenPosition = serde_json::from_value(json!({
            "id": 3,
            "user_id": 9,
            "symbol": "MSFT",
            "quantity": 10.0,
            "avg_price": 401.5,
            "account": "DU123",
            "last_update": "2024-05-01T13:00:00"
        }))
        .unwrap();

        assert_eq!(position.symbol, "MSFT");
        assert_eq!(position.extra.get("user_id"), Some(&json!(9)));

        let back = serde_json::to_value(&position).unwrap();
        assert_eq!(back["user_id"], json!(9));
        assert_eq!(back["last_update"], json!("2024-05-01T13:00:00"));
    }

    #[test]
    fn test_snapshot_accepts_nulls_and_missing_fields() {
        let snapshot: AccountSnapshot = serde_json::from_value(json!({
            "account": "DU123",
            "net_liquidation": 25000.5,
            "realized_pnl": null,
            "timestamp": null
        }))
        .unwrap();

        assert_eq!(snapshot.net_liquidation, Some(25000.5));
        assert_eq!(snapshot.realized_pnl, None);
        assert_eq!(snapshot.timestamp, None);
    }

    #[test]
    fn test_runner_activation_values() {
        let runner: Runner = serde_json::from_value(json!({
            "id": 1,
            "name": "r1",
            "strategy": "s",
            "budget": 100.0,
            "stock": "AAPL",
            "time_frame": 1,
            "stop_loss": -1.0,
            "take_profit": 2.0,
            "exit_strategy": "fixed",
            "activation": "paused"
        }))
        .unwrap();
        assert_eq!(runner.activation, Activation::Unknown);
        assert_eq!(Activation::Inactive.to_string(), "inactive");
    }

    #[test]
    fn test_new_runner_normalization_and_validation() {
        let runner = new_runner().normalized();
        assert_eq!(runner.stock, "AAPL");
        assert_eq!(runner.name, "breakout");
        assert!(runner.validate().is_ok());

        let payload = serde_json::to_value(&runner).unwrap();
        assert!(payload.get("time_range_from").is_none());
        assert_eq!(payload["activation"], json!("active"));

        let mut broke = new_runner();
        broke.budget = 0.0;
        assert!(broke.validate().is_err());

        let mut no_frame = new_runner();
        no_frame.time_frame = 0;
        assert!(no_frame.validate().is_err());

        let mut ranged = new_runner();
        ranged.time_range_from = Some("2024-05-01T09:30:00+02:00".to_string());
        ranged.time_range_to = Some("May 2 2024 16:00".to_string());
        assert!(ranged.validate().is_ok());
        let payload = serde_json::to_value(&ranged).unwrap();
        assert_eq!(payload["time_range_from"], json!("2024-05-01T09:30:00+02:00"));
        assert_eq!(payload["time_range_to"], json!("May 2 2024 16:00"));
    }

    #[test]
    fn test_ib_status_null_means_disconnected() {
        let null: IbStatus = serde_json::from_value(json!({ "connected": null })).unwrap();
        let missing: IbStatus = serde_json::from_value(json!({})).unwrap();
        let up: IbStatus = serde_json::from_value(json!({ "connected": true })).unwrap();

        assert!(!null.is_connected());
        assert!(!missing.is_connected());
        assert!(up.is_connected());
    }

    #[test]
    fn test_runner_ids_validation() {
        assert!(RunnerIds::new(vec![1, 2]).validate().is_ok());
        assert!(RunnerIds::new(Vec::new()).validate().is_err());
        assert!(RunnerIds::new(vec![3, 0]).validate().is_err());
    }

    #[test]
    fn test_signup_request_validation() {
        let request = SignupRequest {
            username: "trader".to_string(),
            email: "trader@example.com".to_string(),
            password: "secret".to_string(),
            ib_username: None,
            ib_password: None,
        };
        assert!(request.validate().is_ok());
        let payload = serde_json::to_value(&request).unwrap();
        assert!(payload.get("ib_username").is_none());

        let local_only = SignupRequest {
            email: "trader-at-desk".to_string(),
            ..request.clone()
        };
        assert!(local_only.validate().is_ok());

        let blank = SignupRequest {
            email: " ".to_string(),
            ..request
        };
        assert!(blank.validate().is_err());
    }
}
