use crate::core::dashboard::DashboardView;
use crate::domain::model::{AccountSnapshot, ExecutedTrade, OpenPosition, Order, Runner};
use chrono::NaiveDateTime;

const EMPTY: &str = "-";

/// 純文字表格，欄寬取每欄最長的內容
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_row = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![format_row(self.headers.clone())];
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        if self.rows.is_empty() {
            lines.push("(none)".to_string());
        }
        for row in &self.rows {
            lines.push(format_row(row.iter().map(String::as_str).collect()));
        }
        lines.join("\n")
    }
}

fn money(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| EMPTY.to_string())
}

fn quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(EMPTY).to_string()
}

fn timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

pub fn render_snapshot(snapshot: &AccountSnapshot) -> String {
    let mut table = Table::new(vec!["field", "value"]);
    let rows = [
        ("account", text(snapshot.account.as_deref())),
        ("timestamp", timestamp(snapshot.timestamp)),
        ("net liquidation", money(snapshot.net_liquidation)),
        ("total cash", money(snapshot.total_cash_value)),
        ("available funds", money(snapshot.available_funds)),
        ("buying power", money(snapshot.buying_power)),
        ("excess liquidity", money(snapshot.excess_liquidity)),
        ("gross position value", money(snapshot.gross_position_value)),
        ("unrealized pnl", money(snapshot.unrealized_pnl)),
        ("realized pnl", money(snapshot.realized_pnl)),
    ];
    for (field, value) in rows {
        table.push(vec![field.to_string(), value]);
    }
    table.render()
}

pub fn render_positions(positions: &[OpenPosition]) -> String {
    let mut table = Table::new(vec!["symbol", "quantity", "avg price", "account", "updated"]);
    for p in positions {
        table.push(vec![
            p.symbol.clone(),
            quantity(p.quantity),
            money(Some(p.avg_price)),
            text(p.account.as_deref()),
            timestamp(p.last_update),
        ]);
    }
    table.render()
}

pub fn render_orders(orders: &[Order]) -> String {
    let mut table = Table::new(vec![
        "perm id", "runner", "symbol", "action", "type", "qty", "limit", "stop", "status",
        "filled", "avg fill", "created",
    ]);
    for o in orders {
        table.push(vec![
            o.ibkr_perm_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| EMPTY.to_string()),
            o.runner_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| EMPTY.to_string()),
            o.symbol.clone(),
            o.action.clone(),
            o.order_type.clone(),
            quantity(o.quantity),
            money(o.limit_price),
            money(o.stop_price),
            text(o.status.as_deref()),
            o.filled_quantity
                .map(quantity)
                .unwrap_or_else(|| EMPTY.to_string()),
            money(o.avg_fill_price),
            timestamp(o.created_at),
        ]);
    }
    table.render()
}

pub fn render_trades(trades: &[ExecutedTrade]) -> String {
    let mut table = Table::new(vec![
        "perm id", "symbol", "action", "type", "qty", "price", "filled at", "account",
    ]);
    for t in trades {
        table.push(vec![
            t.perm_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| EMPTY.to_string()),
            text(t.symbol.as_deref()),
            text(t.action.as_deref()),
            text(t.order_type.as_deref()),
            t.quantity.map(quantity).unwrap_or_else(|| EMPTY.to_string()),
            money(t.price),
            timestamp(t.fill_time),
            text(t.account.as_deref()),
        ]);
    }
    table.render()
}

pub fn render_runners(runners: &[Runner]) -> String {
    let mut table = Table::new(vec![
        "id", "name", "strategy", "stock", "budget", "tf", "sl", "tp", "exit", "activation",
    ]);
    for r in runners {
        table.push(vec![
            r.id.to_string(),
            r.name.clone(),
            r.strategy.clone(),
            r.stock.clone(),
            money(Some(r.budget)),
            r.time_frame.to_string(),
            format!("{}", r.stop_loss),
            format!("{}", r.take_profit),
            r.exit_strategy.clone(),
            r.activation.to_string(),
        ]);
    }
    table.render()
}

pub fn render_ib_status(connected: bool) -> String {
    if connected {
        "IB gateway: connected".to_string()
    } else {
        "IB gateway: disconnected".to_string()
    }
}

fn section(title: &str, body: Option<String>) -> String {
    let body = body.unwrap_or_else(|| "(unavailable)".to_string());
    format!("== {} ==\n{}", title, body)
}

pub fn render_view(view: &DashboardView) -> String {
    [
        render_ib_status(view.ib_connected),
        section("Account", view.snapshot.as_ref().map(render_snapshot)),
        section(
            "Open positions",
            view.positions.as_deref().map(render_positions),
        ),
        section("Orders", view.orders.as_deref().map(render_orders)),
        section(
            "Executed trades",
            view.trades.as_deref().map(render_trades),
        ),
    ]
    .join("\n\n")
}
