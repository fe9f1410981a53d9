use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::time::{interval, Duration};

use crate::core::config::MonitorConfig;
use crate::core::types::TransactionRecord;
use crate::monitor::price::PriceSource;
use crate::monitor::state::MonitorState;
use crate::utils::symbol::base_symbol;

/// 表格中展示的行数上限
const TABLE_ROW_LIMIT: usize = 10;

/// 渲染给表格的一行
#[derive(Debug, Clone)]
pub struct TableRow {
    pub time: String,
    pub value: f64,
    pub signal: String,
    pub num_inputs: usize,
    pub num_outputs: usize,
    /// 现价换算的美元金额，价格不可用时为 "N/A"
    pub usd_value: String,
}

/// 时间序列图的一个数据点
#[derive(Debug, Clone)]
pub struct ChartPoint {
    pub time: DateTime<Local>,
    pub value: f64,
}

/// 一次轮询产出的完整视图数据
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub alerts: Vec<String>,
    pub table_rows: Vec<TableRow>,
    pub chart_points: Vec<ChartPoint>,
    /// 无数据或币种不支持时的占位提示
    pub status: Option<String>,
}

impl DashboardView {
    /// 渲染到控制台
    pub fn render(&self) {
        println!("\n========== 大额交易监控 ==========");

        for alert in &self.alerts {
            println!("⚠️  {}", alert);
        }

        if let Some(status) = &self.status {
            println!("{}", status);
            println!("==================================");
            return;
        }

        println!(
            "{:<20} {:>12} {:<28} {:>6} {:>6} {:>12}",
            "时间", "金额(BTC)", "信号", "输入数", "输出数", "金额(USD)"
        );
        for row in &self.table_rows {
            println!(
                "{:<20} {:>12.2} {:<28} {:>6} {:>6} {:>12}",
                row.time, row.value, row.signal, row.num_inputs, row.num_outputs, row.usd_value
            );
        }

        if let Some(latest) = self.chart_points.last() {
            println!(
                "图表数据点: {} (最新 {:.2} BTC @ {})",
                self.chart_points.len(),
                latest.value,
                latest.time.format("%H:%M:%S")
            );
        }
        println!("==================================");
    }
}

/// 轮询桥
///
/// 由定时器驱动：每个周期对共享状态取快照，合并进本地展示历史，
/// 按当前阈值过滤后产出表格与图表数据。监听线程从不直接触碰
/// 渲染侧，两者只通过共享缓冲区通信。
pub struct PollingBridge<P: PriceSource> {
    config: MonitorConfig,
    state: Arc<MonitorState>,
    price: P,
    /// 本地展示历史，只增不改，进程重启即丢失
    history: Vec<TransactionRecord>,
}

impl<P: PriceSource> PollingBridge<P> {
    pub fn new(config: MonitorConfig, state: Arc<MonitorState>, price: P) -> Self {
        Self {
            config,
            state,
            price,
            history: Vec::new(),
        }
    }

    /// 周期循环：轮询周期产出完整视图，告警检查周期只做过期清理
    pub async fn run(&mut self) {
        let mut poll_timer = interval(Duration::from_secs(self.config.poll_interval_secs));
        let mut notification_timer =
            interval(Duration::from_secs(self.config.notification_check_secs));

        loop {
            tokio::select! {
                _ = poll_timer.tick() => {
                    let view = self.tick().await;
                    view.render();
                }
                _ = notification_timer.tick() => {
                    self.state.prune_expired_notifications(Utc::now());
                }
            }
        }
    }

    /// 单次轮询：清理过期告警、取快照、合并历史、过滤、构建视图
    pub async fn tick(&mut self) -> DashboardView {
        self.state.prune_expired_notifications(Utc::now());
        let snapshot = self.state.snapshot();

        let alerts: Vec<String> = snapshot
            .notifications
            .iter()
            .map(|note| format!("{}: {}", note.time, note.message))
            .collect();

        if base_symbol(&self.config.display_symbol) != "BTC" {
            return DashboardView {
                alerts,
                status: Some(format!(
                    "暂不支持 {} 的大额交易监控",
                    base_symbol(&self.config.display_symbol)
                )),
                ..DashboardView::default()
            };
        }

        self.merge_history(snapshot.transactions);

        let threshold = self.state.threshold();
        let filtered: Vec<&TransactionRecord> = self
            .history
            .iter()
            .filter(|rec| rec.value >= threshold)
            .collect();

        if filtered.is_empty() {
            return DashboardView {
                alerts,
                status: Some(format!("尚未检测到超过 {} BTC 的交易", threshold)),
                ..DashboardView::default()
            };
        }

        let usd_price = self.price.latest_usd_price().await;

        let skip = filtered.len().saturating_sub(TABLE_ROW_LIMIT);
        let table_rows = filtered
            .iter()
            .skip(skip)
            .map(|rec| TableRow {
                time: rec.time.format("%Y-%m-%d %H:%M:%S").to_string(),
                value: rec.value,
                signal: rec.signal.to_string(),
                num_inputs: rec.num_inputs,
                num_outputs: rec.num_outputs,
                usd_value: match usd_price {
                    Some(price) => format!("{:.0}", rec.value * price),
                    None => "N/A".to_string(),
                },
            })
            .collect();

        let chart_points = filtered
            .iter()
            .map(|rec| ChartPoint {
                time: rec.time,
                value: rec.value,
            })
            .collect();

        DashboardView {
            alerts,
            table_rows,
            chart_points,
            status: None,
        }
    }

    /// 把快照合并进展示历史
    ///
    /// 以 (到达时间, 金额) 去重，只追加不改写；超出容量时淘汰最旧的。
    fn merge_history(&mut self, records: Vec<TransactionRecord>) {
        for record in records {
            let duplicate = self.history.iter().any(|held| {
                held.time == record.time && held.value.to_bits() == record.value.to_bits()
            });
            if !duplicate {
                self.history.push(record);
            }
        }

        if self.history.len() > self.config.tx_capacity {
            let excess = self.history.len() - self.config.tx_capacity;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TradeSignal;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// 返回固定价格的测试桩
    struct FixedPrice(Option<f64>);

    #[async_trait]
    impl PriceSource for FixedPrice {
        async fn latest_usd_price(&self) -> Option<f64> {
            self.0
        }
    }

    fn record(seq: i64, value: f64) -> TransactionRecord {
        TransactionRecord {
            time: Local.timestamp_opt(1_700_000_000 + seq, 0).unwrap(),
            value,
            signal: TradeSignal::Neutral,
            num_inputs: 1,
            num_outputs: 1,
        }
    }

    fn bridge(price: Option<f64>) -> PollingBridge<FixedPrice> {
        let config = MonitorConfig::default();
        let state = MonitorState::new(&config);
        PollingBridge::new(config, state, FixedPrice(price))
    }

    #[tokio::test]
    async fn table_keeps_last_ten_chart_keeps_all() {
        let mut bridge = bridge(None);
        for i in 0..15 {
            bridge.state.append_transaction(record(i, 60.0 + i as f64));
        }

        let view = bridge.tick().await;
        assert_eq!(view.table_rows.len(), 10);
        assert_eq!(view.chart_points.len(), 15);
        // 表格保留最新 10 条
        assert_eq!(view.table_rows[0].value, 65.0);
        assert_eq!(view.table_rows[9].value, 74.0);
        assert!(view.status.is_none());
    }

    #[tokio::test]
    async fn repeated_polls_do_not_duplicate_history() {
        let mut bridge = bridge(None);
        for i in 0..5 {
            bridge.state.append_transaction(record(i, 70.0));
        }

        let first = bridge.tick().await;
        let second = bridge.tick().await;
        assert_eq!(first.chart_points.len(), 5);
        assert_eq!(second.chart_points.len(), 5);
    }

    #[tokio::test]
    async fn threshold_filters_view_but_not_history() {
        let mut bridge = bridge(None);
        bridge.state.append_transaction(record(0, 60.0));
        bridge.state.append_transaction(record(1, 200.0));

        bridge.state.set_threshold(100.0);
        let view = bridge.tick().await;
        assert_eq!(view.chart_points.len(), 1);
        assert_eq!(view.table_rows[0].value, 200.0);

        // 阈值调回后历史里的低额记录重新可见
        bridge.state.set_threshold(50.0);
        let view = bridge.tick().await;
        assert_eq!(view.chart_points.len(), 2);
    }

    #[tokio::test]
    async fn usd_column_degrades_to_sentinel() {
        let mut bridge = bridge(None);
        bridge.state.append_transaction(record(0, 100.0));
        let view = bridge.tick().await;
        assert_eq!(view.table_rows[0].usd_value, "N/A");

        let mut bridge = self::bridge(Some(60000.0));
        bridge.state.append_transaction(record(0, 100.0));
        let view = bridge.tick().await;
        assert_eq!(view.table_rows[0].usd_value, "6000000");
    }

    #[tokio::test]
    async fn unsupported_symbol_renders_placeholder() {
        let config = MonitorConfig {
            display_symbol: "ETHUSDT".to_string(),
            ..MonitorConfig::default()
        };
        let state = MonitorState::new(&config);
        state.append_transaction(record(0, 100.0));
        let mut bridge = PollingBridge::new(config, state, FixedPrice(None));

        let view = bridge.tick().await;
        assert!(view.status.unwrap().contains("ETH"));
        assert!(view.table_rows.is_empty());
    }

    #[tokio::test]
    async fn expired_alerts_are_pruned_before_render() {
        use crate::core::types::Notification;
        use chrono::Duration as ChronoDuration;

        let mut bridge = bridge(None);
        bridge.state.append_notification(Notification::new(
            "stale".to_string(),
            Utc::now() - ChronoDuration::seconds(30),
        ));
        bridge
            .state
            .append_notification(Notification::new("fresh".to_string(), Utc::now()));

        let view = bridge.tick().await;
        assert_eq!(view.alerts.len(), 1);
        assert!(view.alerts[0].contains("fresh"));
    }

    #[tokio::test]
    async fn empty_state_reports_status_message() {
        let mut bridge = bridge(None);
        let view = bridge.tick().await;
        assert!(view.status.unwrap().contains("尚未检测到"));
    }
}
