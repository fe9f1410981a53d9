use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Local, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::core::config::MonitorConfig;
use crate::core::types::{FeedEnvelope, Notification, TransactionRecord};
use crate::monitor::classifier::classify;
use crate::monitor::state::MonitorState;

/// 未确认交易事件流监听器
///
/// 订阅上游推送，逐条解析并写入共享状态。连接断开由监督循环
/// 指数退避重连，组件本身对单条消息无状态。
pub struct TxListener {
    config: MonitorConfig,
    state: Arc<MonitorState>,
}

impl TxListener {
    pub fn new(config: MonitorConfig, state: Arc<MonitorState>) -> Self {
        Self { config, state }
    }

    /// 启动受监督的后台监听任务
    ///
    /// 任务句柄交由调用方保管，进程退出前不会自行结束。
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial_delay = Duration::from_secs(self.config.reconnect_delay_secs);
            let max_delay = Duration::from_secs(self.config.max_reconnect_delay_secs);
            let mut retry_delay = initial_delay;

            loop {
                match self.run_stream_once().await {
                    Ok(()) => {
                        log::warn!("[listener] 事件流被远端关闭，立即重新订阅");
                        retry_delay = initial_delay;
                    }
                    Err(err) => {
                        log::error!(
                            "[listener] 事件流运行异常: {}，{} 秒后重试",
                            err,
                            retry_delay.as_secs()
                        );
                        sleep(retry_delay).await;
                        retry_delay = (retry_delay * 2).min(max_delay);
                    }
                }
            }
        })
    }

    /// 建立一次连接并持续消费，返回即代表连接已结束
    async fn run_stream_once(&self) -> Result<()> {
        log::info!("[listener] 正在连接事件流: {}", self.config.ws_url);

        let (ws_stream, _) = connect_async(self.config.ws_url.as_str())
            .await
            .map_err(|e| anyhow!("连接失败: {}", e))?;
        let (mut write, mut read) = ws_stream.split();

        let subscribe = json!({ "op": self.config.subscribe_op }).to_string();
        write
            .send(Message::Text(subscribe))
            .await
            .map_err(|e| anyhow!("发送订阅指令失败: {}", e))?;
        log::info!("[listener] ✅ 已订阅 {}", self.config.subscribe_op);

        let mut message_count: u64 = 0;
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    message_count += 1;
                    self.handle_frame(&text);

                    if message_count % 200 == 0 {
                        log::debug!("[listener] 累计处理 {} 条消息", message_count);
                    }
                }
                Ok(Message::Ping(data)) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(_)) => {
                    log::info!("[listener] 收到关闭帧");
                    return Ok(());
                }
                Ok(_) => {}
                Err(err) => {
                    return Err(anyhow!("接收错误: {}", err));
                }
            }
        }

        Ok(())
    }

    /// 处理一条文本帧
    ///
    /// 监控关闭时整体跳过，告警路径也一并被抑制。
    /// 非法 JSON 或缺少交易信封的报文静默丢弃。
    pub fn handle_frame(&self, text: &str) {
        if !self.state.is_active() {
            return;
        }

        let envelope: FeedEnvelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                log::trace!("[listener] 报文丢弃: {}", err);
                return;
            }
        };

        let tx = envelope.tx;
        let btc_value = tx.btc_value();
        if btc_value < self.state.threshold() {
            return;
        }

        if btc_value > self.config.special_cutoff {
            let note = Notification::new(
                format!("⚠️ Special Transaction Detected: {:.2} BTC", btc_value),
                Utc::now(),
            );
            log::info!("[listener] {}", note.message);
            self.state.append_notification(note);
        }

        let num_inputs = tx.inputs.len();
        let num_outputs = tx.outputs.len();
        let signal = classify(
            btc_value,
            num_inputs,
            num_outputs,
            tx.distinct_output_addresses(),
        );

        log::debug!(
            "[listener] 大额交易 hash={} value={:.4} BTC fee_rate={:.2} sat/B signal={}",
            tx.hash.as_deref().unwrap_or("N/A"),
            btc_value,
            tx.fee_per_byte(),
            signal
        );

        self.state.append_transaction(TransactionRecord {
            time: Local::now(),
            value: btc_value,
            signal,
            num_inputs,
            num_outputs,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TradeSignal;

    fn listener() -> TxListener {
        let config = MonitorConfig::default();
        let state = MonitorState::new(&config);
        TxListener::new(config, state)
    }

    /// 构造一条带 n 个等额输出的合成报文
    fn frame(total_satoshi: u64, num_inputs: usize, num_outputs: usize) -> String {
        let inputs: Vec<_> = (0..num_inputs)
            .map(|i| json!({ "prev_out": { "addr": format!("1in{}", i) } }))
            .collect();
        let outputs: Vec<_> = (0..num_outputs)
            .map(|i| {
                json!({
                    "value": total_satoshi / num_outputs as u64,
                    "addr": format!("1out{}", i),
                })
            })
            .collect();
        json!({
            "op": "utx",
            "x": {
                "hash": "deadbeef",
                "inputs": inputs,
                "out": outputs,
                "size": 250,
                "fee": 1000,
                "time": 1700000000,
            }
        })
        .to_string()
    }

    #[test]
    fn qualifying_event_produces_one_record() {
        let listener = listener();
        // 150 * 10^8 聪 => 150 BTC，阈值 50
        listener.handle_frame(&frame(150 * 100_000_000, 1, 1));

        let snap = listener.state.snapshot();
        assert_eq!(snap.transactions.len(), 1);
        assert!((snap.transactions[0].value - 150.0).abs() < 1e-9);
        assert_eq!(snap.transactions[0].signal, TradeSignal::Neutral);
        assert_eq!(snap.transactions[0].num_inputs, 1);
        assert_eq!(snap.transactions[0].num_outputs, 1);
        assert!(snap.notifications.is_empty());
    }

    #[test]
    fn special_event_also_produces_notification() {
        let listener = listener();
        listener.handle_frame(&frame(1200 * 100_000_000, 1, 1));

        let snap = listener.state.snapshot();
        assert_eq!(snap.transactions.len(), 1);
        assert_eq!(snap.transactions[0].signal, TradeSignal::WhaleMove);
        assert_eq!(snap.notifications.len(), 1);
        assert!(snap.notifications[0]
            .message
            .contains("Special Transaction Detected: 1200.00 BTC"));
    }

    #[test]
    fn below_threshold_event_is_ignored() {
        let listener = listener();
        listener.handle_frame(&frame(10 * 100_000_000, 1, 1));
        assert!(listener.state.snapshot().transactions.is_empty());
    }

    #[test]
    fn inactive_monitor_suppresses_records_and_notifications() {
        let listener = listener();
        listener.state.set_active(false);
        listener.handle_frame(&frame(1200 * 100_000_000, 1, 1));

        let snap = listener.state.snapshot();
        assert!(snap.transactions.is_empty());
        // 开关同时抑制告警
        assert!(snap.notifications.is_empty());
    }

    #[test]
    fn reenabled_monitor_resumes_processing() {
        let listener = listener();
        listener.state.set_active(false);
        listener.handle_frame(&frame(150 * 100_000_000, 1, 1));
        listener.state.set_active(true);
        listener.handle_frame(&frame(150 * 100_000_000, 1, 1));
        assert_eq!(listener.state.snapshot().transactions.len(), 1);
    }

    #[test]
    fn malformed_frames_are_dropped_silently() {
        let listener = listener();
        listener.handle_frame("not json at all");
        listener.handle_frame(r#"{"op":"pong"}"#);
        listener.handle_frame(r#"{"x": 42}"#);
        assert!(listener.state.snapshot().transactions.is_empty());
    }

    #[test]
    fn runtime_threshold_change_applies_per_event() {
        let listener = listener();
        listener.state.set_threshold(200.0);
        listener.handle_frame(&frame(150 * 100_000_000, 1, 1));
        assert!(listener.state.snapshot().transactions.is_empty());

        listener.state.set_threshold(100.0);
        listener.handle_frame(&frame(150 * 100_000_000, 1, 1));
        assert_eq!(listener.state.snapshot().transactions.len(), 1);
    }
}
