use crate::core::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::fs;

/// 监控器全局配置
///
/// 从 YAML 文件加载，所有字段均有默认值，不带配置文件也能直接运行。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 事件流地址
    pub ws_url: String,
    /// 连接建立后发送的订阅指令
    pub subscribe_op: String,
    /// 监控阈值（BTC），低于该值的交易直接忽略
    pub threshold: f64,
    /// 特殊大额交易阈值（BTC），超过该值额外产生告警
    pub special_cutoff: f64,
    /// 交易记录缓冲区容量
    pub tx_capacity: usize,
    /// 告警缓冲区容量
    pub notification_capacity: usize,
    /// 告警存活时间（秒）
    pub notification_ttl_secs: u64,
    /// 轮询渲染周期（秒）
    pub poll_interval_secs: u64,
    /// 告警过期检查周期（秒）
    pub notification_check_secs: u64,
    /// 价格查询接口
    pub price_api_url: String,
    /// 展示用交易对符号，目前仅支持 BTC 基础币种
    pub display_symbol: String,
    /// 首次重连等待（秒），指数退避
    pub reconnect_delay_secs: u64,
    /// 重连等待上限（秒）
    pub max_reconnect_delay_secs: u64,
    /// 日志级别
    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://ws.blockchain.info/inv".to_string(),
            subscribe_op: "unconfirmed_sub".to_string(),
            threshold: 50.0,
            special_cutoff: 1000.0,
            tx_capacity: 100,
            notification_capacity: 3,
            notification_ttl_secs: 10,
            poll_interval_secs: 10,
            notification_check_secs: 5,
            price_api_url:
                "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd"
                    .to_string(),
            display_symbol: "BTCUSDC".to_string(),
            reconnect_delay_secs: 5,
            max_reconnect_delay_secs: 60,
            log_level: "INFO".to_string(),
        }
    }
}

impl MonitorConfig {
    /// 从YAML文件加载配置
    pub fn from_file(path: &str) -> Result<Self, MonitorError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MonitorError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        let config: MonitorConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 基本参数校验
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.threshold < 1.0 {
            return Err(MonitorError::ConfigError(format!(
                "threshold 必须 >= 1，当前为 {}",
                self.threshold
            )));
        }
        if self.special_cutoff <= self.threshold {
            return Err(MonitorError::ConfigError(format!(
                "special_cutoff ({}) 必须高于 threshold ({})",
                self.special_cutoff, self.threshold
            )));
        }
        if self.tx_capacity == 0 || self.notification_capacity == 0 {
            return Err(MonitorError::ConfigError(
                "缓冲区容量必须大于 0".to_string(),
            ));
        }
        Ok(())
    }
}
