use chrono::{DateTime, Local, Utc};
/// 统一的类型定义模块
/// 整合了链上监控相关的数据结构
use serde::{Deserialize, Serialize};

// ============= 基础类型定义 =============

/// 结果类型别名
pub type Result<T> = std::result::Result<T, crate::core::error::MonitorError>;

/// 1 BTC = 10^8 聪
pub const SATOSHI_PER_BTC: f64 = 100_000_000.0;

/// 交易信号分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSignal {
    /// 巨鲸转移
    WhaleMove,
    /// 疑似交易所充值
    ExchangeDeposit,
    /// 分发/派发
    Distribution,
    /// 中性
    Neutral,
}

impl std::fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            TradeSignal::WhaleMove => "Whale Move",
            TradeSignal::ExchangeDeposit => "Possible Exchange Deposit",
            TradeSignal::Distribution => "Distribution",
            TradeSignal::Neutral => "Neutral",
        };
        write!(f, "{}", label)
    }
}

// ============= 事件流原始报文 =============

/// 订阅流的顶层信封，交易载荷位于 "x" 键
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    #[serde(rename = "x")]
    pub tx: RawTransaction,
}

/// 未确认交易的原始报文（仅在解析期间存在）
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub inputs: Vec<RawInput>,
    #[serde(default, rename = "out")]
    pub outputs: Vec<RawOutput>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub fee: u64,
    /// 上游给出的发起时间（Unix 秒）
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub prev_out: Option<RawPrevOut>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrevOut {
    #[serde(default)]
    pub addr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOutput {
    /// 输出金额，单位为聪
    #[serde(default)]
    pub value: u64,
    #[serde(default)]
    pub addr: Option<String>,
}

impl RawTransaction {
    /// 总输出金额（聪）
    pub fn total_value_satoshi(&self) -> u64 {
        self.outputs.iter().map(|out| out.value).sum()
    }

    /// 总输出金额（BTC）
    pub fn btc_value(&self) -> f64 {
        self.total_value_satoshi() as f64 / SATOSHI_PER_BTC
    }

    /// 去重后的输出地址数量
    pub fn distinct_output_addresses(&self) -> usize {
        let mut addrs: Vec<&str> = self
            .outputs
            .iter()
            .filter_map(|out| out.addr.as_deref())
            .collect();
        addrs.sort_unstable();
        addrs.dedup();
        addrs.len()
    }

    /// 每字节手续费（聪/字节），size 为 0 时返回 0
    pub fn fee_per_byte(&self) -> f64 {
        if self.size > 0 {
            self.fee as f64 / self.size as f64
        } else {
            0.0
        }
    }
}

// ============= 监控留存数据 =============

/// 监控器留存的交易记录，创建后只读
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    /// 到达监控器的本地时间，用于展示与图表排序
    pub time: DateTime<Local>,
    /// 交易金额（BTC）
    pub value: f64,
    pub signal: TradeSignal,
    pub num_inputs: usize,
    pub num_outputs: usize,
}

/// 大额交易的临时告警
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// 可读时间字符串，用于展示
    pub time: String,
    pub message: String,
    /// 创建时间，用于过期判断
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: String, created_at: DateTime<Utc>) -> Self {
        Self {
            time: created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            message,
            created_at,
        }
    }
}

/// 共享状态的一致性快照，拷贝后读取无需再加锁
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    pub transactions: Vec<TransactionRecord>,
    pub notifications: Vec<Notification>,
}
