// 核心模块 - 配置、错误与类型定义
pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::{
    FeedEnvelope, MonitorSnapshot, Notification, RawInput, RawOutput, RawPrevOut, RawTransaction,
    TradeSignal, TransactionRecord, SATOSHI_PER_BTC,
};
