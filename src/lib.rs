pub mod core;
pub mod monitor;
pub mod utils;

// 选择性导出，避免命名冲突
pub use crate::core::{config::*, error::*, types::*};
pub use monitor::{
    classify, CoinGeckoPriceSource, DashboardView, MonitorState, PollingBridge, PriceSource,
    TxListener,
};
pub use utils::base_symbol;
