// 监控模块 - 事件流监听、共享状态、价格查询与轮询渲染
pub mod bridge;
pub mod classifier;
pub mod listener;
pub mod price;
pub mod state;

pub use bridge::{ChartPoint, DashboardView, PollingBridge, TableRow};
pub use classifier::{classify, WHALE_VALUE_CUTOFF};
pub use listener::TxListener;
pub use price::{CoinGeckoPriceSource, PriceSource};
pub use state::MonitorState;
