// 工具模块
pub mod symbol;

pub use symbol::base_symbol;
