use crate::core::types::TradeSignal;

/// 巨鲸判定的金额下限（BTC）
pub const WHALE_VALUE_CUTOFF: f64 = 1000.0;

/// 根据交易特征给出信号分类
///
/// 判定顺序固定：巨鲸 -> 交易所充值 -> 分发 -> 中性，先命中者生效。
/// 纯函数，无副作用。
pub fn classify(
    btc_value: f64,
    num_inputs: usize,
    num_outputs: usize,
    num_output_addresses: usize,
) -> TradeSignal {
    if btc_value > WHALE_VALUE_CUTOFF && num_inputs <= 2 && num_outputs <= 2 {
        TradeSignal::WhaleMove
    } else if num_inputs > 5 && num_output_addresses == 1 {
        TradeSignal::ExchangeDeposit
    } else if num_inputs < 3 && num_outputs > 10 {
        TradeSignal::Distribution
    } else {
        TradeSignal::Neutral
    }
}
