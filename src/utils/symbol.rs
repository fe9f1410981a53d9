use once_cell::sync::Lazy;

/// 常见的报价货币列表（按优先级排序）
static QUOTE_CURRENCIES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // 稳定币（优先级最高）
        "USDT", "USDC", // 主要加密货币与法币
        "BTC", "USD", "EUR",
    ]
});

/// 从交易对符号推导基础币种
///
/// BTCUSDC -> BTC，ETH/USDT -> ETH，无法识别时原样返回。
pub fn base_symbol(full_symbol: &str) -> &str {
    if full_symbol.is_empty() {
        return "BTC";
    }

    // 先按分隔符拆分
    for sep in ['/', '-', '_'] {
        if let Some((base, _)) = full_symbol.split_once(sep) {
            return base;
        }
    }

    // 再尝试剥离已知报价货币后缀
    for quote in QUOTE_CURRENCIES.iter() {
        if full_symbol.len() > quote.len() && full_symbol.ends_with(quote) {
            return &full_symbol[..full_symbol.len() - quote.len()];
        }
    }

    full_symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_quote_suffix() {
        assert_eq!(base_symbol("BTCUSDC"), "BTC");
        assert_eq!(base_symbol("ETHUSDT"), "ETH");
    }

    #[test]
    fn splits_on_separator() {
        assert_eq!(base_symbol("BTC/USDT"), "BTC");
        assert_eq!(base_symbol("SOL-USDC"), "SOL");
    }

    #[test]
    fn unknown_format_passes_through() {
        assert_eq!(base_symbol("DOGE"), "DOGE");
        assert_eq!(base_symbol(""), "BTC");
    }
}
