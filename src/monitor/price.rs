use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// 现价查询通道
///
/// 任意失败都退化为 None，由渲染层显示为 N/A，绝不向上抛错。
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn latest_usd_price(&self) -> Option<f64>;
}

/// CoinGecko 简单价格接口响应
#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: Option<UsdQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: Option<f64>,
}

/// CoinGecko 现价查询实现
pub struct CoinGeckoPriceSource {
    client: Client,
    url: String,
}

impl CoinGeckoPriceSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPriceSource {
    async fn latest_usd_price(&self) -> Option<f64> {
        let response = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                log::debug!("[price] BTC价格请求失败: {}", err);
                return None;
            }
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                log::debug!("[price] 价格接口触发限流 (429)");
                return None;
            }
            status => {
                log::debug!("[price] 价格接口返回异常状态: {}", status);
                return None;
            }
        }

        match response.json::<SimplePriceResponse>().await {
            Ok(body) => body.bitcoin.and_then(|quote| quote.usd),
            Err(err) => {
                log::debug!("[price] 价格响应解析失败: {}", err);
                None
            }
        }
    }
}
