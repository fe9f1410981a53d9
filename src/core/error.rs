use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("网络请求错误: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("YAML配置错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("WebSocket错误: {0}")]
    WebSocketError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据解析错误: {0}")]
    ParseError(String),

    #[error("其他错误: {0}")]
    Other(String),
}

impl MonitorError {
    /// 判断错误是否可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            MonitorError::NetworkError(_) => true,
            MonitorError::WebSocketError(_) => true,
            // 解析类错误重试也不会变好，直接丢弃对应消息
            _ => false,
        }
    }
}
