use clap::{Arg, Command};
use whalemon::{
    core::config::MonitorConfig,
    monitor::{CoinGeckoPriceSource, MonitorState, PollingBridge, TxListener},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 解析命令行参数
    let matches = Command::new("whalemon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("比特币大额交易实时监控")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（YAML），缺省使用内置默认值"),
        )
        .arg(
            Arg::new("threshold")
                .short('t')
                .long("threshold")
                .value_name("BTC")
                .help("启动时覆盖监控阈值（BTC）"),
        )
        .get_matches();

    // 加载配置
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };

    if let Some(raw) = matches.get_one::<String>("threshold") {
        let threshold: f64 = raw
            .parse()
            .map_err(|_| format!("无效的阈值参数: {}", raw))?;
        config.threshold = threshold;
        config.validate()?;
    }

    // 设置日志级别
    std::env::set_var("RUST_LOG", &config.log_level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    log::info!(
        "启动大额交易监控: 阈值 {} BTC, 特殊告警线 {} BTC, 日志级别: {}",
        config.threshold,
        config.special_cutoff,
        config.log_level
    );

    // 构建共享状态，监听任务与轮询桥各持一份引用
    let state = MonitorState::new(&config);

    let listener = TxListener::new(config.clone(), state.clone());
    let listener_handle = listener.spawn();
    log::info!("✅ 事件流监听任务已启动");

    let price_source = CoinGeckoPriceSource::new(&config.price_api_url);
    let mut bridge = PollingBridge::new(config, state, price_source);

    // 轮询渲染直到收到停止信号
    tokio::select! {
        _ = bridge.run() => {
            log::error!("轮询循环意外退出");
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("收到停止信号，正在关闭监控...");
        }
    }

    listener_handle.abort();
    log::info!("监控已停止");
    Ok(())
}
