// logging.rs — 日志初始化模块
// stderr 层给交互输出，文件层做持久化诊断日志；
// 通知层发布的每条消息都会经由 tracing 落到这里

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 过滤级别从 RUST_LOG 读取，默认 info；
/// 日志文件打不开时降级为只有 stderr 层，不中断启动
pub fn init(log_path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .ok();

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        );

    match file {
        Some(file) => {
            let _ = registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .try_init();
        }
        None => {
            let _ = registry.try_init();
        }
    }
}
