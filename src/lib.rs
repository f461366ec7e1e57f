// lib.rs — wallery 库入口
// 核心组件（查询构建、搜索客户端、分页控制、下载与应用、配置与通知）
// 全部以库模块提供，src/main.rs 的 CLI 只是薄薄一层组合根

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod pager;
pub mod secrets;
pub mod setter;
pub mod settings;
pub mod source;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");
