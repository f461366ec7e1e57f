// error.rs — 错误类型模块
// 按失败来源划分错误变体：网络传输、JSON 解码、空响应体、本地配置缺失等

use thiserror::Error;

/// wallery 的统一错误类型
///
/// 所有库层函数返回 `Result<T, WalleryError>`，
/// main.rs 中再按需转为 `Box<dyn std::error::Error>`（`?` 自动转换）。
#[derive(Debug, Error)]
pub enum WalleryError {
    /// 网络传输失败（连接不上、超时等），原样透传 reqwest 的错误
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 响应体不是合法的壁纸 JSON（包括 created_at 日期格式不匹配）
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// 响应体为空，与解码失败区分开
    #[error("no data in response body")]
    NoData,

    /// 尚未配置壁纸保存目录，下载前直接拒绝
    #[error("no save folder configured")]
    NoSaveFolder,

    /// 试图保存空的 API Key，拒绝写入
    #[error("api key must not be empty")]
    EmptyApiKey,

    /// 本地文件系统操作失败（创建目录、写文件、读配置等）
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 设置桌面壁纸失败，携带底层平台调用的描述
    #[error("wallpaper backend error: {0}")]
    Backend(String),
}

/// 库层函数的返回值别名
pub type Result<T> = std::result::Result<T, WalleryError>;
