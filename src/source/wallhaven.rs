// source/wallhaven.rs — Wallhaven API 异步客户端模块
// 负责与 Wallhaven API 交互：按页搜索壁纸和下载原图

use super::WallpaperSource;
use crate::error::{Result, WalleryError};
use crate::model::{SearchResponse, Wallpaper};
use crate::settings::SearchSettings;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Wallhaven API 异步客户端
///
/// # Rust 特性说明
/// - `reqwest::Client` 内部维护连接池，整个进程复用同一个实例
/// - `Option<String>` 用于可选的 API Key（有 Key 才能搜到 NSFW 内容）
pub struct WallhavenClient {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,

    /// 可选的 API Key
    api_key: Option<String>,
}

impl WallhavenClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

/// 把响应体文本解析成壁纸列表
///
/// 错误分三类，控制流保持互不混淆：
/// - 空响应体 → NoData（与解码失败区分开）
/// - JSON 结构或 created_at 格式不对 → Decode，整页作废，不部分生效
/// - `{"data": []}` → Ok(空列表)，这不是错误，是"没有更多页"
fn parse_search_body(body: &str) -> Result<Vec<Wallpaper>> {
    if body.is_empty() {
        return Err(WalleryError::NoData);
    }
    let envelope: SearchResponse = serde_json::from_str(body)?;
    Ok(envelope.data)
}

#[async_trait]
impl WallpaperSource for WallhavenClient {
    async fn search(
        &self,
        query: &str,
        settings: &SearchSettings,
        page: u32,
    ) -> Result<Vec<Wallpaper>> {
        let url = settings.build_url(query, page, self.api_key.as_deref());

        // 传输层错误原样透传；这里拿 text 而不是直接 .json()，
        // 是为了把"没有响应体"和"解码失败"拆成两种错误
        let body = self.client.get(&url).send().await?.text().await?;

        parse_search_body(&body)
    }

    async fn download(&self, wallpaper: &Wallpaper, save_dir: &Path) -> Result<PathBuf> {
        let save_path = save_dir.join(wallpaper.file_name());

        // 目标目录可能带着不存在的中间层级，先补齐
        fs::create_dir_all(save_dir).await?;

        let response = self.client.get(&wallpaper.path).send().await?;
        let bytes = response.bytes().await?;

        let mut file = fs::File::create(&save_path).await?;
        file.write_all(&bytes).await?;

        Ok(save_path)
    }
}
