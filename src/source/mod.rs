// source/mod.rs — 壁纸源抽象接口模块
// 分页控制器和下载流程只依赖这个 Trait，
// 生产实现是 WallhavenClient，测试里用内存桩替换

pub mod wallhaven;

use crate::error::Result;
use crate::model::Wallpaper;
use crate::settings::SearchSettings;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 壁纸源的抽象 Trait
///
/// # 异步 Trait 说明
/// Rust 原生的 trait 中 async fn 还不能直接做成 trait 对象，
/// 这里用 `async_trait` 宏保持接口可被 `&dyn WallpaperSource` 注入。
#[async_trait]
pub trait WallpaperSource {
    /// 拉取一页搜索结果
    ///
    /// 一次调用对应一个 HTTP 请求，不重试、不缓存；
    /// 空页（data 为空数组）返回 Ok(空 Vec)，由调用方判定为"已取尽"
    async fn search(
        &self,
        query: &str,
        settings: &SearchSettings,
        page: u32,
    ) -> Result<Vec<Wallpaper>>;

    /// 下载一张壁纸的原图到指定目录，返回落盘后的完整路径
    async fn download(&self, wallpaper: &Wallpaper, save_dir: &Path) -> Result<PathBuf>;
}
