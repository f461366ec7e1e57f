// pager.rs — 分页控制模块
// 三个标志位构成的小状态机：空闲（可加载）、加载中（拒绝并发）、已取尽。
// 结果列表只在显式 reset 时清空；页码只增不减，除非 reset 归一

use crate::error::{Result, WalleryError};
use crate::model::Wallpaper;
use crate::notify::Notifier;
use crate::settings::SearchSettings;
use crate::source::WallpaperSource;
use rust_i18n::t;

/// 距离列表末尾多少条时预取下一页
pub const LOOKBACK_WINDOW: usize = 5;

/// 一次加载尝试的结果
#[derive(Debug)]
pub enum PageOutcome {
    /// 追加了 n 条记录，页码 +1
    Appended(usize),
    /// 空页：当前查询已无更多结果，在 reset 之前不再发起请求
    Exhausted,
    /// 请求或解码失败：页码与结果列表不变，状态回到空闲以便重试
    Failed(WalleryError),
    /// 有请求在途或已取尽，本次触发被忽略
    Skipped,
}

/// 分页控制器
///
/// 单个逻辑线程驱动（&mut self 串行化所有状态变更），
/// `loading` 是协作式门闩而不是锁：同一时刻最多一个搜索请求在途
pub struct Pager {
    wallpapers: Vec<Wallpaper>,
    current_page: u32,
    loading: bool,
    can_load_more: bool,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}

impl Pager {
    pub fn new() -> Self {
        Self {
            wallpapers: Vec::new(),
            current_page: 1,
            loading: false,
            can_load_more: true,
        }
    }

    /// 已累积的结果列表（跨页追加，不去重）
    pub fn wallpapers(&self) -> &[Wallpaper] {
        &self.wallpapers
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_load_more(&self) -> bool {
        self.can_load_more
    }

    /// 显式重置：搜索词提交或任何过滤/排序设置变更时调用
    ///
    /// 这是结果列表被清空、can_load_more 由 false 回到 true 的唯一途径
    pub fn reset(&mut self) {
        self.wallpapers.clear();
        self.current_page = 1;
        self.loading = false;
        self.can_load_more = true;
    }

    /// 列表中第 visible_index 条进入可视范围时是否应该预取下一页
    ///
    /// 结果列表只增不减，所以同一页边界内重复滚动不会触发第二次请求：
    /// 第一次触发后 loading 置位，后续触发都被它挡掉
    pub fn should_load_more(&self, visible_index: usize) -> bool {
        if self.loading || !self.can_load_more {
            return false;
        }
        visible_index + LOOKBACK_WINDOW >= self.wallpapers.len()
    }

    /// 尝试进入加载态；已在加载或已取尽时返回 false
    pub fn begin(&mut self) -> bool {
        if self.loading || !self.can_load_more {
            return false;
        }
        self.loading = true;
        true
    }

    /// 用一次请求的结果收尾加载态
    ///
    /// - 非空页：追加、页码 +1、回到空闲
    /// - 空页：标记取尽（不是错误，不弹横幅）
    /// - 出错：页码与列表保持原样，回到空闲等待重试
    pub fn complete(&mut self, result: Result<Vec<Wallpaper>>) -> PageOutcome {
        self.loading = false;
        match result {
            Ok(batch) if batch.is_empty() => {
                self.can_load_more = false;
                PageOutcome::Exhausted
            }
            Ok(batch) => {
                let count = batch.len();
                self.wallpapers.extend(batch);
                self.current_page += 1;
                PageOutcome::Appended(count)
            }
            Err(err) => PageOutcome::Failed(err),
        }
    }

    /// 串行拉取下一页：begin 门闩 → 请求 → complete
    ///
    /// 失败会上报到通知层；空页静默（取尽不是错误）
    pub async fn load_next(
        &mut self,
        source: &dyn WallpaperSource,
        query: &str,
        settings: &SearchSettings,
        notifier: &Notifier,
    ) -> PageOutcome {
        if !self.begin() {
            return PageOutcome::Skipped;
        }

        let result = source.search(query, settings, self.current_page).await;
        let outcome = self.complete(result);

        if let PageOutcome::Failed(err) = &outcome {
            notifier.error(t!("load_failed", reason => err));
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn wp(id: &str) -> Wallpaper {
        use crate::model::{Purity, Thumbs};
        Wallpaper {
            id: id.to_string(),
            url: format!("https://wallhaven.cc/w/{id}"),
            short_url: format!("https://whvn.cc/{id}"),
            views: 0,
            favorites: 0,
            source: String::new(),
            purity: Purity::Sfw,
            category: "general".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            file_type: "image/jpeg".to_string(),
            file_size: 1024,
            colors: Vec::new(),
            path: format!("https://w.wallhaven.cc/full/{id}/wallhaven-{id}.jpg"),
            uploader: None,
            thumbs: Thumbs {
                large: String::new(),
                original: String::new(),
                small: String::new(),
            },
        }
    }

    fn page_of(count: usize, prefix: &str) -> Vec<Wallpaper> {
        (0..count).map(|i| wp(&format!("{prefix}{i}"))).collect()
    }

    /// 按预置脚本逐次返回结果的内存桩
    struct ScriptedSource {
        pages: Mutex<Vec<Result<Vec<Wallpaper>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Vec<Wallpaper>>>) -> Self {
            let mut pages = pages;
            pages.reverse();
            Self { pages: Mutex::new(pages), calls: AtomicUsize::new(0) }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WallpaperSource for ScriptedSource {
        async fn search(
            &self,
            _query: &str,
            _settings: &SearchSettings,
            _page: u32,
        ) -> Result<Vec<Wallpaper>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn download(&self, _wallpaper: &Wallpaper, _dir: &Path) -> Result<PathBuf> {
            unreachable!("pager never downloads")
        }
    }

    #[test]
    fn begin_blocks_second_fetch_while_loading() {
        let mut pager = Pager::new();
        assert!(pager.begin());
        assert!(pager.is_loading());
        assert!(!pager.begin());
    }

    #[test]
    fn appended_page_increments_counter() {
        let mut pager = Pager::new();
        assert!(pager.begin());
        let outcome = pager.complete(Ok(page_of(24, "a")));
        assert!(matches!(outcome, PageOutcome::Appended(24)));
        assert_eq!(pager.current_page(), 2);
        assert_eq!(pager.wallpapers().len(), 24);
        assert!(!pager.is_loading());
        assert!(pager.can_load_more());
    }

    #[test]
    fn empty_page_exhausts_until_reset() {
        let mut pager = Pager::new();
        pager.begin();
        pager.complete(Ok(page_of(10, "a")));

        pager.begin();
        let outcome = pager.complete(Ok(Vec::new()));
        assert!(matches!(outcome, PageOutcome::Exhausted));
        // 结果列表保持原样，取尽后 begin 一律失败
        assert_eq!(pager.wallpapers().len(), 10);
        assert!(!pager.can_load_more());
        assert!(!pager.begin());

        pager.reset();
        assert!(pager.can_load_more());
        assert!(pager.wallpapers().is_empty());
        assert_eq!(pager.current_page(), 1);
        assert!(pager.begin());
    }

    #[test]
    fn error_keeps_page_and_list_and_allows_retry() {
        let mut pager = Pager::new();
        pager.begin();
        pager.complete(Ok(page_of(24, "a")));

        pager.begin();
        let outcome = pager.complete(Err(WalleryError::NoData));
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert_eq!(pager.current_page(), 2);
        assert_eq!(pager.wallpapers().len(), 24);
        assert!(!pager.is_loading());
        // 失败后允许重试
        assert!(pager.begin());
    }

    #[test]
    fn lookback_window_edge() {
        let mut pager = Pager::new();
        pager.begin();
        pager.complete(Ok(page_of(24, "a")));

        // 24 条时：索引 18 还差一条，索引 19 正好进入 5 条回看窗口
        assert!(!pager.should_load_more(18));
        assert!(pager.should_load_more(19));
        assert!(pager.should_load_more(23));
    }

    #[test]
    fn trigger_deduped_while_loading_or_exhausted() {
        let mut pager = Pager::new();
        pager.begin();
        pager.complete(Ok(page_of(24, "a")));

        assert!(pager.should_load_more(23));
        pager.begin();
        // 请求在途时反复滚动同一区域，不应再触发
        assert!(!pager.should_load_more(23));
        pager.complete(Ok(Vec::new()));
        // 已取尽同样不触发
        assert!(!pager.should_load_more(23));
    }

    #[tokio::test]
    async fn load_next_walks_pages_sequentially() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(24, "p1-")),
            Ok(page_of(24, "p2-")),
            Ok(Vec::new()),
        ]);
        let notifier = Notifier::new();
        let settings = SearchSettings::default();
        let mut pager = Pager::new();

        let one = pager.load_next(&source, "mountains", &settings, &notifier).await;
        assert!(matches!(one, PageOutcome::Appended(24)));
        let two = pager.load_next(&source, "mountains", &settings, &notifier).await;
        assert!(matches!(two, PageOutcome::Appended(24)));
        let three = pager.load_next(&source, "mountains", &settings, &notifier).await;
        assert!(matches!(three, PageOutcome::Exhausted));

        assert_eq!(pager.wallpapers().len(), 48);
        assert_eq!(source.call_count(), 3);

        // 取尽后再调用直接 Skipped，不发请求
        let four = pager.load_next(&source, "mountains", &settings, &notifier).await;
        assert!(matches!(four, PageOutcome::Skipped));
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn exhausted_page_shows_no_toast() {
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);
        let notifier = Notifier::new();
        let settings = SearchSettings::default();
        let mut pager = Pager::new();

        let outcome = pager.load_next(&source, "", &settings, &notifier).await;
        assert!(matches!(outcome, PageOutcome::Exhausted));
        // 空页是取尽，不是错误
        assert!(notifier.active_toasts().is_empty());
    }

    #[tokio::test]
    async fn failed_page_surfaces_error_toast() {
        let source = ScriptedSource::new(vec![Err(WalleryError::NoData)]);
        let notifier = Notifier::new();
        let settings = SearchSettings::default();
        let mut pager = Pager::new();

        let outcome = pager.load_next(&source, "", &settings, &notifier).await;
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        let toasts = notifier.active_toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, crate::notify::Level::Error);
    }
}
