// notify.rs — 通知模块
// 进程内唯一的消息发布点：每条消息一定写入持久化日志（tracing），
// 按级别策略决定是否同时作为 Toast 横幅展示一段时间

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Toast 默认展示时长
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

/// 消息级别
///
/// 展示策略是刻意不对称的：info 默认只进日志不弹横幅，
/// success / warning / error 默认弹出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// 一条正在展示的横幅消息
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: Level,
    pub duration: Duration,
}

/// 通知接收器
///
/// 由组合根（main）构造唯一实例，按引用注入给需要上报状态的组件；
/// 活动横幅列表只增不改，到期后由后台任务移除
pub struct Notifier {
    toasts: Arc<Mutex<Vec<Toast>>>,
    next_id: AtomicU64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// 发布一条消息：总是写日志，show_toast 为 true 时追加横幅
    ///
    /// 到期移除的后台任务只持有列表的弱引用：
    /// Notifier 先被销毁时任务静默退出，不会崩溃
    pub fn log(&self, message: impl Into<String>, level: Level, show_toast: bool, duration: Duration) {
        let message = message.into();
        match level {
            Level::Info => tracing::info!("{message}"),
            Level::Success => tracing::info!("{message}"),
            Level::Warning => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }

        if !show_toast {
            return;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.toasts
            .lock()
            .unwrap()
            .push(Toast { id, message, level, duration });

        let weak = Arc::downgrade(&self.toasts);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                // 宿主已销毁或锁已中毒时放弃移除，绝不 panic
                if let Some(list) = weak.upgrade() {
                    if let Ok(mut list) = list.lock() {
                        list.retain(|t| t.id != id);
                    }
                }
            });
        }
    }

    /// info 默认不弹横幅，只进日志
    pub fn info(&self, message: impl Into<String>) {
        self.log(message, Level::Info, false, DEFAULT_TOAST_DURATION);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(message, Level::Success, true, DEFAULT_TOAST_DURATION);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(message, Level::Warning, true, DEFAULT_TOAST_DURATION);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(message, Level::Error, true, DEFAULT_TOAST_DURATION);
    }

    /// 当前活动横幅的快照
    pub fn active_toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}
