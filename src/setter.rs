// setter.rs — 系统壁纸设置模块
// 对每个显示目标独立尝试、独立上报：一个目标失败不中断其余目标

use crate::error::{Result, WalleryError};
use crate::notify::Notifier;
use rust_i18n::t;
use std::path::Path;

/// 可设置壁纸的桌面后端
///
/// 生产实现只有一个桌面会话目标；测试桩用多目标验证
/// 逐个尝试、互不阻塞的约定
pub trait DesktopBackend {
    /// 枚举当前可用的显示目标
    fn displays(&self) -> Vec<String>;

    /// 在指定目标上设置壁纸
    fn set(&self, display: &str, image: &Path) -> Result<()>;
}

/// 生产后端：wallpaper crate 把整个桌面会话当作一个目标，
/// 各平台的多显示器展开由其内部的系统调用完成
pub struct SystemBackend;

impl DesktopBackend for SystemBackend {
    fn displays(&self) -> Vec<String> {
        vec!["desktop".to_string()]
    }

    fn set(&self, _display: &str, image: &Path) -> Result<()> {
        let path_str = image
            .to_str()
            .ok_or_else(|| WalleryError::Backend(t!("error_utf8").to_string()))?;
        wallpaper::set_from_path(path_str).map_err(|e| WalleryError::Backend(e.to_string()))
    }
}

/// 把图片应用到所有显示目标，返回成功的目标数量
pub fn apply_to_all(backend: &dyn DesktopBackend, image: &Path, notifier: &Notifier) -> usize {
    let mut applied = 0;
    for display in backend.displays() {
        match backend.set(&display, image) {
            Ok(()) => {
                notifier.success(t!(
                    "apply_done",
                    display => display,
                    path => image.display()
                ));
                applied += 1;
            }
            Err(err) => {
                notifier.error(t!(
                    "apply_failed",
                    display => display,
                    reason => err
                ));
            }
        }
    }
    applied
}
