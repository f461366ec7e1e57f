// config.rs — 配置管理模块
// 遵循 Unix 风格：从 ~/.config/wallery/config.toml 读取配置。
// 保存目录不是裸路径，而是带 inode 的持久化引用（bookmark）：
// 加载时解析回可用路径，发现过期就立刻重新签发并写回

use crate::error::Result;
use crate::notify::Notifier;
use crate::settings::{CategoryFlags, Order, PurityFlags, SearchSettings, Sorting, TopRange};
use rust_i18n::t;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellexpand::tilde;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 展开路径中的 ~ 和环境变量 ($HOME 等)
pub fn expand_path(path_str: &str) -> PathBuf {
    let expanded = tilde(path_str).into_owned();
    PathBuf::from(expanded)
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    common: CommonConfig,
    /// 壁纸保存目录的持久化引用
    #[serde(default)]
    save_folder: Option<FolderBookmark>,
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct CommonConfig {
    /// 默认搜索参数
    #[serde(default)]
    search: SearchDefaults,
}

/// 默认搜索参数，存储形式与查询参数一致（三位开关串、排序名）
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
pub struct SearchDefaults {
    /// 默认搜索关键词
    #[serde(default)]
    pub query: Option<String>,
    /// 分类开关，如 "111"
    #[serde(default = "default_categories")]
    pub categories: String,
    /// 分级开关，如 "100"
    #[serde(default = "default_purity")]
    pub purity: String,
    /// 排序方式
    #[serde(default = "default_sorting")]
    pub sorting: String,
    /// 排序方向
    #[serde(default = "default_order")]
    pub order: String,
    /// toplist 统计窗口
    #[serde(default = "default_top_range")]
    pub top_range: String,
    /// 最低分辨率
    #[serde(default)]
    pub atleast: Option<String>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            query: None,
            categories: default_categories(),
            purity: default_purity(),
            sorting: default_sorting(),
            order: default_order(),
            top_range: default_top_range(),
            atleast: None,
        }
    }
}

fn default_categories() -> String {
    "111".to_string()
}
fn default_purity() -> String {
    "100".to_string()
}
fn default_sorting() -> String {
    "date_added".to_string()
}
fn default_order() -> String {
    "desc".to_string()
}
fn default_top_range() -> String {
    "1M".to_string()
}

impl SearchDefaults {
    /// 把存储形式转换成值对象
    ///
    /// 单个字段不合法时退回该字段的默认值并记一条警告，
    /// 不让一处手改坏掉的配置拖垮整个会话
    pub fn to_settings(&self) -> SearchSettings {
        let mut settings = SearchSettings::default();

        match CategoryFlags::from_flags(&self.categories) {
            Some(flags) => settings.categories = flags,
            None => tracing::warn!("invalid categories flags in config: {}", self.categories),
        }
        match PurityFlags::from_flags(&self.purity) {
            Some(flags) => settings.purity = flags,
            None => tracing::warn!("invalid purity flags in config: {}", self.purity),
        }
        match self.sorting.parse::<Sorting>() {
            Ok(sorting) => settings.sorting = sorting,
            Err(reason) => tracing::warn!("{reason}"),
        }
        match self.order.parse::<Order>() {
            Ok(order) => settings.order = order,
            Err(reason) => tracing::warn!("{reason}"),
        }
        match self.top_range.parse::<TopRange>() {
            Ok(range) => settings.top_range = Some(range),
            Err(reason) => tracing::warn!("{reason}"),
        }
        settings.minimum_resolution = self.atleast.clone();

        settings
    }
}

/// 保存目录的持久化引用
///
/// 除路径外还记录目录的 inode：目录被整体替换（重建、换挂载）后
/// inode 不再匹配，引用视为过期，必须从解析出的路径重新签发。
/// 非 Unix 平台没有 inode 概念，退化为纯路径存储
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq)]
pub struct FolderBookmark {
    pub path: String,
    #[serde(default)]
    pub inode: u64,
}

impl FolderBookmark {
    /// 从一个存在的目录签发新引用（路径先规范化）
    pub fn issue(path: &Path) -> Result<Self> {
        let canonical = fs::canonicalize(path)?;
        let inode = inode_of(&canonical)?;
        Ok(Self {
            path: canonical.to_string_lossy().to_string(),
            inode,
        })
    }

    /// 解析回可用路径；第二个返回值表示引用是否已过期
    ///
    /// 目录不存在时解析失败（Io 错误），由调用方决定如何上报
    pub fn resolve(&self) -> Result<(PathBuf, bool)> {
        let stored = PathBuf::from(&self.path);
        let canonical = fs::canonicalize(&stored)?;
        let current_inode = inode_of(&canonical)?;

        let drifted = canonical != stored;
        let replaced = cfg!(unix) && self.inode != 0 && current_inode != self.inode;

        Ok((canonical, drifted || replaced))
    }
}

#[cfg(unix)]
fn inode_of(path: &Path) -> Result<u64> {
    use std::os::unix::fs::MetadataExt;
    Ok(fs::metadata(path)?.ino())
}

#[cfg(not(unix))]
fn inode_of(_path: &Path) -> Result<u64> {
    Ok(0)
}

/// 应用全局配置项（单例，由组合根持有并注入）
pub struct AppConfig {
    /// 解析成功的保存目录；未配置或解析失败时为 None
    pub save_folder: Option<PathBuf>,
    /// 配置文件所在路径
    pub config_path: PathBuf,
    /// 默认搜索参数
    pub search_defaults: SearchDefaults,
    /// 当前持有的保存目录引用（保持原样写回，避免覆盖掉未解析成功的值）
    bookmark: Option<FolderBookmark>,
}

impl AppConfig {
    /// 默认配置目录：~/.config/wallery
    pub fn default_dir() -> Result<PathBuf> {
        let home = env::var("HOME").map_err(|_| std::io::Error::other("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("wallery"))
    }

    pub fn load(notifier: &Notifier) -> Result<Self> {
        Ok(Self::load_from_dir(Self::default_dir()?, notifier))
    }

    /// 从指定目录加载配置并立刻解析保存目录引用
    ///
    /// 引用过期时当场重新签发并持久化（原引用已不可信，不能等到下次保存）
    pub fn load_from_dir(config_dir: PathBuf, notifier: &Notifier) -> Self {
        let config_path = config_dir.join("config.toml");
        let config_file = Self::load_config_from_file(&config_path).unwrap_or_default();

        let mut config = Self {
            save_folder: None,
            config_path,
            search_defaults: config_file.common.search,
            bookmark: config_file.save_folder,
        };

        if let Some(bookmark) = config.bookmark.clone() {
            match bookmark.resolve() {
                Ok((path, false)) => {
                    config.save_folder = Some(path);
                }
                Ok((path, true)) => {
                    notifier.info(t!("bookmark_stale"));
                    match FolderBookmark::issue(&path) {
                        Ok(fresh) => {
                            config.bookmark = Some(fresh);
                            config.save_folder = Some(path);
                            if let Err(err) = config.save() {
                                notifier.warning(t!("config_save_failed", reason => err));
                            }
                        }
                        Err(err) => {
                            notifier.warning(t!("bookmark_reissue_failed", reason => err));
                            config.save_folder = Some(path);
                        }
                    }
                }
                Err(_) => {
                    notifier.warning(t!("save_folder_missing", path => bookmark.path));
                }
            }
        }

        config
    }

    /// 辅助函数：解析 TOML 配置文件
    fn load_config_from_file(path: &Path) -> Option<ConfigFile> {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
    }

    /// 配置目录（credentials.toml 与日志文件也放在这里）
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("."))
    }

    /// 确保配置目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 选定新的保存目录：签发引用并立即持久化
    pub fn set_save_folder(&mut self, path: &Path) -> Result<()> {
        let bookmark = FolderBookmark::issue(path)?;
        self.save_folder = Some(PathBuf::from(&bookmark.path));
        self.bookmark = Some(bookmark);
        self.save()?;
        Ok(())
    }

    fn as_config_file(&self) -> ConfigFile {
        ConfigFile {
            common: CommonConfig {
                search: self.search_defaults.clone(),
            },
            save_folder: self.bookmark.clone(),
        }
    }

    /// 将配置保存回文件
    pub fn save(&self) -> Result<()> {
        self.ensure_dirs()?;
        let toml_str = toml::to_string_pretty(&self.as_config_file())
            .map_err(|e| std::io::Error::other(e))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
    }

    /// 以 TOML 格式导出当前配置
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(&self.as_config_file())
            .unwrap_or_else(|_| "# error serializing config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    /// 每个测试一个独立的临时目录
    fn temp_dir(tag: &str) -> PathBuf {
        let seq = DIR_SEQ.fetch_add(1, Ordering::SeqCst);
        let dir = env::temp_dir().join(format!(
            "wallery-test-{}-{}-{}",
            tag,
            std::process::id(),
            seq
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// 同级的兄弟路径（不创建）
    #[cfg(unix)]
    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let name = path.file_name().unwrap().to_string_lossy();
        path.with_file_name(format!("{name}-{suffix}"))
    }

    #[test]
    fn defaults_to_date_added_desc_sfw() {
        let settings = SearchDefaults::default().to_settings();
        assert_eq!(settings, SearchSettings::default());
        assert_eq!(settings.categories.flags(), "111");
        assert_eq!(settings.purity.flags(), "100");
    }

    #[test]
    fn invalid_defaults_fall_back_per_field() {
        let defaults = SearchDefaults {
            categories: "xyz".to_string(),
            sorting: "newest".to_string(),
            ..SearchDefaults::default()
        };
        let settings = defaults.to_settings();
        // 坏掉的字段回退，其余字段照常生效
        assert_eq!(settings.categories.flags(), "111");
        assert_eq!(settings.sorting, Sorting::DateAdded);
        assert_eq!(settings.purity.flags(), "100");
    }

    #[test]
    fn bookmark_round_trip() {
        let folder = temp_dir("bookmark");
        let bookmark = FolderBookmark::issue(&folder).unwrap();
        let (resolved, stale) = bookmark.resolve().unwrap();
        assert_eq!(resolved, fs::canonicalize(&folder).unwrap());
        assert!(!stale);
    }

    #[cfg(unix)]
    #[test]
    fn redirected_folder_reports_stale() {
        let folder = temp_dir("stale");
        let bookmark = FolderBookmark::issue(&folder).unwrap();

        // 原目录整体挪走，旧路径变成符号链接：规范化结果漂移，引用过期
        let moved = sibling(&folder, "moved");
        fs::rename(&folder, &moved).unwrap();
        std::os::unix::fs::symlink(&moved, &folder).unwrap();

        let (resolved, stale) = bookmark.resolve().unwrap();
        assert!(stale);
        assert_eq!(resolved, fs::canonicalize(&moved).unwrap());
    }

    #[test]
    fn missing_folder_fails_resolution() {
        let folder = temp_dir("gone");
        let bookmark = FolderBookmark::issue(&folder).unwrap();
        fs::remove_dir(&folder).unwrap();
        assert!(bookmark.resolve().is_err());
    }

    #[tokio::test]
    async fn set_save_folder_persists_bookmark() {
        let config_dir = temp_dir("cfg");
        let target = temp_dir("target");
        let notifier = Notifier::new();

        let mut config = AppConfig::load_from_dir(config_dir.clone(), &notifier);
        assert!(config.save_folder.is_none());

        config.set_save_folder(&target).unwrap();
        assert!(config.save_folder.is_some());

        // 重新加载：引用解析回同一路径
        let reloaded = AppConfig::load_from_dir(config_dir, &notifier);
        assert_eq!(
            reloaded.save_folder.unwrap(),
            fs::canonicalize(&target).unwrap()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stale_bookmark_reissued_on_load() {
        let config_dir = temp_dir("cfg-stale");
        let target = temp_dir("target-stale");
        let notifier = Notifier::new();

        let mut config = AppConfig::load_from_dir(config_dir.clone(), &notifier);
        config.set_save_folder(&target).unwrap();

        // 目录挪走、旧路径换成符号链接：引用过期但仍可解析
        let moved = sibling(&target, "moved");
        fs::rename(&target, &moved).unwrap();
        std::os::unix::fs::symlink(&moved, &target).unwrap();
        let fresh = fs::canonicalize(&moved).unwrap();

        let reloaded = AppConfig::load_from_dir(config_dir.clone(), &notifier);
        assert_eq!(reloaded.save_folder.as_deref(), Some(fresh.as_path()));

        // 重新签发的引用已经指向新位置并写回磁盘
        let raw = fs::read_to_string(config_dir.join("config.toml")).unwrap();
        let on_disk: super::ConfigFile = toml::from_str(&raw).unwrap();
        assert_eq!(
            on_disk.save_folder.unwrap().path,
            fresh.to_string_lossy().to_string()
        );
    }

    #[tokio::test]
    async fn unresolvable_bookmark_leaves_folder_unset() {
        let config_dir = temp_dir("cfg-gone");
        let target = temp_dir("target-gone");
        let notifier = Notifier::new();

        let mut config = AppConfig::load_from_dir(config_dir.clone(), &notifier);
        config.set_save_folder(&target).unwrap();
        fs::remove_dir(&target).unwrap();

        let reloaded = AppConfig::load_from_dir(config_dir, &notifier);
        assert!(reloaded.save_folder.is_none());
        // 解析失败走 warning 横幅
        assert_eq!(notifier.active_toasts().len(), 1);
    }

    #[test]
    fn search_defaults_survive_save_and_reload() {
        let config_dir = temp_dir("cfg-defaults");
        let notifier = Notifier::new();

        let mut config = AppConfig::load_from_dir(config_dir.clone(), &notifier);
        config.search_defaults.query = Some("mountains".to_string());
        config.search_defaults.sorting = "toplist".to_string();
        config.save().unwrap();

        let reloaded = AppConfig::load_from_dir(config_dir, &notifier);
        assert_eq!(reloaded.search_defaults.query.as_deref(), Some("mountains"));
        assert_eq!(reloaded.search_defaults.sorting, "toplist");
    }
}
