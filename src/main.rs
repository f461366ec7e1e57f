// main.rs — 程序入口
// 组合根：构造唯一的通知层、配置、机密存储和 API 客户端，
// 显式注入到各个流程函数，再按子命令分发

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");

use clap::{CommandFactory, Parser}; // Parser 提供 parse(); CommandFactory 用于生成补全脚本
use clap_complete::generate;
use rand::Rng;
use rust_i18n::t;
use std::path::{Path, PathBuf};
use wallery::cli::{Cli, Commands, ConfigAction, SearchArgs};
use wallery::config::{self, AppConfig};
use wallery::error::{self, WalleryError};
use wallery::model::Wallpaper;
use wallery::notify::{DEFAULT_TOAST_DURATION, Level, Notifier};
use wallery::pager::{PageOutcome, Pager};
use wallery::secrets::{API_KEY_ID, SecretStore};
use wallery::setter::{self, SystemBackend};
use wallery::settings::{CategoryFlags, Order, PurityFlags, SearchSettings, Sorting, TopRange};
use wallery::logging;
use wallery::source::WallpaperSource;
use wallery::source::wallhaven::WallhavenClient;

/// `#[tokio::main]` 宏将 async main 转换为同步 main + tokio 运行时
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    // 解析命令行参数
    let cli = Cli::parse();

    // 组合根：每个服务在进程内只有一个逻辑实例，全部显式传引用
    let notifier = Notifier::new();
    let config_dir = AppConfig::default_dir()?;
    std::fs::create_dir_all(&config_dir)?;
    logging::init(&config_dir.join("wallery.log"));

    let mut config = AppConfig::load_from_dir(config_dir.clone(), &notifier);
    let secrets = SecretStore::new(&config_dir);

    // API Key 优先级：环境变量 > 机密存储
    let api_key = std::env::var("WALLHAVEN_API_KEY")
        .ok()
        .or_else(|| secrets.get(API_KEY_ID));

    // 根据子命令分发执行逻辑
    match &cli.command {
        Commands::Search { args, pages, long } => {
            let (query, settings) = build_search(&config, args)?;
            let client = WallhavenClient::new(api_key);
            handle_search(&client, &notifier, &query, &settings, *pages, *long).await;
        }

        Commands::Fetch { args, count } => {
            let (query, settings) = build_search(&config, args)?;
            let client = WallhavenClient::new(api_key);
            handle_fetch(&client, &config, &notifier, &query, &settings, *count).await;
        }

        Commands::Set { args } => {
            let (query, settings) = build_search(&config, args)?;
            let client = WallhavenClient::new(api_key);
            handle_set(&client, &config, &notifier, &query, &settings).await;
        }

        Commands::Apply { image } => {
            handle_apply(&notifier, image);
        }

        Commands::Config { action } => {
            handle_config(&mut config, &secrets, &notifier, action)?;
        }

        Commands::Completions { shell } => {
            generate(
                *shell,
                &mut Cli::command(),
                "wallery",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// 把配置默认值和命令行覆盖合并成一次搜索的 (关键词, 设置)
///
/// 任何一项覆盖都等价于设置变更：调用方拿到的是全新的设置对象，
/// 配套的 Pager 也从第 1 页开始
fn build_search(
    config: &AppConfig,
    args: &SearchArgs,
) -> Result<(String, SearchSettings), Box<dyn std::error::Error>> {
    let mut settings = config.search_defaults.to_settings();

    if let Some(sorting) = args.sorting {
        settings.sorting = sorting;
    }
    if let Some(order) = args.order {
        settings.order = order;
    }
    if let Some(flags) = &args.categories {
        settings.categories = CategoryFlags::from_flags(flags)
            .ok_or_else(|| t!("error_bad_flags", value => flags).to_string())?;
    }
    if let Some(flags) = &args.purity {
        settings.purity = PurityFlags::from_flags(flags)
            .ok_or_else(|| t!("error_bad_flags", value => flags).to_string())?;
    }
    if let Some(range) = args.range {
        settings.top_range = Some(range);
    }
    if let Some(atleast) = &args.atleast {
        settings.minimum_resolution = Some(atleast.clone());
    }
    if let Some(list) = &args.resolutions {
        settings.resolutions = split_list(list);
    }
    if let Some(list) = &args.ratios {
        settings.ratios = split_list(list);
    }
    if let Some(list) = &args.colors {
        settings.colors = split_list(list);
    }
    if let Some(seed) = &args.seed {
        settings.seed = Some(seed.clone());
    }

    settings.filters.tags = args.tags.clone();
    settings.filters.excluded_tags = args.excluded.clone();
    settings.filters.required_tags = args.required.clone();
    settings.filters.username = args.username.clone();
    settings.filters.exact_tag_id = args.tag_id;
    settings.filters.file_type = args.file_type.clone();
    settings.filters.similar_to = args.similar_to.clone();

    // random 排序没有种子时自动生成一个：
    // 同一种子跨页有效，否则每页都是一次全新乱序
    if settings.sorting == Sorting::Random && settings.seed.is_none() {
        settings.seed = Some(random_seed());
    }

    let query = args
        .query
        .clone()
        .or_else(|| config.search_defaults.query.clone())
        .unwrap_or_default();

    Ok((query, settings))
}

/// 6 位字母数字种子，与远端返回的种子形式一致
fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 处理 search 子命令：连续拉取若干页并打印元数据
async fn handle_search(
    source: &dyn WallpaperSource,
    notifier: &Notifier,
    query: &str,
    settings: &SearchSettings,
    pages: u32,
    long: bool,
) {
    println!("{}", t!("search_start"));

    let mut pager = Pager::new();
    for _ in 0..pages {
        match pager.load_next(source, query, settings, notifier).await {
            PageOutcome::Appended(count) => {
                println!(
                    "{}",
                    t!("page_loaded", page => pager.current_page() - 1, count => count)
                );
            }
            // 失败已经上报到通知层；取尽在循环后统一提示
            PageOutcome::Exhausted | PageOutcome::Failed(_) | PageOutcome::Skipped => break,
        }
    }
    debug_assert!(!pager.is_loading());

    if !pager.can_load_more() {
        println!("{}", t!("no_more_results"));
    }
    if pager.wallpapers().is_empty() {
        println!("{}", t!("no_wallpapers"));
        return;
    }

    for wallpaper in pager.wallpapers() {
        println!(
            "  {:<8} {:<8} {:<8} {:>9} {:>7} {:>7.1} MB  {}  {}",
            wallpaper.id,
            wallpaper.purity.as_str(),
            wallpaper.category,
            wallpaper.views,
            wallpaper.favorites,
            wallpaper.file_size_mb(),
            wallpaper.created_at.format("%Y-%m-%d %H:%M:%S"),
            wallpaper.short_url,
        );
        if long {
            print_details(wallpaper);
        }
    }
    println!("{}", t!("search_done", count => pager.wallpapers().len()));
}

/// 详情视图的 CLI 版：一条记录的完整元数据
fn print_details(wallpaper: &Wallpaper) {
    println!("           type:     {}", wallpaper.file_type);
    if !wallpaper.colors.is_empty() {
        println!("           colors:   {}", wallpaper.colors.join(" "));
    }
    if let Some(uploader) = &wallpaper.uploader {
        println!(
            "           uploader: {} ({})",
            uploader.username, uploader.group
        );
    }
    if !wallpaper.source.is_empty() {
        println!("           source:   {}", wallpaper.source);
    }
    println!("           page:     {}", wallpaper.url);
    println!("           preview:  {}", wallpaper.thumbs.large);
    println!("           full:     {}", wallpaper.path);
}

/// 下载一张壁纸到保存目录
///
/// 未配置保存目录时直接拒绝，不发出任何网络请求；
/// 成败都经由通知层上报
async fn download_wallpaper(
    source: &dyn WallpaperSource,
    wallpaper: &Wallpaper,
    save_folder: Option<&Path>,
    notifier: &Notifier,
) -> error::Result<PathBuf> {
    let folder = match save_folder {
        Some(folder) => folder,
        None => {
            notifier.error(t!("no_save_folder"));
            return Err(WalleryError::NoSaveFolder);
        }
    };

    notifier.log(
        t!("download_start", id => wallpaper.id),
        Level::Info,
        true,
        DEFAULT_TOAST_DURATION,
    );

    match source.download(wallpaper, folder).await {
        Ok(path) => {
            notifier.success(t!("download_done", path => path.display()));
            Ok(path)
        }
        Err(err) => {
            notifier.error(t!("download_failed", reason => err));
            Err(err)
        }
    }
}

/// 处理 fetch 子命令：搜索并下载前 count 张
///
/// 消费驱动的翻页：逐张下载，下一张落进回看窗口就预取下一页，
/// 和 GUI 里滚动到列表末端附近触发加载是同一套控制流
async fn handle_fetch(
    source: &dyn WallpaperSource,
    config: &AppConfig,
    notifier: &Notifier,
    query: &str,
    settings: &SearchSettings,
    count: usize,
) {
    println!("{}", t!("search_start"));

    let save_folder = config.save_folder.as_deref();
    let mut pager = Pager::new();
    let mut downloaded = 0;
    let mut index = 0;

    while index < count {
        if pager.should_load_more(index) {
            if let PageOutcome::Failed(_) =
                pager.load_next(source, query, settings, notifier).await
            {
                // 错误已上报，结束本次批量下载
                break;
            }
        }
        if index >= pager.wallpapers().len() {
            // 已取尽且消费到头
            break;
        }

        let wallpaper = pager.wallpapers()[index].clone();
        println!(
            "{}",
            t!("download_info", current => index + 1, total => count, id => wallpaper.id)
        );

        match download_wallpaper(source, &wallpaper, save_folder, notifier).await {
            Ok(path) => {
                downloaded += 1;
                println!("{}", t!("save_path", path => path.display()));
            }
            // 未配置保存目录时后面的也都会失败，直接收尾
            Err(WalleryError::NoSaveFolder) => return,
            // 单张失败不拦住剩下的
            Err(_) => {}
        }
        index += 1;
    }

    if pager.wallpapers().is_empty() {
        println!("{}", t!("no_wallpapers"));
        return;
    }
    println!("{}", t!("download_summary", count => downloaded));
}

/// 处理 set 子命令：下载第一张结果并应用为桌面壁纸
///
/// 应用是下载成功之后的后续动作，下载失败就不再往下走
async fn handle_set(
    source: &dyn WallpaperSource,
    config: &AppConfig,
    notifier: &Notifier,
    query: &str,
    settings: &SearchSettings,
) {
    println!("{}", t!("search_start"));

    let mut pager = Pager::new();
    match pager.load_next(source, query, settings, notifier).await {
        PageOutcome::Appended(_) => {}
        PageOutcome::Exhausted => {
            println!("{}", t!("no_wallpapers"));
            return;
        }
        PageOutcome::Failed(_) | PageOutcome::Skipped => return,
    }

    // load_next 返回 Appended 时列表一定非空
    let wallpaper = pager.wallpapers()[0].clone();
    let save_folder = config.save_folder.as_deref();

    let path = match download_wallpaper(source, &wallpaper, save_folder, notifier).await {
        Ok(path) => path,
        Err(_) => return,
    };

    println!("{}", t!("setting_wallpaper"));
    setter::apply_to_all(&SystemBackend, &path, notifier);
}

/// 处理 apply 子命令：把本地图片应用为桌面壁纸
fn handle_apply(notifier: &Notifier, image: &str) {
    let path = config::expand_path(image);
    if !path.is_file() {
        notifier.error(t!("apply_missing_file", path => path.display()));
        return;
    }

    println!("{}", t!("setting_wallpaper"));
    setter::apply_to_all(&SystemBackend, &path, notifier);
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(
    config: &mut AppConfig,
    secrets: &SecretStore,
    notifier: &Notifier,
    action: &ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", t!("config_title"));
            println!(
                "{}",
                t!("config_path", path => config.config_path.display())
            );
            match &config.save_folder {
                Some(folder) => {
                    println!("{}", t!("config_folder", path => folder.display()))
                }
                None => println!("{}", t!("config_folder_unset")),
            }
            println!("{}", t!("config_search_defaults"));
            let query_str = config.search_defaults.query.as_deref().unwrap_or("None");
            println!("{}", t!("config_query", query => query_str));
            println!(
                "{}",
                t!("config_sorting", sorting => config.search_defaults.sorting)
            );
            println!(
                "{}",
                t!("config_order", order => config.search_defaults.order)
            );
            println!(
                "{}",
                t!("config_categories", flags => config.search_defaults.categories)
            );
            println!(
                "{}",
                t!("config_purity", flags => config.search_defaults.purity)
            );
        }

        ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema());
        }

        ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }

        ConfigAction::Set { key, value } => {
            // 先校验后落盘，坏值不会写进配置文件
            match key.as_str() {
                "query" => config.search_defaults.query = Some(value.clone()),
                "categories" => {
                    CategoryFlags::from_flags(value)
                        .ok_or_else(|| t!("error_bad_flags", value => value).to_string())?;
                    config.search_defaults.categories = value.clone();
                }
                "purity" => {
                    PurityFlags::from_flags(value)
                        .ok_or_else(|| t!("error_bad_flags", value => value).to_string())?;
                    config.search_defaults.purity = value.clone();
                }
                "sorting" => {
                    value.parse::<Sorting>()?;
                    config.search_defaults.sorting = value.clone();
                }
                "order" => {
                    value.parse::<Order>()?;
                    config.search_defaults.order = value.clone();
                }
                "range" => {
                    value.parse::<TopRange>()?;
                    config.search_defaults.top_range = value.clone();
                }
                "atleast" => config.search_defaults.atleast = Some(value.clone()),
                _ => return Err(t!("config_error_unknown_key", key => key).to_string().into()),
            }
            config.save()?;
            println!("{}", t!("config_updated", key => key, value => value));
        }

        ConfigAction::SetFolder { path } => {
            let folder = config::expand_path(path);
            std::fs::create_dir_all(&folder)?;
            config.set_save_folder(&folder)?;
            notifier.success(t!("save_folder_set", path => folder.display()));
        }

        ConfigAction::SetKey { key } => match secrets.set(API_KEY_ID, key) {
            Ok(()) => notifier.success(t!("api_key_saved")),
            // 空 Key 是用户可见错误，不写入、不中断进程
            Err(WalleryError::EmptyApiKey) => notifier.error(t!("api_key_empty")),
            Err(err) => return Err(err.into()),
        },

        ConfigAction::ClearKey => {
            secrets.delete(API_KEY_ID)?;
            notifier.success(t!("api_key_cleared"));
        }
    }
    Ok(())
}
