// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义所有子命令和参数

use crate::settings::{Order, Sorting, TopRange};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Wallhaven 壁纸客户端
///
/// 搜索壁纸、按页浏览、下载原图并设置为桌面壁纸。
#[derive(Parser)]
#[command(name = "wallery")]
#[command(version)]
#[command(about = "Wallhaven 壁纸客户端 — 搜索、下载并设置桌面壁纸")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 搜索相关参数，search / fetch / set 三个子命令共用
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// 搜索关键词（如 "nature", "mountains"）
    #[arg(short, long)]
    pub query: Option<String>,

    /// 排序方式 (date_added/relevance/random/views/favorites/toplist)
    #[arg(short, long)]
    pub sorting: Option<Sorting>,

    /// 排序方向 (desc/asc)
    #[arg(short, long)]
    pub order: Option<Order>,

    /// 分类开关 general/anime/people，如 "111"=全部, "100"=仅general
    #[arg(short, long)]
    pub categories: Option<String>,

    /// 分级开关 sfw/sketchy/nsfw，如 "100"=仅SFW
    #[arg(short, long)]
    pub purity: Option<String>,

    /// toplist 统计窗口 (1d/3d/1w/1M/3M/6M/1y)
    #[arg(long)]
    pub range: Option<TopRange>,

    /// 最低分辨率（如 1920x1080）
    #[arg(long)]
    pub atleast: Option<String>,

    /// 精确分辨率列表，逗号分隔
    #[arg(long)]
    pub resolutions: Option<String>,

    /// 宽高比列表，逗号分隔（如 16x9,16x10）
    #[arg(long)]
    pub ratios: Option<String>,

    /// 颜色过滤列表，逗号分隔（十六进制）
    #[arg(long)]
    pub colors: Option<String>,

    /// random 排序的种子；不指定时自动生成，保证翻页结果稳定
    #[arg(long)]
    pub seed: Option<String>,

    /// 普通标签，可多次指定
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// 排除标签，可多次指定
    #[arg(short = 'x', long = "exclude")]
    pub excluded: Vec<String>,

    /// 必含标签，可多次指定
    #[arg(short = 'r', long = "require")]
    pub required: Vec<String>,

    /// 只看某个用户上传的壁纸
    #[arg(long)]
    pub username: Option<String>,

    /// 精确标签 ID
    #[arg(long = "tag-id")]
    pub tag_id: Option<u64>,

    /// 按文件类型过滤（如 jpg, png）
    #[arg(long = "file-type")]
    pub file_type: Option<String>,

    /// 查找与指定壁纸相似的结果，值为壁纸 ID
    #[arg(long = "similar-to")]
    pub similar_to: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 搜索壁纸并打印结果元数据
    ///
    /// 用法示例:
    ///   wallery search --query mountains
    ///   wallery search -q anime -n 3
    ///   wallery search --sorting toplist --range 1w
    Search {
        #[command(flatten)]
        args: SearchArgs,

        /// 连续拉取的页数
        #[arg(short = 'n', long, default_value = "1", value_name = "N")]
        pages: u32,

        /// 同时打印每条结果的完整元数据
        #[arg(short = 'l', long)]
        long: bool,
    },

    /// 搜索并下载壁纸到配置的保存目录
    ///
    /// 用法示例:
    ///   wallery fetch --query nature
    ///   wallery fetch -q landscape -n 5
    Fetch {
        #[command(flatten)]
        args: SearchArgs,

        /// 下载数量
        #[arg(short = 'n', long, default_value = "1", value_name = "N")]
        count: usize,
    },

    /// 一键更换：搜索、下载第一张结果并设置为桌面壁纸
    ///
    /// 用法示例:
    ///   wallery set --query nature
    ///   wallery set -s random
    Set {
        #[command(flatten)]
        args: SearchArgs,
    },

    /// 将本地指定的图片设置为桌面壁纸
    ///
    /// 用法示例:
    ///   wallery apply ~/Pictures/wallery/wallhaven-94x38z.jpg
    Apply {
        /// 图片的本地路径
        image: String,
    },

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   wallery config show
    ///   wallery config set-folder ~/Pictures/wallery
    ///   wallery config set-key <API_KEY>
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   wallery completions zsh > ~/.zsh/completions/_wallery
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },
}

/// 配置管理操作
#[derive(Subcommand)]
pub enum ConfigAction {
    /// 查看当前配置简报
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印当前完整配置内容
    Dump,
    /// 设置默认搜索参数 (query, categories, purity, sorting, order, range, atleast)
    Set {
        /// 要设置的键
        key: String,
        /// 要设置的值
        value: String,
    },
    /// 选定壁纸保存目录（持久化为带校验的目录引用）
    SetFolder {
        /// 目录路径，支持 ~ 展开
        path: String,
    },
    /// 保存 Wallhaven API Key 到机密存储
    SetKey {
        /// API Key（不能为空）
        key: String,
    },
    /// 从机密存储中删除已保存的 API Key
    ClearKey,
}
