// settings.rs — 搜索设置与请求 URL 构建模块
// SearchSettings 是纯值对象：全字段结构化相等，
// 任何一项改动都意味着当前结果列表失效（由 pager 负责 reset）

use std::fmt;
use std::str::FromStr;

/// Wallhaven 搜索接口的固定入口
const SEARCH_URL: &str = "https://wallhaven.cc/api/v1/search";

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sorting {
    #[default]
    DateAdded,
    Relevance,
    Random,
    Views,
    Favorites,
    Toplist,
}

impl Sorting {
    /// 查询参数里使用的名字
    pub fn as_param(self) -> &'static str {
        match self {
            Sorting::DateAdded => "date_added",
            Sorting::Relevance => "relevance",
            Sorting::Random => "random",
            Sorting::Views => "views",
            Sorting::Favorites => "favorites",
            Sorting::Toplist => "toplist",
        }
    }

    pub const ALL: [Sorting; 6] = [
        Sorting::DateAdded,
        Sorting::Relevance,
        Sorting::Random,
        Sorting::Views,
        Sorting::Favorites,
        Sorting::Toplist,
    ];
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for Sorting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sorting::ALL
            .into_iter()
            .find(|v| v.as_param() == s)
            .ok_or_else(|| format!("unknown sorting: {s}"))
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Descending,
    Ascending,
}

impl Order {
    pub fn as_param(self) -> &'static str {
        match self {
            Order::Descending => "desc",
            Order::Ascending => "asc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desc" => Ok(Order::Descending),
            "asc" => Ok(Order::Ascending),
            other => Err(format!("unknown order: {other}")),
        }
    }
}

/// toplist 排序的统计窗口
/// 只有 sorting = toplist 时才会被发送
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopRange {
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl TopRange {
    pub fn as_param(self) -> &'static str {
        match self {
            TopRange::OneDay => "1d",
            TopRange::ThreeDays => "3d",
            TopRange::OneWeek => "1w",
            TopRange::OneMonth => "1M",
            TopRange::ThreeMonths => "3M",
            TopRange::SixMonths => "6M",
            TopRange::OneYear => "1y",
        }
    }

    pub const ALL: [TopRange; 7] = [
        TopRange::OneDay,
        TopRange::ThreeDays,
        TopRange::OneWeek,
        TopRange::OneMonth,
        TopRange::ThreeMonths,
        TopRange::SixMonths,
        TopRange::OneYear,
    ];
}

impl fmt::Display for TopRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for TopRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TopRange::ALL
            .into_iter()
            .find(|v| v.as_param() == s)
            .ok_or_else(|| format!("unknown top range: {s}"))
    }
}

/// 标签与范围过滤器
///
/// username / exact_tag_id / 标签组合 / file_type / similar_to
/// 是互斥的二级查询片段，组合规则见 [`TagFilters::scope_fragment`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagFilters {
    /// 普通标签，原样写入
    pub tags: Vec<String>,
    /// 排除标签，前缀 `-`
    pub excluded_tags: Vec<String>,
    /// 必含标签，前缀 `+`
    pub required_tags: Vec<String>,
    /// 只看某个用户上传的壁纸
    pub username: Option<String>,
    /// 精确标签 ID
    pub exact_tag_id: Option<u64>,
    /// 按文件类型过滤（如 "png"）
    pub file_type: Option<String>,
    /// 查找与某张壁纸相似的结果，值为壁纸 ID
    pub similar_to: Option<String>,
}

impl TagFilters {
    /// 生成二级查询片段
    ///
    /// 原实现会把多个片段作为重复的 `q` 参数发出去，而按唯一键解析
    /// 查询串的接收端只会保留其中一个。这里收敛为恰好一个片段，
    /// 优先级沿用原实现的判断顺序：
    /// username → exact_tag_id → 标签组合 → file_type → similar_to
    fn scope_fragment(&self) -> Option<String> {
        if let Some(name) = &self.username {
            return Some(format!("@{name}"));
        }
        if let Some(id) = self.exact_tag_id {
            return Some(format!("id:{id}"));
        }

        let parts: Vec<String> = self
            .tags
            .iter()
            .cloned()
            .chain(self.excluded_tags.iter().map(|t| format!("-{t}")))
            .chain(self.required_tags.iter().map(|t| format!("+{t}")))
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(" "));
        }

        if let Some(ft) = &self.file_type {
            return Some(format!("type:{ft}"));
        }
        if let Some(id) = &self.similar_to {
            return Some(format!("like:{id}"));
        }
        None
    }
}

/// 分类开关，序列化为三位 0/1 串，顺序 general/anime/people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFlags {
    pub general: bool,
    pub anime: bool,
    pub people: bool,
}

impl Default for CategoryFlags {
    fn default() -> Self {
        Self { general: true, anime: true, people: true }
    }
}

impl CategoryFlags {
    pub fn flags(self) -> String {
        flag_string(&[self.general, self.anime, self.people])
    }

    /// 从 "101" 形式的三位串解析，长度或字符不合法时返回 None
    pub fn from_flags(s: &str) -> Option<Self> {
        let [general, anime, people] = parse_flags(s)?;
        Some(Self { general, anime, people })
    }
}

/// 内容分级开关，序列化为三位 0/1 串，顺序 sfw/sketchy/nsfw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurityFlags {
    pub sfw: bool,
    pub sketchy: bool,
    pub nsfw: bool,
}

impl Default for PurityFlags {
    fn default() -> Self {
        Self { sfw: true, sketchy: false, nsfw: false }
    }
}

impl PurityFlags {
    pub fn flags(self) -> String {
        flag_string(&[self.sfw, self.sketchy, self.nsfw])
    }

    pub fn from_flags(s: &str) -> Option<Self> {
        let [sfw, sketchy, nsfw] = parse_flags(s)?;
        Some(Self { sfw, sketchy, nsfw })
    }
}

fn flag_string(flags: &[bool; 3]) -> String {
    flags.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn parse_flags(s: &str) -> Option<[bool; 3]> {
    let mut out = [false; 3];
    if s.len() != 3 {
        return None;
    }
    for (slot, c) in out.iter_mut().zip(s.chars()) {
        *slot = match c {
            '1' => true,
            '0' => false,
            _ => return None,
        };
    }
    Some(out)
}

/// 一次搜索会话的全部设置
///
/// 每个会话构造一份默认值，由 UI / CLI 参数就地修改；
/// 修改后必须调用 `Pager::reset` 使已累积的结果失效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub sorting: Sorting,
    pub order: Order,
    /// 仅 sorting = toplist 时生效
    pub top_range: Option<TopRange>,
    /// 最低分辨率（如 "1920x1080"），对应 atleast 参数
    pub minimum_resolution: Option<String>,
    /// 精确分辨率列表，逗号连接
    pub resolutions: Vec<String>,
    /// 宽高比列表，逗号连接
    pub ratios: Vec<String>,
    /// 颜色过滤列表，逗号连接
    pub colors: Vec<String>,
    /// random 排序的种子；翻页时保持同一种子才能得到稳定的乱序
    pub seed: Option<String>,
    pub filters: TagFilters,
    pub categories: CategoryFlags,
    pub purity: PurityFlags,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            sorting: Sorting::DateAdded,
            order: Order::Descending,
            top_range: Some(TopRange::OneMonth),
            minimum_resolution: None,
            resolutions: Vec::new(),
            ratios: Vec::new(),
            colors: Vec::new(),
            seed: None,
            filters: TagFilters::default(),
            categories: CategoryFlags::default(),
            purity: PurityFlags::default(),
        }
    }
}

impl SearchSettings {
    /// 把搜索词、设置、页码和可选 API Key 组装成完整的请求 URL
    ///
    /// 纯函数：不碰网络和磁盘，相同输入永远得到字节一致的输出。
    /// 参数的出现顺序不构成契约，但 categories/purity 三位串内部的
    /// 顺序是有意义的，不能打乱。
    pub fn build_url(&self, query: &str, page: u32, api_key: Option<&str>) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        params.push(("q", self.compose_query(query)));
        params.push(("categories", self.categories.flags()));
        params.push(("purity", self.purity.flags()));
        params.push(("sorting", self.sorting.as_param().to_string()));
        params.push(("order", self.order.as_param().to_string()));

        if self.sorting == Sorting::Toplist {
            if let Some(range) = self.top_range {
                params.push(("topRange", range.as_param().to_string()));
            }
        }

        if let Some(atleast) = &self.minimum_resolution {
            params.push(("atleast", atleast.clone()));
        }
        if !self.resolutions.is_empty() {
            params.push(("resolutions", self.resolutions.join(",")));
        }
        if !self.ratios.is_empty() {
            params.push(("ratios", self.ratios.join(",")));
        }
        if !self.colors.is_empty() {
            params.push(("colors", self.colors.join(",")));
        }

        params.push(("page", page.to_string()));

        if let Some(seed) = &self.seed {
            params.push(("seed", seed.clone()));
        }
        if let Some(key) = api_key {
            params.push(("apikey", key.to_string()));
        }

        // 基址是常量、参数已是合法键值对，解析不会失败
        reqwest::Url::parse_with_params(SEARCH_URL, &params)
            .expect("constant base url")
            .to_string()
    }

    /// 把自由文本和二级过滤片段合并成唯一的 q 值
    fn compose_query(&self, query: &str) -> String {
        let base = query.trim();
        match self.filters.scope_fragment() {
            Some(fragment) if base.is_empty() => fragment,
            Some(fragment) => format!("{base} {fragment}"),
            None => base.to_string(),
        }
    }
}
