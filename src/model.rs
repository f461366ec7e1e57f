// model.rs — Wallhaven 壁纸数据模型
// 与 API 返回的 JSON 字段一一对应，解码后不可变；
// 每页请求都会产生全新实例，追加到结果列表（不做去重合并）

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

/// created_at 字段的固定格式（秒级精度）
/// 不匹配该格式的字符串会让整条记录解码失败，而不是部分生效
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 搜索响应的顶层结构
///
/// Wallhaven API 每页最多返回 24 条结果，`data` 为空数组表示没有更多页
#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    pub data: Vec<Wallpaper>,
}

/// 单张壁纸的完整数据
///
/// JSON 中多余的字段会被 serde 自动忽略
#[derive(Deserialize, Debug, Clone)]
pub struct Wallpaper {
    /// 壁纸唯一标识符（如 "94x38z"）
    pub id: String,

    /// 壁纸详情页 URL
    pub url: String,

    /// 短链接
    #[serde(rename = "short_url")]
    pub short_url: String,

    /// 浏览次数
    pub views: u64,

    /// 收藏次数
    pub favorites: u64,

    /// 来源站点 URL（可能为空字符串）
    pub source: String,

    /// 内容分级
    pub purity: Purity,

    /// 分类（general / anime / people）
    pub category: String,

    /// 上传时间，固定格式 "yyyy-MM-dd HH:mm:ss"
    #[serde(rename = "created_at", deserialize_with = "deserialize_created_at")]
    pub created_at: NaiveDateTime,

    /// 图片文件类型（如 "image/jpeg"）
    #[serde(rename = "file_type")]
    pub file_type: String,

    /// 文件大小，单位字节
    #[serde(rename = "file_size")]
    pub file_size: u64,

    /// 主色调列表（十六进制颜色串）
    pub colors: Vec<String>,

    /// 原图的直接下载 URL
    /// 格式如：https://w.wallhaven.cc/full/94/wallhaven-94x38z.jpg
    pub path: String,

    /// 上传者信息，匿名壁纸没有该字段
    #[serde(default)]
    pub uploader: Option<Uploader>,

    /// 缩略图集合
    pub thumbs: Thumbs,
}

/// 内容分级：与搜索过滤器里的 Purity 开关一一对应
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Purity {
    Sfw,
    Sketchy,
    Nsfw,
}

impl Purity {
    pub fn as_str(self) -> &'static str {
        match self {
            Purity::Sfw => "sfw",
            Purity::Sketchy => "sketchy",
            Purity::Nsfw => "nsfw",
        }
    }
}

/// 三种尺寸的缩略图 URL
#[derive(Deserialize, Debug, Clone)]
pub struct Thumbs {
    pub large: String,
    pub original: String,
    pub small: String,
}

/// 上传者信息
#[derive(Deserialize, Debug, Clone)]
pub struct Uploader {
    pub username: String,
    pub group: String,
    pub avatar: Avatar,
}

/// 上传者头像，四种固定分辨率
/// JSON key 以数字开头，必须用 rename 映射
#[derive(Deserialize, Debug, Clone)]
pub struct Avatar {
    #[serde(rename = "200px")]
    pub px200: String,
    #[serde(rename = "128px")]
    pub px128: String,
    #[serde(rename = "32px")]
    pub px32: String,
    #[serde(rename = "20px")]
    pub px20: String,
}

/// 按固定格式解析 created_at
///
/// chrono 的 parse_from_str 是严格匹配：多一个字符、少一位秒数都会报错，
/// 这里把解析错误转成 serde 的自定义错误，让整条记录解码失败
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, CREATED_AT_FORMAT).map_err(serde::de::Error::custom)
}

impl Wallpaper {
    /// 从原图 URL 中取最后一段路径作为本地文件名
    /// URL 不含 '/' 时退回默认名（实际 API 不会出现这种情况）
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("wallpaper.jpg")
    }

    /// 文件大小换算为 MB，用于展示
    pub fn file_size_mb(&self) -> f64 {
        self.file_size as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    /// 一条接近真实 API 返回的完整记录
    fn sample_json() -> &'static str {
        r##"{
            "id": "94x38z",
            "url": "https://wallhaven.cc/w/94x38z",
            "short_url": "https://whvn.cc/94x38z",
            "views": 12850,
            "favorites": 623,
            "source": "https://example.com/art",
            "purity": "sfw",
            "category": "general",
            "created_at": "2024-03-01 10:00:00",
            "file_type": "image/jpeg",
            "file_size": 4145234,
            "colors": ["#424153", "#999999"],
            "path": "https://w.wallhaven.cc/full/94/wallhaven-94x38z.jpg",
            "uploader": {
                "username": "someone",
                "group": "User",
                "avatar": {
                    "200px": "https://wallhaven.cc/images/user/avatar/200/a.png",
                    "128px": "https://wallhaven.cc/images/user/avatar/128/a.png",
                    "32px": "https://wallhaven.cc/images/user/avatar/32/a.png",
                    "20px": "https://wallhaven.cc/images/user/avatar/20/a.png"
                }
            },
            "thumbs": {
                "large": "https://th.wallhaven.cc/lg/94/94x38z.jpg",
                "original": "https://th.wallhaven.cc/orig/94/94x38z.jpg",
                "small": "https://th.wallhaven.cc/small/94/94x38z.jpg"
            }
        }"#
    }

    #[test]
    fn decodes_full_record() {
        let w: Wallpaper = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(w.id, "94x38z");
        assert_eq!(w.views, 12850);
        assert_eq!(w.favorites, 623);
        assert_eq!(w.purity, Purity::Sfw);
        assert_eq!(w.file_size, 4145234);
        assert_eq!(w.colors.len(), 2);
        assert_eq!(w.thumbs.small, "https://th.wallhaven.cc/small/94/94x38z.jpg");
        let up = w.uploader.as_ref().unwrap();
        assert_eq!(up.username, "someone");
        assert_eq!(up.avatar.px32, "https://wallhaven.cc/images/user/avatar/32/a.png");
    }

    #[test]
    fn created_at_parses_exact_format() {
        let w: Wallpaper = serde_json::from_str(sample_json()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(w.created_at, expected);
        assert_eq!(w.created_at.hour(), 10);
    }

    #[test]
    fn created_at_rejects_other_formats() {
        // 换成美式日期格式，整条记录必须解码失败
        let bad = sample_json().replace("2024-03-01 10:00:00", "03/01/2024");
        let result: Result<Wallpaper, _> = serde_json::from_str(&bad);
        assert!(result.is_err());
    }

    #[test]
    fn uploader_is_optional() {
        // 删除 uploader 字段，记录仍可解码
        let json = sample_json().replace(
            r#""uploader": {
                "username": "someone",
                "group": "User",
                "avatar": {
                    "200px": "https://wallhaven.cc/images/user/avatar/200/a.png",
                    "128px": "https://wallhaven.cc/images/user/avatar/128/a.png",
                    "32px": "https://wallhaven.cc/images/user/avatar/32/a.png",
                    "20px": "https://wallhaven.cc/images/user/avatar/20/a.png"
                }
            },"#,
            "",
        );
        let w: Wallpaper = serde_json::from_str(&json).unwrap();
        assert!(w.uploader.is_none());
    }

    #[test]
    fn envelope_with_empty_data() {
        let resp: SearchResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn file_name_is_last_path_segment() {
        let w: Wallpaper = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(w.file_name(), "wallhaven-94x38z.jpg");
    }
}
