// secrets.rs — 机密存储模块
// API Key 与普通配置记录分开存放：credentials.toml 用 0600 权限落盘，
// 内容是 固定标识符 → 值 的映射，普通配置文件不应获得这种保密级别

use crate::error::{Result, WalleryError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Wallhaven API Key 在机密存储里的固定标识符
pub const API_KEY_ID: &str = "wallhaven-api-key";

/// 文件后端的机密存储
pub struct SecretStore {
    path: PathBuf,
}

impl SecretStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join("credentials.toml"),
        }
    }

    /// 按标识符写入一条机密
    ///
    /// 空值在任何磁盘操作之前就被拒绝，不会留下空条目
    pub fn set(&self, id: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(WalleryError::EmptyApiKey);
        }

        let mut entries = self.read_entries();
        entries.insert(id.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    /// 按标识符读取机密，不存在时返回 None
    pub fn get(&self, id: &str) -> Option<String> {
        self.read_entries().remove(id)
    }

    /// 删除一条机密；条目本就不存在也算成功
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.read_entries();
        if entries.remove(id).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = toml::to_string_pretty(entries).map_err(std::io::Error::other)?;
        fs::write(&self.path, body)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

/// 机密文件只允许属主读写
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
