//! 组件扫描器实现
//!
//! - [`CatalogScanner`] 读取进程内编译期目录
//! - [`DirectoryScanner`] 遍历展开的目录树中的组件清单
//! - [`ArchiveScanner`] 读取 tar 归档中的组件清单

use crate::manifest::{resolve_manifests, MANIFEST_SUFFIX};
use container_common::{
    ComponentCatalog, ContainerError, ContainerResult, DiscoveredComponent, PackageConventions,
};
use di_abstractions::ComponentScanner;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 清单内容按 UTF-8 解码，无法解码的清单记录警告后跳过
fn decode_manifest(origin: &str, bytes: Vec<u8>) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("跳过无法解码的组件清单 {}: {}", origin, e);
            None
        }
    }
}

/// 编译期目录扫描器
#[derive(Debug, Clone)]
pub struct CatalogScanner {
    catalog: Arc<ComponentCatalog>,
}

impl CatalogScanner {
    /// 使用指定目录创建扫描器
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        Self { catalog }
    }

    /// 使用进程级目录
    pub fn global() -> Self {
        Self::new(ComponentCatalog::global())
    }
}

impl ComponentScanner for CatalogScanner {
    fn scan(&self, root_package: &str) -> ContainerResult<Vec<DiscoveredComponent>> {
        let entries = self.catalog.entries_within(root_package);
        if entries.is_empty() {
            return Err(ContainerError::discovery_failure(
                root_package,
                "编译期目录中没有位于该包之下的组件",
            ));
        }

        let discovered = entries
            .iter()
            .map(DiscoveredComponent::from_entry)
            .collect::<ContainerResult<Vec<_>>>()?;

        info!("目录扫描完成: {}, 发现 {} 个组件", root_package, discovered.len());
        Ok(discovered)
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

/// 目录树扫描器
///
/// 在 `<base>/<包路径>/` 下递归收集 `*.component.toml` 清单
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    base: PathBuf,
    catalog: Arc<ComponentCatalog>,
}

impl DirectoryScanner {
    /// 以 `base` 为根目录创建扫描器
    pub fn new(base: impl Into<PathBuf>, catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            base: base.into(),
            catalog,
        }
    }

    fn relative_origin(&self, path: &Path) -> String {
        path.strip_prefix(&self.base)
            .unwrap_or(path)
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl ComponentScanner for DirectoryScanner {
    fn scan(&self, root_package: &str) -> ContainerResult<Vec<DiscoveredComponent>> {
        let root = PackageConventions::to_path_segments(root_package)
            .iter()
            .fold(self.base.clone(), |path, segment| path.join(segment));

        if !root.is_dir() {
            return Err(ContainerError::discovery_failure(
                root_package,
                format!("包目录不存在或不可读: {}", root.display()),
            ));
        }

        let mut manifests = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                ContainerError::discovery_failure(root_package, format!("目录遍历失败: {}", e))
            })?;
            let is_manifest = entry.file_type().is_file()
                && entry.file_name().to_string_lossy().ends_with(MANIFEST_SUFFIX);
            if !is_manifest {
                continue;
            }

            let origin = self.relative_origin(entry.path());
            let bytes = fs::read(entry.path()).map_err(|e| {
                ContainerError::discovery_failure(root_package, format!("清单读取失败 {}: {}", origin, e))
            })?;
            if let Some(text) = decode_manifest(&origin, bytes) {
                debug!("读取组件清单: {}", origin);
                manifests.push((origin, text));
            }
        }

        if manifests.is_empty() {
            return Err(ContainerError::discovery_failure(
                root_package,
                format!("包目录中没有组件清单: {}", root.display()),
            ));
        }
        manifests.sort_by(|a, b| a.0.cmp(&b.0));

        let discovered = resolve_manifests(manifests, &self.catalog)?;
        info!("目录树扫描完成: {}, 发现 {} 个组件", root_package, discovered.len());
        Ok(discovered)
    }

    fn name(&self) -> &str {
        "directory"
    }
}

/// tar 归档扫描器
#[derive(Debug, Clone)]
pub struct ArchiveScanner {
    archive: PathBuf,
    catalog: Arc<ComponentCatalog>,
}

impl ArchiveScanner {
    /// 读取指定 tar 归档
    pub fn new(archive: impl Into<PathBuf>, catalog: Arc<ComponentCatalog>) -> Self {
        Self {
            archive: archive.into(),
            catalog,
        }
    }

    fn read_manifests(&self, prefix: &str) -> std::io::Result<Vec<(String, String)>> {
        let mut archive = tar::Archive::new(fs::File::open(&self.archive)?);
        let mut manifests = Vec::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let origin = entry
                .path()?
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .filter(|segment| segment != ".")
                .collect::<Vec<_>>()
                .join("/");
            let under_prefix = prefix.is_empty() || origin.starts_with(&format!("{prefix}/"));
            if !under_prefix || !origin.ends_with(MANIFEST_SUFFIX) {
                continue;
            }

            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            if let Some(text) = decode_manifest(&origin, bytes) {
                manifests.push((origin, text));
            }
        }

        Ok(manifests)
    }
}

impl ComponentScanner for ArchiveScanner {
    fn scan(&self, root_package: &str) -> ContainerResult<Vec<DiscoveredComponent>> {
        let prefix = PackageConventions::to_path_segments(root_package).join("/");

        let mut manifests = self.read_manifests(&prefix).map_err(|e| {
            ContainerError::discovery_failure(
                root_package,
                format!("归档不可读 {}: {}", self.archive.display(), e),
            )
        })?;

        if manifests.is_empty() {
            return Err(ContainerError::discovery_failure(
                root_package,
                format!("归档中没有位于该包之下的组件清单: {}", self.archive.display()),
            ));
        }
        manifests.sort_by(|a, b| a.0.cmp(&b.0));

        let discovered = resolve_manifests(manifests, &self.catalog)?;
        info!("归档扫描完成: {}, 发现 {} 个组件", root_package, discovered.len());
        Ok(discovered)
    }

    fn name(&self) -> &str {
        "archive"
    }
}
