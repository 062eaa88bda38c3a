//! 组件编译期目录与发现结果
//!
//! 目录条目在加载期由 `#[component]` / `#[configuration]` 宏生成的 `ctor` 函数提交，
//! 也可以通过 [`ComponentCatalog::submit`] 手工提交。扫描器从目录中挑选位于根包之下的条目。

use crate::component::ComponentDescriptor;
use crate::configuration::ConfigurationCategory;
use crate::conventions::PackageConventions;
use crate::errors::{ContainerError, ContainerResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 容器标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// 普通组件
    Component,
    /// 框架配置候选者
    Configuration {
        category: ConfigurationCategory,
        is_default: bool,
    },
}

impl Marker {
    /// 是否为配置标记
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// 目录条目
#[derive(Clone)]
pub struct CatalogEntry {
    /// 简短类型名称
    pub type_name: &'static str,
    /// 定义该类型的模块路径
    pub module_path: &'static str,
    /// 容器标记
    pub marker: Marker,
    describe: Option<fn() -> ComponentDescriptor>,
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("type_name", &self.type_name)
            .field("module_path", &self.module_path)
            .field("marker", &self.marker)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

impl CatalogEntry {
    /// 可构造的目录条目
    pub const fn new(
        type_name: &'static str,
        module_path: &'static str,
        marker: Marker,
        describe: fn() -> ComponentDescriptor,
    ) -> Self {
        Self {
            type_name,
            module_path,
            marker,
            describe: Some(describe),
        }
    }

    /// 不可构造的目录条目（trait 上的标记）
    pub const fn interface(type_name: &'static str, module_path: &'static str, marker: Marker) -> Self {
        Self {
            type_name,
            module_path,
            marker,
            describe: None,
        }
    }

    /// 完整限定名称
    pub fn qualified_name(&self) -> String {
        let module_path = PackageConventions::normalize(self.module_path);
        if module_path.is_empty() {
            self.type_name.to_string()
        } else {
            format!("{module_path}::{}", self.type_name)
        }
    }

    /// 是否可构造
    pub fn is_constructible(&self) -> bool {
        self.describe.is_some()
    }

    /// 生成组件描述符，不可构造的条目返回注册错误
    pub fn describe(&self) -> ContainerResult<ComponentDescriptor> {
        match self.describe {
            Some(describe) => Ok(describe()),
            None => Err(ContainerError::configuration_invalid(format!(
                "{} 不是可构造的类型，不能作为容器组件注册",
                self.qualified_name()
            ))),
        }
    }
}

/// 组件目录
#[derive(Debug, Default)]
pub struct ComponentCatalog {
    entries: RwLock<Vec<CatalogEntry>>,
}

static GLOBAL_CATALOG: Lazy<Arc<ComponentCatalog>> = Lazy::new(|| Arc::new(ComponentCatalog::new()));

impl ComponentCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级目录
    pub fn global() -> Arc<ComponentCatalog> {
        GLOBAL_CATALOG.clone()
    }

    /// 提交目录条目，同名条目以后提交者为准
    pub fn submit(&self, entry: CatalogEntry) {
        let qualified_name = entry.qualified_name();
        let mut entries = self.entries.write();
        if let Some(existing) = entries
            .iter_mut()
            .find(|existing| existing.qualified_name() == qualified_name)
        {
            tracing::debug!("目录条目被替换: {}", qualified_name);
            *existing = entry;
        } else {
            tracing::trace!("提交目录条目: {}", qualified_name);
            entries.push(entry);
        }
    }

    /// 全部条目，按模块路径与类型名称排序
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let mut entries = self.entries.read().clone();
        entries.sort_by(|a, b| {
            PackageConventions::normalize(a.module_path)
                .cmp(&PackageConventions::normalize(b.module_path))
                .then_with(|| a.type_name.cmp(b.type_name))
        });
        entries
    }

    /// 位于根包之下的条目
    pub fn entries_within(&self, root_package: &str) -> Vec<CatalogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| PackageConventions::is_within(entry.module_path, root_package))
            .collect()
    }

    /// 按完整限定名称查找条目
    pub fn find(&self, qualified_name: &str) -> Option<CatalogEntry> {
        let qualified_name = PackageConventions::normalize(qualified_name);
        self.entries
            .read()
            .iter()
            .find(|entry| entry.qualified_name() == qualified_name)
            .cloned()
    }

    /// 目录条目数量
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// 向进程级目录提交条目
///
/// 由组件宏生成的加载期函数调用
pub fn submit_catalog_entry(entry: CatalogEntry) {
    ComponentCatalog::global().submit(entry);
}

/// 发现结果
#[derive(Debug, Clone)]
pub struct DiscoveredComponent {
    /// 组件描述符
    pub descriptor: ComponentDescriptor,
    /// 容器标记
    pub marker: Marker,
    /// 来源（目录条目名称或清单文件路径）
    pub origin: String,
}

impl DiscoveredComponent {
    /// 从目录条目生成发现结果
    pub fn from_entry(entry: &CatalogEntry) -> ContainerResult<Self> {
        Ok(Self {
            descriptor: entry.describe()?,
            marker: entry.marker,
            origin: entry.qualified_name(),
        })
    }
}
