//! 组件清单
//!
//! 目录与归档布局中，每个被发现的组件由一个 `*.component.toml` 清单描述，
//! 清单引用编译期目录中的类型，由目录提供构造函数。
//!
//! ```toml
//! type = "shop::services::OrderService"
//! marker = "component"
//! name = "orders"
//! scope = "prototype"
//! init = "lazy"
//! ```

use container_common::{
    ComponentCatalog, ConfigurationCategory, ContainerError, ContainerResult, DiscoveredComponent,
    InitMode, Marker, Scope,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// 清单文件后缀
pub const MANIFEST_SUFFIX: &str = ".component.toml";

/// 清单标记类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestMarker {
    #[default]
    Component,
    Configuration,
}

/// 组件清单
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentManifest {
    /// 目录中的完整限定类型名称
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub marker: ManifestMarker,
    /// 组件标识覆盖
    pub name: Option<String>,
    /// 作用域覆盖
    pub scope: Option<String>,
    /// 初始化模式覆盖
    pub init: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// 配置槽位类别
    pub category: Option<String>,
    #[serde(default)]
    pub default: bool,
}

/// 清单处理错误
#[derive(Debug, Error)]
pub enum ManifestError {
    /// 格式错误的条目，记录后跳过
    #[error("清单格式错误: {0}")]
    Malformed(String),
    /// 不可构造的候选者，立即报告
    #[error(transparent)]
    Rejected(#[from] ContainerError),
}

impl ComponentManifest {
    /// 解析清单文本
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        toml::from_str(text).map_err(|e| ManifestError::Malformed(e.to_string()))
    }

    /// 结合编译期目录生成发现结果
    pub fn resolve(
        &self,
        catalog: &ComponentCatalog,
        origin: &str,
    ) -> Result<DiscoveredComponent, ManifestError> {
        if self.is_abstract {
            return Err(ContainerError::configuration_invalid(format!(
                "{} 被标记为抽象类型，不能作为容器组件注册 ({origin})",
                self.type_name
            ))
            .into());
        }

        let entry = catalog.find(&self.type_name).ok_or_else(|| {
            ManifestError::Malformed(format!("编译期目录中不存在类型 {}", self.type_name))
        })?;

        let marker = match self.marker {
            ManifestMarker::Component => Marker::Component,
            ManifestMarker::Configuration => {
                let category = self.category.as_deref().ok_or_else(|| {
                    ManifestError::Malformed(format!("配置标记缺少类别: {}", self.type_name))
                })?;
                Marker::Configuration {
                    category: category
                        .parse::<ConfigurationCategory>()
                        .map_err(|e| ManifestError::Malformed(e.to_string()))?,
                    is_default: self.default,
                }
            }
        };

        let mut descriptor = entry.describe()?;
        if let Some(name) = &self.name {
            descriptor = descriptor.named(name.clone());
        }
        if let Some(scope) = &self.scope {
            descriptor = descriptor.with_scope(
                scope
                    .parse::<Scope>()
                    .map_err(|e| ManifestError::Malformed(e.to_string()))?,
            );
        }
        if let Some(init) = &self.init {
            descriptor = descriptor.with_init_mode(
                init.parse::<InitMode>()
                    .map_err(|e| ManifestError::Malformed(e.to_string()))?,
            );
        }

        Ok(DiscoveredComponent {
            descriptor,
            marker,
            origin: origin.to_string(),
        })
    }
}

/// 处理一组 (来源, 清单文本)，来源须已排序
///
/// 格式错误的条目记录警告后跳过，不可构造的候选者使整个发现过程失败
pub fn resolve_manifests(
    manifests: Vec<(String, String)>,
    catalog: &ComponentCatalog,
) -> ContainerResult<Vec<DiscoveredComponent>> {
    let mut discovered = Vec::with_capacity(manifests.len());

    for (origin, text) in manifests {
        match ComponentManifest::parse(&text).and_then(|manifest| manifest.resolve(catalog, &origin)) {
            Ok(component) => {
                debug!("发现组件: {} <- {}", component.descriptor.identity(), origin);
                discovered.push(component);
            }
            Err(ManifestError::Malformed(message)) => {
                warn!("跳过格式错误的组件清单 {}: {}", origin, message);
            }
            Err(ManifestError::Rejected(error)) => return Err(error),
        }
    }

    Ok(discovered)
}
