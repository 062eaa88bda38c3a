//! 注入点与已解析依赖

use crate::component::{BeanRef, ComponentDescriptor};
use crate::errors::{ContainerError, ContainerResult};
use crate::metadata::TypeInfo;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 注入目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteTarget {
    /// 按组件标识查找
    Identity(String),
    /// 按类型查找（具体类型或 `dyn Trait` 能力）
    Type(TypeInfo),
}

impl fmt::Display for SiteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(identity) => write!(f, "#{identity}"),
            Self::Type(type_info) => f.write_str(type_info.name),
        }
    }
}

/// 注入点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionSite {
    name: String,
    target: SiteTarget,
    required: bool,
}

impl InjectionSite {
    /// 按类型注入的必需注入点
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: SiteTarget::Type(TypeInfo::of::<T>()),
            required: true,
        }
    }

    /// 按标识注入的必需注入点
    pub fn named(name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: SiteTarget::Identity(identity.into()),
            required: true,
        }
    }

    /// 标记为可选注入点
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// 注入点名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 注入目标
    pub fn target(&self) -> &SiteTarget {
        &self.target
    }

    /// 是否必需
    pub fn is_required(&self) -> bool {
        self.required
    }
}

#[derive(Clone)]
struct Injected {
    descriptor: Arc<ComponentDescriptor>,
    instance: BeanRef,
}

/// 已解析的依赖集合
///
/// 由容器在调用工厂函数之前按注入点名称填充。
/// 可选注入点在无候选时不会出现在集合中。
#[derive(Clone)]
pub struct Dependencies {
    owner: String,
    resolved: HashMap<String, Injected>,
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sites: Vec<_> = self
            .resolved
            .iter()
            .map(|(site, injected)| (site.as_str(), injected.descriptor.identity()))
            .collect();
        sites.sort_unstable();
        f.debug_struct("Dependencies")
            .field("owner", &self.owner)
            .field("resolved", &sites)
            .finish()
    }
}

impl Dependencies {
    /// 创建空的依赖集合
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            resolved: HashMap::new(),
        }
    }

    /// 组件所有者标识
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// 写入注入点的解析结果
    pub fn insert(
        &mut self,
        site: impl Into<String>,
        descriptor: Arc<ComponentDescriptor>,
        instance: BeanRef,
    ) {
        self.resolved.insert(
            site.into(),
            Injected {
                descriptor,
                instance,
            },
        );
    }

    /// 注入点是否已解析
    pub fn contains(&self, site: &str) -> bool {
        self.resolved.contains_key(site)
    }

    /// 获取必需依赖（具体类型）
    pub fn get<T: Send + Sync + 'static>(&self, site: &str) -> ContainerResult<Arc<T>> {
        self.optional::<T>(site)?
            .ok_or_else(|| self.unresolved(site, std::any::type_name::<T>()))
    }

    /// 获取必需依赖（能力类型）
    pub fn get_as<C: ?Sized + 'static>(&self, site: &str) -> ContainerResult<Arc<C>> {
        self.optional_as::<C>(site)?
            .ok_or_else(|| self.unresolved(site, std::any::type_name::<C>()))
    }

    /// 获取可选依赖（具体类型）
    pub fn optional<T: Send + Sync + 'static>(&self, site: &str) -> ContainerResult<Option<Arc<T>>> {
        let Some(injected) = self.resolved.get(site) else {
            return Ok(None);
        };

        injected
            .instance
            .clone()
            .downcast::<T>()
            .map(Some)
            .map_err(|_| {
                ContainerError::type_mismatch(
                    injected.descriptor.identity(),
                    std::any::type_name::<T>(),
                )
            })
    }

    /// 获取可选依赖（能力类型）
    pub fn optional_as<C: ?Sized + 'static>(&self, site: &str) -> ContainerResult<Option<Arc<C>>> {
        let Some(injected) = self.resolved.get(site) else {
            return Ok(None);
        };

        injected
            .descriptor
            .cast::<C>(&injected.instance)
            .map(Some)
            .ok_or_else(|| {
                ContainerError::type_mismatch(
                    injected.descriptor.identity(),
                    std::any::type_name::<C>(),
                )
            })
    }

    fn unresolved(&self, site: &str, target: &str) -> ContainerError {
        ContainerError::UnresolvedRequiredDependency {
            owner: self.owner.clone(),
            site: site.to_string(),
            target: target.to_string(),
        }
    }
}
