//! 组件查找抽象接口
//!
//! [`BeanLookup`] 是对象安全的，子系统可以持有 `Arc<dyn BeanLookup>`；
//! [`BeanLookupExt`] 在其之上提供类型化的查找方法。

use container_common::{
    BeanRef, ComponentDescriptor, ConfigurationCategory, ContainerError, ContainerResult, TypeInfo,
};
use std::sync::Arc;

/// 已解析的组件实例及其描述符
#[derive(Debug, Clone)]
pub struct ResolvedBean {
    /// 组件描述符
    pub descriptor: Arc<ComponentDescriptor>,
    /// 组件实例
    pub instance: BeanRef,
}

impl ResolvedBean {
    /// 创建已解析组件
    pub fn new(descriptor: Arc<ComponentDescriptor>, instance: BeanRef) -> Self {
        Self {
            descriptor,
            instance,
        }
    }

    /// 组件标识
    pub fn identity(&self) -> &str {
        self.descriptor.identity()
    }

    /// 以具体类型查看实例
    pub fn downcast<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.instance.clone().downcast::<T>().map_err(|_| {
            ContainerError::type_mismatch(self.identity(), std::any::type_name::<T>())
        })
    }

    /// 以能力类型查看实例
    pub fn cast<C: ?Sized + 'static>(&self) -> ContainerResult<Arc<C>> {
        self.descriptor
            .cast::<C>(&self.instance)
            .ok_or_else(|| ContainerError::type_mismatch(self.identity(), std::any::type_name::<C>()))
    }
}

/// 组件查找 trait
pub trait BeanLookup: Send + Sync {
    /// 按类型（具体类型或能力）查找唯一组件
    fn lookup_by_type(&self, type_info: TypeInfo) -> ContainerResult<ResolvedBean>;

    /// 按标识查找组件
    fn lookup_by_name(&self, name: &str) -> ContainerResult<ResolvedBean>;

    /// 按类型查找所有组件，按注册顺序
    fn lookup_all(&self, type_info: TypeInfo) -> ContainerResult<Vec<ResolvedBean>>;

    /// 查找配置槽位中的活跃实例
    fn lookup_configuration(&self, category: ConfigurationCategory) -> ContainerResult<ResolvedBean>;

    /// 是否注册了指定标识的组件
    fn contains_bean(&self, name: &str) -> bool;
}

/// 类型化的组件查找扩展
pub trait BeanLookupExt: BeanLookup {
    /// 按具体类型获取组件
    fn get<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.lookup_by_type(TypeInfo::of::<T>())?.downcast::<T>()
    }

    /// 按能力获取唯一组件
    fn get_as<C: ?Sized + 'static>(&self) -> ContainerResult<Arc<C>> {
        self.lookup_by_type(TypeInfo::of::<C>())?.cast::<C>()
    }

    /// 按标识获取并转换为具体类型
    fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> ContainerResult<Arc<T>> {
        self.lookup_by_name(name)?.downcast::<T>()
    }

    /// 获取所有具备指定能力的组件
    fn get_all_as<C: ?Sized + 'static>(&self) -> ContainerResult<Vec<Arc<C>>> {
        self.lookup_all(TypeInfo::of::<C>())?
            .iter()
            .map(ResolvedBean::cast::<C>)
            .collect()
    }

    /// 获取配置槽位实例并转换为能力
    fn get_configuration_as<C: ?Sized + 'static>(
        &self,
        category: ConfigurationCategory,
    ) -> ContainerResult<Arc<C>> {
        self.lookup_configuration(category)?.cast::<C>()
    }
}

impl<L: BeanLookup + ?Sized> BeanLookupExt for L {}
