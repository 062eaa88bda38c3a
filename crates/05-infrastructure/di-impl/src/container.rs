//! 应用容器
//!
//! 组件注册表与配置槽位注册表之上的门面，只做委托。

use crate::configuration::ConfigurationRegistry;
use crate::registry::BeanRegistry;
use crate::report::ContainerReport;
use chrono::{DateTime, Utc};
use container_common::{
    BeanRef, BeanState, ConfigurationCategory, ContainerResult, TypeInfo,
};
use di_abstractions::{BeanLookup, BeanLookupExt, ResolvedBean};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 应用容器
///
/// 查找使用递归读锁，组件构造期间的嵌套查找不会死锁；关闭时获取写锁。
#[derive(Debug)]
pub struct ApplicationContainer {
    id: Uuid,
    started_at: DateTime<Utc>,
    beans: RwLock<BeanRegistry>,
    configurations: RwLock<ConfigurationRegistry>,
}

impl ApplicationContainer {
    /// 启动容器：启动组件注册表，然后激活所有配置槽位
    pub fn start(
        mut beans: BeanRegistry,
        configurations: ConfigurationRegistry,
    ) -> ContainerResult<Self> {
        let id = Uuid::new_v4();
        info!("启动容器: {}", id);

        beans.start()?;
        configurations.activate(&beans)?;

        let container = Self {
            id,
            started_at: Utc::now(),
            beans: RwLock::new(beans),
            configurations: RwLock::new(configurations),
        };

        info!(
            "容器已启动: {}, 组件 {} 个, 配置槽位 {} 个",
            container.id,
            container.beans.read().len(),
            container.configurations.read().active_configurations().len()
        );
        Ok(container)
    }

    /// 容器ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 启动时间
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 按具体类型获取组件
    pub fn get_bean<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.get::<T>()
    }

    /// 按能力获取唯一组件
    pub fn get_bean_as<C: ?Sized + 'static>(&self) -> ContainerResult<Arc<C>> {
        self.get_as::<C>()
    }

    /// 按标识获取组件
    pub fn get_bean_by_name(&self, name: &str) -> ContainerResult<BeanRef> {
        Ok(self.lookup_by_name(name)?.instance)
    }

    /// 按标识获取组件并转换为具体类型
    pub fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> ContainerResult<Arc<T>> {
        BeanLookupExt::get_named::<T>(self, name)
    }

    /// 获取所有具备指定能力的组件，按注册顺序
    pub fn get_beans<C: ?Sized + 'static>(&self) -> ContainerResult<Vec<Arc<C>>> {
        self.get_all_as::<C>()
    }

    /// 每个已注册组件各解析一次，按注册顺序；原型组件得到新实例
    pub fn get_all_beans(&self) -> ContainerResult<Vec<ResolvedBean>> {
        self.beans.read_recursive().resolve_every()
    }

    /// 获取配置槽位实例
    pub fn get_configuration<C: ?Sized + 'static>(
        &self,
        category: ConfigurationCategory,
    ) -> ContainerResult<Arc<C>> {
        self.get_configuration_as::<C>(category)
    }

    /// 组件生命周期状态
    pub fn bean_state(&self, name: &str) -> BeanState {
        self.beans.read_recursive().state(name)
    }

    /// 诊断报告
    pub fn report(&self) -> ContainerReport {
        let beans = self.beans.read_recursive();
        let configurations = self.configurations.read_recursive();
        ContainerReport {
            container_id: self.id,
            started_at: self.started_at,
            beans: ContainerReport::beans_of(&beans),
            configurations: configurations.active_configurations(),
            arbitration: configurations.history().to_vec(),
        }
    }

    /// 关闭容器：先销毁配置实例，再按构造逆序销毁单例
    pub fn shutdown(&self) {
        info!("关闭容器: {}", self.id);
        self.configurations.write().teardown();
        self.beans.write().teardown();
    }
}

impl BeanLookup for ApplicationContainer {
    fn lookup_by_type(&self, type_info: TypeInfo) -> ContainerResult<ResolvedBean> {
        self.beans.read_recursive().resolve_by_type(type_info)
    }

    fn lookup_by_name(&self, name: &str) -> ContainerResult<ResolvedBean> {
        self.beans.read_recursive().resolve_by_name(name)
    }

    fn lookup_all(&self, type_info: TypeInfo) -> ContainerResult<Vec<ResolvedBean>> {
        self.beans.read_recursive().resolve_all(type_info)
    }

    fn lookup_configuration(&self, category: ConfigurationCategory) -> ContainerResult<ResolvedBean> {
        let configurations = self.configurations.read_recursive();
        let beans = self.beans.read_recursive();
        configurations.resolve(category, &beans)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.beans.read_recursive().contains(name)
    }
}
