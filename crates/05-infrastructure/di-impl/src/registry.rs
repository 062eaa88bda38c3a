//! 组件注册表
//!
//! 持有组件描述符、单例缓存与类型索引，负责按注入点深度优先地解析并构造组件。

use crate::graph::DependencyGraph;
use container_common::{
    BeanRef, BeanState, ComponentDescriptor, ContainerError, ContainerResult, Dependencies,
    InjectionSite, Scope, SiteTarget, TypeInfo,
};
use dashmap::DashMap;
use di_abstractions::{ResolutionStack, ResolveOptions, ResolvedBean};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 组件注册表
///
/// 注册阶段需要 `&mut self`；启动后注册表冻结，所有解析操作只需要 `&self`，
/// 可在多个线程间共享。单例在 [`OnceCell`] 中构造，竞争的首次查找只构造一次。
pub struct BeanRegistry {
    descriptors: Vec<Arc<ComponentDescriptor>>,
    by_identity: HashMap<String, usize>,
    /// 具体类型与能力 -> 按注册顺序排列的组件索引
    by_type: HashMap<TypeId, Vec<usize>>,
    singletons: Vec<OnceCell<BeanRef>>,
    states: DashMap<usize, BeanState>,
    construction_order: Mutex<Vec<usize>>,
    options: ResolveOptions,
    started: bool,
}

impl fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanRegistry")
            .field("identities", &self.identities())
            .field("options", &self.options)
            .field("started", &self.started)
            .finish()
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::with_options(ResolveOptions::default())
    }

    /// 使用解析选项创建注册表
    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            descriptors: Vec::new(),
            by_identity: HashMap::new(),
            by_type: HashMap::new(),
            singletons: Vec::new(),
            states: DashMap::new(),
            construction_order: Mutex::new(Vec::new()),
            options,
            started: false,
        }
    }

    /// 解析选项
    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// 是否已启动
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// 注册组件描述符
    ///
    /// 标识冲突时返回 [`ContainerError::IdentityCollision`]，此时不会构造任何实例
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> ContainerResult<()> {
        if self.started {
            return Err(ContainerError::configuration_invalid(format!(
                "组件注册表已启动，无法再注册组件: {}",
                descriptor.identity()
            )));
        }

        if let Some(&existing) = self.by_identity.get(descriptor.identity()) {
            return Err(ContainerError::IdentityCollision {
                identity: descriptor.identity().to_string(),
                existing_type: self.descriptors[existing].type_info().name.to_string(),
            });
        }

        debug!(
            "注册组件: {} ({}, {}, {})",
            descriptor.identity(),
            descriptor.type_info().name,
            descriptor.scope(),
            descriptor.init_mode()
        );

        self.by_identity
            .insert(descriptor.identity().to_string(), self.descriptors.len());
        self.descriptors.push(Arc::new(descriptor));
        self.singletons.push(OnceCell::new());
        Ok(())
    }

    /// 启动注册表
    ///
    /// 构建类型索引，校验静态依赖图，然后按注册顺序构造所有 EAGER 单例
    pub fn start(&mut self) -> ContainerResult<()> {
        if self.started {
            return Ok(());
        }

        self.build_type_index();
        DependencyGraph::build(self)?.ensure_acyclic()?;
        self.started = true;

        let eager: Vec<usize> = self
            .descriptors
            .iter()
            .enumerate()
            .filter(|(_, descriptor)| descriptor.is_eager_singleton())
            .map(|(index, _)| index)
            .collect();

        for &index in &eager {
            self.resolve_fresh(index)?;
        }

        info!(
            "组件注册表已启动: {} 个组件, {} 个预先构造的单例",
            self.descriptors.len(),
            eager.len()
        );
        Ok(())
    }

    fn build_type_index(&mut self) {
        self.by_type.clear();
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            self.by_type
                .entry(descriptor.type_info().id)
                .or_default()
                .push(index);
            for binding in descriptor.capabilities() {
                self.by_type
                    .entry(binding.capability.id)
                    .or_default()
                    .push(index);
            }
        }
    }

    /// 按标识解析组件
    pub fn resolve_by_name(&self, name: &str) -> ContainerResult<ResolvedBean> {
        self.ensure_started()?;
        let index = *self
            .by_identity
            .get(name)
            .ok_or_else(|| ContainerError::not_found(name))?;
        self.resolve_fresh(index)
    }

    /// 按类型解析唯一组件
    pub fn resolve_by_type(&self, type_info: TypeInfo) -> ContainerResult<ResolvedBean> {
        self.ensure_started()?;
        match self.candidates(type_info.id) {
            [index] => self.resolve_fresh(*index),
            [] => Err(ContainerError::not_found(type_info.name)),
            many => Err(ContainerError::AmbiguousTypeLookup {
                target: type_info.name.to_string(),
                candidates: self.identities_of(many),
            }),
        }
    }

    /// 按类型解析所有组件，按注册顺序
    pub fn resolve_all(&self, type_info: TypeInfo) -> ContainerResult<Vec<ResolvedBean>> {
        self.ensure_started()?;
        self.candidates(type_info.id)
            .iter()
            .map(|&index| self.resolve_fresh(index))
            .collect()
    }

    /// 每个描述符各解析一次，按注册顺序
    pub fn resolve_every(&self) -> ContainerResult<Vec<ResolvedBean>> {
        self.ensure_started()?;
        (0..self.descriptors.len())
            .map(|index| self.resolve_fresh(index))
            .collect()
    }

    /// 使用注册表中的组件满足注入点并构造一个未注册的描述符
    ///
    /// 配置槽位的候选者通过此方法激活
    pub fn instantiate(&self, descriptor: &ComponentDescriptor) -> ContainerResult<BeanRef> {
        self.ensure_started()?;
        let mut stack = ResolutionStack::new(self.options);
        stack.enter(descriptor.identity())?;
        let result = self.construct(descriptor, &mut stack);
        stack.exit();
        result
    }

    /// 组件生命周期状态
    pub fn state(&self, identity: &str) -> BeanState {
        let Some(&index) = self.by_identity.get(identity) else {
            return BeanState::Unregistered;
        };

        if self.singletons[index].get().is_some() {
            return BeanState::Resolved;
        }
        self.states
            .get(&index)
            .map_or(BeanState::Registered, |state| *state)
    }

    /// 是否注册了指定标识
    pub fn contains(&self, identity: &str) -> bool {
        self.by_identity.contains_key(identity)
    }

    /// 所有组件标识，按注册顺序
    pub fn identities(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.identity())
            .collect()
    }

    /// 所有描述符，按注册顺序
    pub fn descriptors(&self) -> &[Arc<ComponentDescriptor>] {
        &self.descriptors
    }

    /// 按标识获取描述符
    pub fn descriptor(&self, identity: &str) -> Option<&Arc<ComponentDescriptor>> {
        self.by_identity
            .get(identity)
            .map(|&index| &self.descriptors[index])
    }

    /// 已注册的组件数量
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 是否没有注册任何组件
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 销毁注册表
    ///
    /// 按构造的逆序对已构造的单例执行销毁前回调，回调失败只记录日志
    pub fn teardown(&mut self) {
        let order = std::mem::take(self.construction_order.get_mut());

        for &index in order.iter().rev() {
            let Some(bean) = self.singletons[index].take() else {
                continue;
            };
            let descriptor = &self.descriptors[index];
            match descriptor.run_pre_destroy(&bean) {
                Ok(()) => debug!("组件已销毁: {}", descriptor.identity()),
                Err(error) => warn!("组件销毁回调失败: {}, 原因: {}", descriptor.identity(), error),
            }
        }

        for cell in &mut self.singletons {
            cell.take();
        }
        self.states.clear();
        self.started = false;

        info!("组件注册表已销毁: {} 个单例", order.len());
    }

    /// 注入点的目标组件索引
    ///
    /// 必需注入点无候选时失败，可选注入点无候选时返回 `None`，多个候选时报告歧义
    pub(crate) fn site_target(
        &self,
        owner: &ComponentDescriptor,
        site: &InjectionSite,
    ) -> ContainerResult<Option<usize>> {
        let candidates: &[usize] = match site.target() {
            SiteTarget::Identity(identity) => self
                .by_identity
                .get(identity)
                .map(std::slice::from_ref)
                .unwrap_or_default(),
            SiteTarget::Type(type_info) => self.candidates(type_info.id),
        };

        match candidates {
            [index] => Ok(Some(*index)),
            [] if site.is_required() => Err(ContainerError::UnresolvedRequiredDependency {
                owner: owner.identity().to_string(),
                site: site.name().to_string(),
                target: site.target().to_string(),
            }),
            [] => Ok(None),
            many => Err(ContainerError::AmbiguousTypeLookup {
                target: site.target().to_string(),
                candidates: self.identities_of(many),
            }),
        }
    }

    fn candidates(&self, type_id: TypeId) -> &[usize] {
        self.by_type
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn identities_of(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&index| self.descriptors[index].identity().to_string())
            .collect()
    }

    fn ensure_started(&self) -> ContainerResult<()> {
        if self.started {
            Ok(())
        } else {
            Err(ContainerError::configuration_invalid(
                "组件注册表尚未启动或已销毁",
            ))
        }
    }

    fn resolve_fresh(&self, index: usize) -> ContainerResult<ResolvedBean> {
        let mut stack = ResolutionStack::new(self.options);
        let instance = self.resolve_index(index, &mut stack)?;
        Ok(ResolvedBean::new(self.descriptors[index].clone(), instance))
    }

    fn resolve_index(&self, index: usize, stack: &mut ResolutionStack) -> ContainerResult<BeanRef> {
        let descriptor = &self.descriptors[index];

        if descriptor.scope() == Scope::Singleton {
            if let Some(bean) = self.singletons[index].get() {
                return Ok(bean.clone());
            }
        }

        // 先检查解析栈，OnceCell 不允许同一线程重入初始化
        stack.enter(descriptor.identity())?;
        self.states.insert(index, BeanState::Resolving);

        let result = match descriptor.scope() {
            Scope::Singleton => self.singletons[index]
                .get_or_try_init(|| -> ContainerResult<BeanRef> {
                    let bean = self.construct(descriptor, &mut *stack)?;
                    self.construction_order.lock().push(index);
                    Ok(bean)
                })
                .cloned(),
            Scope::Prototype => self.construct(descriptor, stack),
        };

        stack.exit();
        match &result {
            Ok(_) => {
                self.states.insert(index, BeanState::Resolved);
            }
            Err(_) => {
                self.states.remove(&index);
            }
        }
        result
    }

    fn construct(
        &self,
        descriptor: &ComponentDescriptor,
        stack: &mut ResolutionStack,
    ) -> ContainerResult<BeanRef> {
        let mut deps = Dependencies::new(descriptor.identity());

        for site in descriptor.injection_sites() {
            if let Some(target) = self.site_target(descriptor, site)? {
                let instance = self.resolve_index(target, stack)?;
                deps.insert(site.name(), self.descriptors[target].clone(), instance);
            }
        }

        let bean = descriptor.instantiate(&deps)?;
        descriptor.run_post_construct(&bean)?;

        debug!(
            "组件已构造: {} ({}), 解析深度 {}",
            descriptor.identity(),
            descriptor.scope(),
            stack.depth()
        );
        Ok(bean)
    }
}
