//! 组件描述符定义
//!
//! 描述符是注册期的惰性元数据：标识、作用域、初始化模式、注入点、能力与生命周期回调。
//! 注册后不再修改。

use crate::conventions::NamingConventions;
use crate::errors::{BoxError, ContainerError, ContainerResult};
use crate::injection::{Dependencies, InjectionSite};
use crate::lifecycle::{InitMode, Scope};
use crate::metadata::TypeInfo;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 类型擦除后的组件实例
pub type BeanRef = Arc<dyn Any + Send + Sync>;

type FactoryFn = Arc<dyn Fn(&Dependencies) -> Result<BeanRef, BoxError> + Send + Sync>;
type HookFn = Arc<dyn Fn(&BeanRef) -> Result<(), BoxError> + Send + Sync>;
type CastFn = Arc<dyn Fn(BeanRef) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// 可注入组件 trait
///
/// 声明注入点并使用已解析的依赖构造自身
pub trait Injectable: Sized + Send + Sync + 'static {
    /// 组件声明的注入点
    fn injection_sites() -> Vec<InjectionSite> {
        Vec::new()
    }

    /// 使用已解析的依赖构造组件实例
    fn construct(deps: &Dependencies) -> Result<Self, BoxError>;

    /// 构造完成后的回调
    fn post_construct(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// 销毁前的回调
    fn pre_destroy(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// 能力绑定：组件可以被视作的 trait object 类型
#[derive(Clone)]
pub struct CapabilityBinding {
    /// 能力类型（通常为 `dyn Trait`）
    pub capability: TypeInfo,
    cast: CastFn,
}

impl fmt::Debug for CapabilityBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityBinding")
            .field("capability", &self.capability.name)
            .finish()
    }
}

/// 组件描述符
#[derive(Clone)]
pub struct ComponentDescriptor {
    identity: String,
    type_info: TypeInfo,
    scope: Scope,
    init_mode: InitMode,
    injection_sites: Vec<InjectionSite>,
    capabilities: Vec<CapabilityBinding>,
    self_cast: CastFn,
    factory: FactoryFn,
    post_construct: Option<HookFn>,
    pre_destroy: Option<HookFn>,
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("identity", &self.identity)
            .field("type", &self.type_info.name)
            .field("scope", &self.scope)
            .field("init_mode", &self.init_mode)
            .field("injection_sites", &self.injection_sites)
            .field("capabilities", &self.capabilities)
            .field("factory", &"<function>")
            .finish()
    }
}

impl ComponentDescriptor {
    /// 使用工厂函数创建描述符
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Dependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        ComponentBuilder::new(factory).build()
    }

    /// 为实现了 [`Injectable`] 的类型创建描述符
    pub fn injectable<T: Injectable>() -> Self {
        ComponentBuilder::<T>::injectable().build()
    }

    /// 组件标识
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// 组件类型信息
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 组件作用域
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// 初始化模式
    pub fn init_mode(&self) -> InitMode {
        self.init_mode
    }

    /// 注入点列表
    pub fn injection_sites(&self) -> &[InjectionSite] {
        &self.injection_sites
    }

    /// 能力列表
    pub fn capabilities(&self) -> &[CapabilityBinding] {
        &self.capabilities
    }

    /// 是否为启动时构造的单例
    pub fn is_eager_singleton(&self) -> bool {
        self.scope == Scope::Singleton && self.init_mode == InitMode::Eager
    }

    /// 是否能以指定类型被查找（具体类型或已声明的能力）
    pub fn provides(&self, type_id: TypeId) -> bool {
        self.type_info.id == type_id
            || self.capabilities.iter().any(|c| c.capability.id == type_id)
    }

    /// 设置组件标识
    pub fn named(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置初始化模式
    pub fn with_init_mode(mut self, init_mode: InitMode) -> Self {
        self.init_mode = init_mode;
        self
    }

    /// 添加注入点
    pub fn inject(mut self, site: InjectionSite) -> Self {
        self.injection_sites.push(site);
        self
    }

    /// 以具体类型或能力类型查看实例
    pub fn cast<C: ?Sized + 'static>(&self, bean: &BeanRef) -> Option<Arc<C>> {
        let cast = if self.type_info.id == TypeId::of::<C>() {
            &self.self_cast
        } else {
            &self
                .capabilities
                .iter()
                .find(|binding| binding.capability.id == TypeId::of::<C>())?
                .cast
        };
        let boxed = cast(bean.clone())?;
        boxed.downcast::<Arc<C>>().ok().map(|typed| *typed)
    }

    /// 调用工厂函数创建实例
    pub fn instantiate(&self, deps: &Dependencies) -> ContainerResult<BeanRef> {
        (self.factory)(deps).map_err(|source| ContainerError::creation_failed(&self.identity, source))
    }

    /// 执行构造后回调
    pub fn run_post_construct(&self, bean: &BeanRef) -> ContainerResult<()> {
        match &self.post_construct {
            Some(hook) => {
                hook(bean).map_err(|source| ContainerError::creation_failed(&self.identity, source))
            }
            None => Ok(()),
        }
    }

    /// 执行销毁前回调
    pub fn run_pre_destroy(&self, bean: &BeanRef) -> Result<(), BoxError> {
        match &self.pre_destroy {
            Some(hook) => hook(bean),
            None => Ok(()),
        }
    }
}

/// 类型化的描述符构建器
pub struct ComponentBuilder<T> {
    descriptor: ComponentDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ComponentBuilder<T> {
    /// 使用工厂函数创建构建器
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Dependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::with_factory(Arc::new(move |deps: &Dependencies| -> Result<BeanRef, BoxError> {
            factory(deps).map(|bean| Arc::new(bean) as BeanRef)
        }))
    }

    /// 使用预先构建的实例创建单例构建器
    pub fn instance(instance: Arc<T>) -> Self {
        Self::with_factory(Arc::new(move |_: &Dependencies| -> Result<BeanRef, BoxError> {
            Ok(instance.clone() as BeanRef)
        }))
    }

    fn with_factory(factory: FactoryFn) -> Self {
        let type_info = TypeInfo::of::<T>();
        Self {
            descriptor: ComponentDescriptor {
                identity: NamingConventions::canonical_identity(type_info.name),
                type_info,
                scope: Scope::default(),
                init_mode: InitMode::default(),
                injection_sites: Vec::new(),
                capabilities: Vec::new(),
                self_cast: Arc::new(|bean: BeanRef| {
                    bean.downcast::<T>()
                        .ok()
                        .map(|typed| Box::new(typed) as Box<dyn Any + Send + Sync>)
                }),
                factory,
                post_construct: None,
                pre_destroy: None,
            },
            _marker: PhantomData,
        }
    }

    /// 设置组件标识
    pub fn named(mut self, identity: impl Into<String>) -> Self {
        self.descriptor = self.descriptor.named(identity);
        self
    }

    /// 设置为原型作用域
    pub fn prototype(mut self) -> Self {
        self.descriptor.scope = Scope::Prototype;
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.descriptor.scope = scope;
        self
    }

    /// 设置为延迟初始化
    pub fn lazy(mut self) -> Self {
        self.descriptor.init_mode = InitMode::Lazy;
        self
    }

    /// 设置初始化模式
    pub fn with_init_mode(mut self, init_mode: InitMode) -> Self {
        self.descriptor.init_mode = init_mode;
        self
    }

    /// 添加注入点
    pub fn inject(mut self, site: InjectionSite) -> Self {
        self.descriptor.injection_sites.push(site);
        self
    }

    /// 声明能力
    ///
    /// ```ignore
    /// ComponentBuilder::<EnglishGreeter>::injectable().provides::<dyn Greeter>(|bean| bean)
    /// ```
    pub fn provides<C>(mut self, cast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let capability = TypeInfo::of::<C>();
        if self.descriptor.provides(capability.id) {
            return self;
        }

        let cast: CastFn = Arc::new(move |bean: BeanRef| {
            bean.downcast::<T>()
                .ok()
                .map(|typed| Box::new(cast(typed)) as Box<dyn Any + Send + Sync>)
        });
        self.descriptor
            .capabilities
            .push(CapabilityBinding { capability, cast });
        self
    }

    /// 设置构造后回调
    pub fn on_post_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.descriptor.post_construct = Some(typed_hook(hook));
        self
    }

    /// 设置销毁前回调
    pub fn on_pre_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.descriptor.pre_destroy = Some(typed_hook(hook));
        self
    }

    /// 完成构建
    pub fn build(self) -> ComponentDescriptor {
        self.descriptor
    }
}

impl<T: Injectable> ComponentBuilder<T> {
    /// 为实现了 [`Injectable`] 的类型创建构建器
    pub fn injectable() -> Self {
        let mut builder = Self::new(T::construct)
            .on_post_construct(T::post_construct)
            .on_pre_destroy(T::pre_destroy);
        builder.descriptor.injection_sites = T::injection_sites();
        builder
    }
}

impl<T: Send + Sync + 'static> From<ComponentBuilder<T>> for ComponentDescriptor {
    fn from(builder: ComponentBuilder<T>) -> Self {
        builder.build()
    }
}

fn typed_hook<T, F>(hook: F) -> HookFn
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(move |bean: &BeanRef| match bean.downcast_ref::<T>() {
        Some(typed) => hook(typed),
        None => Ok(()),
    })
}
