//! # Container Common
//!
//! 组件容器的公共类型与约定。
//!
//! ## 核心组件
//!
//! - [`ComponentDescriptor`] - 组件描述符
//! - [`Injectable`] - 可注入组件 trait
//! - [`InjectionSite`] / [`Dependencies`] - 注入点与已解析依赖
//! - [`ConfigurationCategory`] - 框架配置槽位类别
//! - [`ComponentCatalog`] - 编译期组件目录
//! - [`ContainerError`] - 容器错误类型

pub mod component;
pub mod configuration;
pub mod conventions;
pub mod discovery;
pub mod errors;
pub mod injection;
pub mod lifecycle;
pub mod metadata;

pub use component::*;
pub use configuration::*;
pub use conventions::*;
pub use discovery::*;
pub use errors::*;
pub use injection::*;
pub use lifecycle::*;
pub use metadata::*;
