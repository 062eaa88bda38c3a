//! # 组件容器实现
//!
//! 提供组件注册表、配置槽位仲裁以及应用容器门面。
//!
//! - [`BeanRegistry`] - 组件注册、静态依赖校验与解析
//! - [`ConfigurationRegistry`] - 配置槽位仲裁
//! - [`ApplicationContainer`] - 容器门面

pub mod configuration;
pub mod container;
mod graph;
pub mod registry;
pub mod report;

pub use configuration::*;
pub use container::*;
pub use registry::*;
pub use report::*;
