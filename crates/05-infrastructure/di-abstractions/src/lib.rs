//! # Dependency Injection Abstractions
//!
//! 组件容器的抽象层，定义组件查找、组件扫描和依赖解析上下文。
//!
//! ## 核心接口
//!
//! - [`BeanLookup`] - 对象安全的组件查找接口
//! - [`BeanLookupExt`] - 类型化的查找扩展
//! - [`ComponentScanner`] - 组件扫描器接口
//! - [`ResolutionStack`] - 解析栈，用于检测循环依赖

pub mod lookup;
pub mod resolver;
pub mod scanner;

pub use lookup::*;
pub use resolver::*;
pub use scanner::*;
