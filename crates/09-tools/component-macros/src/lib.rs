//! # Component Macros
//!
//! 这个 crate 提供了用于加载期组件注册的过程宏。
//!
//! ## 核心宏
//!
//! - [`component`] - 把类型提交到进程级组件目录
//! - [`configuration`] - 把类型作为框架配置候选者提交到组件目录
//!
//! 生成的代码引用 `container_common` 与 `ctor`，使用方需要同时依赖这两个 crate。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::component;
//! use container_common::{BoxError, Dependencies, Injectable, InjectionSite};
//!
//! pub trait Repository: Send + Sync {}
//!
//! #[component(name = "orders", lazy, provides(Repository))]
//! pub struct OrderRepository;
//!
//! impl Repository for OrderRepository {}
//!
//! impl Injectable for OrderRepository {
//!     fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
//!         Ok(Self)
//!     }
//! }
//! ```

use proc_macro::TokenStream;

mod component;

use component::MarkerKind;

/// 组件注册宏
///
/// 标注的类型必须实现 `Injectable`。标注在 trait 上时提交不可构造的条目，发现阶段会拒绝它。
///
/// # 参数
///
/// - `name = "custom_name"` - 自定义组件标识
/// - `singleton` / `prototype` - 作用域（默认单例）
/// - `eager` / `lazy` - 初始化模式（默认立即初始化）
/// - `provides(Trait, ...)` - 组件声明的能力
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    component::expand(MarkerKind::Component, args.into(), input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 配置候选者注册宏
///
/// # 参数
///
/// - `category = "exception_handler"` - 配置类别（必需）
/// - `default` - 作为框架默认候选者参与仲裁
/// - 其余参数同 [`component`]
///
/// 占据 `exception_handler` 槽位的类型必须声明 `provides(ExceptionHandler)`。
#[proc_macro_attribute]
pub fn configuration(args: TokenStream, input: TokenStream) -> TokenStream {
    component::expand(MarkerKind::Configuration, args.into(), input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
