//! # 容器组合层
//!
//! 负责把组件发现、配置加载、日志初始化与框架默认配置组合成一次完整的容器启动。
//!
//! ## 主要功能
//!
//! - **容器构建器**: 使用构建者模式完成扫描、仲裁、注册与启动
//! - **组件扫描**: 编译期目录、展开的目录树与 tar 归档三种布局
//! - **容器配置**: TOML 配置文件叠加 `CONTAINER__*` 环境变量
//! - **进程级句柄**: 启动便利设施
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use container_composition::{ContainerBuilder, ContainerSettings};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ContainerSettings::load(None)?;
//!     let container = ContainerBuilder::from_settings(settings)
//!         .scan_package("shop")
//!         .build()?;
//!
//!     println!("{}", container.report().to_json()?);
//!     container.shutdown();
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod defaults;
pub mod global;
pub mod logging;
pub mod manifest;
pub mod scanner;
pub mod settings;

pub use bootstrapper::ContainerBuilder;
pub use defaults::{framework_defaults, DefaultExceptionHandler, ServerConfiguration};
pub use logging::{init_logging, LoggingSettings};
pub use manifest::{ComponentManifest, ManifestError, MANIFEST_SUFFIX};
pub use scanner::{ArchiveScanner, CatalogScanner, DirectoryScanner};
pub use settings::{
    ConfigurationSettings, ContainerSettings, ScanSettings, ServerSettings, ENV_PREFIX,
};

// 重新导出错误类型
pub use container_common::{ContainerError, ContainerResult};
