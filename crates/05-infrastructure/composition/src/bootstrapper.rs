//! 容器启动器
//!
//! 使用建造者模式协调一次完整的启动：日志、组件发现、配置仲裁、注册与容器启动。

use crate::defaults::framework_defaults;
use crate::logging::{init_logging, LoggingSettings};
use crate::scanner::{ArchiveScanner, CatalogScanner, DirectoryScanner};
use crate::settings::ContainerSettings;
use container_common::{
    ComponentCatalog, ComponentDescriptor, ConfigurationCandidate, ConfigurationCategory,
    ContainerError, ContainerResult, DiscoveredComponent, Marker,
};
use di_abstractions::{ComponentScanner, ScanLayout};
use di_impl::{ApplicationContainer, BeanRegistry, ConfigurationRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 容器构建器
pub struct ContainerBuilder {
    settings: ContainerSettings,
    catalog: Arc<ComponentCatalog>,
    /// 待扫描的根包
    packages: Vec<String>,
    /// 显式添加的扫描器，为空时按配置的布局创建
    scanners: Vec<Box<dyn ComponentScanner>>,
    components: Vec<ComponentDescriptor>,
    configurations: Vec<ConfigurationCandidate>,
    framework_defaults: bool,
    logging_enabled: bool,
}

impl ContainerBuilder {
    /// 创建新的容器构建器，使用进程级目录
    pub fn new() -> Self {
        Self::from_settings(ContainerSettings::default())
    }

    /// 从容器配置创建构建器
    pub fn from_settings(settings: ContainerSettings) -> Self {
        let packages = settings.scan.root_package.iter().cloned().collect();
        Self {
            settings,
            catalog: ComponentCatalog::global(),
            packages,
            scanners: Vec::new(),
            components: Vec::new(),
            configurations: Vec::new(),
            framework_defaults: true,
            logging_enabled: false,
        }
    }

    /// 使用指定的组件目录
    pub fn with_catalog(mut self, catalog: Arc<ComponentCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// 扫描指定的根包
    pub fn scan_package(mut self, package: impl Into<String>) -> Self {
        let package = package.into();
        info!("添加包扫描: {}", package);
        self.packages.push(package);
        self
    }

    /// 添加组件扫描器
    pub fn with_scanner<S: ComponentScanner + 'static>(mut self, scanner: S) -> Self {
        debug!("添加组件扫描器: {}", scanner.name());
        self.scanners.push(Box::new(scanner));
        self
    }

    /// 显式注册组件
    pub fn register(mut self, descriptor: impl Into<ComponentDescriptor>) -> Self {
        self.components.push(descriptor.into());
        self
    }

    /// 显式提供配置候选者
    pub fn register_configuration(
        mut self,
        descriptor: impl Into<ComponentDescriptor>,
        category: ConfigurationCategory,
    ) -> Self {
        self.configurations
            .push(ConfigurationCandidate::new(descriptor.into(), category));
        self
    }

    /// 不提供框架默认配置
    pub fn without_framework_defaults(mut self) -> Self {
        self.framework_defaults = false;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, logging: LoggingSettings) -> Self {
        self.settings.logging = logging;
        self.logging_enabled = true;
        self
    }

    /// 两个非默认配置候选者竞争同一槽位时报错
    pub fn strict(mut self, strict: bool) -> Self {
        self.settings.configuration.strict = strict;
        self
    }

    /// 当前配置
    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// 构建并启动容器
    pub fn build(self) -> ContainerResult<ApplicationContainer> {
        if self.logging_enabled {
            init_logging(&self.settings.logging)?;
        }

        info!("开始构建容器");
        let result = self.assemble();
        if let Err(e) = &result {
            error!("容器启动失败: {}", e);
        }
        result
    }

    fn assemble(mut self) -> ContainerResult<ApplicationContainer> {
        if self.scanners.is_empty() && !self.packages.is_empty() {
            let scanner = self.default_scanner()?;
            self.scanners.push(scanner);
        }

        let discovered = self.discover()?;

        let mut beans = BeanRegistry::with_options(self.settings.resolution);
        let mut configurations =
            ConfigurationRegistry::new().with_strict(self.settings.configuration.strict);

        if self.framework_defaults {
            for candidate in framework_defaults(&self.settings) {
                configurations.offer(candidate)?;
            }
        }

        for component in discovered {
            match component.marker {
                Marker::Component => beans.register(component.descriptor)?,
                Marker::Configuration {
                    category,
                    is_default,
                } => {
                    configurations.offer(ConfigurationCandidate {
                        descriptor: component.descriptor,
                        category,
                        is_default,
                    })?;
                }
            }
        }

        for descriptor in self.components {
            beans.register(descriptor)?;
        }
        for candidate in self.configurations {
            configurations.offer(candidate)?;
        }

        ApplicationContainer::start(beans, configurations)
    }

    fn default_scanner(&self) -> ContainerResult<Box<dyn ComponentScanner>> {
        let layout = self.settings.scan.layout;
        let path = || {
            self.settings.scan.path.clone().ok_or_else(|| {
                ContainerError::configuration_invalid(format!("{} 布局需要配置 scan.path", layout))
            })
        };

        let scanner: Box<dyn ComponentScanner> = match layout {
            ScanLayout::Catalog => Box::new(CatalogScanner::new(self.catalog.clone())),
            ScanLayout::Directory => Box::new(DirectoryScanner::new(path()?, self.catalog.clone())),
            ScanLayout::Archive => Box::new(ArchiveScanner::new(path()?, self.catalog.clone())),
        };
        Ok(scanner)
    }

    /// 每个扫描器扫描每个根包，按来源去重
    fn discover(&self) -> ContainerResult<Vec<DiscoveredComponent>> {
        let mut origins = HashSet::new();
        let mut discovered = Vec::new();

        for package in &self.packages {
            for scanner in &self.scanners {
                for component in scanner.scan(package)? {
                    if origins.insert(component.origin.clone()) {
                        discovered.push(component);
                    } else {
                        debug!("跳过重复发现的组件: {}", component.origin);
                    }
                }
            }
        }

        info!("组件发现完成, 共 {} 个", discovered.len());
        Ok(discovered)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
