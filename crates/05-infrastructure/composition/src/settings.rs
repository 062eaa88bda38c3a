//! 容器配置
//!
//! 依次叠加 TOML 配置文件与 `CONTAINER__*` 环境变量，例如
//! `CONTAINER__SCAN__ROOT_PACKAGE=shop` 或 `CONTAINER__SERVER__PORT=9090`。

use crate::logging::LoggingSettings;
use container_common::{ContainerError, ContainerResult};
use di_abstractions::{ResolveOptions, ScanLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "CONTAINER";

/// 默认配置文件名（不含扩展名）
pub const DEFAULT_SETTINGS_FILE: &str = "container";

/// 组件扫描配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// 根包
    pub root_package: Option<String>,
    /// 扫描布局
    pub layout: ScanLayout,
    /// 目录布局的根目录或归档文件路径
    pub path: Option<PathBuf>,
}

/// 配置槽位仲裁配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationSettings {
    /// 两个非默认候选者竞争同一槽位时报错
    pub strict: bool,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 容器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// 组件发现
    pub scan: ScanSettings,
    /// 日志
    pub logging: LoggingSettings,
    /// 配置槽位
    pub configuration: ConfigurationSettings,
    /// 依赖解析
    pub resolution: ResolveOptions,
    /// 服务器
    pub server: ServerSettings,
}

impl ContainerSettings {
    /// 加载配置
    ///
    /// 指定路径时文件必须存在；未指定时尝试当前目录下可选的 `container.toml`
    pub fn load(path: Option<&Path>) -> ContainerResult<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let settings = Self::build(config::Config::builder().add_source(file))?;
        debug!("容器配置已加载: {:?}", settings);
        Ok(settings)
    }

    /// 从 TOML 文本加载配置，同样叠加环境变量
    pub fn from_toml_str(text: &str) -> ContainerResult<Self> {
        Self::build(
            config::Config::builder()
                .add_source(config::File::from_str(text, config::FileFormat::Toml)),
        )
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ContainerResult<Self> {
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize::<Self>())
            .map_err(|e| ContainerError::configuration_invalid(format!("容器配置加载失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = ContainerSettings::default();
        assert_eq!(settings.scan.layout, ScanLayout::Catalog);
        assert_eq!(settings.resolution.max_depth, 100);
        assert_eq!(settings.server.port, 8080);
        assert!(!settings.configuration.strict);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[scan]
root_package = "shop.services"
layout = "directory"
path = "target/components"

[configuration]
strict = true

[server]
port = 9443
"#
        )
        .unwrap();

        let settings = ContainerSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.scan.root_package.as_deref(), Some("shop.services"));
        assert_eq!(settings.scan.layout, ScanLayout::Directory);
        assert_eq!(settings.scan.path, Some(PathBuf::from("target/components")));
        assert!(settings.configuration.strict);
        assert_eq!(settings.server.port, 9443);
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = ContainerSettings::load(Some(Path::new("/nonexistent/container.toml")));
        assert!(matches!(result, Err(ContainerError::ConfigurationInvalid { .. })));
    }

    #[test]
    fn test_environment_overrides_file() {
        std::env::set_var("CONTAINER__LOGGING__LEVEL", "warn");
        let settings = ContainerSettings::from_toml_str("[logging]\nlevel = \"trace\"\n");
        std::env::remove_var("CONTAINER__LOGGING__LEVEL");

        assert_eq!(settings.unwrap().logging.level, "warn");
    }

    #[test]
    fn test_unknown_layout_is_rejected() {
        let result = ContainerSettings::from_toml_str("[scan]\nlayout = \"zip\"\n");
        assert!(result.is_err());
    }
}
