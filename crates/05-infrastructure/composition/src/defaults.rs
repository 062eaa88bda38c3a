//! 框架默认配置
//!
//! 每个默认候选者以 `is_default = true` 参与仲裁，应用提供的候选者总会覆盖它们。

use crate::settings::{ContainerSettings, ServerSettings};
use container_common::{
    ComponentBuilder, ConfigurationCandidate, ConfigurationCategory, ContainerError, ErrorReport,
    ExceptionHandler,
};
use std::error::Error;
use std::sync::Arc;

/// 默认异常处理器
#[derive(Debug, Default)]
pub struct DefaultExceptionHandler;

impl ExceptionHandler for DefaultExceptionHandler {
    fn handle(&self, error: &(dyn Error + 'static)) -> ErrorReport {
        let message = match error.downcast_ref::<ContainerError>() {
            Some(container_error) => format!("容器错误: {}", container_error),
            None => error.to_string(),
        };

        ErrorReport {
            status: 500,
            message,
        }
    }
}

/// 默认服务器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfiguration {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl ServerConfiguration {
    /// `host:port` 形式的地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&ServerSettings> for ServerConfiguration {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
        }
    }
}

/// 框架默认候选者
pub fn framework_defaults(settings: &ContainerSettings) -> Vec<ConfigurationCandidate> {
    let server = Arc::new(ServerConfiguration::from(&settings.server));

    vec![
        ConfigurationCandidate::framework_default(
            ComponentBuilder::new(|_| Ok(DefaultExceptionHandler))
                .named("default_exception_handler")
                .provides::<dyn ExceptionHandler>(|bean| bean)
                .build(),
            ConfigurationCategory::ExceptionHandler,
        ),
        ConfigurationCandidate::framework_default(
            ComponentBuilder::instance(server)
                .named("default_server_configuration")
                .build(),
            ConfigurationCategory::Server,
        ),
    ]
}
