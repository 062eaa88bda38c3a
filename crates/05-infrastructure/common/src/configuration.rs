//! 框架配置槽位相关的基础定义

use crate::component::ComponentDescriptor;
use crate::errors::ContainerError;
use crate::metadata::TypeInfo;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// 配置类别
///
/// 每个类别对应一个配置槽位，仲裁后至多有一个实例占据该槽位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationCategory {
    ExceptionHandler,
    Security,
    Server,
    Filter,
    Template,
    Cookie,
}

impl ConfigurationCategory {
    /// 所有类别
    pub const ALL: [ConfigurationCategory; 6] = [
        Self::ExceptionHandler,
        Self::Security,
        Self::Server,
        Self::Filter,
        Self::Template,
        Self::Cookie,
    ];

    /// 类别的规范名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExceptionHandler => "exception_handler",
            Self::Security => "security",
            Self::Server => "server",
            Self::Filter => "filter",
            Self::Template => "template",
            Self::Cookie => "cookie",
        }
    }

    /// 该类别候选组件必须具备的能力
    pub fn required_capability(&self) -> Option<TypeInfo> {
        match self {
            Self::ExceptionHandler => Some(TypeInfo::of::<dyn ExceptionHandler>()),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigurationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigurationCategory {
    type Err = ContainerError;

    // 接受 exception_handler / EXCEPTION_HANDLER / exception-handler
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ContainerError::configuration_invalid(format!("未知的配置类别: {s}")))
    }
}

/// 异常处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// 状态码
    pub status: u16,
    /// 错误消息
    pub message: String,
}

/// 异常处理器
///
/// 占据 EXCEPTION_HANDLER 槽位的组件必须声明此能力
pub trait ExceptionHandler: Send + Sync {
    fn handle(&self, error: &(dyn Error + 'static)) -> ErrorReport;
}

/// 配置候选者
#[derive(Debug, Clone)]
pub struct ConfigurationCandidate {
    /// 候选者描述符
    pub descriptor: ComponentDescriptor,
    /// 目标槽位
    pub category: ConfigurationCategory,
    /// 是否为框架默认
    pub is_default: bool,
}

impl ConfigurationCandidate {
    /// 应用提供的候选者
    pub fn new(descriptor: ComponentDescriptor, category: ConfigurationCategory) -> Self {
        Self {
            descriptor,
            category,
            is_default: false,
        }
    }

    /// 框架默认候选者
    pub fn framework_default(descriptor: ComponentDescriptor, category: ConfigurationCategory) -> Self {
        Self {
            descriptor,
            category,
            is_default: true,
        }
    }
}
