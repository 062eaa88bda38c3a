//! 组件生命周期管理

use crate::errors::ContainerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// 单例模式 - 每个标识只存在一个实例
    #[default]
    Singleton,
    /// 原型模式 - 每次查找都创建新实例
    Prototype,
}

/// 初始化模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitMode {
    /// 容器启动时构造
    #[default]
    Eager,
    /// 首次查找时构造
    Lazy,
}

/// 组件生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanState {
    /// 未注册
    Unregistered,
    /// 已注册，尚未构造
    Registered,
    /// 构造中（位于某个解析栈上）
    Resolving,
    /// 已构造并缓存
    Resolved,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}

impl fmt::Display for InitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager => f.write_str("eager"),
            Self::Lazy => f.write_str("lazy"),
        }
    }
}

// 为作用域与初始化模式实现 FromStr 以支持清单解析
impl std::str::FromStr for Scope {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "prototype" => Ok(Self::Prototype),
            _ => Err(ContainerError::configuration_invalid(format!(
                "未知的组件作用域: {s}"
            ))),
        }
    }
}

impl std::str::FromStr for InitMode {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "lazy" => Ok(Self::Lazy),
            _ => Err(ContainerError::configuration_invalid(format!(
                "未知的初始化模式: {s}"
            ))),
        }
    }
}
