//! 错误类型定义

use thiserror::Error;

/// 组件构造或生命周期回调返回的装箱错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 容器错误类型
///
/// 除单个格式错误的发现条目（记录后跳过）之外，所有错误在启动阶段均为致命错误。
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("容器配置无效: {message}")]
    ConfigurationInvalid { message: String },

    #[error("组件标识冲突: {identity} 已被 {existing_type} 注册")]
    IdentityCollision {
        identity: String,
        existing_type: String,
    },

    #[error("检测到循环依赖: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("无法解析必需依赖: {owner}.{site} -> {target}")]
    UnresolvedRequiredDependency {
        owner: String,
        site: String,
        target: String,
    },

    #[error("按类型查找存在歧义: {target}, 候选: {}", candidates.join(", "))]
    AmbiguousTypeLookup {
        target: String,
        candidates: Vec<String>,
    },

    #[error("组件发现失败: 包 {root} 不存在或不可读, 原因: {message}")]
    DiscoveryStructuralFailure { root: String, message: String },

    #[error("组件未找到: {target}")]
    NotFound { target: String },

    #[error("配置槽位为空: {category}")]
    ConfigurationNotFound { category: String },

    #[error("类型不匹配: {identity} 无法作为 {expected} 使用")]
    TypeMismatch { identity: String, expected: String },

    #[error("组件创建失败: {identity}, 原因: {source}")]
    CreationFailed {
        identity: String,
        #[source]
        source: BoxError,
    },
}

impl ContainerError {
    /// 创建配置无效错误
    pub fn configuration_invalid(message: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            message: message.into(),
        }
    }

    /// 创建组件未找到错误
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// 创建结构性发现错误
    pub fn discovery_failure(root: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DiscoveryStructuralFailure {
            root: root.into(),
            message: message.into(),
        }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch(identity: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            identity: identity.into(),
            expected: expected.into(),
        }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(identity: impl Into<String>, source: BoxError) -> Self {
        Self::CreationFailed {
            identity: identity.into(),
            source,
        }
    }
}

/// 结果类型别名
pub type ContainerResult<T> = Result<T, ContainerError>;
