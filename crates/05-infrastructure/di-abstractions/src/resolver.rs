//! 依赖解析上下文
//!
//! 解析栈记录当前线程正在构造的组件标识，用于检测循环依赖并限制递归深度

use container_common::{ContainerError, ContainerResult};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// 解析选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// 解析栈
#[derive(Debug, Clone, Default)]
pub struct ResolutionStack {
    chain: Vec<String>,
    options: ResolveOptions,
}

impl ResolutionStack {
    /// 创建新的解析栈
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            chain: Vec::new(),
            options,
        }
    }

    /// 将组件标识压入解析栈
    ///
    /// 标识已在栈上时返回带完整环路路径的 [`ContainerError::CircularDependency`]
    pub fn enter(&mut self, identity: &str) -> ContainerResult<()> {
        if let Some(start) = self.chain.iter().position(|entry| entry == identity) {
            let mut path = self.chain[start..].to_vec();
            path.push(identity.to_string());
            warn!("解析期间检测到循环依赖: {}", path.join(" -> "));
            return Err(ContainerError::CircularDependency { path });
        }

        if self.chain.len() >= self.options.max_depth {
            return Err(ContainerError::configuration_invalid(format!(
                "解析深度超过上限 {}: {}",
                self.options.max_depth,
                self.chain.join(" -> ")
            )));
        }

        trace!("进入解析: {} (深度 {})", identity, self.chain.len());
        self.chain.push(identity.to_string());
        Ok(())
    }

    /// 弹出栈顶标识
    pub fn exit(&mut self) {
        self.chain.pop();
    }

    /// 标识是否在当前解析链上
    pub fn contains(&self, identity: &str) -> bool {
        self.chain.iter().any(|entry| entry == identity)
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// 当前解析链
    pub fn path(&self) -> &[String] {
        &self.chain
    }
}
