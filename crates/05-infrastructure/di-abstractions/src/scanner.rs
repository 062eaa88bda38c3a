//! 组件扫描器抽象接口
//!
//! 给定根包标识，产出其下所有带容器标记的可构造类型

use container_common::{ContainerResult, DiscoveredComponent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件扫描器 trait
pub trait ComponentScanner: Send + Sync {
    /// 扫描根包下的组件，结果顺序确定
    fn scan(&self, root_package: &str) -> ContainerResult<Vec<DiscoveredComponent>>;

    /// 获取扫描器名称
    fn name(&self) -> &str;
}

/// 组件来源布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanLayout {
    /// 进程内编译期目录
    #[default]
    Catalog,
    /// 展开的目录树
    Directory,
    /// tar 归档
    Archive,
}

impl fmt::Display for ScanLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str("catalog"),
            Self::Directory => f.write_str("directory"),
            Self::Archive => f.write_str("archive"),
        }
    }
}
