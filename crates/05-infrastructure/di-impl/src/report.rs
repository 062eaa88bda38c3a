//! 容器诊断报告

use crate::configuration::{ActiveConfiguration, ArbitrationRecord};
use crate::registry::BeanRegistry;
use chrono::{DateTime, Utc};
use container_common::{BeanState, InitMode, Scope};
use serde::Serialize;
use uuid::Uuid;

/// 注入点摘要
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    /// 注入点名称
    pub name: String,
    /// 注入目标
    pub target: String,
    /// 是否必需
    pub required: bool,
}

/// 组件摘要
#[derive(Debug, Clone, Serialize)]
pub struct BeanReport {
    /// 组件标识
    pub identity: String,
    /// 具体类型名
    pub type_name: String,
    /// 作用域
    pub scope: Scope,
    /// 初始化模式
    pub init_mode: InitMode,
    /// 当前状态
    pub state: BeanState,
    /// 提供的能力
    pub capabilities: Vec<String>,
    /// 注入点
    pub injection_sites: Vec<SiteReport>,
}

/// 容器诊断报告
#[derive(Debug, Clone, Serialize)]
pub struct ContainerReport {
    /// 容器ID
    pub container_id: Uuid,
    /// 启动时间
    pub started_at: DateTime<Utc>,
    /// 组件摘要，按注册顺序
    pub beans: Vec<BeanReport>,
    /// 活跃的配置
    pub configurations: Vec<ActiveConfiguration>,
    /// 仲裁历史
    pub arbitration: Vec<ArbitrationRecord>,
}

impl ContainerReport {
    pub(crate) fn beans_of(registry: &BeanRegistry) -> Vec<BeanReport> {
        registry
            .descriptors()
            .iter()
            .map(|descriptor| BeanReport {
                identity: descriptor.identity().to_string(),
                type_name: descriptor.type_info().name.to_string(),
                scope: descriptor.scope(),
                init_mode: descriptor.init_mode(),
                state: registry.state(descriptor.identity()),
                capabilities: descriptor
                    .capabilities()
                    .iter()
                    .map(|binding| binding.capability.name.to_string())
                    .collect(),
                injection_sites: descriptor
                    .injection_sites()
                    .iter()
                    .map(|site| SiteReport {
                        name: site.name().to_string(),
                        target: site.target().to_string(),
                        required: site.is_required(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// 以格式化 JSON 输出
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 指定状态的组件数量
    pub fn count_in_state(&self, state: BeanState) -> usize {
        self.beans.iter().filter(|bean| bean.state == state).count()
    }
}
