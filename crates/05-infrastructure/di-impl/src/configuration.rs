//! 配置槽位注册表
//!
//! 每个配置类别对应一个槽位。候选者按提交顺序仲裁：
//!
//! | 已有 \ 新来 | 默认 | 非默认 |
//! |---|---|---|
//! | 默认 | 保留已有 | 新来者覆盖 |
//! | 非默认 | 保留已有 | 保留已有（严格模式下报错） |

use crate::registry::BeanRegistry;
use container_common::{
    BeanRef, ComponentDescriptor, ConfigurationCandidate, ConfigurationCategory, ContainerError,
    ContainerResult,
};
use di_abstractions::ResolvedBean;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 仲裁结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArbitrationOutcome {
    /// 槽位为空，直接占据
    Installed,
    /// 覆盖了已有的默认候选者
    Overridden { previous: String },
    /// 被忽略，保留已有候选者
    Ignored { kept: String },
}

/// 仲裁记录
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrationRecord {
    /// 槽位类别
    pub category: ConfigurationCategory,
    /// 候选者标识
    pub identity: String,
    /// 是否为框架默认
    pub is_default: bool,
    #[serde(flatten)]
    pub outcome: ArbitrationOutcome,
}

#[derive(Debug)]
struct ConfigurationSlot {
    active: Arc<ComponentDescriptor>,
    is_default: bool,
    instance: OnceCell<BeanRef>,
}

impl ConfigurationSlot {
    fn new(candidate: ConfigurationCandidate) -> Self {
        Self {
            active: Arc::new(candidate.descriptor),
            is_default: candidate.is_default,
            instance: OnceCell::new(),
        }
    }
}

/// 活跃配置的摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveConfiguration {
    /// 槽位类别
    pub category: ConfigurationCategory,
    /// 活跃实例标识
    pub identity: String,
    /// 是否为框架默认
    pub is_default: bool,
    /// 是否已实例化
    pub activated: bool,
}

/// 配置槽位注册表
#[derive(Debug, Default)]
pub struct ConfigurationRegistry {
    slots: BTreeMap<ConfigurationCategory, ConfigurationSlot>,
    history: Vec<ArbitrationRecord>,
    strict: bool,
}

impl ConfigurationRegistry {
    /// 创建空的配置槽位注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 严格模式：两个非默认候选者竞争同一槽位时报错
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 是否启用严格模式
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// 提交候选者并执行仲裁
    pub fn offer(&mut self, candidate: ConfigurationCandidate) -> ContainerResult<ArbitrationOutcome> {
        let category = candidate.category;
        let identity = candidate.descriptor.identity().to_string();
        let is_default = candidate.is_default;

        if let Some(capability) = category.required_capability() {
            if !candidate.descriptor.provides(capability.id) {
                return Err(ContainerError::configuration_invalid(format!(
                    "配置 {identity} 占据 {category} 槽位必须提供能力 {capability}"
                )));
            }
        }

        let outcome = match self.slots.get(&category) {
            None => {
                self.slots.insert(category, ConfigurationSlot::new(candidate));
                debug!("配置槽位 {} 由 {} 占据", category, identity);
                ArbitrationOutcome::Installed
            }
            Some(existing) if existing.is_default && !is_default => {
                let previous = existing.active.identity().to_string();
                info!("配置槽位 {} 的默认配置 {} 被 {} 覆盖", category, previous, identity);
                self.slots.insert(category, ConfigurationSlot::new(candidate));
                ArbitrationOutcome::Overridden { previous }
            }
            Some(existing) => {
                let kept = existing.active.identity().to_string();
                if self.strict && !existing.is_default && !is_default {
                    return Err(ContainerError::configuration_invalid(format!(
                        "配置槽位 {category} 存在多个非默认配置: {kept}, {identity}"
                    )));
                }
                warn!("配置槽位 {} 已由 {} 占据, 忽略 {}", category, kept, identity);
                ArbitrationOutcome::Ignored { kept }
            }
        };

        self.history.push(ArbitrationRecord {
            category,
            identity,
            is_default,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// 解析槽位中的活跃实例，首次访问时构造
    pub fn resolve(
        &self,
        category: ConfigurationCategory,
        beans: &BeanRegistry,
    ) -> ContainerResult<ResolvedBean> {
        let slot = self
            .slots
            .get(&category)
            .ok_or_else(|| ContainerError::ConfigurationNotFound {
                category: category.to_string(),
            })?;

        let instance = slot
            .instance
            .get_or_try_init(|| beans.instantiate(&slot.active))?
            .clone();
        Ok(ResolvedBean::new(slot.active.clone(), instance))
    }

    /// 激活所有槽位
    pub fn activate(&self, beans: &BeanRegistry) -> ContainerResult<()> {
        for &category in self.slots.keys() {
            self.resolve(category, beans)?;
        }
        info!("配置槽位已激活: {} 个", self.slots.len());
        Ok(())
    }

    /// 槽位中的活跃配置
    pub fn active(&self, category: ConfigurationCategory) -> Option<ActiveConfiguration> {
        self.slots.get(&category).map(|slot| ActiveConfiguration {
            category,
            identity: slot.active.identity().to_string(),
            is_default: slot.is_default,
            activated: slot.instance.get().is_some(),
        })
    }

    /// 所有活跃配置，按类别排序
    pub fn active_configurations(&self) -> Vec<ActiveConfiguration> {
        self.slots
            .keys()
            .filter_map(|&category| self.active(category))
            .collect()
    }

    /// 全部仲裁记录，按提交顺序
    pub fn history(&self) -> &[ArbitrationRecord] {
        &self.history
    }

    /// 销毁所有已激活的配置实例
    pub fn teardown(&mut self) {
        for (category, slot) in &mut self.slots {
            let Some(instance) = slot.instance.take() else {
                continue;
            };
            if let Err(error) = slot.active.run_pre_destroy(&instance) {
                warn!(
                    "配置销毁回调失败: {} ({}), 原因: {}",
                    slot.active.identity(),
                    category,
                    error
                );
            }
        }
    }
}
