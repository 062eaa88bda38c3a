//! 静态依赖图校验
//!
//! 启动时在构造任何实例之前校验全部注入点，使延迟初始化的组件的配置错误也在启动阶段暴露。

use crate::registry::BeanRegistry;
use container_common::{ContainerError, ContainerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// 组件依赖图
#[derive(Debug)]
pub(crate) struct DependencyGraph {
    identities: Vec<String>,
    /// 组件索引 -> 注入点目标索引
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// 从注册表构建依赖图
    ///
    /// 必需注入点无候选或存在歧义时立即失败
    pub(crate) fn build(registry: &BeanRegistry) -> ContainerResult<Self> {
        let descriptors = registry.descriptors();
        let mut edges = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let mut targets = Vec::new();
            for site in descriptor.injection_sites() {
                if let Some(target) = registry.site_target(descriptor, site)? {
                    targets.push(target);
                }
            }
            edges.push(targets);
        }

        Ok(Self {
            identities: descriptors
                .iter()
                .map(|descriptor| descriptor.identity().to_string())
                .collect(),
            edges,
        })
    }

    /// 检测循环依赖
    ///
    /// 使用显式栈的深度优先搜索，依赖链再长也不会溢出调用栈
    pub(crate) fn ensure_acyclic(&self) -> ContainerResult<()> {
        let mut marks = vec![Mark::Unvisited; self.edges.len()];

        for root in 0..self.edges.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            // (节点, 下一条待访问的边)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::Visiting;

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let Some(&target) = self.edges[node].get(top.1) else {
                    marks[node] = Mark::Visited;
                    stack.pop();
                    continue;
                };
                top.1 += 1;

                match marks[target] {
                    Mark::Unvisited => {
                        marks[target] = Mark::Visiting;
                        stack.push((target, 0));
                    }
                    Mark::Visiting => return Err(self.cycle_error(&stack, target)),
                    Mark::Visited => {}
                }
            }
        }

        Ok(())
    }

    fn cycle_error(&self, stack: &[(usize, usize)], repeated: usize) -> ContainerError {
        let start = stack
            .iter()
            .position(|&(node, _)| node == repeated)
            .unwrap_or(0);
        let mut path: Vec<String> = stack[start..]
            .iter()
            .map(|&(node, _)| self.identities[node].clone())
            .collect();
        path.push(self.identities[repeated].clone());
        ContainerError::CircularDependency { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use container_common::{ComponentBuilder, ComponentDescriptor, InitMode, InjectionSite};

    struct Node;

    fn node(identity: &str, targets: &[&str]) -> ComponentDescriptor {
        targets
            .iter()
            .fold(ComponentBuilder::new(|_| Ok(Node)).named(identity), |builder, target| {
                builder.inject(InjectionSite::named(*target, *target))
            })
            .build()
            .with_init_mode(InitMode::Lazy)
    }

    fn start(descriptors: Vec<ComponentDescriptor>) -> ContainerResult<BeanRegistry> {
        let mut registry = BeanRegistry::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        registry.start()?;
        Ok(registry)
    }

    #[test]
    fn test_two_node_cycle_reports_path() {
        let error = start(vec![node("a", &["b"]), node("b", &["a"])]).unwrap_err();
        match error {
            ContainerError::CircularDependency { path } => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_reached_through_tail() {
        let error = start(vec![
            node("entry", &["x"]),
            node("x", &["y"]),
            node("y", &["z"]),
            node("z", &["x"]),
        ])
        .unwrap_err();
        match error {
            ContainerError::CircularDependency { path } => {
                assert_eq!(path, vec!["x", "y", "z", "x"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let error = start(vec![node("me", &["me"])]).unwrap_err();
        assert!(matches!(error, ContainerError::CircularDependency { ref path } if path == &["me", "me"]));
    }

    #[test]
    fn test_diamond_is_not_cycle() {
        start(vec![
            node("top", &["left", "right"]),
            node("left", &["bottom"]),
            node("right", &["bottom"]),
            node("bottom", &[]),
        ])
        .unwrap();
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let descriptors: Vec<_> = (0..5_000)
            .map(|i| {
                let identity = format!("n{i}");
                let next = format!("n{}", i + 1);
                if i == 4_999 {
                    node(&identity, &[])
                } else {
                    node(&identity, &[next.as_str()])
                }
            })
            .collect();
        start(descriptors).unwrap();
    }
}
