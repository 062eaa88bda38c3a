//! 容器端到端场景测试

use container_common::{
    BeanState, BoxError, ComponentBuilder, ComponentDescriptor, ConfigurationCandidate,
    ConfigurationCategory, ContainerError, Dependencies, ErrorReport, ExceptionHandler, Injectable,
    InjectionSite,
};
use di_abstractions::BeanLookup;
use di_impl::{ApplicationContainer, ArbitrationOutcome, BeanRegistry, ConfigurationRegistry};
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试仓储
#[derive(Debug)]
struct Repo;

/// 依赖仓储的服务
#[derive(Debug)]
struct Service {
    repo: Arc<Repo>,
}

impl Injectable for Service {
    fn injection_sites() -> Vec<InjectionSite> {
        vec![InjectionSite::of::<Repo>("repo")]
    }

    fn construct(deps: &Dependencies) -> Result<Self, BoxError> {
        Ok(Self {
            repo: deps.get::<Repo>("repo")?,
        })
    }
}

struct Alpha;
struct Beta;

impl Injectable for Alpha {
    fn injection_sites() -> Vec<InjectionSite> {
        vec![InjectionSite::of::<Beta>("beta")]
    }

    fn construct(deps: &Dependencies) -> Result<Self, BoxError> {
        deps.get::<Beta>("beta")?;
        Ok(Self)
    }
}

impl Injectable for Beta {
    fn injection_sites() -> Vec<InjectionSite> {
        vec![InjectionSite::of::<Alpha>("alpha")]
    }

    fn construct(deps: &Dependencies) -> Result<Self, BoxError> {
        deps.get::<Alpha>("alpha")?;
        Ok(Self)
    }
}

struct PlainErrors(u16);

impl ExceptionHandler for PlainErrors {
    fn handle(&self, error: &(dyn Error + 'static)) -> ErrorReport {
        ErrorReport {
            status: self.0,
            message: error.to_string(),
        }
    }
}

fn handler(name: &str, status: u16) -> ComponentDescriptor {
    ComponentBuilder::new(move |_| Ok(PlainErrors(status)))
        .named(name)
        .provides::<dyn ExceptionHandler>(|bean| bean)
        .build()
}

#[test]
fn test_singleton_is_shared_between_lookup_and_injection() -> anyhow::Result<()> {
    let mut beans = BeanRegistry::new();
    beans.register(ComponentDescriptor::new(|_| Ok(Repo)))?;
    beans.register(ComponentDescriptor::injectable::<Service>())?;
    let container = ApplicationContainer::start(beans, ConfigurationRegistry::new())?;

    let service = container.get_bean::<Service>()?;
    let repo = container.get_bean::<Repo>()?;
    assert!(Arc::ptr_eq(&service.repo, &repo));
    assert_eq!(container.bean_state("repo"), BeanState::Resolved);
    Ok(())
}

#[test]
fn test_cycle_is_rejected_before_construction() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();

    let mut beans = BeanRegistry::new();
    beans
        .register(
            ComponentBuilder::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Repo)
            })
            .build(),
        )
        .unwrap();
    beans.register(ComponentDescriptor::injectable::<Alpha>()).unwrap();
    beans.register(ComponentDescriptor::injectable::<Beta>()).unwrap();

    match ApplicationContainer::start(beans, ConfigurationRegistry::new()) {
        Err(ContainerError::CircularDependency { path }) => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"alpha".to_string()));
            assert!(path.contains(&"beta".to_string()));
        }
        other => panic!("期望循环依赖错误, 实际: {:?}", other.map(|c| c.id())),
    }
    assert_eq!(constructed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_identity_is_not_found() -> anyhow::Result<()> {
    let container = ApplicationContainer::start(BeanRegistry::new(), ConfigurationRegistry::new())?;

    assert!(!container.contains_bean("ghost"));
    assert!(matches!(
        container.get_bean_by_name("ghost"),
        Err(ContainerError::NotFound { .. })
    ));
    assert!(matches!(container.get_bean::<Repo>(), Err(ContainerError::NotFound { .. })));
    Ok(())
}

#[test]
fn test_configuration_arbitration() -> anyhow::Result<()> {
    let mut configurations = ConfigurationRegistry::new();
    let installed = configurations.offer(ConfigurationCandidate::framework_default(
        handler("framework_errors", 500),
        ConfigurationCategory::ExceptionHandler,
    ))?;
    let overridden = configurations.offer(ConfigurationCandidate::new(
        handler("app_errors", 422),
        ConfigurationCategory::ExceptionHandler,
    ))?;
    let ignored = configurations.offer(ConfigurationCandidate::framework_default(
        handler("late_default", 503),
        ConfigurationCategory::ExceptionHandler,
    ))?;

    assert_eq!(installed, ArbitrationOutcome::Installed);
    assert_eq!(
        overridden,
        ArbitrationOutcome::Overridden {
            previous: "framework_errors".to_string()
        }
    );
    assert_eq!(
        ignored,
        ArbitrationOutcome::Ignored {
            kept: "app_errors".to_string()
        }
    );

    let container = ApplicationContainer::start(BeanRegistry::new(), configurations)?;
    let active = container
        .get_configuration::<dyn ExceptionHandler>(ConfigurationCategory::ExceptionHandler)?;
    let error = ContainerError::not_found("orders");
    assert_eq!(active.handle(&error).status, 422);

    let report = container.report();
    assert_eq!(report.arbitration.len(), 3);
    assert_eq!(report.configurations[0].identity, "app_errors");
    Ok(())
}

#[test]
fn test_configuration_without_capability_is_rejected() {
    let mut configurations = ConfigurationRegistry::new();
    let result = configurations.offer(ConfigurationCandidate::new(
        ComponentDescriptor::new(|_| Ok(Repo)),
        ConfigurationCategory::ExceptionHandler,
    ));
    assert!(matches!(result, Err(ContainerError::ConfigurationInvalid { .. })));
}

#[test]
fn test_eager_and_lazy_initialization() -> anyhow::Result<()> {
    let eager_count = Arc::new(AtomicUsize::new(0));
    let lazy_count = Arc::new(AtomicUsize::new(0));
    let (eager, lazy) = (eager_count.clone(), lazy_count.clone());

    let mut beans = BeanRegistry::new();
    beans.register(
        ComponentBuilder::new(move |_| {
            eager.fetch_add(1, Ordering::SeqCst);
            Ok(Repo)
        })
        .named("eager_repo")
        .build(),
    )?;
    beans.register(
        ComponentBuilder::new(move |_| {
            lazy.fetch_add(1, Ordering::SeqCst);
            Ok(Repo)
        })
        .named("lazy_repo")
        .lazy()
        .build(),
    )?;

    let container = ApplicationContainer::start(beans, ConfigurationRegistry::new())?;
    assert_eq!(eager_count.load(Ordering::SeqCst), 1);
    assert_eq!(lazy_count.load(Ordering::SeqCst), 0);
    assert_eq!(container.bean_state("lazy_repo"), BeanState::Registered);

    container.get_named::<Repo>("lazy_repo")?;
    container.get_named::<Repo>("lazy_repo")?;
    assert_eq!(lazy_count.load(Ordering::SeqCst), 1);
    assert_eq!(container.bean_state("lazy_repo"), BeanState::Resolved);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lazy_lookups_construct_once() -> anyhow::Result<()> {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();

    let mut beans = BeanRegistry::new();
    beans.register(
        ComponentBuilder::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Repo)
        })
        .lazy()
        .build(),
    )?;
    beans.register(
        ComponentBuilder::<Service>::injectable()
            .prototype()
            .build(),
    )?;
    let container = Arc::new(ApplicationContainer::start(beans, ConfigurationRegistry::new())?);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let container = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let service = container.get_bean::<Service>()?;
            Ok::<_, ContainerError>(service)
        }));
    }

    let mut services = Vec::new();
    for handle in handles {
        services.push(handle.await??);
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(services
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0].repo, &pair[1].repo)));
    assert!(!Arc::ptr_eq(&services[0], &services[1]));
    Ok(())
}

#[test]
fn test_shutdown_runs_pre_destroy_in_reverse_order() -> anyhow::Result<()> {
    let destroyed = Arc::new(support::Log::default());
    let (first, second) = (destroyed.clone(), destroyed.clone());

    let mut beans = BeanRegistry::new();
    beans.register(
        ComponentBuilder::new(|_| Ok(Repo))
            .on_pre_destroy(move |_| {
                first.push("repo");
                Ok(())
            })
            .build(),
    )?;
    beans.register(
        ComponentBuilder::<Service>::injectable()
            .on_pre_destroy(move |_| {
                second.push("service");
                Ok(())
            })
            .build(),
    )?;

    let container = ApplicationContainer::start(beans, ConfigurationRegistry::new())?;
    container.shutdown();

    assert_eq!(destroyed.entries(), vec!["service", "repo"]);
    Ok(())
}

mod support {
    use parking_lot::Mutex;

    /// 记录回调顺序
    #[derive(Debug, Default)]
    pub struct Log(Mutex<Vec<&'static str>>);

    impl Log {
        pub fn push(&self, entry: &'static str) {
            self.0.lock().push(entry);
        }

        pub fn entries(&self) -> Vec<&'static str> {
            self.0.lock().clone()
        }
    }
}
