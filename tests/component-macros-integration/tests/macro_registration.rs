//! 组件宏注册与目录发现测试

use component_macros::{component, configuration};
use container_common::{
    BoxError, ComponentCatalog, ConfigurationCategory, ContainerError, Dependencies, ErrorReport,
    ExceptionHandler, Injectable, InjectionSite, InitMode, Marker, Scope,
};
use container_composition::{CatalogScanner, ContainerBuilder};
use di_abstractions::{BeanLookup, ComponentScanner};
use std::error::Error;
use std::sync::Arc;

mod shop {
    pub mod repository {
        use super::super::*;

        pub trait Repository: Send + Sync {
            fn table(&self) -> &str;
        }

        #[component(provides(Repository))]
        pub struct SqlRepository;

        impl Repository for SqlRepository {
            fn table(&self) -> &str {
                "orders"
            }
        }

        impl Injectable for SqlRepository {
            fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
                Ok(Self)
            }
        }
    }

    pub mod service {
        use super::repository::Repository;
        use super::super::*;

        #[component(name = "orders", lazy)]
        pub struct OrderService {
            pub repository: Arc<dyn Repository>,
        }

        impl Injectable for OrderService {
            fn injection_sites() -> Vec<InjectionSite> {
                vec![InjectionSite::of::<dyn Repository>("repository")]
            }

            fn construct(deps: &Dependencies) -> Result<Self, BoxError> {
                Ok(Self {
                    repository: deps.get_as::<dyn Repository>("repository")?,
                })
            }
        }

        #[component(prototype)]
        pub struct Receipt;

        impl Injectable for Receipt {
            fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
                Ok(Self)
            }
        }
    }

    pub mod web {
        use super::super::*;

        #[configuration(category = "exception_handler", provides(ExceptionHandler))]
        pub struct ValidationErrors;

        impl ExceptionHandler for ValidationErrors {
            fn handle(&self, error: &(dyn Error + 'static)) -> ErrorReport {
                ErrorReport {
                    status: 422,
                    message: error.to_string(),
                }
            }
        }

        impl Injectable for ValidationErrors {
            fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
                Ok(Self)
            }
        }
    }
}

mod plugins {
    use super::*;

    #[component]
    pub trait Plugin: Send + Sync {}
}

fn package(suffix: &str) -> String {
    format!("{}::{}", module_path!(), suffix)
}

#[test]
fn test_macros_submit_catalog_entries() {
    let catalog = ComponentCatalog::global();
    let qualified = package("shop::service::OrderService");

    let entry = catalog.find(&qualified).unwrap();
    assert!(entry.is_constructible());
    assert_eq!(entry.marker, Marker::Component);

    let descriptor = entry.describe().unwrap();
    assert_eq!(descriptor.identity(), "orders");
    assert_eq!(descriptor.scope(), Scope::Singleton);
    assert_eq!(descriptor.init_mode(), InitMode::Lazy);
    assert_eq!(descriptor.injection_sites().len(), 1);

    let receipt = catalog.find(&package("shop::service::Receipt")).unwrap();
    assert_eq!(receipt.describe().unwrap().scope(), Scope::Prototype);

    let handler = catalog.find(&package("shop::web::ValidationErrors")).unwrap();
    assert_eq!(
        handler.marker,
        Marker::Configuration {
            category: ConfigurationCategory::ExceptionHandler,
            is_default: false
        }
    );
}

#[test]
fn test_catalog_scan_is_sorted() {
    let discovered = CatalogScanner::global().scan(&package("shop")).unwrap();
    let origins: Vec<String> = discovered.into_iter().map(|component| component.origin).collect();

    assert_eq!(
        origins,
        vec![
            package("shop::repository::SqlRepository"),
            package("shop::service::OrderService"),
            package("shop::service::Receipt"),
            package("shop::web::ValidationErrors"),
        ]
    );
}

#[test]
fn test_bootstrap_discovered_components() {
    let container = ContainerBuilder::new()
        .scan_package(package("shop"))
        .build()
        .unwrap();

    assert_eq!(container.bean_state("orders"), container_common::BeanState::Registered);
    let orders = container.get_named::<shop::service::OrderService>("orders").unwrap();
    assert_eq!(orders.repository.table(), "orders");

    let repository = container.get_bean::<shop::repository::SqlRepository>().unwrap();
    assert_eq!(
        Arc::as_ptr(&orders.repository) as *const (),
        Arc::as_ptr(&repository) as *const ()
    );

    let first = container.get_bean::<shop::service::Receipt>().unwrap();
    let second = container.get_bean::<shop::service::Receipt>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    let handler = container
        .get_configuration::<dyn ExceptionHandler>(ConfigurationCategory::ExceptionHandler)
        .unwrap();
    assert_eq!(handler.handle(&ContainerError::not_found("sku")).status, 422);
    assert!(!container.contains_bean("validation_errors"));

    container.shutdown();
}

#[test]
fn test_trait_marker_is_rejected() {
    let result = CatalogScanner::global().scan(&package("plugins"));
    assert!(matches!(result, Err(ContainerError::ConfigurationInvalid { .. })));

    let result = ContainerBuilder::new().scan_package(package("plugins")).build();
    assert!(matches!(result, Err(ContainerError::ConfigurationInvalid { .. })));
}

#[test]
fn test_unknown_package_is_structural_failure() {
    let result = ContainerBuilder::new().scan_package(package("warehouse")).build();
    assert!(matches!(
        result,
        Err(ContainerError::DiscoveryStructuralFailure { .. })
    ));
}
