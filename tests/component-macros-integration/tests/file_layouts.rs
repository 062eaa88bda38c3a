//! 目录树与归档布局发现测试

use component_macros::component;
use container_common::{BoxError, ContainerError, Dependencies, Injectable, InjectionSite, Scope};
use container_composition::{ContainerBuilder, ContainerSettings};
use di_abstractions::{BeanLookup, ScanLayout};
use std::fs;
use std::path::Path;
use std::sync::Arc;

mod inventory {
    use super::*;

    #[component]
    pub struct Stock;

    impl Injectable for Stock {
        fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
            Ok(Self)
        }
    }

    #[component]
    pub struct Picker {
        pub stock: Arc<Stock>,
    }

    impl Injectable for Picker {
        fn injection_sites() -> Vec<InjectionSite> {
            vec![InjectionSite::named("stock", "main_stock")]
        }

        fn construct(deps: &Dependencies) -> Result<Self, BoxError> {
            Ok(Self {
                stock: deps.get::<Stock>("stock")?,
            })
        }
    }
}

fn type_name(suffix: &str) -> String {
    format!("{}::inventory::{}", module_path!(), suffix)
}

fn manifests() -> Vec<(&'static str, String)> {
    vec![
        (
            "warehouse/stock.component.toml",
            format!("type = \"{}\"\nname = \"main_stock\"\n", type_name("Stock")),
        ),
        (
            "warehouse/picking/picker.component.toml",
            format!("type = \"{}\"\nscope = \"prototype\"\n", type_name("Picker")),
        ),
        (
            "warehouse/picking/unknown.component.toml",
            format!("type = \"{}\"\n", type_name("Forklift")),
        ),
        ("office/stock.component.toml", format!("type = \"{}\"\n", type_name("Stock"))),
    ]
}

fn settings(layout: ScanLayout, path: &Path) -> ContainerSettings {
    let mut settings = ContainerSettings::default();
    settings.scan.root_package = Some("warehouse".to_string());
    settings.scan.layout = layout;
    settings.scan.path = Some(path.to_path_buf());
    settings
}

#[test]
fn test_directory_layout() {
    let base = tempfile::tempdir().unwrap();
    for (relative, text) in manifests() {
        let path = base.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    let container = ContainerBuilder::from_settings(settings(ScanLayout::Directory, base.path()))
        .build()
        .unwrap();

    assert!(container.contains_bean("main_stock"));
    assert!(!container.contains_bean("stock"));

    let picker = container.get_bean::<inventory::Picker>().unwrap();
    let stock = container.get_named::<inventory::Stock>("main_stock").unwrap();
    assert!(Arc::ptr_eq(&picker.stock, &stock));

    let report = container.report();
    let picker_report = report
        .beans
        .iter()
        .find(|bean| bean.identity == "picker")
        .unwrap();
    assert_eq!(picker_report.scope, Scope::Prototype);
}

#[test]
fn test_archive_layout() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("components.tar");

    let mut builder = tar::Builder::new(fs::File::create(&archive).unwrap());
    for (relative, text) in manifests() {
        let mut header = tar::Header::new_gnu();
        header.set_size(text.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, relative, text.as_bytes()).unwrap();
    }
    builder.finish().unwrap();
    drop(builder);

    let container = ContainerBuilder::from_settings(settings(ScanLayout::Archive, &archive))
        .build()
        .unwrap();

    assert_eq!(container.report().beans.len(), 2);
    let first = container.get_bean::<inventory::Picker>().unwrap();
    let second = container.get_bean::<inventory::Picker>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.stock, &second.stock));
}

#[test]
fn test_abstract_manifest_is_rejected() {
    let base = tempfile::tempdir().unwrap();
    let package = base.path().join("warehouse");
    fs::create_dir_all(&package).unwrap();
    fs::write(
        package.join("stock.component.toml"),
        format!("type = \"{}\"\nabstract = true\n", type_name("Stock")),
    )
    .unwrap();

    let result = ContainerBuilder::from_settings(settings(ScanLayout::Directory, base.path())).build();
    assert!(matches!(result, Err(ContainerError::ConfigurationInvalid { .. })));
}

#[test]
fn test_missing_archive_is_structural_failure() {
    let dir = tempfile::tempdir().unwrap();
    let result =
        ContainerBuilder::from_settings(settings(ScanLayout::Archive, &dir.path().join("absent.tar")))
            .build();
    assert!(matches!(
        result,
        Err(ContainerError::DiscoveryStructuralFailure { .. })
    ));
}
