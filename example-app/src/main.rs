//! # 示例应用程序
//!
//! 演示如何使用组件宏注册组件、通过容器构建器启动容器并执行查找

use anyhow::Context;
use clap::Parser;
use container_common::ConfigurationCategory;
use container_composition::{global, ContainerBuilder, ContainerSettings, LoggingSettings};
use di_abstractions::BeanLookup;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod shop;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn Container 示例应用")]
struct Args {
    /// 配置文件路径，未指定时尝试当前目录下的 container.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 扫描的根包，默认使用示例自带的 shop 模块
    #[arg(short, long)]
    package: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 格式输出日志
    #[arg(long)]
    json: bool,

    /// 输出容器诊断报告
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = ContainerSettings::load(args.config.as_deref()).context("加载容器配置失败")?;
    let logging = LoggingSettings {
        level: args.log_level.clone(),
        json_format: args.json || settings.logging.json_format,
        ..settings.logging.clone()
    };
    let package = args
        .package
        .clone()
        .or_else(|| settings.scan.root_package.clone())
        .unwrap_or_else(|| format!("{}::shop", module_path!()));

    let container = global::get_or_bootstrap(|| {
        ContainerBuilder::from_settings(settings)
            .with_logging(logging)
            .scan_package(package)
            .build()
    })
    .context("启动容器失败")?;

    info!("启动 Lorn Container 示例应用");

    demonstrate_lookups(&container)?;
    demonstrate_concurrent_checkout(container.clone()).await?;
    demonstrate_exception_handler(&container)?;

    if args.report {
        println!("{}", container.report().to_json()?);
    }

    global::reset();
    info!("应用已关闭");
    Ok(())
}

/// 演示按类型、按标识与按能力查找
fn demonstrate_lookups(container: &di_impl::ApplicationContainer) -> anyhow::Result<()> {
    let inventory = container.get_named::<shop::Inventory>("inventory")?;
    info!("库存中的商品: {:?}", inventory.skus());

    let pricing = container.get_beans::<dyn shop::PriceRule>()?;
    info!("已注册 {} 条价格规则", pricing.len());

    info!("orders 组件是否存在: {}", container.contains_bean("orders"));
    Ok(())
}

/// 演示并发下单：延迟单例只构造一次，原型组件每次都是新实例
async fn demonstrate_concurrent_checkout(
    container: Arc<di_impl::ApplicationContainer>,
) -> anyhow::Result<()> {
    let mut handles = Vec::new();
    for sku in ["apple", "pear", "plum", "apple"] {
        let container = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let orders = container.get_bean::<shop::OrderService>()?;
            let receipt = container.get_bean::<shop::ReceiptNumber>()?;
            orders.checkout(&receipt, sku)
        }));
    }

    for handle in handles {
        let receipt = handle.await??;
        info!("下单完成: {}", receipt);
    }
    Ok(())
}

/// 演示配置槽位中的异常处理器
fn demonstrate_exception_handler(container: &di_impl::ApplicationContainer) -> anyhow::Result<()> {
    let handler = container.get_configuration::<dyn container_common::ExceptionHandler>(
        ConfigurationCategory::ExceptionHandler,
    )?;

    let error = shop::OrderService::unknown_sku("durian");
    let report = handler.handle(&error);
    info!("异常处理结果: {} {}", report.status, report.message);
    Ok(())
}
