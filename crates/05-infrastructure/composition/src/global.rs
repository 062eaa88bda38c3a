//! 进程级容器句柄
//!
//! 启动便利设施：子系统仍应优先通过 `Arc<ApplicationContainer>` 显式传递容器。

use container_common::{ContainerError, ContainerResult};
use di_impl::ApplicationContainer;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;

static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<ApplicationContainer>>>> =
    Lazy::new(|| RwLock::new(None));

static BOOTSTRAP_GUARD: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// 安装进程级容器，已存在时返回错误
pub fn install(container: ApplicationContainer) -> ContainerResult<Arc<ApplicationContainer>> {
    let mut slot = GLOBAL_CONTAINER.write();
    if let Some(existing) = slot.as_ref() {
        return Err(ContainerError::configuration_invalid(format!(
            "进程级容器已安装: {}",
            existing.id()
        )));
    }

    let container = Arc::new(container);
    info!("安装进程级容器: {}", container.id());
    *slot = Some(container.clone());
    Ok(container)
}

/// 获取进程级容器
pub fn get() -> Option<Arc<ApplicationContainer>> {
    GLOBAL_CONTAINER.read().clone()
}

/// 获取进程级容器，不存在时执行一次启动
///
/// 启动过程由独立的互斥锁串行化，启动期间 [`get`] 返回 `None` 而不会阻塞。
pub fn get_or_bootstrap<F>(bootstrap: F) -> ContainerResult<Arc<ApplicationContainer>>
where
    F: FnOnce() -> ContainerResult<ApplicationContainer>,
{
    if let Some(container) = get() {
        return Ok(container);
    }

    let _bootstrapping = BOOTSTRAP_GUARD.lock();
    if let Some(container) = get() {
        return Ok(container);
    }

    let container = Arc::new(bootstrap()?);
    let mut slot = GLOBAL_CONTAINER.write();
    if let Some(existing) = slot.as_ref() {
        info!("启动期间已安装其他容器, 关闭新容器: {}", container.id());
        container.shutdown();
        return Ok(existing.clone());
    }

    info!("安装进程级容器: {}", container.id());
    *slot = Some(container.clone());
    Ok(container)
}

/// 关闭并移除进程级容器
pub fn reset() -> Option<Arc<ApplicationContainer>> {
    let container = GLOBAL_CONTAINER.write().take();
    if let Some(container) = &container {
        container.shutdown();
    }
    container
}
