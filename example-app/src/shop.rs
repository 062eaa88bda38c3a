//! 示例组件

use component_macros::{component, configuration};
use container_common::{
    BoxError, ContainerError, Dependencies, ErrorReport, ExceptionHandler, Injectable, InjectionSite,
};
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// 价格规则
pub trait PriceRule: Send + Sync {
    fn apply(&self, cents: u64) -> u64;
}

#[component(provides(PriceRule))]
pub struct MemberDiscount;

impl PriceRule for MemberDiscount {
    fn apply(&self, cents: u64) -> u64 {
        cents * 9 / 10
    }
}

impl Injectable for MemberDiscount {
    fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
        Ok(Self)
    }
}

#[component(provides(PriceRule))]
pub struct RoundDown;

impl PriceRule for RoundDown {
    fn apply(&self, cents: u64) -> u64 {
        cents - cents % 10
    }
}

impl Injectable for RoundDown {
    fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
        Ok(Self)
    }
}

#[component]
pub struct Inventory {
    skus: Vec<(&'static str, u64)>,
}

impl Inventory {
    pub fn skus(&self) -> Vec<&'static str> {
        self.skus.iter().map(|(sku, _)| *sku).collect()
    }

    pub fn price_of(&self, sku: &str) -> Option<u64> {
        self.skus
            .iter()
            .find(|(name, _)| *name == sku)
            .map(|(_, cents)| *cents)
    }
}

impl Injectable for Inventory {
    fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
        Ok(Self {
            skus: vec![("apple", 120), ("pear", 95), ("plum", 233)],
        })
    }

    fn post_construct(&self) -> Result<(), BoxError> {
        info!("库存已加载: {} 种商品", self.skus.len());
        Ok(())
    }
}

/// 收据编号
#[component(prototype)]
pub struct ReceiptNumber(u64);

static NEXT_RECEIPT: AtomicU64 = AtomicU64::new(1);

impl ReceiptNumber {
    pub fn number(&self) -> u64 {
        self.0
    }
}

impl Injectable for ReceiptNumber {
    fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
        Ok(Self(NEXT_RECEIPT.fetch_add(1, Ordering::SeqCst)))
    }
}

#[component(name = "orders", lazy)]
pub struct OrderService {
    inventory: Arc<Inventory>,
    rules: Vec<Arc<dyn PriceRule>>,
}

impl OrderService {
    /// 下单并返回收据描述
    pub fn checkout(&self, receipt: &ReceiptNumber, sku: &str) -> anyhow::Result<String> {
        let cents = self
            .inventory
            .price_of(sku)
            .ok_or_else(|| Self::unknown_sku(sku))?;
        let total = self.rules.iter().fold(cents, |total, rule| rule.apply(total));
        Ok(format!("#{} {} {} 分", receipt.number(), sku, total))
    }

    pub fn unknown_sku(sku: &str) -> ContainerError {
        ContainerError::not_found(format!("sku:{sku}"))
    }
}

impl Injectable for OrderService {
    fn injection_sites() -> Vec<InjectionSite> {
        vec![
            InjectionSite::of::<Inventory>("inventory"),
            InjectionSite::named("member_discount", "member_discount"),
            InjectionSite::named("round_down", "round_down").optional(),
        ]
    }

    fn construct(deps: &Dependencies) -> Result<Self, BoxError> {
        let mut rules = vec![deps.get_as::<dyn PriceRule>("member_discount")?];
        rules.extend(deps.optional_as::<dyn PriceRule>("round_down")?);

        Ok(Self {
            inventory: deps.get::<Inventory>("inventory")?,
            rules,
        })
    }
}

#[configuration(category = "exception_handler", provides(ExceptionHandler))]
pub struct ShopErrors;

impl ExceptionHandler for ShopErrors {
    fn handle(&self, error: &(dyn Error + 'static)) -> ErrorReport {
        match error.downcast_ref::<ContainerError>() {
            Some(ContainerError::NotFound { target }) => ErrorReport {
                status: 404,
                message: format!("商品不存在: {target}"),
            },
            _ => ErrorReport {
                status: 500,
                message: error.to_string(),
            },
        }
    }
}

impl Injectable for ShopErrors {
    fn construct(_deps: &Dependencies) -> Result<Self, BoxError> {
        Ok(Self)
    }
}
