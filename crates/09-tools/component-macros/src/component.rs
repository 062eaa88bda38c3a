//! 组件注册宏实现

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    parse::Parser, punctuated::Punctuated, Expr, Ident, Item, Lit, Meta, Path, Result, Token,
};

/// 容器标记类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Component,
    Configuration,
}

/// 作用域参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeArg {
    Singleton,
    Prototype,
}

/// 初始化模式参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitArg {
    Eager,
    Lazy,
}

/// 已知的配置类别：(属性中的名称, 枚举变体)
const CATEGORIES: [(&str, &str); 6] = [
    ("exception_handler", "ExceptionHandler"),
    ("security", "Security"),
    ("server", "Server"),
    ("filter", "Filter"),
    ("template", "Template"),
    ("cookie", "Cookie"),
];

/// 宏参数
#[derive(Debug, Default)]
pub struct ComponentArgs {
    /// 自定义组件标识
    pub name: Option<String>,
    pub scope: Option<ScopeArg>,
    pub init: Option<InitArg>,
    /// 组件声明的能力（trait 路径）
    pub provides: Vec<Path>,
    /// 配置类别对应的枚举变体
    pub category: Option<Ident>,
    pub is_default: bool,
}

impl ComponentArgs {
    /// 解析属性参数
    pub fn parse(kind: MarkerKind, args: TokenStream) -> Result<Self> {
        let mut parsed = ComponentArgs::default();
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;

        for meta in metas {
            match &meta {
                Meta::Path(path) if path.is_ident("singleton") => {
                    parsed.set_scope(&meta, ScopeArg::Singleton)?
                }
                Meta::Path(path) if path.is_ident("prototype") => {
                    parsed.set_scope(&meta, ScopeArg::Prototype)?
                }
                Meta::Path(path) if path.is_ident("eager") => parsed.set_init(&meta, InitArg::Eager)?,
                Meta::Path(path) if path.is_ident("lazy") => parsed.set_init(&meta, InitArg::Lazy)?,
                Meta::Path(path) if path.is_ident("default") && kind == MarkerKind::Configuration => {
                    parsed.is_default = true;
                }
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    parsed.name = Some(string_value(&nv.value)?);
                }
                Meta::NameValue(nv)
                    if nv.path.is_ident("category") && kind == MarkerKind::Configuration =>
                {
                    let value = string_value(&nv.value)?;
                    parsed.category = Some(category_variant(&value).ok_or_else(|| {
                        syn::Error::new_spanned(&nv.value, format!("未知的配置类别: {}", value))
                    })?);
                }
                Meta::List(list) if list.path.is_ident("provides") => {
                    let paths = list.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
                    parsed.provides.extend(paths);
                }
                _ => return Err(syn::Error::new_spanned(&meta, "不支持的参数")),
            }
        }

        if kind == MarkerKind::Configuration && parsed.category.is_none() {
            return Err(syn::Error::new(
                Span::call_site(),
                "#[configuration] 需要 category 参数",
            ));
        }

        Ok(parsed)
    }

    fn set_scope(&mut self, meta: &Meta, scope: ScopeArg) -> Result<()> {
        if self.scope.replace(scope).is_some() {
            return Err(syn::Error::new_spanned(meta, "作用域只能指定一次"));
        }
        Ok(())
    }

    fn set_init(&mut self, meta: &Meta, init: InitArg) -> Result<()> {
        if self.init.replace(init).is_some() {
            return Err(syn::Error::new_spanned(meta, "初始化模式只能指定一次"));
        }
        Ok(())
    }

    fn marker_tokens(&self) -> TokenStream {
        match &self.category {
            Some(category) => {
                let is_default = self.is_default;
                quote! {
                    ::container_common::Marker::Configuration {
                        category: ::container_common::ConfigurationCategory::#category,
                        is_default: #is_default,
                    }
                }
            }
            None => quote! { ::container_common::Marker::Component },
        }
    }

    fn builder_calls(&self) -> TokenStream {
        let name = self.name.as_ref().map(|name| quote! { .named(#name) });
        let scope = self.scope.map(|scope| match scope {
            ScopeArg::Singleton => quote! { .with_scope(::container_common::Scope::Singleton) },
            ScopeArg::Prototype => quote! { .with_scope(::container_common::Scope::Prototype) },
        });
        let init = self.init.map(|init| match init {
            InitArg::Eager => quote! { .with_init_mode(::container_common::InitMode::Eager) },
            InitArg::Lazy => quote! { .with_init_mode(::container_common::InitMode::Lazy) },
        });
        let provides = self.provides.iter();

        quote! {
            #name
            #scope
            #init
            #( .provides::<dyn #provides>(|bean| bean) )*
        }
    }
}

fn string_value(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Ok(lit_str.value()),
            _ => Err(syn::Error::new_spanned(expr, "需要字符串字面量")),
        },
        _ => Err(syn::Error::new_spanned(expr, "需要字符串字面量")),
    }
}

fn category_variant(value: &str) -> Option<Ident> {
    let normalized = value.trim().to_lowercase().replace('-', "_");
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, variant)| Ident::new(variant, Span::call_site()))
}

/// 展开 `#[component]` / `#[configuration]`
pub fn expand(kind: MarkerKind, args: TokenStream, input: TokenStream) -> Result<TokenStream> {
    let args = ComponentArgs::parse(kind, args)?;
    let item: Item = syn::parse2(input)?;
    let marker = args.marker_tokens();

    let (ident, entry) = match &item {
        Item::Struct(item_struct) => {
            reject_generics(&item_struct.generics)?;
            let ident = &item_struct.ident;
            (ident.clone(), constructible_entry(ident, &args, &marker))
        }
        Item::Enum(item_enum) => {
            reject_generics(&item_enum.generics)?;
            let ident = &item_enum.ident;
            (ident.clone(), constructible_entry(ident, &args, &marker))
        }
        Item::Trait(item_trait) => {
            let ident = &item_trait.ident;
            let entry = quote! {
                ::container_common::CatalogEntry::interface(
                    ::std::stringify!(#ident),
                    ::std::module_path!(),
                    #marker,
                )
            };
            (ident.clone(), entry)
        }
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "容器标记只能用于结构体、枚举或 trait",
            ))
        }
    };

    let registration_fn_name = format_ident!(
        "__register_component_{}",
        ident.to_string().to_lowercase()
    );

    Ok(quote! {
        #item

        // 加载期提交目录条目
        #[ctor::ctor]
        fn #registration_fn_name() {
            ::container_common::submit_catalog_entry(#entry);
        }
    })
}

fn reject_generics(generics: &syn::Generics) -> Result<()> {
    if generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(generics, "泛型类型不能注册为容器组件"))
    }
}

fn constructible_entry(ident: &Ident, args: &ComponentArgs, marker: &TokenStream) -> TokenStream {
    let builder_calls = args.builder_calls();
    quote! {
        {
            fn describe() -> ::container_common::ComponentDescriptor {
                ::container_common::ComponentBuilder::<#ident>::injectable()
                    #builder_calls
                    .build()
            }

            ::container_common::CatalogEntry::new(
                ::std::stringify!(#ident),
                ::std::module_path!(),
                #marker,
                describe,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_args() {
        let args = ComponentArgs::parse(
            MarkerKind::Component,
            quote! { name = "orders", prototype, lazy, provides(Repository, crate::Audit) },
        )
        .unwrap();

        assert_eq!(args.name.as_deref(), Some("orders"));
        assert_eq!(args.scope, Some(ScopeArg::Prototype));
        assert_eq!(args.init, Some(InitArg::Lazy));
        assert_eq!(args.provides.len(), 2);
        assert!(args.category.is_none());
    }

    #[test]
    fn test_configuration_args() {
        let args = ComponentArgs::parse(
            MarkerKind::Configuration,
            quote! { category = "EXCEPTION_HANDLER", default },
        )
        .unwrap();

        assert_eq!(args.category.unwrap().to_string(), "ExceptionHandler");
        assert!(args.is_default);
    }

    #[test]
    fn test_invalid_args() {
        assert!(ComponentArgs::parse(MarkerKind::Configuration, quote! { default }).is_err());
        assert!(ComponentArgs::parse(MarkerKind::Configuration, quote! { category = "session" }).is_err());
        assert!(ComponentArgs::parse(MarkerKind::Component, quote! { default }).is_err());
        assert!(ComponentArgs::parse(MarkerKind::Component, quote! { lazy, eager }).is_err());
        assert!(ComponentArgs::parse(MarkerKind::Component, quote! { priority = 3 }).is_err());
    }

    #[test]
    fn test_expand_struct_and_trait() {
        let expanded = expand(
            MarkerKind::Component,
            quote! { lazy },
            quote! { pub struct OrderService; },
        )
        .unwrap()
        .to_string();
        assert!(expanded.contains("__register_component_orderservice"));
        assert!(expanded.contains("CatalogEntry :: new"));

        let expanded = expand(
            MarkerKind::Component,
            TokenStream::new(),
            quote! { pub trait Repository {} },
        )
        .unwrap()
        .to_string();
        assert!(expanded.contains("CatalogEntry :: interface"));
    }

    #[test]
    fn test_expand_rejects_generics_and_functions() {
        assert!(expand(
            MarkerKind::Component,
            TokenStream::new(),
            quote! { struct Cache<T> { items: Vec<T> } },
        )
        .is_err());
        assert!(expand(MarkerKind::Component, TokenStream::new(), quote! { fn run() {} }).is_err());
    }
}
