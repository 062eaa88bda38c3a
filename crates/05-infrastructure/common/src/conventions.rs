//! 约定规范定义
//!
//! 组件标识命名约定与包路径约定

use crate::metadata::short_type_name;

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 从类型名称提取组件默认标识
    ///
    /// `shop::services::OrderService` -> `order_service`
    pub fn canonical_identity(type_name: &str) -> String {
        Self::to_snake_case(short_type_name(type_name))
    }

    /// 将驼峰命名转换为蛇形命名
    pub fn to_snake_case(s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 4);
        let mut chars = s.chars().peekable();
        let mut previous_lower = false;

        while let Some(ch) = chars.next() {
            if ch.is_uppercase() && !result.is_empty() {
                let next_lower = chars.peek().map_or(false, |next| next.is_lowercase());
                if previous_lower || next_lower {
                    result.push('_');
                }
            }
            previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
            result.extend(ch.to_lowercase());
        }

        result
    }
}

/// 包路径约定规范
#[derive(Debug)]
pub struct PackageConventions;

impl PackageConventions {
    /// 将 `a.b.c`、`a/b/c` 或 `a::b::c` 统一为 `a::b::c`
    pub fn normalize(package: &str) -> String {
        package
            .split(|c| c == '.' || c == '/' || c == '\\' || c == ':')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// 包路径对应的相对目录片段
    pub fn to_path_segments(package: &str) -> Vec<String> {
        Self::normalize(package)
            .split("::")
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 检查模块路径是否位于根包之内（包含根包本身与其子包）
    pub fn is_within(module_path: &str, root: &str) -> bool {
        let module_path = Self::normalize(module_path);
        let root = Self::normalize(root);

        if root.is_empty() {
            return true;
        }

        module_path == root
            || module_path
                .strip_prefix(&root)
                .map_or(false, |rest| rest.starts_with("::"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_identity() {
        assert_eq!(
            NamingConventions::canonical_identity("shop::services::OrderService"),
            "order_service"
        );
        assert_eq!(NamingConventions::canonical_identity("Repo"), "repo");
        assert_eq!(
            NamingConventions::canonical_identity("shop::HTTPClient"),
            "http_client"
        );
    }

    #[test]
    fn test_normalize_package_separators() {
        assert_eq!(PackageConventions::normalize("shop.services"), "shop::services");
        assert_eq!(PackageConventions::normalize("shop/services/"), "shop::services");
        assert_eq!(PackageConventions::normalize("shop::services"), "shop::services");
    }

    #[test]
    fn test_is_within_respects_segment_boundaries() {
        assert!(PackageConventions::is_within("shop::services", "shop"));
        assert!(PackageConventions::is_within("shop", "shop"));
        assert!(PackageConventions::is_within("shop::services::orders", "shop.services"));
        assert!(!PackageConventions::is_within("shopping::cart", "shop"));
        assert!(!PackageConventions::is_within("shop", "shop::services"));
    }
}
