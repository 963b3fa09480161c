//! 约定规范定义
//!
//! 提供组件名称推断和扫描路径归并的约定规范

use std::collections::BTreeSet;

/// 限定名的分隔符
pub const PATH_SEPARATOR: char = '.';

/// `${key}` 或 `${key:default}` 占位符的正则表达式
///
/// 键和默认值都不含花括号，因此只匹配最内层的占位符，嵌套的占位符需要由内向外逐层解析。
pub const PLACEHOLDER_PATTERN: &str = r"\$\{([^{}:]+)(?::([^{}]*))?\}";

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 推断组件名称
    ///
    /// 显式名称非空时直接使用；否则取回退名称并把首字母改为小写，
    /// 回退名称通常是父类型的简单名称或声明方法的名称。
    pub fn deduce_component_name(explicit: &str, fallback: &str) -> String {
        if explicit.trim().is_empty() {
            Self::decapitalize(fallback)
        } else {
            explicit.to_string()
        }
    }

    /// 获取限定名中的简单名称
    pub fn simple_name(qualified_name: &str) -> &str {
        qualified_name
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(qualified_name)
    }

    /// 将首字母改为小写
    pub fn decapitalize(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// 扫描路径约定规范
#[derive(Debug)]
pub struct PathConventions;

impl PathConventions {
    /// 判断 `path` 是否为 `ancestor` 本身或其子路径
    pub fn is_descendant(path: &str, ancestor: &str) -> bool {
        let path = format!("{path}{PATH_SEPARATOR}");
        let ancestor = format!("{ancestor}{PATH_SEPARATOR}");
        path.starts_with(&ancestor)
    }

    /// 归并扫描路径
    ///
    /// 去掉空白和重复项后按字典序排序，丢弃已被保留路径覆盖的子路径。
    /// 祖先路径在字典序中总排在其子路径之前，所以只需与已保留的路径比较。
    pub fn reduce<I, S>(paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = paths
            .into_iter()
            .map(|path| path.as_ref().trim().to_string())
            .filter(|path| !path.is_empty())
            .collect();

        let mut retained: Vec<String> = Vec::with_capacity(sorted.len());
        for path in sorted {
            if !retained
                .iter()
                .any(|ancestor| Self::is_descendant(&path, ancestor))
            {
                retained.push(path);
            }
        }
        retained
    }

    /// 拆分逗号分隔的列表
    pub fn split_comma_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduce_component_name() {
        assert_eq!(NamingConventions::deduce_component_name("", "FooBar"), "fooBar");
        assert_eq!(
            NamingConventions::deduce_component_name("explicit", "FooBar"),
            "explicit"
        );
        assert_eq!(NamingConventions::deduce_component_name("", "helloService"), "helloService");
        assert_eq!(NamingConventions::deduce_component_name("", ""), "");
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(
            NamingConventions::simple_name("demo.service.HelloService"),
            "HelloService"
        );
        assert_eq!(NamingConventions::simple_name("HelloService"), "HelloService");
    }

    #[test]
    fn test_is_descendant() {
        assert!(PathConventions::is_descendant("com.app.service", "com.app"));
        assert!(PathConventions::is_descendant("com.app", "com.app"));
        assert!(!PathConventions::is_descendant("com.application", "com.app"));
        assert!(!PathConventions::is_descendant("com.app", "com.app.service"));
    }

    #[test]
    fn test_reduce_overlapping_paths() {
        let reduced = PathConventions::reduce(["com.app.service", "com.app", " com.app ", "org.lib"]);
        assert_eq!(reduced, vec!["com.app".to_string(), "org.lib".to_string()]);
    }

    #[test]
    fn test_reduce_keeps_siblings_with_common_prefix() {
        let reduced = PathConventions::reduce(["com.app", "com.app-x", "com.app.b", "com.application"]);
        assert_eq!(
            reduced,
            vec![
                "com.app".to_string(),
                "com.app-x".to_string(),
                "com.application".to_string()
            ]
        );
    }

    #[test]
    fn test_reduce_covers_every_input() {
        let inputs = ["a.b.c", "a.b", "a.c", "b", "b.a.x", "c.d", "c.de"];
        let reduced = PathConventions::reduce(inputs);

        for (i, left) in reduced.iter().enumerate() {
            for (j, right) in reduced.iter().enumerate() {
                if i != j {
                    assert!(!PathConventions::is_descendant(left, right));
                }
            }
        }
        for input in inputs {
            assert!(reduced
                .iter()
                .any(|kept| PathConventions::is_descendant(input, kept)));
        }
    }

    #[test]
    fn test_split_comma_list() {
        assert_eq!(
            PathConventions::split_comma_list(" a, b,,c "),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(PathConventions::split_comma_list("").is_empty());
    }
}
