//! 组件替换配置

use di_abstractions::Environment;
use infrastructure_common::{ConfigError, ConfigResult, PathConventions};
use serde::Deserialize;
use std::collections::BTreeMap;

/// 配置前缀
pub const OVERRIDE_PREFIX: &str = "override";
/// 扫描包路径，逗号分隔
pub const PACKAGES_KEY: &str = "override.packages";
/// 替换工厂类型，逗号分隔
pub const FACTORIES_KEY: &str = "override.factories";
/// 单个组件的替换映射前缀，值的格式为 `type[:priority]`
pub const MAPPINGS_PREFIX: &str = "override.mappings.";

/// 组件替换配置
///
/// `packages` 和 `factories` 合并全部属性源的值；`mappings` 不经过 `config` 绑定，
/// 直接从属性源读取以保留组件名称的大小写。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OverrideProperties {
    /// 是否启用组件替换
    pub enabled: bool,
    /// 扫描包路径
    #[serde(skip)]
    pub packages: Vec<String>,
    /// 替换工厂类型
    #[serde(skip)]
    pub factories: Vec<String>,
    /// 组件名称到 `type[:priority]` 的映射
    #[serde(skip)]
    pub mappings: BTreeMap<String, String>,
}

impl Default for OverrideProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            packages: Vec::new(),
            factories: Vec::new(),
            mappings: BTreeMap::new(),
        }
    }
}

impl OverrideProperties {
    /// 从环境绑定配置，靠前的属性源优先
    pub fn bind(environment: &dyn Environment) -> ConfigResult<Self> {
        let sources = environment.property_sources();

        // 低优先级先写入，让高优先级覆盖
        let mut builder = config::Config::builder();
        for source in sources.iter().rev() {
            for (key, value) in &source.properties {
                let scoped = key
                    .strip_prefix(OVERRIDE_PREFIX)
                    .is_some_and(|rest| rest.starts_with('.'));
                if !scoped
                    || key.starts_with(MAPPINGS_PREFIX)
                    || key.as_str() == PACKAGES_KEY
                    || key.as_str() == FACTORIES_KEY
                {
                    continue;
                }
                builder = builder
                    .set_override(key.as_str(), value.as_str())
                    .map_err(parse_error)?;
            }
        }
        let settings = builder.build().map_err(parse_error)?;

        let mut properties = match settings.get::<Self>(OVERRIDE_PREFIX) {
            Ok(properties) => properties,
            Err(config::ConfigError::NotFound(_)) => Self::default(),
            Err(e) => return Err(parse_error(e)),
        };
        properties.packages = union_list(environment, PACKAGES_KEY);
        properties.factories = union_list(environment, FACTORIES_KEY);

        for source in &sources {
            for (key, value) in &source.properties {
                let Some(name) = key.strip_prefix(MAPPINGS_PREFIX) else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                properties
                    .mappings
                    .entry(name.to_string())
                    .or_insert_with(|| value.clone());
            }
        }
        Ok(properties)
    }
}

/// 合并全部属性源中某个逗号分隔属性的值，保留首次出现的顺序
pub fn union_list(environment: &dyn Environment, key: &str) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for source in environment.property_sources() {
        let Some(value) = source.get(key) else {
            continue;
        };
        for item in PathConventions::split_comma_list(value) {
            if !merged.contains(&item) {
                merged.push(item);
            }
        }
    }
    merged
}

fn parse_error(e: config::ConfigError) -> ConfigError {
    ConfigError::ParseError {
        source: Box::new(e),
    }
}
