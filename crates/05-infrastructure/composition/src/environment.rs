//! 分层属性源环境

use di_abstractions::{Environment, PropertySource};
use infrastructure_common::{ConfigError, ConfigResult, PLACEHOLDER_PATTERN};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// `${key}` 或 `${key:default}`
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(PLACEHOLDER_PATTERN).expect("占位符正则表达式无效")
});

/// 占位符嵌套解析的最大深度
const MAX_PLACEHOLDER_DEPTH: usize = 8;

/// 分层环境
///
/// 属性源按加入顺序排列，越靠前优先级越高。占位符解析是宽松的：
/// 找不到属性且没有默认值时原样保留。
#[derive(Default)]
pub struct LayeredEnvironment {
    sources: RwLock<Vec<PropertySource>>,
}

impl LayeredEnvironment {
    /// 创建没有属性源的环境
    pub fn new() -> Self {
        Self::default()
    }

    /// 以最低优先级追加属性源
    pub fn with_source(self, source: PropertySource) -> Self {
        self.add_last(source);
        self
    }

    /// 以最高优先级加入属性源
    pub fn add_first(&self, source: PropertySource) {
        debug!("加入最高优先级属性源 {}", source.name);
        self.sources.write().insert(0, source);
    }

    /// 以最低优先级加入属性源
    pub fn add_last(&self, source: PropertySource) {
        debug!("加入最低优先级属性源 {}", source.name);
        self.sources.write().push(source);
    }

    /// 按名称移除属性源
    pub fn remove(&self, name: &str) -> Option<PropertySource> {
        let mut sources = self.sources.write();
        let index = sources.iter().position(|source| source.name == name)?;
        Some(sources.remove(index))
    }

    /// 从配置文件读取属性源，格式由扩展名决定
    ///
    /// 嵌套的表展开为点分键，数组展开为逗号分隔的值。
    pub fn file_source(path: impl AsRef<Path>) -> ConfigResult<PropertySource> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        let name = format!("file [{}]", path.display());
        to_property_source(name, settings)
    }

    /// 从带前缀的环境变量读取属性源
    ///
    /// `ADSP_OVERRIDE_PACKAGES` 在前缀为 `ADSP` 时对应 `override.packages`。
    pub fn environment_source(prefix: &str) -> ConfigResult<PropertySource> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).separator("_"))
            .build()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;
        to_property_source(format!("env [{prefix}]"), settings)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.sources
            .read()
            .iter()
            .find_map(|source| source.get(key).map(str::to_string))
    }

    fn resolve_once(&self, expression: &str) -> String {
        PLACEHOLDER
            .replace_all(expression, |captures: &Captures<'_>| {
                let key = captures[1].trim();
                match (self.lookup(key), captures.get(2)) {
                    (Some(value), _) => value,
                    (None, Some(default)) => default.as_str().to_string(),
                    (None, None) => captures[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Environment for LayeredEnvironment {
    fn property_sources(&self) -> Vec<PropertySource> {
        self.sources.read().clone()
    }

    fn get_property(&self, key: &str) -> Option<String> {
        self.lookup(key)
    }

    fn resolve_placeholders(&self, expression: &str) -> String {
        let mut current = expression.to_string();
        for _ in 0..MAX_PLACEHOLDER_DEPTH {
            if !current.contains("${") {
                break;
            }
            let next = self.resolve_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

impl fmt::Debug for LayeredEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .sources
            .read()
            .iter()
            .map(|source| source.name.clone())
            .collect();
        f.debug_struct("LayeredEnvironment")
            .field("sources", &names)
            .finish()
    }
}

fn to_property_source(name: String, settings: config::Config) -> ConfigResult<PropertySource> {
    let tree: Value = settings
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
    let mut properties = BTreeMap::new();
    flatten("", &tree, &mut properties);
    Ok(PropertySource { name, properties })
}

fn flatten(prefix: &str, value: &Value, properties: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, child, properties);
            }
        }
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(scalar).collect();
            properties.insert(prefix.to_string(), joined.join(","));
        }
        other => {
            if let Some(text) = scalar(other) {
                properties.insert(prefix.to_string(), text);
            }
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
