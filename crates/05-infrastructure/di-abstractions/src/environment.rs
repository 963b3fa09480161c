//! 环境接口

use infrastructure_common::{ConfigError, ConfigResult, ValueType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 属性源
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySource {
    /// 属性源名称
    pub name: String,
    /// 扁平化的键值
    pub properties: BTreeMap<String, String>,
}

impl PropertySource {
    /// 创建属性源
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// 添加属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 获取属性
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// 环境
///
/// 属性源按优先级排列，单值查找时第一个命中的属性源生效
pub trait Environment: Send + Sync {
    /// 全部属性源
    fn property_sources(&self) -> Vec<PropertySource>;

    /// 获取属性值
    fn get_property(&self, key: &str) -> Option<String> {
        self.property_sources()
            .iter()
            .find_map(|source| source.get(key).map(str::to_string))
    }

    /// 解析 `${key:default}` 占位符，无法解析的占位符原样保留
    fn resolve_placeholders(&self, expression: &str) -> String;

    /// 将字符串转换为指定类型的值
    fn convert(&self, raw: &str, value_type: ValueType) -> ConfigResult<Value> {
        convert_value(raw, value_type)
    }
}

/// 默认的标量转换规则
pub fn convert_value(raw: &str, value_type: ValueType) -> ConfigResult<Value> {
    let trimmed = raw.trim();
    let failed = || ConfigError::TypeConversionError {
        message: format!("无法将 '{raw}' 转换为 {value_type}"),
    };

    match value_type {
        ValueType::String => Ok(Value::from(raw)),
        ValueType::Integer => trimmed.parse::<i64>().map(Value::from).map_err(|_| failed()),
        ValueType::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(|number| serde_json::Number::from_f64(number).map(Value::Number))
            .ok_or_else(failed),
        ValueType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(failed()),
        },
    }
}
