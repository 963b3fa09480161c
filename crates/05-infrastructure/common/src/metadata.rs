//! 元数据定义
//!
//! 提供扫描元数据、替换标记和参数描述等纯数据类型

use crate::errors::{OverrideError, OverrideResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// 替换标记的注解名称
pub const OVERRIDE_ANNOTATION: &str = "Override";

/// 替换标记属性：被替换组件的名称
pub const ATTR_VALUE: &str = "value";

/// 替换标记属性：优先级
pub const ATTR_PRIORITY: &str = "priority";

/// 替换标记属性：静态实例化方法名称
pub const ATTR_INSTANTIATE_METHOD: &str = "instantiate_method";

/// 默认优先级，也是最低优先级
///
/// 数值越小优先级越高。首次替换不要使用 `i32::MIN`，否则之后无法再次替换。
pub const DEFAULT_PRIORITY: i32 = i32::MAX;

/// 注解属性
pub type AnnotationAttributes = HashMap<String, Value>;

/// 扫描得到的类型元数据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactMetadata {
    /// 限定类型名
    pub type_name: String,
    /// 父类型限定名
    pub super_type_name: Option<String>,
    /// 注解名称到注解属性的映射
    pub annotations: HashMap<String, AnnotationAttributes>,
}

impl ArtifactMetadata {
    /// 创建新的类型元数据
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// 设置父类型
    pub fn with_super_type(mut self, super_type_name: impl Into<String>) -> Self {
        self.super_type_name = Some(super_type_name.into());
        self
    }

    /// 添加注解
    pub fn with_annotation(
        mut self,
        annotation: impl Into<String>,
        attributes: AnnotationAttributes,
    ) -> Self {
        self.annotations.insert(annotation.into(), attributes);
        self
    }

    /// 获取指定注解的属性
    pub fn annotation_attributes(&self, annotation: &str) -> Option<&AnnotationAttributes> {
        self.annotations.get(annotation)
    }
}

/// 替换标记
///
/// 标注在替换类型或工厂方法上
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideMarker {
    /// 被替换组件的名称，为空时按约定推断
    #[serde(rename = "value")]
    pub name: String,
    /// 优先级，数值越小越优先
    pub priority: i32,
    /// 静态实例化方法名称，为空时使用构造函数
    pub instantiate_method: String,
}

impl Default for OverrideMarker {
    fn default() -> Self {
        Self {
            name: String::new(),
            priority: DEFAULT_PRIORITY,
            instantiate_method: String::new(),
        }
    }
}

impl OverrideMarker {
    /// 创建新的替换标记
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置被替换组件名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 设置静态实例化方法
    pub fn instantiate_with(mut self, method: impl Into<String>) -> Self {
        self.instantiate_method = method.into();
        self
    }

    /// 从注解属性读取替换标记
    ///
    /// 缺失的属性取默认值；属性类型不符时报配置错误
    pub fn from_attributes(attributes: &AnnotationAttributes) -> OverrideResult<Self> {
        let mut marker = Self::default();

        if let Some(value) = attributes.get(ATTR_VALUE) {
            marker.name = string_attribute(ATTR_VALUE, value)?;
        }
        if let Some(value) = attributes.get(ATTR_PRIORITY) {
            marker.priority = value
                .as_i64()
                .and_then(|priority| i32::try_from(priority).ok())
                .ok_or_else(|| {
                    OverrideError::configuration(format!("替换标记的 priority 属性无效: {value}"))
                })?;
        }
        if let Some(value) = attributes.get(ATTR_INSTANTIATE_METHOD) {
            marker.instantiate_method = string_attribute(ATTR_INSTANTIATE_METHOD, value)?;
        }

        Ok(marker)
    }

    /// 转换为注解属性
    pub fn to_attributes(&self) -> AnnotationAttributes {
        let mut attributes = AnnotationAttributes::new();
        attributes.insert(ATTR_VALUE.to_string(), Value::from(self.name.clone()));
        attributes.insert(ATTR_PRIORITY.to_string(), Value::from(self.priority));
        attributes.insert(
            ATTR_INSTANTIATE_METHOD.to_string(),
            Value::from(self.instantiate_method.clone()),
        );
        attributes
    }
}

fn string_attribute(name: &str, value: &Value) -> OverrideResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| OverrideError::configuration(format!("替换标记的 {name} 属性不是字符串: {value}")))
}

/// 容器提供的能力
///
/// 构造参数或字段声明为这些类型时，直接绑定容器自身的对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// 应用上下文
    ApplicationContext,
    /// 组件工厂
    ComponentFactory,
    /// 环境
    Environment,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplicationContext => write!(f, "ApplicationContext"),
            Self::ComponentFactory => write!(f, "ComponentFactory"),
            Self::Environment => write!(f, "Environment"),
        }
    }
}

/// 标量值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// 字符串
    String,
    /// 64 位整数
    Integer,
    /// 64 位浮点数
    Float,
    /// 布尔值，接受 `true`/`false`、`yes`/`no`、`on`/`off`、`1`/`0`
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// 参数或字段的声明类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclaredType {
    /// 容器能力
    Capability(Capability),
    /// 标量值
    Value(ValueType),
    /// 按限定类型名查找的组件
    Component(String),
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capability(capability) => write!(f, "{capability}"),
            Self::Value(value_type) => write!(f, "{value_type}"),
            Self::Component(type_name) => write!(f, "{type_name}"),
        }
    }
}

/// 参数描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// 参数名称
    pub name: String,
    /// 声明类型
    pub declared_type: DeclaredType,
    /// 值表达式，例如 `${app.timeout:30}`
    pub value_expression: Option<String>,
}

impl ParameterDescriptor {
    /// 创建新的参数描述
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            value_expression: None,
        }
    }

    /// 声明为容器能力的参数
    pub fn capability(name: impl Into<String>, capability: Capability) -> Self {
        Self::new(name, DeclaredType::Capability(capability))
    }

    /// 声明为组件的参数
    pub fn component(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::Component(type_name.into()))
    }

    /// 声明为标量值的参数
    pub fn value(name: impl Into<String>, value_type: ValueType, expression: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::Value(value_type)).with_value(expression)
    }

    /// 设置值表达式
    pub fn with_value(mut self, expression: impl Into<String>) -> Self {
        self.value_expression = Some(expression.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_defaults_from_empty_attributes() {
        let marker = OverrideMarker::from_attributes(&AnnotationAttributes::new()).unwrap();
        assert_eq!(marker, OverrideMarker::default());
        assert_eq!(marker.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_marker_attributes_round_trip() {
        let marker = OverrideMarker::new()
            .named("helloService")
            .with_priority(-2)
            .instantiate_with("instantiate");
        let parsed = OverrideMarker::from_attributes(&marker.to_attributes()).unwrap();
        assert_eq!(parsed, marker);
    }

    #[test]
    fn test_marker_rejects_invalid_priority() {
        let mut attributes = AnnotationAttributes::new();
        attributes.insert(ATTR_PRIORITY.to_string(), json!("high"));
        let result = OverrideMarker::from_attributes(&attributes);
        assert!(matches!(result, Err(OverrideError::Configuration { .. })));

        attributes.insert(ATTR_PRIORITY.to_string(), json!(i64::from(i32::MAX) + 1));
        assert!(OverrideMarker::from_attributes(&attributes).is_err());
    }

    #[test]
    fn test_artifact_metadata_from_manifest() {
        let manifest = json!({
            "type_name": "demo.ext.HelloServiceExt",
            "super_type_name": "demo.service.HelloService",
            "annotations": { "Override": { "priority": 0 } }
        });
        let artifact: ArtifactMetadata = serde_json::from_value(manifest).unwrap();
        let attributes = artifact.annotation_attributes(OVERRIDE_ANNOTATION).unwrap();
        let marker = OverrideMarker::from_attributes(attributes).unwrap();
        assert_eq!(marker.priority, 0);
        assert!(marker.name.is_empty());

        let parameter: ParameterDescriptor = serde_json::from_value(json!({
            "name": "timeout",
            "declared_type": { "Value": "integer" },
            "value_expression": "${app.timeout:30}"
        }))
        .unwrap();
        assert_eq!(
            parameter,
            ParameterDescriptor::value("timeout", ValueType::Integer, "${app.timeout:30}")
        );
    }
}
