//! 替换候选发现接口
//!
//! 候选来源把发现的 `(名称, 优先级, 实现)` 三元组交给注册表，注册表负责冲突裁决

use crate::argument::Argument;
use crate::descriptor::MethodDescriptor;
use infrastructure_common::{Instance, OverrideResult};
use std::fmt;

/// 替换实现
#[derive(Clone)]
pub enum Implementation {
    /// 通过构造函数解析实例化的类型
    TypeReference { type_name: String },
    /// 绑定到工厂对象或静态方法的调用，实参已预先解析
    BoundFactory {
        declaring_type: String,
        target: Option<Instance>,
        method: MethodDescriptor,
        args: Vec<Argument>,
    },
}

impl Implementation {
    /// 创建类型引用实现
    pub fn type_reference(type_name: impl Into<String>) -> Self {
        Self::TypeReference {
            type_name: type_name.into(),
        }
    }

    /// 实现所在的类型名
    pub fn type_name(&self) -> &str {
        match self {
            Self::TypeReference { type_name } => type_name,
            Self::BoundFactory { declaring_type, .. } => declaring_type,
        }
    }

    /// 工厂方法名称，类型引用没有
    pub fn method_name(&self) -> Option<&str> {
        match self {
            Self::TypeReference { .. } => None,
            Self::BoundFactory { method, .. } => Some(&method.name),
        }
    }

    /// 汇总输出中使用的实现描述，例如 `demo.Config[-2,helloService]`
    pub fn describe(&self, priority: i32) -> String {
        match self.method_name() {
            Some(method) => format!("{}[{priority},{method}]", self.type_name()),
            None => format!("{}[{priority}]", self.type_name()),
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeReference { type_name } => f
                .debug_struct("TypeReference")
                .field("type_name", type_name)
                .finish(),
            Self::BoundFactory {
                declaring_type,
                target,
                method,
                args,
            } => f
                .debug_struct("BoundFactory")
                .field("declaring_type", declaring_type)
                .field("bound", &target.is_some())
                .field("method", &method.name)
                .field("args", args)
                .finish(),
        }
    }
}

/// 替换候选
#[derive(Debug, Clone)]
pub struct OverrideCandidate {
    /// 被替换组件的名称
    pub component_name: String,
    /// 优先级，越小越优先
    pub priority: i32,
    /// 替换实现
    pub implementation: Implementation,
    /// 候选来源，用于日志
    pub origin: String,
}

impl OverrideCandidate {
    /// 创建替换候选
    pub fn new(
        component_name: impl Into<String>,
        priority: i32,
        implementation: Implementation,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            priority,
            implementation,
            origin: origin.into(),
        }
    }
}

/// 替换候选来源
pub trait CandidateSource: Send + Sync {
    /// 来源名称
    fn name(&self) -> &str;

    /// 发现候选
    ///
    /// 任何一个候选出错都会让整个发现失败，包括优先级较低、最终不会生效的候选
    fn discover(&self) -> OverrideResult<Vec<OverrideCandidate>>;
}
