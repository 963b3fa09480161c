//! 构造函数和工厂方法的实参

use crate::container::{ApplicationContext, ComponentFactory};
use crate::environment::Environment;
use infrastructure_common::{downcast_shared, DependencyError, DependencyResult, Instance};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 单个实参
#[derive(Clone)]
pub enum Argument {
    /// 应用上下文
    Context(Arc<dyn ApplicationContext>),
    /// 组件工厂
    ComponentFactory(Arc<dyn ComponentFactory>),
    /// 环境
    Environment(Arc<dyn Environment>),
    /// 已转换的标量值
    Value(Value),
    /// 组件实例
    Component(Instance),
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(_) => f.write_str("Context(<context>)"),
            Self::ComponentFactory(_) => f.write_str("ComponentFactory(<factory>)"),
            Self::Environment(_) => f.write_str("Environment(<environment>)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Component(_) => f.write_str("Component(<instance>)"),
        }
    }
}

/// 按位置排列的实参列表
///
/// 提供带类型检查的访问方法，类型不符时返回 [`DependencyError::ArgumentMismatch`]
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    owner: String,
    values: Vec<Argument>,
}

impl Arguments {
    /// 创建实参列表
    pub fn new(owner: impl Into<String>, values: Vec<Argument>) -> Self {
        Self {
            owner: owner.into(),
            values,
        }
    }

    /// 创建空实参列表
    pub fn empty(owner: impl Into<String>) -> Self {
        Self::new(owner, Vec::new())
    }

    /// 实参所属的构造函数或方法
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// 实参数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有实参
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 获取原始实参
    pub fn get(&self, index: usize) -> DependencyResult<&Argument> {
        self.values
            .get(index)
            .ok_or_else(|| self.mismatch(index, "存在的参数"))
    }

    /// 获取应用上下文
    pub fn context(&self, index: usize) -> DependencyResult<Arc<dyn ApplicationContext>> {
        match self.get(index)? {
            Argument::Context(context) => Ok(context.clone()),
            _ => Err(self.mismatch(index, "ApplicationContext")),
        }
    }

    /// 获取组件工厂
    pub fn component_factory(&self, index: usize) -> DependencyResult<Arc<dyn ComponentFactory>> {
        match self.get(index)? {
            Argument::ComponentFactory(factory) => Ok(factory.clone()),
            _ => Err(self.mismatch(index, "ComponentFactory")),
        }
    }

    /// 获取环境
    pub fn environment(&self, index: usize) -> DependencyResult<Arc<dyn Environment>> {
        match self.get(index)? {
            Argument::Environment(environment) => Ok(environment.clone()),
            _ => Err(self.mismatch(index, "Environment")),
        }
    }

    /// 获取字符串值
    pub fn string(&self, index: usize) -> DependencyResult<String> {
        self.value(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(index, "string"))
    }

    /// 获取整数值
    pub fn integer(&self, index: usize) -> DependencyResult<i64> {
        self.value(index)?
            .as_i64()
            .ok_or_else(|| self.mismatch(index, "integer"))
    }

    /// 获取浮点值
    pub fn float(&self, index: usize) -> DependencyResult<f64> {
        self.value(index)?
            .as_f64()
            .ok_or_else(|| self.mismatch(index, "float"))
    }

    /// 获取布尔值
    pub fn boolean(&self, index: usize) -> DependencyResult<bool> {
        self.value(index)?
            .as_bool()
            .ok_or_else(|| self.mismatch(index, "boolean"))
    }

    /// 获取具体类型的组件
    pub fn component<T>(&self, index: usize) -> DependencyResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.instance(index)?
            .downcast::<T>()
            .map_err(|_| self.mismatch(index, std::any::type_name::<T>()))
    }

    /// 获取以 trait 对象共享的组件
    pub fn shared<T>(&self, index: usize) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.instance(index)?;
        downcast_shared::<T>(&instance).ok_or_else(|| self.mismatch(index, std::any::type_name::<T>()))
    }

    /// 获取未转型的组件实例
    pub fn instance(&self, index: usize) -> DependencyResult<Instance> {
        match self.get(index)? {
            Argument::Component(instance) => Ok(instance.clone()),
            _ => Err(self.mismatch(index, "component")),
        }
    }

    fn value(&self, index: usize) -> DependencyResult<&Value> {
        match self.get(index)? {
            Argument::Value(value) => Ok(value),
            _ => Err(self.mismatch(index, "value")),
        }
    }

    fn mismatch(&self, index: usize, expected: &str) -> DependencyError {
        DependencyError::ArgumentMismatch {
            owner: self.owner.clone(),
            index,
            expected: expected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_accessors() {
        let arguments = Arguments::new(
            "demo.Widget",
            vec![
                Argument::Value(json!("ext")),
                Argument::Value(json!(30)),
                Argument::Component(Arc::new(7_u32)),
            ],
        );

        assert_eq!(arguments.len(), 3);
        assert_eq!(arguments.string(0).unwrap(), "ext");
        assert_eq!(arguments.integer(1).unwrap(), 30);
        assert_eq!(*arguments.component::<u32>(2).unwrap(), 7);
    }

    #[test]
    fn test_mismatch_reports_owner_and_index() {
        let arguments = Arguments::new("demo.Widget", vec![Argument::Value(json!(true))]);

        match arguments.string(0) {
            Err(DependencyError::ArgumentMismatch { owner, index, .. }) => {
                assert_eq!(owner, "demo.Widget");
                assert_eq!(index, 0);
            }
            other => panic!("期望参数不匹配错误, 实际: {other:?}"),
        }
        assert!(arguments.boolean(0).unwrap());
        assert!(arguments.get(1).is_err());
    }
}
