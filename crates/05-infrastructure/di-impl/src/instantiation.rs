//! 延迟实例化

use crate::capability::{self, Capabilities};
use di_abstractions::{
    ApplicationContext, Argument, Arguments, ConstructorDescriptor, Implementation,
    InstanceSupplier, TypeDescriptor,
};
use infrastructure_common::{
    DeclaredType, Instance, OverrideError, OverrideResult, ParameterDescriptor,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 构造参数解析策略
pub trait ParameterResolver: Send + Sync {
    /// 是否能解析该参数
    fn supports(&self, parameter: &ParameterDescriptor) -> bool;

    /// 解析参数，`owner` 是正在构造的类型
    fn resolve(
        &self,
        owner: &str,
        parameter: &ParameterDescriptor,
        context: &Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Argument>;
}

/// 绑定容器能力
#[derive(Debug, Default)]
pub struct CapabilityParameterResolver;

impl ParameterResolver for CapabilityParameterResolver {
    fn supports(&self, parameter: &ParameterDescriptor) -> bool {
        matches!(parameter.declared_type, DeclaredType::Capability(_))
    }

    fn resolve(
        &self,
        owner: &str,
        parameter: &ParameterDescriptor,
        context: &Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Argument> {
        match parameter.declared_type {
            DeclaredType::Capability(capability) => Ok(capability::bind(capability, context.clone())),
            ref other => Err(OverrideError::unsupported_parameter(owner, &parameter.name, other)),
        }
    }
}

/// 按值表达式解析占位符并转换类型
#[derive(Debug, Default)]
pub struct ValueParameterResolver;

impl ParameterResolver for ValueParameterResolver {
    fn supports(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.value_expression.is_some()
    }

    fn resolve(
        &self,
        owner: &str,
        parameter: &ParameterDescriptor,
        context: &Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Argument> {
        let (DeclaredType::Value(value_type), Some(expression)) =
            (&parameter.declared_type, &parameter.value_expression)
        else {
            return Err(OverrideError::unsupported_parameter(
                owner,
                &parameter.name,
                &parameter.declared_type,
            ));
        };

        let environment = context.environment();
        let raw = environment.resolve_placeholders(expression);
        let value = environment.convert(&raw, *value_type)?;
        debug!("{} 的参数 {} 取值 {}", owner, parameter.name, value);
        Ok(Argument::Value(value))
    }
}

/// 按声明类型从组件工厂获取组件
#[derive(Debug, Default)]
pub struct ComponentParameterResolver;

impl ParameterResolver for ComponentParameterResolver {
    fn supports(&self, parameter: &ParameterDescriptor) -> bool {
        matches!(parameter.declared_type, DeclaredType::Component(_))
    }

    fn resolve(
        &self,
        owner: &str,
        parameter: &ParameterDescriptor,
        context: &Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Argument> {
        let DeclaredType::Component(type_name) = &parameter.declared_type else {
            return Err(OverrideError::unsupported_parameter(
                owner,
                &parameter.name,
                &parameter.declared_type,
            ));
        };

        context
            .component_factory()
            .get_component(type_name)
            .map(Argument::Component)
            .map_err(|source| OverrideError::instantiation(owner, source))
    }
}

/// 选择用于实例化的构造函数
///
/// 只考虑公开构造函数：只有一个时直接使用，多于一个时必须恰好有一个被标记为指定构造函数
pub fn select_constructor(descriptor: &TypeDescriptor) -> OverrideResult<&ConstructorDescriptor> {
    let public = descriptor.public_constructors();
    match public.as_slice() {
        [] => Err(OverrideError::instantiation(
            &descriptor.name,
            "找不到公开的构造函数",
        )),
        [only] => Ok(*only),
        candidates => {
            let designated: Vec<&ConstructorDescriptor> = candidates
                .iter()
                .copied()
                .filter(|constructor| constructor.designated)
                .collect();
            match designated.as_slice() {
                [chosen] => Ok(*chosen),
                _ => Err(OverrideError::ambiguity(format!(
                    "{} 有 {} 个公开构造函数，其中 {} 个被指定，请用 designated 标记唯一的构造函数",
                    descriptor.name,
                    candidates.len(),
                    designated.len()
                ))),
            }
        }
    }
}

/// 延迟工厂构建器
///
/// 把替换实现转换为零参数工厂。参数按解析策略表的顺序逐个尝试，
/// 默认顺序为容器能力、值表达式、组件。
#[derive(Clone)]
pub struct InstanceFactoryBuilder {
    capabilities: Capabilities,
    resolvers: Arc<Vec<Box<dyn ParameterResolver>>>,
}

impl InstanceFactoryBuilder {
    /// 使用默认解析策略创建
    pub fn new(context: &Arc<dyn ApplicationContext>) -> Self {
        Self::with_resolvers(context, Self::default_resolvers())
    }

    /// 使用自定义解析策略创建
    pub fn with_resolvers(
        context: &Arc<dyn ApplicationContext>,
        resolvers: Vec<Box<dyn ParameterResolver>>,
    ) -> Self {
        Self {
            capabilities: Capabilities::new(context),
            resolvers: Arc::new(resolvers),
        }
    }

    /// 默认解析策略表
    pub fn default_resolvers() -> Vec<Box<dyn ParameterResolver>> {
        vec![
            Box::new(CapabilityParameterResolver),
            Box::new(ValueParameterResolver),
            Box::new(ComponentParameterResolver),
        ]
    }

    /// 构建延迟工厂，调用时才真正实例化
    pub fn build(&self, implementation: &Implementation) -> InstanceSupplier {
        match implementation.clone() {
            Implementation::TypeReference { type_name } => {
                let builder = self.clone();
                Arc::new(move || builder.instantiate(&type_name))
            }
            Implementation::BoundFactory {
                declaring_type,
                target,
                method,
                args,
            } => Arc::new(move || {
                let owner = format!("{declaring_type}#{}", method.name);
                let arguments = Arguments::new(owner, args.clone());
                (method.invoke)(target.as_ref(), arguments)
                    .map_err(|source| OverrideError::instantiation(declaring_type.as_str(), source))
            }),
        }
    }

    /// 通过构造函数解析实例化类型
    pub fn instantiate(&self, type_name: &str) -> OverrideResult<Instance> {
        let context = self.capabilities.context()?;
        let descriptor = context.type_catalog().load(type_name)?;
        let constructor = select_constructor(&descriptor)?;

        let values = constructor
            .parameters
            .iter()
            .map(|parameter| self.resolve_parameter(type_name, parameter, &context))
            .collect::<OverrideResult<Vec<_>>>()?;

        debug!("通过构造函数实例化 {}, 参数 {} 个", type_name, values.len());
        (constructor.invoke)(Arguments::new(type_name, values))
            .map_err(|source| OverrideError::instantiation(type_name, source))
    }

    fn resolve_parameter(
        &self,
        owner: &str,
        parameter: &ParameterDescriptor,
        context: &Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Argument> {
        let resolver = self
            .resolvers
            .iter()
            .find(|resolver| resolver.supports(parameter))
            .ok_or_else(|| {
                OverrideError::unsupported_parameter(owner, &parameter.name, &parameter.declared_type)
            })?;
        resolver.resolve(owner, parameter, context)
    }
}

impl fmt::Debug for InstanceFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceFactoryBuilder")
            .field("capabilities", &self.capabilities)
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}
