//! 静态实例化方法解析

use crate::capability::Capabilities;
use di_abstractions::{Argument, MethodDescriptor, TypeDescriptor};
use infrastructure_common::{DeclaredType, OverrideError, OverrideResult};

/// 在类型上查找唯一的同名静态方法
///
/// 不支持按名称重载：找不到返回 [`OverrideError::NoSuchMethod`]，多于一个返回歧义错误。
/// 非公开的静态方法同样可用。
pub fn find_unique_static_method<'a>(
    descriptor: &'a TypeDescriptor,
    method_name: &str,
) -> OverrideResult<&'a MethodDescriptor> {
    let mut matches = descriptor
        .methods
        .iter()
        .filter(|method| method.is_static && method.name == method_name);

    let found = matches.next().ok_or_else(|| OverrideError::NoSuchMethod {
        type_name: descriptor.name.clone(),
        method: method_name.to_string(),
    })?;
    if matches.next().is_some() {
        return Err(OverrideError::ambiguity(format!(
            "在 {} 类型上找到多于一个名为 {} 的静态方法",
            descriptor.name, method_name
        )));
    }
    Ok(found)
}

/// 按位置解析静态方法的实参
///
/// 参数只能声明为容器能力，其他类型都不支持
pub fn resolve_static_arguments(
    type_name: &str,
    method: &MethodDescriptor,
    capabilities: &Capabilities,
) -> OverrideResult<Vec<Argument>> {
    method
        .parameters
        .iter()
        .map(|parameter| match &parameter.declared_type {
            DeclaredType::Capability(capability) => capabilities.argument(*capability),
            other => Err(OverrideError::unsupported_parameter(
                format!("{type_name}#{}", method.name),
                &parameter.name,
                other,
            )),
        })
        .collect()
}
