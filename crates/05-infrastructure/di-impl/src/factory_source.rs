//! 从工厂对象发现替换候选

use crate::capability::Capabilities;
use di_abstractions::{
    CandidateSource, Implementation, OverrideCandidate, TypeCatalog, TypeDescriptor,
};
use infrastructure_common::{
    DeclaredType, Instance, NamingConventions, OverrideError, OverrideResult,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 已实例化的替换工厂对象
#[derive(Clone)]
pub struct FactoryObject {
    /// 工厂对象在类型目录中的类型名
    pub type_name: String,
    /// 工厂对象实例
    pub instance: Instance,
}

impl FactoryObject {
    /// 创建工厂对象
    pub fn new(type_name: impl Into<String>, instance: Instance) -> Self {
        Self {
            type_name: type_name.into(),
            instance,
        }
    }
}

impl fmt::Debug for FactoryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryObject")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// 工厂对象来源
///
/// 工厂对象上公开的、非静态的、带替换标记的方法各自成为一个候选，
/// 候选绑定到工厂对象本身，调用时不传实参。
pub struct FactorySource {
    objects: Vec<FactoryObject>,
    catalog: Arc<TypeCatalog>,
    capabilities: Capabilities,
}

impl FactorySource {
    /// 创建工厂来源
    pub fn new(objects: Vec<FactoryObject>, catalog: Arc<TypeCatalog>, capabilities: Capabilities) -> Self {
        Self {
            objects,
            catalog,
            capabilities,
        }
    }

    /// 向声明为容器能力的字段注入对应的对象
    fn inject_capabilities(
        &self,
        descriptor: &TypeDescriptor,
        object: &FactoryObject,
    ) -> OverrideResult<()> {
        for field in &descriptor.fields {
            let DeclaredType::Capability(capability) = field.declared_type else {
                continue;
            };
            let argument = self.capabilities.argument(capability)?;
            (field.inject)(&object.instance, argument)
                .map_err(|source| OverrideError::instantiation(object.type_name.as_str(), source))?;
            debug!("向 {} 的字段 {} 注入 {}", object.type_name, field.name, capability);
        }
        Ok(())
    }

    fn candidates_of(&self, object: &FactoryObject) -> OverrideResult<Vec<OverrideCandidate>> {
        let descriptor = self.catalog.load(&object.type_name)?;
        let marked: Vec<_> = descriptor
            .methods
            .iter()
            .filter(|method| method.is_public && !method.is_static)
            .filter_map(|method| method.override_marker.as_ref().map(|marker| (method, marker)))
            .collect();

        self.inject_capabilities(&descriptor, object)?;

        marked
            .into_iter()
            .map(|(method, marker)| {
                if let Some(parameter) = method.parameters.first() {
                    return Err(OverrideError::unsupported_parameter(
                        format!("{}#{}", object.type_name, method.name),
                        &parameter.name,
                        &parameter.declared_type,
                    ));
                }
                let component_name =
                    NamingConventions::deduce_component_name(&marker.name, &method.name);
                let implementation = Implementation::BoundFactory {
                    declaring_type: object.type_name.clone(),
                    target: Some(object.instance.clone()),
                    method: method.clone(),
                    args: Vec::new(),
                };
                Ok(OverrideCandidate::new(
                    component_name,
                    marker.priority,
                    implementation,
                    object.type_name.as_str(),
                ))
            })
            .collect()
    }
}

impl CandidateSource for FactorySource {
    fn name(&self) -> &str {
        "factory-objects"
    }

    fn discover(&self) -> OverrideResult<Vec<OverrideCandidate>> {
        let mut candidates = Vec::new();
        for object in &self.objects {
            candidates.extend(self.candidates_of(object)?);
        }
        Ok(candidates)
    }
}

impl fmt::Debug for FactorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorySource")
            .field("objects", &self.objects)
            .finish_non_exhaustive()
    }
}
