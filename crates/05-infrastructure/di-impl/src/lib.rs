//! # 组件替换实现
//!
//! 在宿主容器实例化组件之前，按优先级选出替换声明并改写待实例化定义。
//!
//! ## 数据流
//!
//! 1. [`CandidateSource`](di_abstractions::CandidateSource) 的实现（[`ScanSource`]、[`FactorySource`]）发现替换候选
//! 2. 候选提交到 [`OverrideRegistry`]，按严格改进规则裁决
//! 3. 容器刷新时 [`OverrideHook`] 查询注册表，通过 [`InstanceFactoryBuilder`] 得到延迟工厂并改写定义
//!
//! [`OverrideRegistrar`] 是填充注册表的统一入口，[`DiContainerImpl`] 是供测试和演示使用的参考宿主。

pub mod capability;
pub mod container;
pub mod factory_source;
pub mod hook;
pub mod instantiation;
pub mod registrar;
pub mod registry;
pub mod scan_source;
pub mod scanner;
pub mod static_method;

#[cfg(test)]
mod test_support;

pub use capability::Capabilities;
pub use container::{ComponentDefinition, DiContainerImpl, GenericApplicationContext};
pub use factory_source::{FactoryObject, FactorySource};
pub use hook::{OverrideHook, SubstitutionMode};
pub use instantiation::{
    select_constructor, CapabilityParameterResolver, ComponentParameterResolver,
    InstanceFactoryBuilder, ParameterResolver, ValueParameterResolver,
};
pub use registrar::OverrideRegistrar;
pub use registry::{OverrideDescriptor, OverrideRegistry};
pub use scan_source::ScanSource;
pub use scanner::CatalogMetadataReader;
pub use static_method::{find_unique_static_method, resolve_static_arguments};
