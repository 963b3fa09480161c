//! 实例化前替换钩子

use crate::instantiation::InstanceFactoryBuilder;
use crate::registry::OverrideRegistry;
use di_abstractions::{
    ComponentFactory, ContainerHook, Implementation, SCOPED_PROXY_FACTORY_TYPE,
};
use infrastructure_common::{OverrideError, OverrideResult};
use std::sync::Arc;
use tracing::{debug, info};

/// 类型引用替换的改写方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubstitutionMode {
    /// 改写目标类型名并清除实例来源，由宿主按新类型构造
    #[default]
    RewriteTargetType,
    /// 安装按构造函数解析的延迟工厂
    InstanceSource,
}

/// 替换钩子
///
/// 在组件实例化之前查询注册表，命中时改写待实例化定义
#[derive(Debug)]
pub struct OverrideHook {
    registry: Arc<OverrideRegistry>,
    builder: InstanceFactoryBuilder,
    mode: SubstitutionMode,
}

impl OverrideHook {
    /// 创建替换钩子
    pub fn new(
        registry: Arc<OverrideRegistry>,
        builder: InstanceFactoryBuilder,
        mode: SubstitutionMode,
    ) -> Self {
        Self {
            registry,
            builder,
            mode,
        }
    }

    /// 钩子读取的注册表
    pub fn registry(&self) -> &Arc<OverrideRegistry> {
        &self.registry
    }
}

impl ContainerHook for OverrideHook {
    fn before_instantiation(
        &self,
        factory: &dyn ComponentFactory,
        component_name: &str,
    ) -> OverrideResult<()> {
        let Some(descriptor) = self.registry.lookup(component_name) else {
            return Ok(());
        };

        let definition = factory.get_merged_definition(component_name).map_err(|error| {
            OverrideError::configuration(format!("无法读取组件 {component_name} 的定义: {error}"))
        })?;
        if definition.target_type().as_deref() == Some(SCOPED_PROXY_FACTORY_TYPE) {
            debug!("跳过作用域代理工厂 {}", component_name);
            return Ok(());
        }
        if !definition.supports_instance_source() {
            return Err(OverrideError::configuration(format!(
                "组件 {component_name} 的定义不支持改写实例来源"
            )));
        }

        match (descriptor.implementation(), self.mode) {
            (Implementation::TypeReference { type_name }, SubstitutionMode::RewriteTargetType) => {
                definition.set_target_type(type_name);
                definition.set_instance_source(None);
            }
            (implementation, _) => {
                definition.set_instance_source(Some(self.builder.build(implementation)));
            }
        }

        if descriptor.mark_resolved() {
            info!("{} 替换 {}", descriptor.summary_line(), component_name);
        }
        Ok(())
    }
}
