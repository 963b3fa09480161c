//! 宿主容器接口
//!
//! 组件替换机制只通过这里的窄接口与宿主容器交互

use crate::catalog::TypeCatalog;
use crate::environment::Environment;
use crate::scanner::MetadataReader;
use infrastructure_common::{DependencyResult, Instance, OverrideResult};
use std::fmt;
use std::sync::Arc;

/// 作用域代理目标名称的前缀
pub const SCOPED_TARGET_PREFIX: &str = "scopedTarget.";

/// 容器内部作用域代理工厂的类型名
///
/// 目标类型为它的定义属于代理机制本身，不参与替换
pub const SCOPED_PROXY_FACTORY_TYPE: &str = "di.scope.ScopedProxyFactory";

/// 作用域代理命名规则
#[derive(Debug)]
pub struct ScopedProxy;

impl ScopedProxy {
    /// 是否为作用域代理生成的目标名称
    pub fn is_scoped_target(name: &str) -> bool {
        name.starts_with(SCOPED_TARGET_PREFIX)
    }

    /// 还原原始组件名称，非代理名称原样返回
    pub fn original_name(name: &str) -> &str {
        name.strip_prefix(SCOPED_TARGET_PREFIX).unwrap_or(name)
    }

    /// 生成代理目标名称
    pub fn target_name(original: &str) -> String {
        format!("{SCOPED_TARGET_PREFIX}{original}")
    }
}

/// 延迟实例化的零参数工厂
pub type InstanceSupplier = Arc<dyn Fn() -> OverrideResult<Instance> + Send + Sync>;

/// 待实例化的组件定义
///
/// 宿主在实例化之前把合并后的定义交给钩子改写
pub trait PendingDefinition: Send + Sync {
    /// 目标类型名
    fn target_type(&self) -> Option<String>;

    /// 改写目标类型名
    fn set_target_type(&self, type_name: &str);

    /// 设置或清除实例来源
    fn set_instance_source(&self, supplier: Option<InstanceSupplier>);

    /// 当前的实例来源
    fn instance_source(&self) -> Option<InstanceSupplier>;

    /// 是否允许改写实例来源
    fn supports_instance_source(&self) -> bool {
        true
    }
}

/// 组件工厂
pub trait ComponentFactory: Send + Sync {
    /// 按声明类型获取唯一的组件
    fn get_component(&self, type_name: &str) -> DependencyResult<Instance>;

    /// 获取合并后的待实例化定义
    fn get_merged_definition(&self, name: &str) -> DependencyResult<Arc<dyn PendingDefinition>>;

    /// 父组件工厂
    fn parent(&self) -> Option<Arc<dyn ComponentFactory>>;

    /// 注册实例化前钩子
    fn add_hook(&self, hook: Arc<dyn ContainerHook>);
}

/// 实例化前钩子
///
/// 每个组件在实例化之前调用一次，可能在多个线程上并发调用
pub trait ContainerHook: Send + Sync {
    /// 组件 `component_name` 实例化之前调用，返回错误会中止容器刷新
    fn before_instantiation(
        &self,
        factory: &dyn ComponentFactory,
        component_name: &str,
    ) -> OverrideResult<()>;
}

/// 应用上下文
pub trait ApplicationContext: Send + Sync {
    /// 宿主容器的组件工厂
    fn component_factory(&self) -> Arc<dyn ComponentFactory>;

    /// 属性环境
    fn environment(&self) -> Arc<dyn Environment>;

    /// 按包路径枚举类型元数据
    fn metadata_reader(&self) -> Arc<dyn MetadataReader>;

    /// 显式注册的类型目录
    fn type_catalog(&self) -> Arc<TypeCatalog>;
}

impl fmt::Debug for dyn ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApplicationContext")
    }
}
