//! 参考宿主容器
//!
//! 一个只支持单例、按名称注册定义的最小容器，实现组件替换所需的宿主接口，
//! 供集成测试和演示程序使用

use crate::instantiation::InstanceFactoryBuilder;
use crate::scanner::CatalogMetadataReader;
use dashmap::DashMap;
use di_abstractions::{
    ApplicationContext, ComponentFactory, ContainerHook, Environment, InstanceSupplier,
    MetadataReader, PendingDefinition, ScopedProxy, TypeCatalog,
};
use infrastructure_common::{DependencyError, DependencyResult, Instance, OverrideError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// 组件定义
pub struct ComponentDefinition {
    name: String,
    target_type: RwLock<Option<String>>,
    instance_source: RwLock<Option<InstanceSupplier>>,
    supports_instance_source: bool,
}

impl ComponentDefinition {
    /// 创建以类型构造的定义
    pub fn new(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: RwLock::new(Some(target_type.into())),
            instance_source: RwLock::new(None),
            supports_instance_source: true,
        }
    }

    /// 设置实例来源
    pub fn with_supplier(self, supplier: InstanceSupplier) -> Self {
        *self.instance_source.write() = Some(supplier);
        self
    }

    /// 定义不允许改写实例来源
    pub fn sealed(mut self) -> Self {
        self.supports_instance_source = false;
        self
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PendingDefinition for ComponentDefinition {
    fn target_type(&self) -> Option<String> {
        self.target_type.read().clone()
    }

    fn set_target_type(&self, type_name: &str) {
        *self.target_type.write() = Some(type_name.to_string());
    }

    fn set_instance_source(&self, supplier: Option<InstanceSupplier>) {
        *self.instance_source.write() = supplier;
    }

    fn instance_source(&self) -> Option<InstanceSupplier> {
        self.instance_source.read().clone()
    }

    fn supports_instance_source(&self) -> bool {
        self.supports_instance_source
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("target_type", &*self.target_type.read())
            .field("has_instance_source", &self.instance_source.read().is_some())
            .finish()
    }
}

/// 参考容器实现
pub struct DiContainerImpl {
    catalog: Arc<TypeCatalog>,
    definitions: DashMap<String, Arc<ComponentDefinition>>,
    order: RwLock<Vec<String>>,
    singletons: DashMap<String, Instance>,
    hooks: RwLock<Vec<Arc<dyn ContainerHook>>>,
    parent: Option<Arc<dyn ComponentFactory>>,
    context: RwLock<Option<Weak<dyn ApplicationContext>>>,
}

impl DiContainerImpl {
    /// 创建新的容器
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            definitions: DashMap::new(),
            order: RwLock::new(Vec::new()),
            singletons: DashMap::new(),
            hooks: RwLock::new(Vec::new()),
            parent: None,
            context: RwLock::new(None),
        }
    }

    /// 设置父容器
    pub fn with_parent(mut self, parent: Arc<dyn ComponentFactory>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// 类型目录
    pub fn catalog(&self) -> Arc<TypeCatalog> {
        self.catalog.clone()
    }

    /// 注册组件定义
    pub fn register_definition(&self, definition: ComponentDefinition) -> Arc<ComponentDefinition> {
        let name = definition.name.clone();
        let definition = Arc::new(definition);
        if self
            .definitions
            .insert(name.clone(), definition.clone())
            .is_none()
        {
            self.order.write().push(name);
        }
        definition
    }

    /// 注册以类型构造的组件
    pub fn register_type(
        &self,
        name: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Arc<ComponentDefinition> {
        self.register_definition(ComponentDefinition::new(name, target_type))
    }

    /// 注册已创建好的单例
    pub fn register_instance(
        &self,
        name: impl Into<String>,
        target_type: impl Into<String>,
        instance: Instance,
    ) {
        let definition = self.register_type(name, target_type);
        self.singletons.insert(definition.name.clone(), instance);
    }

    /// 已注册的组件名称，按注册顺序排列
    pub fn component_names(&self) -> Vec<String> {
        self.order.read().clone()
    }

    /// 按名称获取组件，首次获取时实例化
    pub fn get(&self, name: &str) -> DependencyResult<Instance> {
        if let Some(instance) = self.singletons.get(name) {
            return Ok(instance.value().clone());
        }
        let definition = self.definition(name)?;

        let hooks: Vec<Arc<dyn ContainerHook>> = self.hooks.read().clone();
        for hook in hooks {
            hook.before_instantiation(self, name)
                .map_err(|source| creation_failed(name, source))?;
        }

        let instance = match definition.instance_source() {
            Some(supplier) => supplier(),
            None => self.construct(&definition),
        }
        .map_err(|source| creation_failed(name, source))?;

        debug!("组件已实例化: {}", name);
        Ok(self
            .singletons
            .entry(name.to_string())
            .or_insert(instance)
            .value()
            .clone())
    }

    /// 按名称获取以 trait 对象共享的组件
    pub fn get_shared<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.get(name)?;
        infrastructure_common::downcast_shared::<T>(&instance).ok_or_else(|| {
            DependencyError::ComponentCreationFailed {
                type_name: name.to_string(),
                source: format!("组件类型不是 {}", std::any::type_name::<T>()).into(),
            }
        })
    }

    /// 实例化全部已注册的组件
    pub fn refresh(&self) -> DependencyResult<()> {
        let names = self.component_names();
        info!("刷新容器，共 {} 个组件定义", names.len());
        for name in names {
            self.get(&name)?;
        }
        Ok(())
    }

    /// 关闭容器，释放单例和钩子
    pub fn close(&self) {
        self.singletons.clear();
        self.hooks.write().clear();
        info!("容器已关闭");
    }

    fn attach_context(&self, context: Weak<dyn ApplicationContext>) {
        *self.context.write() = Some(context);
    }

    fn definition(&self, name: &str) -> DependencyResult<Arc<ComponentDefinition>> {
        self.definitions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DependencyError::DefinitionNotFound {
                name: name.to_string(),
            })
    }

    fn construct(&self, definition: &ComponentDefinition) -> Result<Instance, OverrideError> {
        let target_type = definition.target_type().ok_or_else(|| {
            OverrideError::configuration(format!("组件 {} 没有目标类型", definition.name))
        })?;
        let context = self
            .context
            .read()
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| OverrideError::configuration("容器尚未关联应用上下文"))?;
        InstanceFactoryBuilder::new(&context).instantiate(&target_type)
    }
}

fn creation_failed(name: &str, source: OverrideError) -> DependencyError {
    DependencyError::ComponentCreationFailed {
        type_name: name.to_string(),
        source: Box::new(source),
    }
}

impl ComponentFactory for DiContainerImpl {
    fn get_component(&self, type_name: &str) -> DependencyResult<Instance> {
        let candidates: Vec<String> = self
            .component_names()
            .into_iter()
            .filter(|name| !ScopedProxy::is_scoped_target(name))
            .filter(|name| {
                self.definition(name)
                    .ok()
                    .and_then(|definition| definition.target_type())
                    .is_some_and(|target| self.catalog.is_assignable(&target, type_name))
            })
            .collect();

        match candidates.as_slice() {
            [name] => self.get(name),
            [] => match &self.parent {
                Some(parent) => parent.get_component(type_name),
                None => Err(DependencyError::ComponentNotRegistered {
                    type_name: type_name.to_string(),
                }),
            },
            _ => Err(DependencyError::AmbiguousComponent {
                type_name: type_name.to_string(),
                candidates,
            }),
        }
    }

    fn get_merged_definition(&self, name: &str) -> DependencyResult<Arc<dyn PendingDefinition>> {
        match self.definition(name) {
            Ok(definition) => Ok(definition as Arc<dyn PendingDefinition>),
            Err(error) => match &self.parent {
                Some(parent) => parent.get_merged_definition(name),
                None => Err(error),
            },
        }
    }

    fn parent(&self) -> Option<Arc<dyn ComponentFactory>> {
        self.parent.clone()
    }

    fn add_hook(&self, hook: Arc<dyn ContainerHook>) {
        self.hooks.write().push(hook);
    }
}

impl fmt::Debug for DiContainerImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiContainerImpl")
            .field("definitions", &self.component_names())
            .field("singletons", &self.singletons.len())
            .field("hooks", &self.hooks.read().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// 通用应用上下文
pub struct GenericApplicationContext {
    container: Arc<DiContainerImpl>,
    environment: Arc<dyn Environment>,
    metadata_reader: Arc<dyn MetadataReader>,
}

impl GenericApplicationContext {
    /// 创建应用上下文并关联到容器
    pub fn new(container: Arc<DiContainerImpl>, environment: Arc<dyn Environment>) -> Arc<Self> {
        let metadata_reader = Arc::new(CatalogMetadataReader::new(container.catalog()));
        let context = Arc::new(Self {
            container,
            environment,
            metadata_reader,
        });

        let shared: Arc<dyn ApplicationContext> = context.clone();
        context.container.attach_context(Arc::downgrade(&shared));
        context
    }

    /// 底层容器
    pub fn container(&self) -> &Arc<DiContainerImpl> {
        &self.container
    }

    /// 刷新容器
    pub fn refresh(&self) -> DependencyResult<()> {
        self.container.refresh()
    }
}

impl ApplicationContext for GenericApplicationContext {
    fn component_factory(&self) -> Arc<dyn ComponentFactory> {
        self.container.clone()
    }

    fn environment(&self) -> Arc<dyn Environment> {
        self.environment.clone()
    }

    fn metadata_reader(&self) -> Arc<dyn MetadataReader> {
        self.metadata_reader.clone()
    }

    fn type_catalog(&self) -> Arc<TypeCatalog> {
        self.container.catalog()
    }
}

impl fmt::Debug for GenericApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericApplicationContext")
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
