//! 组件替换的端到端测试

use di_abstractions::{
    ApplicationContext, Argument, ComponentFactory, ConstructorDescriptor, FieldDescriptor,
    MethodDescriptor, PendingDefinition, PropertySource, ScopedProxy, TypeCatalog, TypeDescriptor,
    SCOPED_PROXY_FACTORY_TYPE,
};
use di_impl::{
    ComponentDefinition, DiContainerImpl, FactoryObject, GenericApplicationContext,
    InstanceFactoryBuilder, OverrideRegistrar, OverrideRegistry, ParameterResolver,
    SubstitutionMode,
};
use infrastructure_common::{
    share, Capability, DependencyError, Instance, OverrideError, OverrideMarker, OverrideResult,
    ParameterDescriptor, ValueType,
};
use infrastructure_composition::{LayeredEnvironment, OverrideInitializer};
use serde_json::json;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 连接池组件
#[derive(Debug)]
struct Pool {
    kind: &'static str,
    size: i64,
    region: String,
}

fn pool(kind: &'static str, size: i64, region: String) -> Result<Instance, infrastructure_common::BoxError> {
    Ok(Arc::new(Pool { kind, size, region }))
}

fn pool_catalog() -> Arc<TypeCatalog> {
    let catalog = Arc::new(TypeCatalog::new());
    catalog.register(
        TypeDescriptor::new("app.data.Pool")
            .constructor(ConstructorDescriptor::new(vec![], |_| pool("basic", 1, String::new()))),
    );
    catalog.register(
        TypeDescriptor::new("app.ext.TunedPool")
            .extends("app.data.Pool")
            .with_override(OverrideMarker::new().with_priority(10))
            .constructor(ConstructorDescriptor::new(
                vec![
                    ParameterDescriptor::value("size", ValueType::Integer, "${pool.size:4}"),
                    ParameterDescriptor::value("region", ValueType::String, "${app.region}"),
                ],
                |arguments| pool("tuned", arguments.integer(0)?, arguments.string(1)?),
            )),
    );
    catalog.register(
        TypeDescriptor::new("app.ext.MappedPool")
            .extends("app.data.Pool")
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                pool("mapped", 2, String::new())
            })),
    );
    catalog
}

fn pool_of(container: &DiContainerImpl, name: &str) -> Arc<Pool> {
    container.get(name).unwrap().downcast::<Pool>().unwrap()
}

#[test]
fn test_file_configuration_with_instance_source_mode() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "[override]")?;
    writeln!(file, "packages = [\"app.ext\"]")?;
    writeln!(file, "[pool]")?;
    writeln!(file, "size = 16")?;

    let environment = LayeredEnvironment::new()
        .with_source(LayeredEnvironment::file_source(file.path())?)
        .with_source(PropertySource::new("defaults").with_property("app.region", "north"));

    let container = Arc::new(DiContainerImpl::new(pool_catalog()));
    container.register_type("pool", "app.data.Pool");
    let context = GenericApplicationContext::new(container.clone(), Arc::new(environment));

    let registry = OverrideInitializer::with_mode(SubstitutionMode::InstanceSource)
        .initialize(context.clone())?
        .ok_or_else(|| anyhow::anyhow!("初始化被跳过"))?;
    context.refresh()?;

    let pool = pool_of(&container, "pool");
    assert_eq!((pool.kind, pool.size, pool.region.as_str()), ("tuned", 16, "north"));
    let definition = container.get_merged_definition("pool")?;
    assert_eq!(definition.target_type().as_deref(), Some("app.data.Pool"));
    assert!(definition.instance_source().is_some());
    assert!(registry.unresolved().is_empty());
    Ok(())
}

#[test]
fn test_mapping_beats_scanned_override() -> anyhow::Result<()> {
    let environment = LayeredEnvironment::new().with_source(
        PropertySource::new("application")
            .with_property("override.packages", "app.ext")
            .with_property("override.mappings.pool", "app.ext.MappedPool:3")
            .with_property("app.region", "south"),
    );
    let container = Arc::new(DiContainerImpl::new(pool_catalog()));
    container.register_type("pool", "app.data.Pool");
    let context = GenericApplicationContext::new(container.clone(), Arc::new(environment));

    let registry = OverrideInitializer::new()
        .initialize(context.clone())?
        .ok_or_else(|| anyhow::anyhow!("初始化被跳过"))?;
    assert_eq!(
        registry.summarize(true)?,
        "app.ext.MappedPool[3]replacespool;"
    );

    context.refresh()?;
    assert_eq!(pool_of(&container, "pool").kind, "mapped");
    Ok(())
}

#[test]
fn test_unresolvable_value_fails_construction() {
    let environment = LayeredEnvironment::new().with_source(
        PropertySource::new("application")
            .with_property("override.packages", "app.ext")
            .with_property("pool.size", "large")
            .with_property("app.region", "west"),
    );
    let container = Arc::new(DiContainerImpl::new(pool_catalog()));
    container.register_type("pool", "app.data.Pool");
    let context = GenericApplicationContext::new(container, Arc::new(environment));
    OverrideInitializer::new()
        .initialize(context.clone())
        .unwrap()
        .unwrap();

    match context.refresh() {
        Err(DependencyError::ComponentCreationFailed { type_name, source }) => {
            assert_eq!(type_name, "pool");
            assert!(matches!(
                source.downcast_ref::<OverrideError>(),
                Some(OverrideError::Config { .. })
            ));
        }
        other => panic!("期望组件创建失败, 实际: {other:?}"),
    }
}

fn proxy_instance() -> OverrideResult<Instance> {
    Ok(Arc::new("proxy"))
}

#[test]
fn test_scoped_proxy_target_is_replaced() {
    let catalog = Arc::new(TypeCatalog::new());
    catalog.register(
        TypeDescriptor::new("app.web.Cart")
            .constructor(ConstructorDescriptor::new(vec![], |_| Ok(Arc::new("cart")))),
    );
    catalog.register(
        TypeDescriptor::new("app.ext.CartExt")
            .extends("app.web.Cart")
            .constructor(ConstructorDescriptor::new(vec![], |_| Ok(Arc::new("cart ext")))),
    );
    let container = Arc::new(DiContainerImpl::new(catalog));
    container.register_definition(
        ComponentDefinition::new("cart", SCOPED_PROXY_FACTORY_TYPE)
            .with_supplier(Arc::new(proxy_instance)),
    );
    container.register_type(ScopedProxy::target_name("cart"), "app.web.Cart");
    let context = GenericApplicationContext::new(container.clone(), Arc::new(LayeredEnvironment::new()));

    let shared: Arc<dyn ApplicationContext> = context.clone();
    let registrar = OverrideRegistrar::new(shared.clone());
    registrar.register_single("cart", "app.ext.CartExt", 0).unwrap();
    shared.component_factory().add_hook(registrar.hook(SubstitutionMode::default()));

    context.refresh().unwrap();
    let proxy = container.get("cart").unwrap();
    assert_eq!(proxy.downcast_ref::<&str>(), Some(&"proxy"));
    let target = container.get("scopedTarget.cart").unwrap();
    assert_eq!(target.downcast_ref::<&str>(), Some(&"cart ext"));
    assert!(registrar.unresolved().is_empty());
}

/// 时钟参数总是解析为固定的时间戳
struct FixedClockResolver;

impl ParameterResolver for FixedClockResolver {
    fn supports(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.name == "clock"
    }

    fn resolve(
        &self,
        _owner: &str,
        _parameter: &ParameterDescriptor,
        _context: &Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Argument> {
        Ok(Argument::Value(json!(1_700_000_000)))
    }
}

#[test]
fn test_custom_resolver_takes_precedence() {
    let catalog = Arc::new(TypeCatalog::new());
    catalog.register(TypeDescriptor::new("app.time.Stamp").constructor(
        ConstructorDescriptor::new(
            vec![ParameterDescriptor::component("clock", "app.time.Clock")],
            |arguments| Ok(Arc::new(arguments.integer(0)?)),
        ),
    ));
    let container = Arc::new(DiContainerImpl::new(catalog));
    let context = GenericApplicationContext::new(container, Arc::new(LayeredEnvironment::new()));
    let shared: Arc<dyn ApplicationContext> = context.clone();

    let mut resolvers: Vec<Box<dyn ParameterResolver>> = vec![Box::new(FixedClockResolver)];
    resolvers.extend(InstanceFactoryBuilder::default_resolvers());
    let stamp = InstanceFactoryBuilder::with_resolvers(&shared, resolvers)
        .instantiate("app.time.Stamp")
        .unwrap();
    assert_eq!(stamp.downcast_ref::<i64>(), Some(&1_700_000_000));

    let result = InstanceFactoryBuilder::new(&shared).instantiate("app.time.Stamp");
    assert!(matches!(result, Err(OverrideError::Instantiation { .. })));
}

#[derive(Default)]
struct AuditConfig {
    factory_injected: AtomicBool,
}

#[test]
fn test_registrars_share_one_registry() {
    let catalog = Arc::new(TypeCatalog::new());
    catalog.register(
        TypeDescriptor::new("app.config.AuditConfig")
            .field(FieldDescriptor::new(
                "factory",
                infrastructure_common::DeclaredType::Capability(Capability::ComponentFactory),
                |instance, argument| {
                    let config = instance
                        .downcast_ref::<AuditConfig>()
                        .ok_or("不是 AuditConfig")?;
                    config
                        .factory_injected
                        .store(matches!(argument, Argument::ComponentFactory(_)), Ordering::SeqCst);
                    Ok(())
                },
            ))
            .method(
                MethodDescriptor::instance("auditLog", vec![], |_, _| Ok(share::<str>(Arc::from("factory"))))
                    .with_override(OverrideMarker::new().with_priority(1)),
            ),
    );
    catalog.register(TypeDescriptor::new("app.log.Worse"));
    catalog.register(TypeDescriptor::new("app.log.Better"));
    let container = Arc::new(DiContainerImpl::new(catalog));
    let context = GenericApplicationContext::new(container, Arc::new(LayeredEnvironment::new()));
    let shared: Arc<dyn ApplicationContext> = context.clone();

    let registry = Arc::new(OverrideRegistry::new());
    let first = OverrideRegistrar::with_registry(shared.clone(), registry.clone());
    let second = OverrideRegistrar::with_registry(shared, registry.clone());

    let config = Arc::new(AuditConfig::default());
    let object = FactoryObject::new("app.config.AuditConfig", config.clone());
    assert_eq!(first.register_factory_objects(vec![object]).unwrap(), 1);
    assert!(config.factory_injected.load(Ordering::SeqCst));

    assert!(!second.register_single("auditLog", "app.log.Worse", 1).unwrap());
    assert!(second.register_single("auditLog", "app.log.Better", 0).unwrap());
    assert_eq!(registry.len(), 1);
    assert_eq!(
        first.summarize(true).unwrap(),
        "app.log.Better[0]replacesauditLog;"
    );
}
