//! 组件替换的集成测试

use di_abstractions::{
    ApplicationContext, ComponentFactory, ConstructorDescriptor, Environment, MethodDescriptor,
    PendingDefinition, PropertySource, TypeCatalog, TypeDescriptor,
};
use di_impl::{
    DiContainerImpl, GenericApplicationContext, OverrideRegistrar, SubstitutionMode,
};
use infrastructure_common::{
    share, Capability, DependencyError, OverrideError, OverrideMarker, ParameterDescriptor,
};
use std::sync::Arc;

/// 不带占位符解析的环境
struct PlainEnvironment;

impl Environment for PlainEnvironment {
    fn property_sources(&self) -> Vec<PropertySource> {
        Vec::new()
    }

    fn resolve_placeholders(&self, expression: &str) -> String {
        expression.to_string()
    }
}

trait HelloService: Send + Sync {
    fn hello(&self) -> String;
}

struct DefaultHello;

impl HelloService for DefaultHello {
    fn hello(&self) -> String {
        "hello".to_string()
    }
}

struct HelloServiceExt;

impl HelloService for HelloServiceExt {
    fn hello(&self) -> String {
        "hello ext".to_string()
    }
}

fn setup() -> (Arc<TypeCatalog>, Arc<GenericApplicationContext>) {
    let catalog = Arc::new(TypeCatalog::new());
    catalog.register(
        TypeDescriptor::new("demo.service.HelloService").constructor(ConstructorDescriptor::new(
            vec![],
            |_| Ok(share::<dyn HelloService>(Arc::new(DefaultHello))),
        )),
    );
    catalog.register(
        TypeDescriptor::new("demo.ext.HelloServiceExt")
            .extends("demo.service.HelloService")
            .with_override(OverrideMarker::new().with_priority(0))
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                Ok(share::<dyn HelloService>(Arc::new(HelloServiceExt)))
            })),
    );

    let container = Arc::new(DiContainerImpl::new(catalog.clone()));
    container.register_type("helloService", "demo.service.HelloService");
    let context = GenericApplicationContext::new(container, Arc::new(PlainEnvironment));
    (catalog, context)
}

fn install(context: &Arc<GenericApplicationContext>, mode: SubstitutionMode) -> OverrideRegistrar {
    let shared: Arc<dyn ApplicationContext> = context.clone();
    let registrar = OverrideRegistrar::new(shared.clone());
    shared.component_factory().add_hook(registrar.hook(mode));
    registrar
}

#[test]
fn test_type_reference_rewrites_pending_definition() {
    let (_catalog, context) = setup();
    let registrar = install(&context, SubstitutionMode::RewriteTargetType);
    registrar.register_single("helloService", "demo.ext.HelloServiceExt", 0).unwrap();
    assert!(registrar.unresolved().contains("helloService"));

    context.refresh().unwrap();

    let definition = context
        .container()
        .get_merged_definition("helloService")
        .unwrap();
    assert_eq!(
        definition.target_type().as_deref(),
        Some("demo.ext.HelloServiceExt")
    );
    let service = context
        .container()
        .get_shared::<dyn HelloService>("helloService")
        .unwrap();
    assert_eq!(service.hello(), "hello ext");
    assert!(registrar.unresolved().is_empty());
}

#[test]
fn test_scan_then_instance_source_mode() {
    let (_catalog, context) = setup();
    let registrar = install(&context, SubstitutionMode::InstanceSource);
    assert_eq!(registrar.register_scan_paths(["demo.ext", "demo.ext.more"]).unwrap(), 1);

    context.refresh().unwrap();
    let service = context
        .container()
        .get_shared::<dyn HelloService>("helloService")
        .unwrap();
    assert_eq!(service.hello(), "hello ext");
}

#[test]
fn test_without_override_uses_original() {
    let (_catalog, context) = setup();
    let registrar = install(&context, SubstitutionMode::default());
    registrar.register_single("otherService", "demo.ext.HelloServiceExt", 0).unwrap();

    context.refresh().unwrap();
    let service = context
        .container()
        .get_shared::<dyn HelloService>("helloService")
        .unwrap();
    assert_eq!(service.hello(), "hello");
    assert_eq!(
        registrar.unresolved().into_iter().collect::<Vec<_>>(),
        vec!["otherService".to_string()]
    );
}

#[test]
fn test_ambiguous_constructors_fail_refresh() {
    let (catalog, context) = setup();
    catalog.register(
        TypeDescriptor::new("demo.ext.Twin")
            .extends("demo.service.HelloService")
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                Ok(share::<dyn HelloService>(Arc::new(DefaultHello)))
            }))
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                Ok(share::<dyn HelloService>(Arc::new(HelloServiceExt)))
            })),
    );
    let registrar = install(&context, SubstitutionMode::InstanceSource);
    registrar.register_single("helloService", "demo.ext.Twin", 0).unwrap();

    match context.refresh() {
        Err(DependencyError::ComponentCreationFailed { source, .. }) => {
            assert!(matches!(
                source.downcast_ref::<OverrideError>(),
                Some(OverrideError::Ambiguity { .. })
            ));
        }
        other => panic!("期望组件创建失败, 实际: {other:?}"),
    }
}

#[test]
fn test_missing_static_method_fails_at_registration() {
    let (catalog, context) = setup();
    catalog.register(
        TypeDescriptor::new("demo.ext.BeanServiceExt")
            .extends("demo.service.BeanService")
            .with_override(OverrideMarker::new().instantiate_with("instantiate"))
            .method(MethodDescriptor::static_method(
                "create",
                vec![ParameterDescriptor::capability("env", Capability::Environment)],
                |_| Ok(share::<dyn HelloService>(Arc::new(DefaultHello))),
            )),
    );
    let registrar = install(&context, SubstitutionMode::default());

    let result = registrar.register_scan_paths(["demo.ext"]);
    assert!(matches!(result, Err(OverrideError::NoSuchMethod { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_hook_invocations() {
    let catalog = Arc::new(TypeCatalog::new());
    catalog.register(TypeDescriptor::new("demo.Slot").constructor(ConstructorDescriptor::new(
        vec![],
        |_| Ok(Arc::new("original")),
    )));
    catalog.register(
        TypeDescriptor::new("demo.SlotExt")
            .extends("demo.Slot")
            .constructor(ConstructorDescriptor::new(vec![], |_| Ok(Arc::new("ext")))),
    );

    let container = Arc::new(DiContainerImpl::new(catalog));
    for index in 0..32 {
        container.register_type(format!("slot{index}"), "demo.Slot");
    }
    let context = GenericApplicationContext::new(container.clone(), Arc::new(PlainEnvironment));
    let registrar = install(&context, SubstitutionMode::RewriteTargetType);
    for index in 0..32 {
        registrar.register_single(format!("slot{index}"), "demo.SlotExt", 0).unwrap();
    }

    let mut handles = Vec::new();
    for worker in 0..8 {
        let container = container.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for index in 0..32 {
                let name = format!("slot{}", (index + worker) % 32);
                let instance = container.get(&name).unwrap();
                assert_eq!(instance.downcast_ref::<&str>(), Some(&"ext"));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(registrar.unresolved().is_empty());
}
