//! # 组件替换演示
//!
//! 演示三种替换方式：
//! - 扫描包路径下带替换标记的类型
//! - 替换工厂对象上带替换标记的方法
//! - `override.mappings.<组件名>` 配置
//!
//! 设置 `RUST_LOG=debug` 可以看到每个候选的裁决过程。

use anyhow::{ensure, Context as _};
use di_abstractions::{
    Argument, ConstructorDescriptor, Environment, FieldDescriptor, MethodDescriptor,
    PropertySource, TypeCatalog, TypeDescriptor,
};
use di_impl::{ComponentDefinition, DiContainerImpl, GenericApplicationContext};
use infrastructure_common::{
    share, Capability, DeclaredType, Instance, OverrideMarker, OverrideResult, ParameterDescriptor,
    ValueType,
};
use infrastructure_composition::{report_unresolved, LayeredEnvironment, OverrideInitializer};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::info;

const HELLO_SERVICE: &str = "demo.service.HelloService";
const TEST_SERVICE: &str = "demo.service.TestService";
const BEAN_SERVICE: &str = "demo.service.BeanService";
const AUDIT_SERVICE: &str = "demo.service.AuditService";

// ========== 演示组件 ==========

trait DemoService: Send + Sync {
    fn describe(&self) -> String;

    /// 是否为替换实现
    fn is_extension(&self) -> bool;
}

struct HelloService;

impl DemoService for HelloService {
    fn describe(&self) -> String {
        "hello world!".to_string()
    }

    fn is_extension(&self) -> bool {
        false
    }
}

struct HelloServiceExt;

impl DemoService for HelloServiceExt {
    fn describe(&self) -> String {
        "hello world ext!".to_string()
    }

    fn is_extension(&self) -> bool {
        true
    }
}

/// 由替换工厂创建的问候服务
struct ConfiguredHelloService {
    greeting: String,
}

impl DemoService for ConfiguredHelloService {
    fn describe(&self) -> String {
        format!("{} (来自替换工厂)", self.greeting)
    }

    fn is_extension(&self) -> bool {
        true
    }
}

struct TestService {
    hello: Arc<dyn DemoService>,
    suffix: Option<String>,
}

impl DemoService for TestService {
    fn describe(&self) -> String {
        let tag = if self.suffix.is_some() { "TestServiceExt" } else { "TestService" };
        format!(
            "{tag} -> {}{}",
            self.hello.describe(),
            self.suffix.as_deref().unwrap_or_default()
        )
    }

    fn is_extension(&self) -> bool {
        self.suffix.is_some()
    }
}

struct BeanService {
    region: Option<String>,
}

impl DemoService for BeanService {
    fn describe(&self) -> String {
        match &self.region {
            Some(region) => format!("BeanServiceExt @ {region}"),
            None => "BeanService".to_string(),
        }
    }

    fn is_extension(&self) -> bool {
        self.region.is_some()
    }
}

struct AuditService(&'static str);

impl DemoService for AuditService {
    fn describe(&self) -> String {
        self.0.to_string()
    }

    fn is_extension(&self) -> bool {
        self.0.ends_with("ext")
    }
}

/// 替换工厂，环境通过字段注入
#[derive(Default)]
struct ServiceConfig {
    environment: OnceLock<Arc<dyn Environment>>,
}

// ========== 类型目录 ==========

fn register_types(catalog: &TypeCatalog) {
    catalog.register(TypeDescriptor::new(HELLO_SERVICE).constructor(ConstructorDescriptor::new(
        vec![],
        |_| Ok(share::<dyn DemoService>(Arc::new(HelloService))),
    )));
    catalog.register(
        TypeDescriptor::new("demo.ext.HelloServiceExt")
            .extends(HELLO_SERVICE)
            .with_override(OverrideMarker::new().named("helloService").with_priority(0))
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                Ok(share::<dyn DemoService>(Arc::new(HelloServiceExt)))
            })),
    );

    let hello = || ParameterDescriptor::component("helloService", HELLO_SERVICE);
    catalog.register(TypeDescriptor::new(TEST_SERVICE).constructor(ConstructorDescriptor::new(
        vec![hello()],
        |arguments| {
            let hello = arguments.shared::<dyn DemoService>(0)?;
            Ok(share::<dyn DemoService>(Arc::new(TestService { hello, suffix: None })))
        },
    )));
    catalog.register(
        TypeDescriptor::new("demo.ext.TestServiceExt")
            .extends(TEST_SERVICE)
            .with_override(OverrideMarker::new())
            .constructor(ConstructorDescriptor::new(vec![hello()], |_| {
                Err("只有一个参数的构造函数不会被使用".into())
            }))
            .constructor(
                ConstructorDescriptor::new(
                    vec![
                        hello(),
                        ParameterDescriptor::value("suffix", ValueType::String, "${demo.suffix: :)}"),
                    ],
                    |arguments| {
                        let hello = arguments.shared::<dyn DemoService>(0)?;
                        let suffix = arguments.string(1)?;
                        Ok(share::<dyn DemoService>(Arc::new(TestService {
                            hello,
                            suffix: Some(suffix),
                        })))
                    },
                )
                .designated(),
            ),
    );

    catalog.register(TypeDescriptor::new(BEAN_SERVICE));
    catalog.register(
        TypeDescriptor::new("demo.ext.BeanServiceExt")
            .extends(BEAN_SERVICE)
            .with_override(OverrideMarker::new().instantiate_with("instantiate"))
            .method(
                MethodDescriptor::static_method(
                    "instantiate",
                    vec![ParameterDescriptor::capability("environment", Capability::Environment)],
                    |arguments| {
                        let region = arguments
                            .environment(0)?
                            .get_property("demo.region")
                            .unwrap_or_else(|| "local".to_string());
                        Ok(share::<dyn DemoService>(Arc::new(BeanService {
                            region: Some(region),
                        })))
                    },
                )
                .private(),
            ),
    );

    catalog.register(TypeDescriptor::new(AUDIT_SERVICE).constructor(ConstructorDescriptor::new(
        vec![],
        |_| Ok(share::<dyn DemoService>(Arc::new(AuditService("audit")))),
    )));
    catalog.register(
        TypeDescriptor::new("demo.mapped.AuditServiceExt")
            .extends(AUDIT_SERVICE)
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                Ok(share::<dyn DemoService>(Arc::new(AuditService("audit ext"))))
            })),
    );

    catalog.register(
        TypeDescriptor::new("demo.config.ServiceConfig")
            .constructor(ConstructorDescriptor::new(vec![], |_| {
                Ok(Arc::new(ServiceConfig::default()))
            }))
            .field(FieldDescriptor::new(
                "environment",
                DeclaredType::Capability(Capability::Environment),
                |instance, argument| {
                    let config = instance
                        .downcast_ref::<ServiceConfig>()
                        .ok_or("不是 ServiceConfig")?;
                    if let Argument::Environment(environment) = argument {
                        let _ = config.environment.set(environment);
                    }
                    Ok(())
                },
            ))
            .method(
                MethodDescriptor::instance("helloService", vec![], |target, _| {
                    let config = target
                        .and_then(|instance| instance.downcast_ref::<ServiceConfig>())
                        .ok_or("替换工厂对象缺失")?;
                    let greeting = config
                        .environment
                        .get()
                        .and_then(|environment| environment.get_property("demo.greeting"))
                        .unwrap_or_else(|| "hello".to_string());
                    Ok(share::<dyn DemoService>(Arc::new(ConfiguredHelloService { greeting })))
                })
                .with_override(OverrideMarker::new().with_priority(-2)),
            ),
    );
}

/// 相当于配置类里声明的组件
fn app_bean_service() -> OverrideResult<Instance> {
    Ok(share::<dyn DemoService>(Arc::new(BeanService { region: None })))
}

// ========== 环境 ==========

fn environment() -> anyhow::Result<LayeredEnvironment> {
    let environment = LayeredEnvironment::new().with_source(
        PropertySource::new("application")
            .with_property("override.packages", "demo.ext")
            .with_property("override.factories", "demo.config.ServiceConfig")
            .with_property("override.mappings.auditService", "demo.mapped.AuditServiceExt:5")
            .with_property("demo.greeting", "hello from config")
            .with_property("demo.region", "east"),
    );

    let file = Path::new("config/override.toml");
    if file.exists() {
        environment.add_first(LayeredEnvironment::file_source(file)?);
    }
    environment.add_first(LayeredEnvironment::environment_source("ADSP")?);
    Ok(environment)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("组件替换演示程序启动");

    let catalog = Arc::new(TypeCatalog::new());
    register_types(&catalog);

    let container = Arc::new(DiContainerImpl::new(catalog));
    container.register_type("helloService", HELLO_SERVICE);
    container.register_type("testService", TEST_SERVICE);
    container.register_definition(
        ComponentDefinition::new("beanService", BEAN_SERVICE).with_supplier(Arc::new(app_bean_service)),
    );
    container.register_type("auditService", AUDIT_SERVICE);

    let context = GenericApplicationContext::new(container.clone(), Arc::new(environment()?));
    let registry = OverrideInitializer::new()
        .initialize(context.clone())?
        .context("组件替换未启用")?;

    context.refresh()?;

    for name in container.component_names() {
        let service = container.get_shared::<dyn DemoService>(&name)?;
        info!("{} = {}", name, service.describe());
        ensure!(service.is_extension(), "{name} 替换失败");
    }

    let unresolved = report_unresolved(&registry);
    ensure!(unresolved.is_empty(), "存在未生效的替换: {unresolved:?}");

    container.close();
    info!("演示完成");
    Ok(())
}
