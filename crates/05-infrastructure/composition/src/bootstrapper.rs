//! 组件替换初始化器

use crate::properties::OverrideProperties;
use di_abstractions::{ApplicationContext, ContainerHook, Environment};
use di_impl::{OverrideRegistrar, OverrideRegistry, SubstitutionMode};
use infrastructure_common::{OverrideResult, ValueType};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 启用引导阶段的属性
pub const BOOTSTRAP_ENABLED_KEY: &str = "bootstrap.enabled";
/// 启用旧式配置处理的属性
pub const LEGACY_PROCESSING_KEY: &str = "config.use-legacy-processing";
/// 类型目录中存在该类型时视为启用了引导阶段
pub const BOOTSTRAP_MARKER_TYPE: &str = "bootstrap.marker.Marker";

/// 组件替换初始化器
///
/// 在上下文刷新前调用一次 [`initialize`](Self::initialize)，读取配置、
/// 填充注册表并把替换钩子安装到组件工厂上。
///
/// 启用引导阶段时上下文会被初始化两次，第一次还读不到应用配置，
/// 所以只处理第二次；否则只处理第一次。
#[derive(Debug, Default)]
pub struct OverrideInitializer {
    invocations: AtomicUsize,
    mode: SubstitutionMode,
}

impl OverrideInitializer {
    /// 使用默认替换模式创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定类型引用替换的改写方式
    pub fn with_mode(mode: SubstitutionMode) -> Self {
        Self {
            invocations: AtomicUsize::new(0),
            mode,
        }
    }

    /// 已调用次数
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// 初始化上下文
    ///
    /// 跳过本次调用或配置关闭了替换时返回 `Ok(None)`，
    /// 否则返回已安装钩子所共享的注册表。
    pub fn initialize(
        &self,
        context: Arc<dyn ApplicationContext>,
    ) -> OverrideResult<Option<Arc<OverrideRegistry>>> {
        let environment = context.environment();
        let invocation = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        let expected = if bootstrap_enabled(&*context, &*environment) {
            2
        } else {
            1
        };
        if invocation != expected {
            debug!("跳过第 {} 次初始化", invocation);
            return Ok(None);
        }

        let properties = OverrideProperties::bind(&*environment)?;
        if !properties.enabled {
            info!("组件替换已关闭");
            return Ok(None);
        }

        let registrar = OverrideRegistrar::new(context.clone());
        registrar.register_scan_paths(&properties.packages)?;
        registrar.register_factory_types(&properties.factories)?;
        for (component_name, mapping) in &properties.mappings {
            registrar.register_mapping(component_name, mapping)?;
        }

        let summary = registrar.summarize(true)?;
        info!("组件替换配置:\n{}", summary);

        let hook: Arc<dyn ContainerHook> = registrar.hook(self.mode);
        let factory = context.component_factory();
        factory.add_hook(hook.clone());
        if let Some(parent) = factory.parent() {
            parent.add_hook(hook);
        }
        Ok(Some(registrar.registry()))
    }
}

/// 报告容器刷新后仍未生效的替换
pub fn report_unresolved(registry: &OverrideRegistry) -> BTreeSet<String> {
    let unresolved = registry.unresolved();
    if !unresolved.is_empty() {
        warn!("以下组件的替换没有生效: {:?}", unresolved);
    }
    unresolved
}

fn bootstrap_enabled(context: &dyn ApplicationContext, environment: &dyn Environment) -> bool {
    flag(environment, BOOTSTRAP_ENABLED_KEY)
        || context.type_catalog().contains(BOOTSTRAP_MARKER_TYPE)
        || flag(environment, LEGACY_PROCESSING_KEY)
}

fn flag(environment: &dyn Environment, key: &str) -> bool {
    environment
        .get_property(key)
        .and_then(|raw| environment.convert(&raw, ValueType::Boolean).ok())
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}
