//! 替换注册入口

use crate::capability::Capabilities;
use crate::factory_source::{FactoryObject, FactorySource};
use crate::hook::{OverrideHook, SubstitutionMode};
use crate::instantiation::InstanceFactoryBuilder;
use crate::registry::OverrideRegistry;
use crate::scan_source::ScanSource;
use di_abstractions::{ApplicationContext, Arguments, CandidateSource, Implementation};
use infrastructure_common::{OverrideError, OverrideResult, DEFAULT_PRIORITY};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 替换注册器
///
/// 把各种来源的替换声明提交到同一个注册表，并为容器创建替换钩子
pub struct OverrideRegistrar {
    registry: Arc<OverrideRegistry>,
    context: Arc<dyn ApplicationContext>,
}

impl OverrideRegistrar {
    /// 使用新的注册表创建
    pub fn new(context: Arc<dyn ApplicationContext>) -> Self {
        Self::with_registry(context, Arc::new(OverrideRegistry::new()))
    }

    /// 使用已有的注册表创建
    pub fn with_registry(context: Arc<dyn ApplicationContext>, registry: Arc<OverrideRegistry>) -> Self {
        Self { registry, context }
    }

    /// 共享的注册表
    pub fn registry(&self) -> Arc<OverrideRegistry> {
        self.registry.clone()
    }

    /// 提交来源发现的全部候选，返回被接受的数量
    pub fn register_from(&self, source: &dyn CandidateSource) -> OverrideResult<usize> {
        let candidates = source.discover()?;
        let discovered = candidates.len();
        let mut accepted = 0;
        for candidate in candidates {
            if self.registry.submit_candidate(candidate) {
                accepted += 1;
            }
        }
        debug!(
            "来源 {} 发现 {} 个替换候选，接受 {} 个",
            source.name(),
            discovered,
            accepted
        );
        Ok(accepted)
    }

    /// 扫描包路径
    pub fn register_scan_paths<I, S>(&self, paths: I) -> OverrideResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let source = ScanSource::new(
            paths,
            self.context.metadata_reader(),
            self.context.type_catalog(),
            self.capabilities(),
        );
        if source.paths().is_empty() {
            return Ok(0);
        }
        self.register_from(&source)
    }

    /// 通过无参构造函数实例化工厂类型，再注册工厂对象
    pub fn register_factory_types<I, S>(&self, type_names: I) -> OverrideResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let catalog = self.context.type_catalog();
        let mut objects = Vec::new();
        for type_name in type_names {
            let type_name = type_name.as_ref().trim();
            if type_name.is_empty() {
                continue;
            }
            let descriptor = catalog.load(type_name)?;
            let constructor = descriptor
                .public_constructors()
                .into_iter()
                .find(|constructor| constructor.parameters.is_empty())
                .ok_or_else(|| OverrideError::instantiation(type_name, "找不到公开的无参构造函数"))?;
            let instance = (constructor.invoke)(Arguments::empty(type_name))
                .map_err(|source| OverrideError::instantiation(type_name, source))?;
            objects.push(FactoryObject::new(type_name, instance));
        }
        self.register_factory_objects(objects)
    }

    /// 注册已实例化的工厂对象
    pub fn register_factory_objects(&self, objects: Vec<FactoryObject>) -> OverrideResult<usize> {
        if objects.is_empty() {
            return Ok(0);
        }
        let source = FactorySource::new(objects, self.context.type_catalog(), self.capabilities());
        self.register_from(&source)
    }

    /// 注册单个类型引用替换
    ///
    /// 类型必须已在类型目录中注册，否则返回 [`OverrideError::NoSuchType`]
    pub fn register_single(
        &self,
        component_name: impl Into<String>,
        type_name: &str,
        priority: i32,
    ) -> OverrideResult<bool> {
        if !self.context.type_catalog().contains(type_name) {
            return Err(OverrideError::NoSuchType {
                type_name: type_name.to_string(),
            });
        }
        Ok(self
            .registry
            .submit(component_name, priority, Implementation::type_reference(type_name)))
    }

    /// 注册 `type[:priority]` 形式的映射，优先级缺省为最低
    pub fn register_mapping(&self, component_name: &str, mapping: &str) -> OverrideResult<bool> {
        let (type_name, priority) = parse_mapping(component_name, mapping)?;
        self.register_single(component_name, type_name, priority)
    }

    /// 汇总当前的替换
    pub fn summarize(&self, require_non_empty: bool) -> OverrideResult<String> {
        self.registry.summarize(require_non_empty)
    }

    /// 尚未生效的替换
    pub fn unresolved(&self) -> BTreeSet<String> {
        self.registry.unresolved()
    }

    /// 创建与注册表关联的替换钩子
    pub fn hook(&self, mode: SubstitutionMode) -> Arc<OverrideHook> {
        info!("创建替换钩子, 模式: {:?}", mode);
        Arc::new(OverrideHook::new(
            self.registry.clone(),
            InstanceFactoryBuilder::new(&self.context),
            mode,
        ))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(&self.context)
    }
}

impl fmt::Debug for OverrideRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideRegistrar")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn parse_mapping<'a>(component_name: &str, mapping: &'a str) -> OverrideResult<(&'a str, i32)> {
    let (type_name, priority) = match mapping.split_once(':') {
        Some((type_name, priority)) => {
            let priority = priority.trim().parse::<i32>().map_err(|_| {
                OverrideError::configuration(format!(
                    "组件 {component_name} 的替换映射优先级无效: {mapping}"
                ))
            })?;
            (type_name.trim(), priority)
        }
        None => (mapping.trim(), DEFAULT_PRIORITY),
    };

    if type_name.is_empty() {
        return Err(OverrideError::configuration(format!(
            "组件 {component_name} 的替换映射缺少类型名"
        )));
    }
    Ok((type_name, priority))
}
