//! 单元测试使用的宿主环境

use crate::capability::Capabilities;
use crate::container::{DiContainerImpl, GenericApplicationContext};
use di_abstractions::{ApplicationContext, Environment, PropertySource, TypeCatalog};
use infrastructure_common::PLACEHOLDER_PATTERN;
use regex::{Captures, Regex};
use std::sync::Arc;

/// 只包含一个属性源的环境，占位符按 `${key:default}` 解析
#[derive(Debug, Default)]
pub struct MapEnvironment {
    source: PropertySource,
}

impl Environment for MapEnvironment {
    fn property_sources(&self) -> Vec<PropertySource> {
        vec![self.source.clone()]
    }

    fn resolve_placeholders(&self, expression: &str) -> String {
        let placeholder = Regex::new(PLACEHOLDER_PATTERN).unwrap();
        let mut current = expression.to_string();
        for _ in 0..8 {
            let next = placeholder
                .replace_all(&current, |captures: &Captures<'_>| {
                    self.get_property(captures[1].trim())
                        .or_else(|| captures.get(2).map(|default| default.as_str().to_string()))
                        .unwrap_or_else(|| captures[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

pub struct TestHost {
    pub catalog: Arc<TypeCatalog>,
    pub container: Arc<DiContainerImpl>,
    pub context: Arc<GenericApplicationContext>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::with_properties(&[])
    }

    pub fn with_properties(properties: &[(&str, &str)]) -> Self {
        let catalog = Arc::new(TypeCatalog::new());
        let container = Arc::new(DiContainerImpl::new(catalog.clone()));
        Self::assemble(catalog, container, properties)
    }

    pub fn with_parent(parent: Arc<DiContainerImpl>) -> Self {
        let catalog = Arc::new(TypeCatalog::new());
        let container = Arc::new(DiContainerImpl::new(catalog.clone()).with_parent(parent));
        Self::assemble(catalog, container, &[])
    }

    fn assemble(
        catalog: Arc<TypeCatalog>,
        container: Arc<DiContainerImpl>,
        properties: &[(&str, &str)],
    ) -> Self {
        let source = properties
            .iter()
            .fold(PropertySource::new("test"), |source, (key, value)| {
                source.with_property(*key, *value)
            });
        let environment = Arc::new(MapEnvironment { source });
        let context = GenericApplicationContext::new(container.clone(), environment);
        Self {
            catalog,
            container,
            context,
        }
    }

    pub fn dyn_context(&self) -> Arc<dyn ApplicationContext> {
        self.context.clone()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(&self.dyn_context())
    }
}

#[test]
fn test_map_environment_placeholders() {
    let host = TestHost::with_properties(&[("a", "1")]);
    let environment = host.context.environment();
    assert_eq!(environment.resolve_placeholders("x${a}y${b:2}${c}"), "x1y2${c}");
    assert_eq!(environment.resolve_placeholders("${a:${b:2}}"), "1");
}
