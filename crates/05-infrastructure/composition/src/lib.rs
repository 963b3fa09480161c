//! # 基础设施组合层
//!
//! 把组件替换接入应用上下文：从分层属性源绑定 `override.*` 配置，
//! 填充替换注册表，并在容器刷新前安装替换钩子。
//!
//! ## 配置项
//!
//! - `override.enabled`: 是否启用，默认启用
//! - `override.packages`: 扫描包路径，逗号分隔，合并全部属性源
//! - `override.factories`: 替换工厂类型，逗号分隔，合并全部属性源
//! - `override.mappings.<组件名>`: `type[:priority]` 形式的单个替换
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{PropertySource, TypeCatalog};
//! use di_impl::{DiContainerImpl, GenericApplicationContext};
//! use infrastructure_composition::{LayeredEnvironment, OverrideInitializer};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let environment = LayeredEnvironment::new()
//!         .with_source(LayeredEnvironment::file_source("config/app.toml")?)
//!         .with_source(PropertySource::new("defaults").with_property("override.packages", "demo.ext"));
//!
//!     let catalog = Arc::new(TypeCatalog::new());
//!     let container = Arc::new(DiContainerImpl::new(catalog));
//!     let context = GenericApplicationContext::new(container, Arc::new(environment));
//!
//!     let initializer = OverrideInitializer::new();
//!     if let Some(registry) = initializer.initialize(context.clone())? {
//!         context.refresh()?;
//!         infrastructure_composition::report_unresolved(&registry);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod environment;
pub mod properties;

pub use bootstrapper::{
    report_unresolved, OverrideInitializer, BOOTSTRAP_ENABLED_KEY, BOOTSTRAP_MARKER_TYPE,
    LEGACY_PROCESSING_KEY,
};
pub use environment::LayeredEnvironment;
pub use properties::{
    union_list, OverrideProperties, FACTORIES_KEY, MAPPINGS_PREFIX, OVERRIDE_PREFIX, PACKAGES_KEY,
};
