//! # Dependency Injection Abstractions
//!
//! 宿主容器与组件替换机制之间的接口层。
//!
//! ## 核心接口
//!
//! - [`ApplicationContext`] - 应用上下文，聚合容器提供的能力
//! - [`ComponentFactory`] - 组件工厂，按类型获取组件、读取待实例化定义
//! - [`PendingDefinition`] - 可改写的待实例化组件定义
//! - [`ContainerHook`] - 组件实例化前的拦截点
//! - [`Environment`] - 属性源和占位符解析
//! - [`MetadataReader`] - 按包路径枚举类型元数据
//! - [`CandidateSource`] - 替换候选的发现来源
//! - [`TypeCatalog`] - 以显式描述代替运行时反射的类型目录

pub mod argument;
pub mod catalog;
pub mod container;
pub mod descriptor;
pub mod discovery;
pub mod environment;
pub mod scanner;

pub use argument::*;
pub use catalog::*;
pub use container::*;
pub use descriptor::*;
pub use discovery::*;
pub use environment::*;
pub use scanner::*;
