//! # Infrastructure Common
//!
//! 这个 crate 提供了组件替换机制在各层之间共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`OverrideError`] - 组件替换的错误分类
//! - [`NamingConventions`] - 组件名称推断约定
//! - [`PathConventions`] - 扫描路径归并约定
//! - [`ArtifactMetadata`] - 扫描得到的类型元数据
//! - [`ParameterDescriptor`] - 构造函数和工厂方法的参数描述
//!
//! ## 设计原则
//!
//! - 用显式元数据代替运行时反射
//! - 启动期快速失败，错误信息指向具体的类型和参数
//! - 纯函数约定，便于在多个容器之间复用

pub mod component;
pub mod conventions;
pub mod errors;
pub mod metadata;

pub use component::*;
pub use conventions::*;
pub use errors::*;
pub use metadata::*;
