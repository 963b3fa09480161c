//! 类型目录

use crate::descriptor::TypeDescriptor;
use dashmap::DashMap;
use infrastructure_common::{OverrideError, OverrideResult, PathConventions};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// 类型目录
///
/// 限定类型名到类型描述的并发映射，承担"按名称加载类型"和"判断可赋值性"的职责
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: DashMap<String, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册类型描述，同名描述会被覆盖
    pub fn register(&self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        if self
            .types
            .insert(descriptor.name.clone(), descriptor.clone())
            .is_some()
        {
            warn!("类型描述被覆盖: {}", descriptor.name);
        } else {
            debug!("注册类型描述: {}", descriptor.name);
        }
        descriptor
    }

    /// 获取类型描述
    pub fn get(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(type_name).map(|entry| entry.value().clone())
    }

    /// 加载类型描述，不存在时返回 [`OverrideError::NoSuchType`]
    pub fn load(&self, type_name: &str) -> OverrideResult<Arc<TypeDescriptor>> {
        self.get(type_name).ok_or_else(|| OverrideError::NoSuchType {
            type_name: type_name.to_string(),
        })
    }

    /// 类型是否已注册
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// 判断 `type_name` 是否为 `target` 本身或其子类型
    pub fn is_assignable(&self, type_name: &str, target: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(type_name.to_string());

        while let Some(name) = current {
            if name == target {
                return true;
            }
            if !visited.insert(name.clone()) {
                return false;
            }
            current = self.get(&name).and_then(|descriptor| descriptor.super_type.clone());
        }
        false
    }

    /// 列出某个包路径下的全部类型名，按字典序排列
    pub fn type_names_under(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .iter()
            .filter(|entry| PathConventions::is_descendant(entry.key(), prefix))
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// 已注册的类型数量
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
