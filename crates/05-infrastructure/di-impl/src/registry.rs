//! 替换注册表

use di_abstractions::{Implementation, OverrideCandidate, ScopedProxy};
use infrastructure_common::{OverrideError, OverrideResult};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// 替换描述
///
/// 每个被替换的组件名称至多一个
#[derive(Debug)]
pub struct OverrideDescriptor {
    component_name: String,
    priority: i32,
    implementation: Implementation,
    resolved: AtomicBool,
}

impl OverrideDescriptor {
    fn new(component_name: String, priority: i32, implementation: Implementation) -> Self {
        Self {
            component_name,
            priority,
            implementation,
            resolved: AtomicBool::new(false),
        }
    }

    /// 被替换组件的名称
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// 优先级
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// 替换实现
    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// 是否已被钩子替换进组件定义
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    /// 标记为已替换，首次标记时返回 `true`
    pub fn mark_resolved(&self) -> bool {
        !self.resolved.swap(true, Ordering::AcqRel)
    }

    /// 汇总输出中的一行
    pub fn summary_line(&self) -> String {
        format!(
            "{}replaces{};",
            self.implementation.describe(self.priority),
            self.component_name
        )
    }
}

/// 替换注册表
///
/// 组件名称到获胜替换描述的映射。写入只发生在初始化阶段，
/// 之后钩子并发读取，唯一的后续修改是描述上的 `resolved` 标记。
#[derive(Debug, Default)]
pub struct OverrideRegistry {
    descriptors: RwLock<HashMap<String, Arc<OverrideDescriptor>>>,
}

impl OverrideRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交替换
    ///
    /// 只有优先级严格小于现有描述时才覆盖，优先级相同时保留先注册的描述。
    /// 返回是否被接受。
    pub fn submit(
        &self,
        component_name: impl Into<String>,
        priority: i32,
        implementation: Implementation,
    ) -> bool {
        let component_name = component_name.into();
        let mut descriptors = self.descriptors.write();

        if let Some(existing) = descriptors.get(&component_name) {
            if priority >= existing.priority {
                warn!(
                    "忽略替换 {}: 已有优先级更高或相同的 {}",
                    implementation.describe(priority),
                    existing.implementation.describe(existing.priority)
                );
                return false;
            }
        }

        debug!("登记替换: {} -> {}", component_name, implementation.describe(priority));
        descriptors.insert(
            component_name.clone(),
            Arc::new(OverrideDescriptor::new(component_name, priority, implementation)),
        );
        true
    }

    /// 提交候选
    pub fn submit_candidate(&self, candidate: OverrideCandidate) -> bool {
        debug!(
            "候选来源 {} 提交 {}",
            candidate.origin, candidate.component_name
        );
        self.submit(
            candidate.component_name,
            candidate.priority,
            candidate.implementation,
        )
    }

    /// 查找替换描述，作用域代理的目标名称按原始名称查找
    pub fn lookup(&self, component_name: &str) -> Option<Arc<OverrideDescriptor>> {
        self.descriptors
            .read()
            .get(ScopedProxy::original_name(component_name))
            .cloned()
    }

    /// 按组件名称排序输出全部替换描述，每行一个
    ///
    /// `require_non_empty` 为真而注册表为空时返回配置错误
    pub fn summarize(&self, require_non_empty: bool) -> OverrideResult<String> {
        let descriptors = self.descriptors.read();
        if require_non_empty && descriptors.is_empty() {
            return Err(OverrideError::configuration(
                "已启用组件替换，但没有找到替换配置，请检查配置或关闭组件替换",
            ));
        }

        let mut sorted: Vec<&Arc<OverrideDescriptor>> = descriptors.values().collect();
        sorted.sort_by(|left, right| left.component_name.cmp(&right.component_name));
        Ok(sorted
            .iter()
            .map(|descriptor| descriptor.summary_line())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// 尚未被替换进任何组件定义的名称
    ///
    /// 应在容器完成全部实例化之后调用
    pub fn unresolved(&self) -> BTreeSet<String> {
        self.descriptors
            .read()
            .values()
            .filter(|descriptor| !descriptor.is_resolved())
            .map(|descriptor| descriptor.component_name.clone())
            .collect()
    }

    /// 已注册替换的组件数量
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// 是否没有任何替换
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}
