//! 容器能力绑定

use di_abstractions::{ApplicationContext, Argument};
use infrastructure_common::{Capability, OverrideError, OverrideResult};
use std::sync::{Arc, Weak};

/// 容器能力
///
/// 以弱引用持有应用上下文，安装到容器中的钩子和延迟工厂不会反过来延长上下文的生命周期
#[derive(Clone)]
pub struct Capabilities {
    context: Weak<dyn ApplicationContext>,
}

impl Capabilities {
    /// 从应用上下文创建
    pub fn new(context: &Arc<dyn ApplicationContext>) -> Self {
        Self {
            context: Arc::downgrade(context),
        }
    }

    /// 获取应用上下文
    pub fn context(&self) -> OverrideResult<Arc<dyn ApplicationContext>> {
        self.context
            .upgrade()
            .ok_or_else(|| OverrideError::configuration("应用上下文已释放"))
    }

    /// 把能力绑定为实参
    pub fn argument(&self, capability: Capability) -> OverrideResult<Argument> {
        let context = self.context()?;
        Ok(bind(capability, context))
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("alive", &(self.context.strong_count() > 0))
            .finish()
    }
}

/// 把能力绑定为实参
pub(crate) fn bind(capability: Capability, context: Arc<dyn ApplicationContext>) -> Argument {
    match capability {
        Capability::ApplicationContext => Argument::Context(context),
        Capability::ComponentFactory => Argument::ComponentFactory(context.component_factory()),
        Capability::Environment => Argument::Environment(context.environment()),
    }
}
