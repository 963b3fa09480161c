//! 组件实例的类型擦除表示

use std::any::Any;
use std::sync::Arc;

/// 容器管理的组件实例
///
/// 具体类型在注册时擦除，使用方通过向下转型取回
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 将 trait 对象包装为组件实例
///
/// 组件以 `Arc<dyn Trait>` 暴露时，实例内部保存的是这个 `Arc` 本身，
/// 之后用 [`downcast_shared`] 以同样的 `T` 取回。
pub fn share<T>(service: Arc<T>) -> Instance
where
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(service)
}

/// 取回由 [`share`] 包装的共享对象
pub fn downcast_shared<T>(instance: &Instance) -> Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<T>>().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_share_and_downcast_trait_object() {
        let instance = share::<dyn Greeter>(Arc::new(English));
        let greeter = downcast_shared::<dyn Greeter>(&instance).expect("应该能取回 Greeter");
        assert_eq!(greeter.greet(), "hello");
        assert!(downcast_shared::<String>(&instance).is_none());
    }
}
