//! 元数据读取接口

use infrastructure_common::{ArtifactMetadata, OverrideResult};

/// 元数据读取器
///
/// 按包路径前缀枚举类型元数据。返回的序列是惰性且有限的，每次调用都从头开始
pub trait MetadataReader: Send + Sync {
    /// 枚举限定名以 `path_prefix` 开头的类型元数据
    fn artifacts(
        &self,
        path_prefix: &str,
    ) -> OverrideResult<Box<dyn Iterator<Item = ArtifactMetadata> + Send + '_>>;
}
