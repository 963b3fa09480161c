//! 基于类型目录的元数据读取

use di_abstractions::{MetadataReader, TypeCatalog};
use infrastructure_common::{ArtifactMetadata, OverrideResult};
use std::sync::Arc;

/// 从类型目录枚举某个包路径下的类型元数据
#[derive(Debug, Clone)]
pub struct CatalogMetadataReader {
    catalog: Arc<TypeCatalog>,
}

impl CatalogMetadataReader {
    /// 基于类型目录创建
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }
}

impl MetadataReader for CatalogMetadataReader {
    fn artifacts(
        &self,
        path_prefix: &str,
    ) -> OverrideResult<Box<dyn Iterator<Item = ArtifactMetadata> + Send + '_>> {
        let names = self.catalog.type_names_under(path_prefix.trim());
        Ok(Box::new(names.into_iter().filter_map(move |name| {
            self.catalog.get(&name).map(|descriptor| descriptor.to_artifact())
        })))
    }
}
