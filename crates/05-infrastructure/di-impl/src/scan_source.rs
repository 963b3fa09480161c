//! 扫描包路径发现替换候选

use crate::capability::Capabilities;
use crate::static_method::{find_unique_static_method, resolve_static_arguments};
use di_abstractions::{
    CandidateSource, Implementation, MetadataReader, OverrideCandidate, TypeCatalog,
};
use infrastructure_common::{
    AnnotationAttributes, ArtifactMetadata, NamingConventions, OverrideError, OverrideMarker,
    OverrideResult, PathConventions, OVERRIDE_ANNOTATION,
};
use std::sync::Arc;
use tracing::debug;

/// 扫描来源
///
/// 枚举包路径下带有替换标记的类型。替换类型必须声明父类型，
/// 默认组件名称由父类型的简单名称推断。
pub struct ScanSource {
    name: String,
    paths: Vec<String>,
    reader: Arc<dyn MetadataReader>,
    catalog: Arc<TypeCatalog>,
    capabilities: Capabilities,
}

impl ScanSource {
    /// 创建扫描来源，包路径会先归并
    pub fn new<I, S>(
        paths: I,
        reader: Arc<dyn MetadataReader>,
        catalog: Arc<TypeCatalog>,
        capabilities: Capabilities,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = PathConventions::reduce(paths);
        Self {
            name: format!("scan[{}]", paths.join(",")),
            paths,
            reader,
            catalog,
            capabilities,
        }
    }

    /// 归并后的包路径
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    fn candidate(
        &self,
        artifact: &ArtifactMetadata,
        attributes: &AnnotationAttributes,
    ) -> OverrideResult<OverrideCandidate> {
        let super_type = artifact
            .super_type_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                OverrideError::configuration(format!(
                    "替换类型 {} 必须声明父类型",
                    artifact.type_name
                ))
            })?;

        let marker = OverrideMarker::from_attributes(attributes)?;
        let component_name = NamingConventions::deduce_component_name(
            &marker.name,
            NamingConventions::simple_name(super_type),
        );

        let method_name = marker.instantiate_method.trim();
        let implementation = if method_name.is_empty() {
            Implementation::type_reference(artifact.type_name.as_str())
        } else {
            let descriptor = self.catalog.load(&artifact.type_name)?;
            let method = find_unique_static_method(&descriptor, method_name)?;
            let args = resolve_static_arguments(&artifact.type_name, method, &self.capabilities)?;
            Implementation::BoundFactory {
                declaring_type: artifact.type_name.clone(),
                target: None,
                method: method.clone(),
                args,
            }
        };

        debug!(
            "扫描到替换 {} -> {}",
            component_name,
            implementation.describe(marker.priority)
        );
        Ok(OverrideCandidate::new(
            component_name,
            marker.priority,
            implementation,
            self.name.as_str(),
        ))
    }
}

impl CandidateSource for ScanSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(&self) -> OverrideResult<Vec<OverrideCandidate>> {
        let mut candidates = Vec::new();
        for path in &self.paths {
            for artifact in self.reader.artifacts(path)? {
                let Some(attributes) = artifact.annotation_attributes(OVERRIDE_ANNOTATION) else {
                    continue;
                };
                candidates.push(self.candidate(&artifact, attributes)?);
            }
        }
        Ok(candidates)
    }
}

impl std::fmt::Debug for ScanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSource")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
