//! 类型描述
//!
//! 以显式注册的描述代替运行时反射：构造函数、方法和字段都携带可调用的闭包

use crate::argument::{Argument, Arguments};
use infrastructure_common::{
    AnnotationAttributes, ArtifactMetadata, BoxError, DeclaredType, Instance, NamingConventions,
    OverrideMarker, ParameterDescriptor, OVERRIDE_ANNOTATION,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 构造函数调用
pub type ConstructorFn = Arc<dyn Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync>;

/// 方法调用，静态方法的目标实例为 `None`
pub type MethodFn =
    Arc<dyn Fn(Option<&Instance>, Arguments) -> Result<Instance, BoxError> + Send + Sync>;

/// 字段注入
pub type FieldInjector = Arc<dyn Fn(&Instance, Argument) -> Result<(), BoxError> + Send + Sync>;

/// 构造函数描述
#[derive(Clone)]
pub struct ConstructorDescriptor {
    /// 参数列表
    pub parameters: Vec<ParameterDescriptor>,
    /// 是否标记为指定构造函数
    pub designated: bool,
    /// 是否公开
    pub is_public: bool,
    /// 调用入口
    pub invoke: ConstructorFn,
}

impl ConstructorDescriptor {
    /// 创建公开的构造函数描述
    pub fn new<F>(parameters: Vec<ParameterDescriptor>, invoke: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            parameters,
            designated: false,
            is_public: true,
            invoke: Arc::new(invoke),
        }
    }

    /// 标记为指定构造函数
    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    /// 标记为非公开
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("parameters", &self.parameters)
            .field("designated", &self.designated)
            .field("is_public", &self.is_public)
            .field("invoke", &"<function>")
            .finish()
    }
}

/// 方法描述
#[derive(Clone)]
pub struct MethodDescriptor {
    /// 方法名
    pub name: String,
    /// 是否为静态方法
    pub is_static: bool,
    /// 是否公开
    pub is_public: bool,
    /// 方法上的替换标记
    pub override_marker: Option<OverrideMarker>,
    /// 参数列表
    pub parameters: Vec<ParameterDescriptor>,
    /// 方法调用入口
    pub invoke: MethodFn,
}

impl MethodDescriptor {
    /// 创建公开的实例方法描述
    pub fn instance<F>(name: impl Into<String>, parameters: Vec<ParameterDescriptor>, invoke: F) -> Self
    where
        F: Fn(Option<&Instance>, Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_static: false,
            is_public: true,
            override_marker: None,
            parameters,
            invoke: Arc::new(invoke),
        }
    }

    /// 创建公开的静态方法描述
    pub fn static_method<F>(
        name: impl Into<String>,
        parameters: Vec<ParameterDescriptor>,
        invoke: F,
    ) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_static: true,
            is_public: true,
            override_marker: None,
            parameters,
            invoke: Arc::new(move |_: Option<&Instance>, arguments: Arguments| invoke(arguments)),
        }
    }

    /// 标记为非公开
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// 添加替换标记
    pub fn with_override(mut self, marker: OverrideMarker) -> Self {
        self.override_marker = Some(marker);
        self
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("is_static", &self.is_static)
            .field("is_public", &self.is_public)
            .field("override_marker", &self.override_marker)
            .field("parameters", &self.parameters)
            .field("invoke", &"<function>")
            .finish()
    }
}

/// 字段描述
#[derive(Clone)]
pub struct FieldDescriptor {
    /// 字段名
    pub name: String,
    /// 声明类型
    pub declared_type: DeclaredType,
    /// 字段注入入口
    pub inject: FieldInjector,
}

impl FieldDescriptor {
    /// 创建字段描述
    pub fn new<F>(name: impl Into<String>, declared_type: DeclaredType, inject: F) -> Self
    where
        F: Fn(&Instance, Argument) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            declared_type,
            inject: Arc::new(inject),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

/// 类型描述
///
/// ```ignore
/// let descriptor = TypeDescriptor::new("demo.ext.HelloServiceExt")
///     .extends("demo.HelloService")
///     .with_override(OverrideMarker::new().with_priority(0))
///     .constructor(ConstructorDescriptor::new(vec![], |_| Ok(Arc::new(HelloServiceExt))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    /// 限定类型名
    pub name: String,
    /// 父类型限定名
    pub super_type: Option<String>,
    /// 注解名称到属性的映射
    pub annotations: HashMap<String, AnnotationAttributes>,
    /// 全部构造函数
    pub constructors: Vec<ConstructorDescriptor>,
    /// 全部方法
    pub methods: Vec<MethodDescriptor>,
    /// 可注入的字段
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// 创建类型描述
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 设置父类型
    pub fn extends(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    /// 添加注解
    pub fn annotate(mut self, annotation: impl Into<String>, attributes: AnnotationAttributes) -> Self {
        self.annotations.insert(annotation.into(), attributes);
        self
    }

    /// 添加替换标记
    pub fn with_override(self, marker: OverrideMarker) -> Self {
        let attributes = marker.to_attributes();
        self.annotate(OVERRIDE_ANNOTATION, attributes)
    }

    /// 添加构造函数
    pub fn constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// 添加方法
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// 添加字段
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// 简单名称
    pub fn simple_name(&self) -> &str {
        NamingConventions::simple_name(&self.name)
    }

    /// 公开的构造函数
    pub fn public_constructors(&self) -> Vec<&ConstructorDescriptor> {
        self.constructors.iter().filter(|ctor| ctor.is_public).collect()
    }

    /// 转换为扫描元数据
    pub fn to_artifact(&self) -> ArtifactMetadata {
        ArtifactMetadata {
            type_name: self.name.clone(),
            super_type_name: self.super_type.clone(),
            annotations: self.annotations.clone(),
        }
    }
}
