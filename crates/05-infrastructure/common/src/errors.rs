//! 错误类型定义

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置内容无法解析
    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    /// 缺少必需的配置键
    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    /// 配置值无法转换为目标类型
    #[error("配置类型转换失败: {message}")]
    TypeConversionError { message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }
}

/// 依赖注入错误类型
///
/// 由宿主容器的组件工厂返回
#[derive(Error, Debug)]
pub enum DependencyError {
    /// 类型没有对应的组件定义
    #[error("组件未注册: {type_name}")]
    ComponentNotRegistered { type_name: String },

    /// 按名称找不到组件定义
    #[error("组件定义不存在: {name}")]
    DefinitionNotFound { name: String },

    /// 组件实例化失败
    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed { type_name: String, source: BoxError },

    /// 同一类型有多个候选组件
    #[error("组件类型不唯一: {type_name}, 候选: {candidates:?}")]
    AmbiguousComponent {
        type_name: String,
        candidates: Vec<String>,
    },

    /// 参数缺失或类型不符
    #[error("参数不匹配: {owner} 第 {index} 个参数, 期望 {expected}")]
    ArgumentMismatch {
        owner: String,
        index: usize,
        expected: String,
    },

    /// 上下文能力不可用
    #[error("组件上下文不可用: {message}")]
    ContextUnavailable { message: String },
}

/// 组件替换错误类型
///
/// 除 `unresolved` 审计之外，所有替换失败都在启动期直接抛出，不做重试
#[derive(Error, Debug)]
pub enum OverrideError {
    /// 替换配置无效，或启用后没有任何替换
    #[error("替换配置错误: {message}")]
    Configuration { message: String },

    /// 构造函数或静态方法不唯一
    #[error("存在歧义: {message}")]
    Ambiguity { message: String },

    /// 找不到指定的静态实例化方法
    #[error("在 {type_name} 类型上找不到静态的 {method} 方法")]
    NoSuchMethod { type_name: String, method: String },

    /// 类型目录中没有该类型
    #[error("找不到类型: {type_name}")]
    NoSuchType { type_name: String },

    /// 参数无法由任何解析器提供
    #[error("不支持的参数类型: [{owner}] 的参数 {parameter} 类型为 {declared_type}")]
    UnsupportedParameter {
        owner: String,
        parameter: String,
        declared_type: String,
    },

    /// 替换实现实例化失败
    #[error("实例化组件失败: {type_name}, 原因: {source}")]
    Instantiation { type_name: String, source: BoxError },

    /// 配置绑定失败
    #[error("替换配置绑定失败: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}

impl OverrideError {
    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建歧义错误
    pub fn ambiguity(message: impl Into<String>) -> Self {
        Self::Ambiguity {
            message: message.into(),
        }
    }

    /// 创建实例化错误
    pub fn instantiation(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 创建不支持的参数错误
    pub fn unsupported_parameter(
        owner: impl Into<String>,
        parameter: impl Into<String>,
        declared_type: impl ToString,
    ) -> Self {
        Self::UnsupportedParameter {
            owner: owner.into(),
            parameter: parameter.into(),
            declared_type: declared_type.to_string(),
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
/// 依赖注入结果
pub type DependencyResult<T> = Result<T, DependencyError>;
/// 组件替换结果
pub type OverrideResult<T> = Result<T, OverrideError>;
