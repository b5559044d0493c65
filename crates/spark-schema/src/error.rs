//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为 schema 引擎提供集中错误域：绑定失败、解码失败、编码失败三类语义各自独立，
//!   便于嵌入方按类别决定是否终止初始化或丢弃单条消息；
//! - 所有失败都携带出错类型的名称，调用方无需回溯调用栈即可定位具体 schema。
//!
//! ## 设计要求（What）
//! - 派生 `thiserror::Error`，兼容 `std::error::Error` 与 `source()` 链；
//! - 每个变体映射到 `spark.schema.*` 命名空间下的稳定错误码，沿用 `<域>.<语义>` 约定。

use std::error::Error as StdError;

use spark_buffer::BufferError;
use thiserror::Error;

/// 装箱的底层原因，满足跨线程传播要求。
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// 引擎统一结果类型。
pub type Result<T, E = SchemaError> = core::result::Result<T, E>;

/// 稳定错误码常量。
pub mod codes {
    /// 字节不足或格式错误导致解码失败。
    pub const DECODE_FAILED: &str = "spark.schema.decode_failed";
    /// 编码失败。
    pub const ENCODE_FAILED: &str = "spark.schema.encode_failed";
    /// 类型无法生成编解码器。
    pub const BINDING_FAILED: &str = "spark.schema.binding_failed";
    /// 对象层收到与 schema 不匹配的值类型。
    pub const TYPE_MISMATCH: &str = "spark.schema.type_mismatch";
    /// 长度字段宽度不在 1/2/4 之内。
    pub const UNSUPPORTED_LENGTH_WIDTH: &str = "spark.schema.unsupported_length_width";
    /// 回填长度超出长度字段可表示的范围。
    pub const LENGTH_OVERFLOW: &str = "spark.schema.length_overflow";
}

/// schema 引擎错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：区分“初始化期致命错误”（[`SchemaError::Binding`]）与“单条消息失败”
///   （[`SchemaError::Decode`]/[`SchemaError::Encode`]），引擎内部从不本地吞掉或重试；
/// - **契约 (What)**：`type_name` 均来自 `core::any::type_name` 或绑定时登记的名称；
///   `source` 保留底层原因（缓冲越界、自描述类型内部错误等）；
/// - **风险 (Trade-offs)**：原因被装箱，若嵌入方需要按具体原因分支，请使用
///   `std::error::Error::source` 配合 `downcast_ref`。
#[derive(Debug, Error)]
pub enum SchemaError {
    /// 解码失败。
    #[error("decode failed for `{type_name}`: {source}")]
    Decode {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// 编码失败。
    #[error("encode failed for `{type_name}`: {source}")]
    Encode {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// 声明的类型无法生成编解码器。
    #[error("cannot bind schema for `{type_name}`: {reason}")]
    Binding {
        type_name: &'static str,
        reason: String,
    },

    /// 对象层调用方传入了错误的值类型。
    #[error("expected value of type `{expected}`, got an incompatible type")]
    TypeMismatch { expected: &'static str },

    /// 长度字段宽度不受支持。
    #[error("unsupported length field width {0}, expected 1, 2 or 4")]
    UnsupportedLengthWidth(u8),

    /// 实际长度无法写入给定宽度的长度字段。
    #[error("length {length} does not fit a {width}-byte length field")]
    LengthOverflow { width: u8, length: usize },
}

impl SchemaError {
    /// 以类型名包装解码原因。
    pub fn decode<E>(type_name: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        SchemaError::Decode {
            type_name,
            source: source.into(),
        }
    }

    /// 以类型名包装编码原因。
    pub fn encode<E>(type_name: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        SchemaError::Encode {
            type_name,
            source: source.into(),
        }
    }

    /// 构造绑定错误。
    pub fn binding(type_name: &'static str, reason: impl Into<String>) -> Self {
        SchemaError::Binding {
            type_name,
            reason: reason.into(),
        }
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Decode { .. } => codes::DECODE_FAILED,
            SchemaError::Encode { .. } => codes::ENCODE_FAILED,
            SchemaError::Binding { .. } => codes::BINDING_FAILED,
            SchemaError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            SchemaError::UnsupportedLengthWidth(_) => codes::UNSUPPORTED_LENGTH_WIDTH,
            SchemaError::LengthOverflow { .. } => codes::LENGTH_OVERFLOW,
        }
    }

    /// 若错误由缓冲访问失败引起，返回该原因。
    pub fn buffer_cause(&self) -> Option<&BufferError> {
        match self {
            SchemaError::Decode { source, .. } | SchemaError::Encode { source, .. } => {
                source.downcast_ref::<BufferError>()
            }
            _ => None,
        }
    }
}

/// 将缓冲错误标记为某类型的解码失败。
pub(crate) trait DecodeContext<T> {
    fn decoding(self, type_name: &'static str) -> Result<T>;
}

impl<T> DecodeContext<T> for core::result::Result<T, BufferError> {
    #[inline]
    fn decoding(self, type_name: &'static str) -> Result<T> {
        self.map_err(|err| SchemaError::decode(type_name, err))
    }
}
