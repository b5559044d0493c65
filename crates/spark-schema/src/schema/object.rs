use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use spark_buffer::CodecBuf;

use crate::error::{Result, SchemaError};
use crate::explain::Explain;

use super::Schema;

/// 类型擦除后的值。
pub type AnyValue = Box<dyn Any + Send + Sync>;

/// `DynSchema` 为对象层提供编解码能力的对象安全接口。
///
/// # 设计初衷（Why）
/// - 版本表与 TLV 值映射需要在同一容器中存放多种值类型的编解码器；
/// - 与泛型 [`Schema`] 在功能上保持等价，差异仅在于类型擦除与运行时下转型检查。
///
/// # 契约说明（What）
/// - `read_dyn` 的结果需由调用方按约定类型 `downcast`；
/// - `write_dyn` 收到不兼容类型时返回 [`SchemaError::TypeMismatch`]；
/// - 两个入口都接收可选轨迹，语义同 [`Schema::read_traced`]/[`Schema::write_traced`]。
///
/// # 风险提示（Trade-offs）
/// - 相较泛型层，额外引入一次虚表跳转、一次堆分配与一次下转型检查；热路径请直接使用泛型 [`Schema`]。
pub trait DynSchema: Send + Sync + 'static {
    /// 该编解码器处理的值类型名称。
    fn value_type(&self) -> &'static str;

    /// 对象安全的解码入口。
    fn read_dyn(
        &self,
        input: &mut CodecBuf,
        explain: Option<&mut Explain>,
    ) -> Result<Option<AnyValue>>;

    /// 对象安全的编码入口。
    fn write_dyn(
        &self,
        output: &mut CodecBuf,
        value: &(dyn Any + Send + Sync),
        explain: Option<&mut Explain>,
    ) -> Result<()>;
}

impl dyn DynSchema {
    /// 解码并还原为具体类型。
    pub fn read_as<T: Any>(&self, input: &mut CodecBuf) -> Result<Option<T>> {
        match self.read_dyn(input, None)? {
            Some(value) => value
                .downcast::<T>()
                .map(|typed| Some(*typed))
                .map_err(|_| SchemaError::TypeMismatch {
                    expected: type_name::<T>(),
                }),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for dyn DynSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynSchema<{}>", self.value_type())
    }
}

/// `TypedSchemaAdapter` 将泛型 [`Schema`] 装箱为对象安全的 [`DynSchema`]。
///
/// # 行为逻辑（How）
/// - `write_dyn` 使用 `Any::downcast_ref` 还原为 `S::Value`；
/// - `read_dyn` 将泛型结果重新装箱，由调用方恢复为原始类型。
pub struct TypedSchemaAdapter<S>
where
    S: Schema,
{
    inner: S,
}

impl<S> TypedSchemaAdapter<S>
where
    S: Schema,
{
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// 直接生成可共享的对象层实例。
    pub fn shared(inner: S) -> Arc<dyn DynSchema> {
        Arc::new(Self::new(inner))
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> DynSchema for TypedSchemaAdapter<S>
where
    S: Schema,
{
    fn value_type(&self) -> &'static str {
        self.inner.name()
    }

    fn read_dyn(
        &self,
        input: &mut CodecBuf,
        explain: Option<&mut Explain>,
    ) -> Result<Option<AnyValue>> {
        let value = self.inner.read_traced(input, explain)?;
        Ok(value.map(|value| Box::new(value) as AnyValue))
    }

    fn write_dyn(
        &self,
        output: &mut CodecBuf,
        value: &(dyn Any + Send + Sync),
        explain: Option<&mut Explain>,
    ) -> Result<()> {
        match value.downcast_ref::<S::Value>() {
            Some(typed) => self.inner.write_traced(output, Some(typed), explain),
            None => Err(SchemaError::TypeMismatch {
                expected: type_name::<S::Value>(),
            }),
        }
    }
}
