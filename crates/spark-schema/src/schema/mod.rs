//! 编解码契约的双层抽象：泛型层 [`Schema`] 与对象层 [`DynSchema`]，以及内置实现。

pub mod array;
pub mod custom;
pub mod map;
pub mod number;
pub mod object;

use std::any::type_name;

use spark_buffer::CodecBuf;

use crate::error::{DecodeContext, Result};
use crate::explain::Explain;

pub use array::{
    ArraySchema, BYTES, ByteArray, CHARS, CharArray, DOUBLES, DoubleArray, Element, FLOATS,
    FloatArray, INTS, IntArray, LONGS, LongArray, SHORTS, ShortArray,
};
pub use custom::{CustomMessage, CustomSchema};
pub use map::{MapSchema, TlvLayout, TlvValue};
pub use number::{I32_SCHEMA, NumberSchema, U8_SCHEMA, U16_SCHEMA, U32_SCHEMA};
pub use object::{AnyValue, DynSchema, TypedSchemaAdapter};

/// `Schema` 统一描述“某一值类型与字节缓冲之间的双向转换”。
///
/// # 设计初衷（Why）
/// - 协议里的每个字段、每条消息、每个 TLV 值都以同一契约编解码，
///   上层（版本表、TLV 编解码器）无需逐类型分支即可完成分派；
/// - 关联类型 `Value` 保证泛型层静态类型安全，对象层通过 [`TypedSchemaAdapter`] 擦除类型。
///
/// # 行为逻辑（How）
/// 1. `read_from` 从读指针读到“可读字节耗尽”或类型自身的自然终点；
/// 2. `read_bounded` 以字节数 `length` 约束读取：`length < 0` 退化为无界读取，
///    `length == 0` 返回空值，`length > 0` 只消费该长度蕴含的内容；
/// 3. `write_to`/`write_bounded` 为对应的写入方向，`value` 为 `None` 时不写任何字节；
/// 4. `read_traced`/`write_traced` 额外接收调用方的 [`Explain`]，只影响诊断旁路。
///
/// # 契约说明（What）
/// - **线程安全**：实现须为无状态或构造后不可变，可在线程间共享；
/// - **前置条件**：读取不得越过缓冲当前的可读上界；
/// - **后置条件**：失败时返回携带出错类型名的 [`crate::SchemaError`]，不在本地恢复；
/// - **轨迹一致性**：`explain` 为 `None` 时追踪版本与非追踪版本完全等价；
///   为 `Some` 时也绝不改变读写的字节。
pub trait Schema: Send + Sync + 'static {
    /// 编解码的值类型。
    type Value: Send + Sync + 'static;

    /// 出错时用于标识类型的名称。
    fn name(&self) -> &'static str {
        type_name::<Self::Value>()
    }

    /// 无界解码。
    fn read_from(&self, input: &mut CodecBuf) -> Result<Option<Self::Value>>;

    /// 以字节长度约束的解码。
    ///
    /// 默认实现把可读上界临时收缩到 `length`，再执行无界解码。
    fn read_bounded(&self, input: &mut CodecBuf, length: i32) -> Result<Option<Self::Value>> {
        if length < 0 {
            return self.read_from(input);
        }
        let mut bounded = input.limit(length as usize).decoding(self.name())?;
        self.read_from(&mut bounded)
    }

    /// 写入完整值。
    fn write_to(&self, output: &mut CodecBuf, value: Option<&Self::Value>) -> Result<()>;

    /// 以字节长度约束的写入，默认写入完整值。
    fn write_bounded(
        &self,
        output: &mut CodecBuf,
        length: i32,
        value: Option<&Self::Value>,
    ) -> Result<()> {
        let _ = length;
        self.write_to(output, value)
    }

    /// 带轨迹的解码；默认不产生字段级记录。
    fn read_traced(
        &self,
        input: &mut CodecBuf,
        explain: Option<&mut Explain>,
    ) -> Result<Option<Self::Value>> {
        let _ = explain;
        self.read_from(input)
    }

    /// 带轨迹的编码；默认不产生字段级记录。
    fn write_traced(
        &self,
        output: &mut CodecBuf,
        value: Option<&Self::Value>,
        explain: Option<&mut Explain>,
    ) -> Result<()> {
        let _ = explain;
        self.write_to(output, value)
    }
}
