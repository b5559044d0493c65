//! 通用 TLV（键 / 长度 / 值）编解码器。
//!
//! # 模块定位（Why）
//! - 协议中的附加信息、扩展属性常以“键 + 长度前缀 + 值”的形式嵌入消息，值的格式由键决定；
//! - 新版本终端可能携带旧版本不认识的键：解码侧必须原样保留这些字节，保证前向兼容。
//!
//! # 结构说明（How）
//! - [`TlvLayout`]：具体协议提供键编解码器、长度字段宽度与“键 → 值编解码器”绑定；
//! - [`MapSchema`]：在构造期把布局冻结为只读映射，之后无状态、可跨线程共享；
//! - [`TlvValue`]：解码结果，要么是已登记编解码器产出的类型化值，要么是未知键的原始字节。

use std::any::{Any, type_name};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use spark_buffer::CodecBuf;

use crate::config::MapConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{DecodeContext, Result, SchemaError};
use crate::explain::Explain;
use crate::length::LengthWidth;
use crate::pair::KeyValuePair;
use crate::prepare::{SchemaMap, SchemaMapBuilder};

use super::Schema;
use super::object::{AnyValue, DynSchema};

/// TLV 布局契约，由具体协议实现。
///
/// # 契约说明（What）
/// - `key_schema`：读写单个键；
/// - `length_width`：长度字段宽度；
/// - `add_schemas`：登记各键的值编解码器，只在 [`MapSchema`] 构造时调用一次。
pub trait TlvLayout: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type KeySchema: Schema<Value = Self::Key>;

    fn key_schema(&self) -> Self::KeySchema;

    fn length_width(&self) -> LengthWidth;

    fn add_schemas(&self, schemas: &mut SchemaMapBuilder<Self::Key>);
}

/// TLV 条目的值。
pub enum TlvValue {
    /// 由登记的值编解码器产出。
    Typed(AnyValue),
    /// 键未登记时保留的原始字节。
    Opaque(Bytes),
}

impl TlvValue {
    pub fn typed<T: Any + Send + Sync>(value: T) -> Self {
        TlvValue::Typed(Box::new(value))
    }

    pub fn opaque(bytes: impl Into<Bytes>) -> Self {
        TlvValue::Opaque(bytes.into())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            TlvValue::Typed(value) => value.downcast_ref::<T>(),
            TlvValue::Opaque(_) => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&[u8]> {
        match self {
            TlvValue::Opaque(bytes) => Some(bytes),
            TlvValue::Typed(_) => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, TlvValue::Opaque(_))
    }
}

impl Debug for TlvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlvValue::Typed(_) => f.write_str("Typed(..)"),
            TlvValue::Opaque(bytes) => f.debug_tuple("Opaque").field(&&bytes[..]).finish(),
        }
    }
}

/// TLV 条目类型别名。
pub type TlvEntry<K> = KeyValuePair<K, TlvValue>;

/// `MapSchema` 读写单个 TLV 条目。
///
/// # 行为逻辑（How）
/// - **解码**：读键、读长度；
///   - `length > 0`：把可读上界收缩到条目末尾后交给值编解码器，未登记的键按原始字节保留；
///     值编解码器未读完的字节被跳过，离开时上界恢复；
///   - `length == 0`：只有键；
///   - `length < 0`：值延伸到缓冲末尾，剩余可读字节全部归属该条目。
/// - **编码**：写键、写零长度占位、写值，再按 `当前位置 - 占位位置 - 宽度` 原位回填长度；
///   原始字节值原样写回；类型化值若无登记编解码器，则只写出键，并通过 [`DiagnosticSink`] 告警；
///   写值或回填失败时写指针回退到条目起点，输出中不残留半条条目。
///
/// # 契约说明（What）
/// - 构造后不可变，可被多个线程同时用于不同缓冲；
/// - 追踪版本在键处理完毕后立即把键字段标记为 `"key"`，其余字节行为与非追踪版本一致。
pub struct MapSchema<L: TlvLayout> {
    key_schema: L::KeySchema,
    width: LengthWidth,
    values: SchemaMap<L::Key>,
    sink: Arc<dyn DiagnosticSink>,
    _layout: PhantomData<fn() -> L>,
}

impl<L: TlvLayout> MapSchema<L> {
    /// 以默认的 `tracing` 接收端构造。
    pub fn new(layout: &L) -> Self {
        Self::with_sink(layout, Arc::new(TracingSink))
    }

    /// 以指定的诊断接收端构造。
    pub fn with_sink(layout: &L, sink: Arc<dyn DiagnosticSink>) -> Self {
        let mut builder = SchemaMapBuilder::new();
        layout.add_schemas(&mut builder);
        tracing::debug!(
            target: "spark_schema::map",
            layout = type_name::<L>(),
            keys = builder.len(),
            "tlv layout frozen"
        );
        Self {
            key_schema: layout.key_schema(),
            width: layout.length_width(),
            values: builder.build(),
            sink,
            _layout: PhantomData,
        }
    }

    /// 以配置中的长度宽度覆盖布局自带的宽度。
    pub fn with_config(layout: &L, config: &MapConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            width: config.length_width,
            ..Self::with_sink(layout, sink)
        }
    }

    pub fn length_width(&self) -> LengthWidth {
        self.width
    }

    /// 查询某个键登记的值编解码器。
    pub fn value_schema(&self, key: &L::Key) -> Option<&Arc<dyn DynSchema>> {
        self.values.get(key)
    }

    fn read_entry(
        &self,
        input: &mut CodecBuf,
        mut explain: Option<&mut Explain>,
    ) -> Result<Option<TlvEntry<L::Key>>> {
        if !input.is_readable() {
            return Ok(None);
        }
        let name = self.name();
        let begin = input.reader_index();
        let key = self
            .key_schema
            .read_traced(input, explain.as_deref_mut())?
            .ok_or_else(|| SchemaError::decode(name, "missing entry key"))?;
        if let Some(explain) = explain.as_deref_mut() {
            explain.label(begin, input.reader_index() - begin, "key", format!("{key:?}"));
        }

        let length = self.width.read(input).decoding(name)?;
        let mut entry = KeyValuePair::new(key);
        if length == 0 {
            return Ok(Some(entry));
        }

        let schema = self.values.get(entry.key());
        let value = if length > 0 {
            let mut bounded = input.limit(length as usize).decoding(name)?;
            self.read_value(&mut bounded, schema, entry.key(), true, explain)?
        } else {
            self.read_value(input, schema, entry.key(), false, explain)?
        };
        entry.set_value(value);
        Ok(Some(entry))
    }

    /// 在已限定的可读区间内读取值，离开前把读指针推进到区间末尾。
    fn read_value(
        &self,
        input: &mut CodecBuf,
        schema: Option<&Arc<dyn DynSchema>>,
        key: &L::Key,
        bounded: bool,
        explain: Option<&mut Explain>,
    ) -> Result<Option<TlvValue>> {
        let Some(schema) = schema else {
            return Ok(Some(TlvValue::Opaque(input.read_remaining())));
        };
        let value = schema.read_dyn(input, explain)?.map(TlvValue::Typed);
        let skipped = input.readable_bytes();
        if skipped > 0 {
            if bounded {
                self.sink.emit(&Diagnostic::UnconsumedValue {
                    schema: self.name(),
                    key,
                    skipped,
                });
            }
            input.skip(skipped).decoding(self.name())?;
        }
        Ok(value)
    }

    fn write_entry(
        &self,
        output: &mut CodecBuf,
        entry: Option<&TlvEntry<L::Key>>,
        mut explain: Option<&mut Explain>,
    ) -> Result<()> {
        let Some(entry) = entry else {
            return Ok(());
        };
        let key = entry.key();
        let begin = output.writer_index();
        self.key_schema
            .write_traced(output, Some(key), explain.as_deref_mut())?;
        if let Some(explain) = explain.as_deref_mut() {
            explain.label(begin, output.writer_index() - begin, "key", format!("{key:?}"));
        }

        let schema = match (self.values.get(key), entry.value()) {
            (_, Some(TlvValue::Opaque(_))) => None,
            (Some(schema), _) => Some(schema),
            (None, value) => {
                self.sink.emit(&Diagnostic::UnregisteredKey {
                    schema: self.name(),
                    key,
                    value: value.map(|value| value as &dyn Debug),
                });
                return Ok(());
            }
        };

        let written = self.write_value(output, entry.value(), schema, explain);
        if written.is_err() {
            output
                .set_writer_index(begin)
                .map_err(|err| SchemaError::encode(self.name(), err))?;
        }
        written
    }

    /// 写零长度占位、写值、回填长度。
    fn write_value(
        &self,
        output: &mut CodecBuf,
        value: Option<&TlvValue>,
        schema: Option<&Arc<dyn DynSchema>>,
        explain: Option<&mut Explain>,
    ) -> Result<()> {
        let mark = output.writer_index();
        self.width.write(output, 0)?;
        match (value, schema) {
            (Some(TlvValue::Opaque(bytes)), _) => output.write_slice(bytes),
            (Some(TlvValue::Typed(value)), Some(schema)) => {
                schema.write_dyn(output, &**value, explain)?
            }
            _ => {}
        }
        let written = output.writer_index() - mark - self.width.bytes();
        self.width.set(output, mark, written)
    }
}

impl<L: TlvLayout> Schema for MapSchema<L> {
    type Value = TlvEntry<L::Key>;

    fn name(&self) -> &'static str {
        type_name::<L>()
    }

    fn read_from(&self, input: &mut CodecBuf) -> Result<Option<Self::Value>> {
        self.read_entry(input, None)
    }

    fn write_to(&self, output: &mut CodecBuf, value: Option<&Self::Value>) -> Result<()> {
        self.write_entry(output, value, None)
    }

    fn read_traced(
        &self,
        input: &mut CodecBuf,
        explain: Option<&mut Explain>,
    ) -> Result<Option<Self::Value>> {
        self.read_entry(input, explain)
    }

    fn write_traced(
        &self,
        output: &mut CodecBuf,
        value: Option<&Self::Value>,
        explain: Option<&mut Explain>,
    ) -> Result<()> {
        self.write_entry(output, value, explain)
    }
}

impl<L: TlvLayout> Debug for MapSchema<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSchema")
            .field("layout", &type_name::<L>())
            .field("length_width", &self.width)
            .field("keys", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::schema::{INTS, NumberSchema, U8_SCHEMA};

    struct Layout;

    impl TlvLayout for Layout {
        type Key = u8;
        type KeySchema = NumberSchema<u8>;

        fn key_schema(&self) -> NumberSchema<u8> {
            U8_SCHEMA
        }

        fn length_width(&self) -> LengthWidth {
            LengthWidth::Word
        }

        fn add_schemas(&self, schemas: &mut SchemaMapBuilder<u8>) {
            schemas.add(0x01, INTS);
        }
    }

    #[traced_test]
    #[test]
    fn unregistered_key_is_reported_through_tracing() {
        let schema = MapSchema::new(&Layout);
        let entry = KeyValuePair::with_value(0x7F, TlvValue::typed(1u32));
        let mut output = CodecBuf::new();

        schema.write_to(&mut output, Some(&entry)).expect("丢弃值不是错误");
        assert_eq!(output.readable(), &[0x7F], "只写出键");
        assert!(logs_contain("unregistered map key, value dropped"));
    }

    #[test]
    fn frozen_layout_exposes_registered_schemas() {
        let schema = MapSchema::new(&Layout);
        assert_eq!(schema.length_width(), LengthWidth::Word);
        assert!(schema.value_schema(&0x01).is_some());
        assert!(schema.value_schema(&0x02).is_none());
        assert!(format!("{schema:?}").contains("keys: 1"));
    }
}
