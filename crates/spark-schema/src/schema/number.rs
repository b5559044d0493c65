use std::fmt;
use std::marker::PhantomData;

use spark_buffer::CodecBuf;

use crate::error::{DecodeContext, Result};
use crate::explain::Explain;

use super::Schema;
use super::array::Element;

/// 单个定宽数值的编解码器，常用作 TLV 键或结构化消息的字段。
///
/// - 可读字节为零时解码返回 `None`；
/// - 不足一个元素宽度时返回解码错误。
pub struct NumberSchema<E> {
    _element: PhantomData<fn() -> E>,
}

impl<E: Element> NumberSchema<E> {
    pub const fn new() -> Self {
        Self {
            _element: PhantomData,
        }
    }
}

impl<E: Element> Default for NumberSchema<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> Clone for NumberSchema<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Element> Copy for NumberSchema<E> {}

impl<E: Element> fmt::Debug for NumberSchema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NumberSchema<{}>", E::NAME)
    }
}

impl<E: Element> Schema for NumberSchema<E> {
    type Value = E;

    fn read_from(&self, input: &mut CodecBuf) -> Result<Option<E>> {
        if !input.is_readable() {
            return Ok(None);
        }
        E::read(input).decoding(self.name()).map(Some)
    }

    fn write_to(&self, output: &mut CodecBuf, value: Option<&E>) -> Result<()> {
        if let Some(value) = value {
            value.write(output);
        }
        Ok(())
    }

    fn read_traced(&self, input: &mut CodecBuf, explain: Option<&mut Explain>) -> Result<Option<E>> {
        let begin = input.reader_index();
        let value = self.read_from(input)?;
        if let (Some(explain), Some(number)) = (explain, value.as_ref()) {
            explain.push(begin, E::WIDTH, E::NAME, format!("{number:?}"));
        }
        Ok(value)
    }

    fn write_traced(
        &self,
        output: &mut CodecBuf,
        value: Option<&E>,
        explain: Option<&mut Explain>,
    ) -> Result<()> {
        let begin = output.writer_index();
        self.write_to(output, value)?;
        if let (Some(explain), Some(number)) = (explain, value) {
            explain.push(begin, E::WIDTH, E::NAME, format!("{number:?}"));
        }
        Ok(())
    }
}

pub const U8_SCHEMA: NumberSchema<u8> = NumberSchema::new();
pub const U16_SCHEMA: NumberSchema<u16> = NumberSchema::new();
pub const U32_SCHEMA: NumberSchema<u32> = NumberSchema::new();
pub const I32_SCHEMA: NumberSchema<i32> = NumberSchema::new();
