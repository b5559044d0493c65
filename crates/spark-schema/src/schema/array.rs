//! 定宽基本类型数组编解码器族。
//!
//! # 模块定位（Why）
//! - TLV 值与消息尾部常以“无自身长度前缀”的定宽元素数组出现，长度由外层上下文（剩余字节或 TLV 长度）隐含；
//! - 七种元素（byte/char/short/int/float/long/double）共享同一套计数规则，统一由泛型 [`ArraySchema`] 实现。
//!
//! # 计数规则（What）
//! - 无界读取：元素个数 = `可读字节 / 元素宽度`（向下取整）；
//! - 有界读取：元素个数 = `length / 元素宽度`，忽略可读字节；`length < 0` 退化为无界规则；
//! - 有界写入：至多写入前 `length / 元素宽度` 个元素；byte 数组即“原样写入前 `length` 字节”；
//! - 所有元素按大端编码，无填充。

use std::fmt::Debug;
use std::marker::PhantomData;

use spark_buffer::{BufferError, CodecBuf};

use crate::error::{DecodeContext, Result};
use crate::explain::Explain;

use super::Schema;

/// 定宽元素的读写能力。
pub trait Element: Copy + Debug + Send + Sync + 'static {
    /// 元素宽度（字节）。
    const WIDTH: usize;
    /// 轨迹中使用的元素名。
    const NAME: &'static str;

    fn read(input: &mut CodecBuf) -> core::result::Result<Self, BufferError>;

    fn write(self, output: &mut CodecBuf);

    /// 连续读取 `count` 个元素。
    fn read_many(input: &mut CodecBuf, count: usize) -> core::result::Result<Vec<Self>, BufferError> {
        input.ensure_readable(count * Self::WIDTH)?;
        let mut array = Vec::with_capacity(count);
        for _ in 0..count {
            array.push(Self::read(input)?);
        }
        Ok(array)
    }

    /// 连续写入全部元素。
    fn write_many(array: &[Self], output: &mut CodecBuf) {
        for element in array {
            element.write(output);
        }
    }
}

macro_rules! element {
    ($($ty:ty => $width:expr, $name:literal, $read:ident, $write:ident;)*) => {
        $(
            impl Element for $ty {
                const WIDTH: usize = $width;
                const NAME: &'static str = $name;

                #[inline]
                fn read(input: &mut CodecBuf) -> core::result::Result<Self, BufferError> {
                    input.$read()
                }

                #[inline]
                fn write(self, output: &mut CodecBuf) {
                    output.$write(self);
                }
            }
        )*
    };
}

element! {
    u16 => 2, "char", read_u16, write_u16;
    i16 => 2, "short", read_i16, write_i16;
    u32 => 4, "u32", read_u32, write_u32;
    i32 => 4, "int", read_i32, write_i32;
    f32 => 4, "float", read_f32, write_f32;
    i64 => 8, "long", read_i64, write_i64;
    f64 => 8, "double", read_f64, write_f64;
}

impl Element for u8 {
    const WIDTH: usize = 1;
    const NAME: &'static str = "byte";

    #[inline]
    fn read(input: &mut CodecBuf) -> core::result::Result<Self, BufferError> {
        input.read_u8()
    }

    #[inline]
    fn write(self, output: &mut CodecBuf) {
        output.write_u8(self);
    }

    fn read_many(input: &mut CodecBuf, count: usize) -> core::result::Result<Vec<Self>, BufferError> {
        Ok(input.read_bytes(count)?.to_vec())
    }

    fn write_many(array: &[Self], output: &mut CodecBuf) {
        output.write_slice(array);
    }
}

/// 元素类型为 `E` 的定宽数组编解码器，无状态，可作为进程级单例共享。
pub struct ArraySchema<E> {
    _element: PhantomData<fn() -> E>,
}

impl<E: Element> ArraySchema<E> {
    pub const fn new() -> Self {
        Self {
            _element: PhantomData,
        }
    }

    fn read_count(&self, input: &mut CodecBuf, count: usize) -> Result<Vec<E>> {
        E::read_many(input, count).decoding(self.name())
    }

    fn write_count(&self, output: &mut CodecBuf, array: &[E], count: usize) {
        E::write_many(&array[..count.min(array.len())], output);
    }
}

impl<E: Element> Default for ArraySchema<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> Clone for ArraySchema<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Element> Copy for ArraySchema<E> {}

impl<E: Element> Debug for ArraySchema<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArraySchema<{}[]>", E::NAME)
    }
}

impl<E: Element> Schema for ArraySchema<E> {
    type Value = Vec<E>;

    fn read_from(&self, input: &mut CodecBuf) -> Result<Option<Vec<E>>> {
        let count = input.readable_bytes() / E::WIDTH;
        self.read_count(input, count).map(Some)
    }

    fn read_bounded(&self, input: &mut CodecBuf, length: i32) -> Result<Option<Vec<E>>> {
        let length = usize::try_from(length).unwrap_or(input.readable_bytes());
        self.read_count(input, length / E::WIDTH).map(Some)
    }

    fn write_to(&self, output: &mut CodecBuf, value: Option<&Vec<E>>) -> Result<()> {
        if let Some(array) = value {
            E::write_many(array, output);
        }
        Ok(())
    }

    fn write_bounded(&self, output: &mut CodecBuf, length: i32, value: Option<&Vec<E>>) -> Result<()> {
        let Some(array) = value else {
            return Ok(());
        };
        match usize::try_from(length) {
            Ok(length) => self.write_count(output, array, length / E::WIDTH),
            Err(_) => E::write_many(array, output),
        }
        Ok(())
    }

    fn read_traced(
        &self,
        input: &mut CodecBuf,
        explain: Option<&mut Explain>,
    ) -> Result<Option<Vec<E>>> {
        let begin = input.reader_index();
        let value = self.read_from(input)?;
        if let (Some(explain), Some(array)) = (explain, value.as_ref()) {
            explain.push(
                begin,
                input.reader_index() - begin,
                format!("{}[{}]", E::NAME, array.len()),
                format!("{array:?}"),
            );
        }
        Ok(value)
    }

    fn write_traced(
        &self,
        output: &mut CodecBuf,
        value: Option<&Vec<E>>,
        explain: Option<&mut Explain>,
    ) -> Result<()> {
        let begin = output.writer_index();
        self.write_to(output, value)?;
        if let (Some(explain), Some(array)) = (explain, value) {
            explain.push(
                begin,
                output.writer_index() - begin,
                format!("{}[{}]", E::NAME, array.len()),
                format!("{array:?}"),
            );
        }
        Ok(())
    }
}

pub type ByteArray = ArraySchema<u8>;
pub type CharArray = ArraySchema<u16>;
pub type ShortArray = ArraySchema<i16>;
pub type IntArray = ArraySchema<i32>;
pub type FloatArray = ArraySchema<f32>;
pub type LongArray = ArraySchema<i64>;
pub type DoubleArray = ArraySchema<f64>;

pub const BYTES: ByteArray = ArraySchema::new();
pub const CHARS: CharArray = ArraySchema::new();
pub const SHORTS: ShortArray = ArraySchema::new();
pub const INTS: IntArray = ArraySchema::new();
pub const FLOATS: FloatArray = ArraySchema::new();
pub const LONGS: LongArray = ArraySchema::new();
pub const DOUBLES: DoubleArray = ArraySchema::new();
