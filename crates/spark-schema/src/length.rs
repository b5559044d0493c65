//! 长度字段工具：按 1/2/4 字节宽度读写、回填长度值。
//!
//! # 契约说明（What）
//! - 1、2 字节宽度按无符号解释；4 字节宽度按有符号 `i32` 解释，
//!   负值表示“值延伸到缓冲末尾”；
//! - 回填时若长度超出宽度可表示的范围，返回 [`SchemaError::LengthOverflow`]，
//!   不做静默截断。

use serde::Deserialize;
use spark_buffer::{BufferError, CodecBuf};

use crate::error::{Result, SchemaError};

/// 长度字段宽度。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum LengthWidth {
    #[default]
    Byte = 1,
    Word = 2,
    DWord = 4,
}

impl LengthWidth {
    /// 宽度对应的字节数。
    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// 该宽度能写出的最大长度。
    pub const fn max_length(self) -> usize {
        match self {
            LengthWidth::Byte => u8::MAX as usize,
            LengthWidth::Word => u16::MAX as usize,
            LengthWidth::DWord => i32::MAX as usize,
        }
    }

    /// 读取一个长度值。
    pub fn read(self, input: &mut CodecBuf) -> core::result::Result<i32, BufferError> {
        Ok(match self {
            LengthWidth::Byte => i32::from(input.read_u8()?),
            LengthWidth::Word => i32::from(input.read_u16()?),
            LengthWidth::DWord => input.read_i32()?,
        })
    }

    /// 在写指针处写出长度值。
    pub fn write(self, output: &mut CodecBuf, length: usize) -> Result<()> {
        self.check(length)?;
        match self {
            LengthWidth::Byte => output.write_u8(length as u8),
            LengthWidth::Word => output.write_u16(length as u16),
            LengthWidth::DWord => output.write_i32(length as i32),
        }
        Ok(())
    }

    /// 在绝对位置 `index` 回填长度值，不移动任何索引。
    pub fn set(self, output: &mut CodecBuf, index: usize, length: usize) -> Result<()> {
        self.check(length)?;
        let patched = match self {
            LengthWidth::Byte => output.set_u8(index, length as u8),
            LengthWidth::Word => output.set_u16(index, length as u16),
            LengthWidth::DWord => output.set_i32(index, length as i32),
        };
        patched.map_err(|err| SchemaError::encode("length field", err))
    }

    fn check(self, length: usize) -> Result<()> {
        if length > self.max_length() {
            return Err(SchemaError::LengthOverflow {
                width: self as u8,
                length,
            });
        }
        Ok(())
    }
}

impl TryFrom<u8> for LengthWidth {
    type Error = SchemaError;

    fn try_from(width: u8) -> Result<Self> {
        match width {
            1 => Ok(LengthWidth::Byte),
            2 => Ok(LengthWidth::Word),
            4 => Ok(LengthWidth::DWord),
            other => Err(SchemaError::UnsupportedLengthWidth(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_one_and_two_read_unsigned() {
        let mut input = CodecBuf::from(&[0xFFu8, 0xFF, 0xFF]);
        assert_eq!(LengthWidth::Byte.read(&mut input).expect("u8"), 255);
        assert_eq!(LengthWidth::Word.read(&mut input).expect("u16"), 65_535);
    }

    #[test]
    fn width_four_reads_signed() {
        let mut input = CodecBuf::from(&[0xFFu8, 0xFF, 0xFF, 0xFF]);
        assert_eq!(LengthWidth::DWord.read(&mut input).expect("i32"), -1);
    }

    #[test]
    fn backpatch_rejects_overflow() {
        let mut output = CodecBuf::new();
        LengthWidth::Byte.write(&mut output, 0).expect("占位");
        let err = LengthWidth::Byte
            .set(&mut output, 0, 256)
            .expect_err("256 超出单字节范围");
        assert!(matches!(
            err,
            SchemaError::LengthOverflow {
                width: 1,
                length: 256
            }
        ));
        LengthWidth::Byte.set(&mut output, 0, 9).expect("回填");
        assert_eq!(output.readable(), &[9]);
    }

    #[test]
    fn unsupported_width_is_rejected() {
        assert!(matches!(
            LengthWidth::try_from(3),
            Err(SchemaError::UnsupportedLengthWidth(3))
        ));
    }
}
