use std::any::type_name;
use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use spark_buffer::CodecBuf;

use crate::error::{Result, SchemaError};
use crate::explain::Explain;

use super::Schema;

/// `CustomMessage` 描述自带编解码逻辑的自描述类型。
///
/// # 设计初衷（Why）
/// - 部分消息的字节布局无法用字段声明表达（压缩体、厂商私有扩展等），由类型自身负责解析；
/// - 引擎不了解其内部结构，只需要“无参构造 + 就地解码 + 自行序列化”三项能力。
///
/// # 契约说明（What）
/// - `Default` 充当无参构造；
/// - `decode` 从缓冲读指针处就地填充实例，可消费至可读上界；
/// - `encode` 返回实例自身的完整序列化字节，由桥接层追加到目标缓冲；
/// - 三项能力在编译期由 trait 约束校验，不存在“首次使用时才发现缺失”的情况。
pub trait CustomMessage: Default + Send + Sync + 'static {
    /// 自身编解码失败的原因。
    type Error: StdError + Send + Sync + 'static;

    fn decode(&mut self, input: &mut CodecBuf) -> core::result::Result<(), Self::Error>;

    fn encode(&self) -> core::result::Result<Bytes, Self::Error>;
}

/// `CustomSchema` 将 [`CustomMessage`] 桥接到统一的 [`Schema`] 契约。
///
/// # 行为逻辑（How）
/// - 解码：缓冲不可读时返回 `None`；否则构造新实例并调用其 `decode`；
/// - 编码：值缺省时不写入；否则调用其 `encode` 并把结果追加到输出缓冲；
/// - 任一失败都被包装为带目标类型名的解码/编码错误。
///
/// # 风险提示（Trade-offs）
/// - 被桥接类型的内部结构对引擎不透明，追踪版本与非追踪版本行为一致，不产出字段级轨迹。
pub struct CustomSchema<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T: CustomMessage> CustomSchema<T> {
    pub const fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }

    /// 就地解码到已有实例；缓冲不可读时返回 `false` 且不修改实例。
    pub fn merge_from(&self, input: &mut CodecBuf, target: &mut T) -> Result<bool> {
        if !input.is_readable() {
            return Ok(false);
        }
        target
            .decode(input)
            .map_err(|err| SchemaError::decode(type_name::<T>(), err))?;
        Ok(true)
    }

    /// [`CustomSchema::merge_from`] 的追踪版本。
    pub fn merge_from_traced(
        &self,
        input: &mut CodecBuf,
        target: &mut T,
        explain: Option<&mut Explain>,
    ) -> Result<bool> {
        let _ = explain;
        self.merge_from(input, target)
    }
}

impl<T: CustomMessage> Default for CustomSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CustomMessage> Clone for CustomSchema<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: CustomMessage> Copy for CustomSchema<T> {}

impl<T: CustomMessage> fmt::Debug for CustomSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{{typeClass={short}}}")
    }
}

impl<T: CustomMessage> Schema for CustomSchema<T> {
    type Value = T;

    fn read_from(&self, input: &mut CodecBuf) -> Result<Option<T>> {
        let mut message = T::default();
        if self.merge_from(input, &mut message)? {
            Ok(Some(message))
        } else {
            Ok(None)
        }
    }

    fn write_to(&self, output: &mut CodecBuf, value: Option<&T>) -> Result<()> {
        let Some(message) = value else {
            return Ok(());
        };
        let encoded = message
            .encode()
            .map_err(|err| SchemaError::encode(type_name::<T>(), err))?;
        output.write_slice(&encoded);
        Ok(())
    }
}
