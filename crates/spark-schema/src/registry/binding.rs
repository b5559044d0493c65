//! 声明式绑定：以显式注册表取代运行期的包扫描。
//!
//! # 设计背景（Why）
//! - 引擎只消费“(标识集合, 类型)”二元组，不关心它们来自代码生成、配置还是手写列表；
//! - 结构化类型通过 [`Message::schemas`] 交出自己的版本表（字段级生成器在引擎之外），
//!   自描述类型通过 [`CustomMessage`] 约束交出桥接能力。

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::Result;
use crate::schema::{CustomMessage, CustomSchema, DynSchema, TypedSchemaAdapter};

use super::version::VersionTable;

/// 结构化消息类型：能生成按版本索引的编解码器集合。
pub trait Message: Send + Sync + 'static {
    /// 生成该类型的版本表；失败视为绑定错误。
    fn schemas() -> Result<VersionTable>;
}

#[derive(Clone, Copy)]
enum DescriptorKind {
    Message { generate: fn() -> Result<VersionTable> },
    Custom { bridge: fn() -> Arc<dyn DynSchema> },
}

/// 类型描述符：类型身份 + 名称 + 生成编解码器的入口。
///
/// - 相等性与哈希只取决于 `TypeId`，同一类型以不同方式声明时视为同一类型；
/// - 可自由复制，注册中心按值保存。
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    type_id: TypeId,
    name: &'static str,
    kind: DescriptorKind,
}

impl TypeDescriptor {
    /// 结构化消息类型的描述符。
    pub fn message<T: Message>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: DescriptorKind::Message {
                generate: T::schemas,
            },
        }
    }

    /// 自描述类型的描述符。
    pub fn custom<T: CustomMessage>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind: DescriptorKind::Custom {
                bridge: custom_bridge::<T>,
            },
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 去掉模块路径的类型名。
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, DescriptorKind::Custom { .. })
    }

    /// 调用外部生成器；自描述类型没有版本表，返回 `None`。
    pub(crate) fn generate(&self) -> Option<Result<VersionTable>> {
        match self.kind {
            DescriptorKind::Message { generate } => Some(generate()),
            DescriptorKind::Custom { .. } => None,
        }
    }

    /// 为自描述类型构造桥接编解码器。
    pub fn bridge(&self) -> Option<Arc<dyn DynSchema>> {
        match self.kind {
            DescriptorKind::Custom { bridge } => Some(bridge()),
            DescriptorKind::Message { .. } => None,
        }
    }
}

fn custom_bridge<T: CustomMessage>() -> Arc<dyn DynSchema> {
    TypedSchemaAdapter::shared(CustomSchema::<T>::new())
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("custom", &self.is_custom())
            .finish()
    }
}

/// 一条已解析的声明：类型及其标识集合。
#[derive(Clone, Debug)]
pub struct Binding {
    pub ids: Vec<u32>,
    pub descriptor: TypeDescriptor,
}

impl Binding {
    pub fn new(ids: impl Into<Vec<u32>>, descriptor: TypeDescriptor) -> Self {
        Self {
            ids: ids.into(),
            descriptor,
        }
    }
}

/// 有序的声明列表构建器。
///
/// ```
/// use spark_schema::{Bindings, CustomMessage};
/// # use bytes::Bytes;
/// # use spark_buffer::CodecBuf;
/// # #[derive(Default)]
/// # struct Passthrough;
/// # impl CustomMessage for Passthrough {
/// #     type Error = std::io::Error;
/// #     fn decode(&mut self, input: &mut CodecBuf) -> Result<(), Self::Error> {
/// #         input.read_remaining();
/// #         Ok(())
/// #     }
/// #     fn encode(&self) -> Result<Bytes, Self::Error> {
/// #         Ok(Bytes::new())
/// #     }
/// # }
/// let bindings = Bindings::new().custom::<Passthrough>(&[0x0900]);
/// assert_eq!(bindings.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    entries: Vec<Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明结构化消息类型。
    pub fn message<T: Message>(self, ids: &[u32]) -> Self {
        self.push(Binding::new(ids, TypeDescriptor::message::<T>()))
    }

    /// 声明自描述类型。
    pub fn custom<T: CustomMessage>(self, ids: &[u32]) -> Self {
        self.push(Binding::new(ids, TypeDescriptor::custom::<T>()))
    }

    pub fn push(mut self, binding: Binding) -> Self {
        self.entries.push(binding);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Bindings {
    type Item = Binding;
    type IntoIter = std::vec::IntoIter<Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<Binding> for Bindings {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
