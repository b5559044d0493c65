#![deny(unsafe_code)]

//! `spark-schema` 提供按“类型标识 + 协议版本”分派的二进制编解码引擎。
//!
//! # 模块定位（Why）
//! - 终端类二进制协议以数十种消息标识、多个协议版本并存，消息体内部又嵌套
//!   “键 + 长度 + 值”的附加信息；手写逐例分支既冗长又容易在版本演进时失配；
//! - 本 crate 把“一个值类型如何与字节互转”抽象为统一契约，并在其上提供定宽数组、TLV 映射、
//!   自描述类型桥接与多版本注册中心，字段级生成器只需交出版本表即可接入。
//!
//! # 设计概要（How）
//! - [`Schema`]：泛型层编解码契约；[`DynSchema`] + [`TypedSchemaAdapter`] 构成对象层，
//!   供版本表与 TLV 值映射以 `Arc<dyn DynSchema>` 混存多种值类型；
//! - [`ArraySchema`]：七种定宽元素数组，元素个数由外层长度或剩余字节隐含；
//! - [`MapSchema`]：通用 TLV 条目编解码，未知键原样保留字节、长度字段占位回填；
//! - [`CustomSchema`]：把自带编解码逻辑的 [`CustomMessage`] 接入统一契约；
//! - [`SchemaRegistry`]：标识/类型 → [`VersionTable`] 的只读索引，另含自描述类型映射；
//! - [`Explain`]：可选的字段级轨迹旁路，不影响任何字节。
//!
//! # 契约说明（What）
//! - 所有编解码器构造后不可变，满足 `Send + Sync + 'static`；
//! - 注册中心在初始化阶段单线程加载，之后只读并发查询；
//! - 失败统一以 [`SchemaError`] 返回，并携带 `spark.schema.*` 稳定错误码。

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod explain;
pub mod length;
pub mod pair;
pub mod prepare;
pub mod registry;
pub mod schema;

pub use config::{MapConfig, RegistryConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, NoopSink, TracingSink};
pub use error::{BoxError, Result, SchemaError, codes};
pub use explain::{Explain, Info};
pub use length::LengthWidth;
pub use pair::KeyValuePair;
pub use prepare::{SchemaMap, SchemaMapBuilder};
pub use registry::{
    Binding, Bindings, Message, SchemaRegistry, TypeDescriptor, VersionTable, VersionTableBuilder,
};
pub use schema::map::TlvEntry;
pub use schema::{
    AnyValue, ArraySchema, BYTES, ByteArray, CHARS, CharArray, CustomMessage, CustomSchema,
    DOUBLES, DoubleArray, DynSchema, Element, FLOATS, FloatArray, I32_SCHEMA, INTS, IntArray,
    LONGS, LongArray, MapSchema, NumberSchema, SHORTS, Schema, ShortArray, TlvLayout, TlvValue,
    TypedSchemaAdapter, U8_SCHEMA, U16_SCHEMA, U32_SCHEMA,
};

pub use spark_buffer::{BufferError, CodecBuf};
