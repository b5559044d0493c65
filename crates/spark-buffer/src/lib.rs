//! `spark-buffer` 提供 schema 编解码所需的游标缓冲实现。
//!
//! # 模块定位（Why）
//! - 协议消息的字段布局依赖“读指针 + 可读上界”两段式游标：嵌套的 TLV 值需要临时收缩上界，
//!   以免子编解码器越过当前条目的边界；
//! - 编码侧需要先写占位长度、再在原位回填真实长度，因此必须支持按绝对位置覆写。
//!
//! # 设计概要（How）
//! - [`CodecBuf`] 以 `bytes::BytesMut` 为底层存储，维护 `reader`/`writer` 两个索引；
//! - [`LimitGuard`] 通过 RAII 在 `Drop` 中恢复原始上界，确保正常返回与 `?` 提前返回两条路径一致；
//! - 所有多字节原语均为大端（网络字节序），借助 `bytes::{Buf, BufMut}` 完成读写。
//!
//! # 命名约定（Consistency）
//! - 沿用 Netty `ByteBuf` 的 `reader_index`/`writer_index`/`readable_bytes` 术语，方便对照协议文档。

mod codec_buf;
mod error;

pub use codec_buf::{CodecBuf, LimitGuard};
pub use error::BufferError;
