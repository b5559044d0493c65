use core::{
    fmt,
    mem::size_of,
    ops::{Deref, DerefMut},
};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::BufferError;

/// `CodecBuf` 是 schema 编解码器共享的游标缓冲。
///
/// # 设计背景（Why）
/// - 协议报文按“类型标识 + 版本化字段布局”组织，字段解码需要精确的读指针推进；
/// - TLV 子条目的值由独立编解码器解析，调用方需临时把可读上界收缩到条目末尾，
///   子编解码器只需“读到可读字节耗尽”即可，而无需感知外层长度；
/// - 编码长度字段采用“占位 + 回填”两遍写入，需要按绝对位置覆写已写区域。
///
/// # 行为逻辑（How）
/// - `inner` 保存全部已写字节；`reader` 为下一次读取的位置；`writer` 同时充当写入位置与可读上界；
/// - 读取原语从 `reader` 开始，不得越过 `writer`；
/// - 写入原语从 `writer` 开始，必要时扩展 `inner`；若上界此前被收缩，则覆写其后的既有字节；
/// - `set_*` 原语按绝对位置覆写 `[0, writer)` 区间，不移动任何索引。
///
/// # 契约说明（What）
/// - **不变式**：`reader <= writer <= inner.len()`；
/// - **前置条件**：多字节原语一律按大端解释；
/// - **后置条件**：任一失败的读取都不会推进 `reader`。
///
/// # 风险提示（Trade-offs）
/// - 缓冲不是线程安全的共享对象，单次编解码期间由调用线程独占；
/// - 在 [`LimitGuard`] 存活期间写入会被恢复动作截断，收缩上界仅用于解码路径。
#[derive(Clone, Default)]
pub struct CodecBuf {
    inner: BytesMut,
    reader: usize,
    writer: usize,
}

macro_rules! read_primitive {
    ($($name:ident => $ty:ty, $get:ident;)*) => {
        $(
            #[doc = concat!("读取一个大端 `", stringify!($ty), "` 并推进读指针。")]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty, BufferError> {
                let width = size_of::<$ty>();
                self.ensure_readable(width)?;
                let mut src = &self.inner[self.reader..self.reader + width];
                let value = src.$get();
                self.reader += width;
                Ok(value)
            }
        )*
    };
}

macro_rules! write_primitive {
    ($($name:ident => $ty:ty, $put:ident;)*) => {
        $(
            #[doc = concat!("在写指针处追加一个大端 `", stringify!($ty), "`。")]
            #[inline]
            pub fn $name(&mut self, value: $ty) {
                let mut dst = self.claim(size_of::<$ty>());
                dst.$put(value);
            }
        )*
    };
}

macro_rules! set_primitive {
    ($($name:ident => $ty:ty, $put:ident;)*) => {
        $(
            #[doc = concat!("在绝对位置 `index` 覆写一个大端 `", stringify!($ty), "`，不移动索引。")]
            #[inline]
            pub fn $name(&mut self, index: usize, value: $ty) -> Result<(), BufferError> {
                let mut dst = self.window_mut(index, size_of::<$ty>())?;
                dst.$put(value);
                Ok(())
            }
        )*
    };
}

impl CodecBuf {
    /// 创建空缓冲。
    pub fn new() -> Self {
        Self::default()
    }

    /// 预留 `capacity` 字节的写入空间。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
            reader: 0,
            writer: 0,
        }
    }

    /// 当前读指针。
    #[inline]
    pub fn reader_index(&self) -> usize {
        self.reader
    }

    /// 当前写指针，同时也是可读上界。
    #[inline]
    pub fn writer_index(&self) -> usize {
        self.writer
    }

    /// 移动读指针；目标位置不得越过写指针。
    pub fn set_reader_index(&mut self, index: usize) -> Result<(), BufferError> {
        if index > self.writer {
            return Err(BufferError::OutOfBounds {
                index,
                len: 0,
                bound: self.writer,
            });
        }
        self.reader = index;
        Ok(())
    }

    /// 移动写指针（可读上界）。
    ///
    /// - 目标位置需位于 `[reader_index, 已存储长度]` 之间；
    /// - 收缩后被隐藏的字节不会丢失，把上界移回原处即可再次可见。
    pub fn set_writer_index(&mut self, index: usize) -> Result<(), BufferError> {
        if index < self.reader || index > self.inner.len() {
            return Err(BufferError::OutOfBounds {
                index,
                len: 0,
                bound: self.inner.len(),
            });
        }
        self.writer = index;
        Ok(())
    }

    /// 剩余可读字节数。
    #[inline]
    pub fn readable_bytes(&self) -> usize {
        self.writer - self.reader
    }

    /// 是否仍有可读字节。
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.writer > self.reader
    }

    /// 返回 `[reader, writer)` 区间的只读视图。
    #[inline]
    pub fn readable(&self) -> &[u8] {
        &self.inner[self.reader..self.writer]
    }

    /// 校验至少还有 `len` 字节可读。
    #[inline]
    pub fn ensure_readable(&self, len: usize) -> Result<(), BufferError> {
        let readable = self.readable_bytes();
        if len > readable {
            return Err(BufferError::Underflow {
                requested: len,
                readable,
            });
        }
        Ok(())
    }

    /// 跳过 `len` 字节。
    pub fn skip(&mut self, len: usize) -> Result<(), BufferError> {
        self.ensure_readable(len)?;
        self.reader += len;
        Ok(())
    }

    /// 复制出 `len` 字节并推进读指针。
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, BufferError> {
        self.ensure_readable(len)?;
        let bytes = Bytes::copy_from_slice(&self.inner[self.reader..self.reader + len]);
        self.reader += len;
        Ok(bytes)
    }

    /// 复制出全部剩余可读字节。
    pub fn read_remaining(&mut self) -> Bytes {
        let bytes = Bytes::copy_from_slice(self.readable());
        self.reader = self.writer;
        bytes
    }

    read_primitive! {
        read_u8 => u8, get_u8;
        read_i8 => i8, get_i8;
        read_u16 => u16, get_u16;
        read_i16 => i16, get_i16;
        read_u32 => u32, get_u32;
        read_i32 => i32, get_i32;
        read_u64 => u64, get_u64;
        read_i64 => i64, get_i64;
        read_f32 => f32, get_f32;
        read_f64 => f64, get_f64;
    }

    write_primitive! {
        write_u8 => u8, put_u8;
        write_i8 => i8, put_i8;
        write_u16 => u16, put_u16;
        write_i16 => i16, put_i16;
        write_u32 => u32, put_u32;
        write_i32 => i32, put_i32;
        write_u64 => u64, put_u64;
        write_i64 => i64, put_i64;
        write_f32 => f32, put_f32;
        write_f64 => f64, put_f64;
    }

    set_primitive! {
        set_u8 => u8, put_u8;
        set_u16 => u16, put_u16;
        set_i16 => i16, put_i16;
        set_u32 => u32, put_u32;
        set_i32 => i32, put_i32;
    }

    /// 在写指针处追加原始字节。
    pub fn write_slice(&mut self, src: &[u8]) {
        self.claim(src.len()).copy_from_slice(src);
    }

    /// 将可读上界临时收缩为 `reader_index + len`。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：`len` 不得超过当前可读字节，否则返回 [`BufferError::Underflow`]；
    /// - **后置条件**：返回的 [`LimitGuard`] 被丢弃时，上界恢复为调用前的值，
    ///   读指针保持子读取推进后的位置。
    pub fn limit(&mut self, len: usize) -> Result<LimitGuard<'_>, BufferError> {
        self.ensure_readable(len)?;
        let saved = self.writer;
        self.writer = self.reader + len;
        Ok(LimitGuard { buf: self, saved })
    }

    /// 冻结为只读 `Bytes`，仅保留 `[reader, writer)` 区间。
    pub fn freeze(self) -> Bytes {
        self.inner.freeze().slice(self.reader..self.writer)
    }

    /// 取回底层存储。
    pub fn into_inner(self) -> BytesMut {
        self.inner
    }

    /// 在写指针处划出 `width` 字节的可写窗口并推进写指针。
    fn claim(&mut self, width: usize) -> &mut [u8] {
        let start = self.writer;
        let end = start + width;
        if end > self.inner.len() {
            self.inner.resize(end, 0);
        }
        self.writer = end;
        &mut self.inner[start..end]
    }

    fn window_mut(&mut self, index: usize, width: usize) -> Result<&mut [u8], BufferError> {
        if index + width > self.writer {
            return Err(BufferError::OutOfBounds {
                index,
                len: width,
                bound: self.writer,
            });
        }
        Ok(&mut self.inner[index..index + width])
    }
}

impl fmt::Debug for CodecBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecBuf")
            .field("reader", &self.reader)
            .field("writer", &self.writer)
            .field("stored", &self.inner.len())
            .finish()
    }
}

impl From<BytesMut> for CodecBuf {
    fn from(inner: BytesMut) -> Self {
        let writer = inner.len();
        Self {
            inner,
            reader: 0,
            writer,
        }
    }
}

impl From<Bytes> for CodecBuf {
    fn from(bytes: Bytes) -> Self {
        Self::from(BytesMut::from(&bytes[..]))
    }
}

impl From<Vec<u8>> for CodecBuf {
    fn from(vec: Vec<u8>) -> Self {
        Self::from(BytesMut::from(&vec[..]))
    }
}

impl From<&[u8]> for CodecBuf {
    fn from(slice: &[u8]) -> Self {
        Self::from(BytesMut::from(slice))
    }
}

impl<const N: usize> From<&[u8; N]> for CodecBuf {
    fn from(array: &[u8; N]) -> Self {
        Self::from(&array[..])
    }
}

/// `LimitGuard` 在生命周期内维持收缩后的可读上界。
///
/// # 设计初衷（Why）
/// - 子条目解码可能因格式错误提前以 `?` 返回；若上界恢复依赖手写代码，错误路径极易遗漏，
///   导致后续兄弟字段被误解析。借助 `Drop`，恢复动作与控制流解耦。
///
/// # 契约说明（What）
/// - 通过 `Deref`/`DerefMut` 暴露底层 [`CodecBuf`]，子编解码器可直接在守卫上读取；
/// - 守卫可以嵌套，内层先于外层恢复。
pub struct LimitGuard<'a> {
    buf: &'a mut CodecBuf,
    saved: usize,
}

impl LimitGuard<'_> {
    /// 被收缩前的原始上界。
    pub fn saved_writer_index(&self) -> usize {
        self.saved
    }
}

impl Deref for LimitGuard<'_> {
    type Target = CodecBuf;

    fn deref(&self) -> &CodecBuf {
        self.buf
    }
}

impl DerefMut for LimitGuard<'_> {
    fn deref_mut(&mut self) -> &mut CodecBuf {
        self.buf
    }
}

impl Drop for LimitGuard<'_> {
    fn drop(&mut self) {
        self.buf.writer = self.saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_big_endian() {
        let mut buf = CodecBuf::new();
        buf.write_u16(0x0102);
        buf.write_i32(-2);
        assert_eq!(buf.readable(), &[0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(buf.read_u16().expect("u16"), 0x0102);
        assert_eq!(buf.read_i32().expect("i32"), -2);
        assert!(!buf.is_readable());
    }

    #[test]
    fn failed_read_does_not_advance() {
        let mut buf = CodecBuf::from(&[0x01u8, 0x02, 0x03]);
        assert_eq!(
            buf.read_u32(),
            Err(BufferError::Underflow {
                requested: 4,
                readable: 3
            })
        );
        assert_eq!(buf.reader_index(), 0);
    }

    #[test]
    fn set_rejects_unwritten_region() {
        let mut buf = CodecBuf::new();
        buf.write_u8(0);
        assert!(buf.set_u16(0, 7).is_err());
        assert!(buf.set_u8(0, 7).is_ok());
        assert_eq!(buf.readable(), &[7]);
    }
}
