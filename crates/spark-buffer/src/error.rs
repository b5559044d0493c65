use thiserror::Error;

/// 缓冲访问失败的错误域。
///
/// # 契约说明（What）
/// - `Underflow`：请求读取（或收缩上界）的字节数超过当前可读字节；
/// - `OutOfBounds`：按绝对位置访问时越过了允许的区间；
/// - 每个变体都映射到稳定错误码（[`BufferError::code`]），供上层包装为领域错误时保留分类。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum BufferError {
    /// 可读字节不足。
    #[error("buffer underflow: requested {requested} bytes but only {readable} readable")]
    Underflow { requested: usize, readable: usize },

    /// 绝对位置越界。
    #[error("index {index} with width {len} is out of bounds (limit {bound})")]
    OutOfBounds {
        index: usize,
        len: usize,
        bound: usize,
    },
}

impl BufferError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            BufferError::Underflow { .. } => "spark.buffer.underflow",
            BufferError::OutOfBounds { .. } => "spark.buffer.out_of_bounds",
        }
    }
}
