use std::{borrow::Cow, fmt};

/// 单个字段的诊断记录。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Info {
    /// 字段起始位置（相对缓冲起点）。
    pub offset: usize,
    /// 字段占用的字节数。
    pub length: usize,
    /// 人类可读的字段标签。
    pub desc: Cow<'static, str>,
    /// 字段值的调试渲染。
    pub value: String,
}

/// `Explain` 是调用方持有的解码/编码轨迹。
///
/// # 设计背景（Why）
/// - 排查协议报文时，需要知道“哪一段字节被解释成了哪个字段”；
/// - 轨迹只是旁路：带轨迹与不带轨迹的调用必须产出/消费完全相同的字节。
///
/// # 契约说明（What）
/// - 生命周期为一次顶层编解码调用，由调用方创建并通过 `Option<&mut Explain>` 传入；
/// - 不可在并发解码之间共享，每条消息使用独立实例；
/// - 编解码器不会在调用结束后持有引用。
#[derive(Clone, Debug, Default)]
pub struct Explain {
    items: Vec<Info>,
}

impl Explain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录。
    pub fn push(
        &mut self,
        offset: usize,
        length: usize,
        desc: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) {
        self.items.push(Info {
            offset,
            length,
            desc: desc.into(),
            value: value.into(),
        });
    }

    /// 重命名最近一条记录；轨迹为空时不做任何事。
    pub fn set_last_desc(&mut self, desc: impl Into<Cow<'static, str>>) {
        if let Some(last) = self.items.last_mut() {
            last.desc = desc.into();
        }
    }

    /// 为 `[offset, offset + length)` 打上标签。
    ///
    /// 若最近一条记录恰好从 `offset` 开始（通常由内层编解码器写入），则就地改名；
    /// 否则追加新记录。
    pub fn label(
        &mut self,
        offset: usize,
        length: usize,
        desc: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) {
        match self.items.last_mut() {
            Some(last) if last.offset == offset => last.desc = desc.into(),
            _ => self.push(offset, length, desc, value),
        }
    }

    pub fn last(&self) -> Option<&Info> {
        self.items.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Info> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl fmt::Display for Explain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for info in &self.items {
            writeln!(
                f,
                "[{:04}+{}] {}: {}",
                info.offset, info.length, info.desc, info.value
            )?;
        }
        Ok(())
    }
}
