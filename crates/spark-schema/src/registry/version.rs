use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SchemaError};
use crate::schema::{DynSchema, Schema, TypedSchemaAdapter};

/// `VersionTable` 把小整数版本号映射到编解码器。
///
/// # 设计背景（Why）
/// - 同一消息类型在不同协议版本下字段布局不同，按版本号做下标查找即可完成分派；
/// - 终端上报未知版本时，需要回落到一个显式指定的默认布局，而不是直接失败。
///
/// # 契约说明（What）
/// - 以版本号为下标的稠密数组存储，版本号应保持较小；
/// - [`VersionTable::get_or_default`]：精确命中优先，否则返回默认版本（若已指定），否则 `None`；
/// - 构建后不可变；注册中心以 `Arc` 共享同一实例，按标识与按类型两条索引看到的是同一对象。
#[derive(Default)]
pub struct VersionTable {
    slots: Vec<Option<Arc<dyn DynSchema>>>,
    default_version: Option<u16>,
}

impl VersionTable {
    pub fn builder() -> VersionTableBuilder {
        VersionTableBuilder::default()
    }

    /// 精确查找。
    pub fn get(&self, version: u16) -> Option<&Arc<dyn DynSchema>> {
        self.slots.get(usize::from(version))?.as_ref()
    }

    /// 精确查找，未命中时回落到默认版本。
    pub fn get_or_default(&self, version: u16) -> Option<&Arc<dyn DynSchema>> {
        self.get(version).or_else(|| self.default_entry())
    }

    /// 默认版本对应的编解码器。
    pub fn default_entry(&self) -> Option<&Arc<dyn DynSchema>> {
        self.default_version.and_then(|version| self.get(version))
    }

    pub fn default_version(&self) -> Option<u16> {
        self.default_version
    }

    /// 按版本号升序遍历已登记的条目。
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Arc<dyn DynSchema>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(version, slot)| Some((version as u16, slot.as_ref()?)))
    }

    pub fn versions(&self) -> impl Iterator<Item = u16> + '_ {
        self.iter().map(|(version, _)| version)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 校验默认版本确实已登记。
    pub(crate) fn validate(&self, type_name: &'static str) -> Result<()> {
        match self.default_version {
            Some(version) if self.get(version).is_none() => Err(SchemaError::binding(
                type_name,
                format!("default version {version} has no registered schema"),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for VersionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionTable")
            .field("versions", &self.versions().collect::<Vec<_>>())
            .field("default_version", &self.default_version)
            .finish()
    }
}

/// [`VersionTable`] 构建器。
#[derive(Default)]
pub struct VersionTableBuilder {
    slots: Vec<Option<Arc<dyn DynSchema>>>,
    default_version: Option<u16>,
}

impl VersionTableBuilder {
    /// 登记泛型编解码器。
    pub fn insert<S: Schema>(self, version: u16, schema: S) -> Self {
        self.insert_shared(version, TypedSchemaAdapter::shared(schema))
    }

    /// 登记已擦除类型的编解码器；同一版本重复登记时后者覆盖前者。
    pub fn insert_shared(mut self, version: u16, schema: Arc<dyn DynSchema>) -> Self {
        let index = usize::from(version);
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(schema);
        self
    }

    /// 指定回落版本。
    pub fn default_version(mut self, version: u16) -> Self {
        self.default_version = Some(version);
        self
    }

    pub fn build(self) -> VersionTable {
        VersionTable {
            slots: self.slots,
            default_version: self.default_version,
        }
    }
}
