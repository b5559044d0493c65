//! 多版本 schema 注册中心。

mod binding;
mod version;

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::schema::DynSchema;

pub use binding::{Binding, Bindings, Message, TypeDescriptor};
pub use version::{VersionTable, VersionTableBuilder};

/// `SchemaRegistry` 把数值类型标识与类型描述符绑定到版本表，并单独维护自描述类型。
///
/// # 设计初衷（Why）
/// - 协议消息以“类型标识 + 版本”寻址，解码入口需要在数十种组合之间分派而不写逐例分支；
/// - 同一类型的版本表只生成一次：按类型索引持有唯一实例，按标识索引共享同一个 `Arc`，
///   两条视图永远一致；
/// - 自描述类型不走版本模型，独立存放在标识 → 描述符映射中。
///
/// # 行为逻辑（How）
/// 1. 初始化阶段（单写者）按声明顺序调用 [`SchemaRegistry::load`]/[`SchemaRegistry::load_custom`]；
/// 2. 之后只读：`schema_by_*`/`versions_by_*`/`custom_*` 均为 `&self` 查询，可被多线程并发调用。
///
/// # 契约说明（What）
/// - **前置条件**：加载阶段必须在任何读者开始查询前完成；
/// - **后置条件**：绑定失败（外部生成器报错、默认版本悬空）直接返回 [`crate::SchemaError::Binding`]，
///   不做部分绑定；生成器返回空表时该标识保持未绑定；
/// - 两个标识空间使用同一数值域：调用方应先检查 [`SchemaRegistry::custom_type`]，再走版本化查找。
#[derive(Debug)]
pub struct SchemaRegistry {
    by_id: HashMap<u32, Arc<VersionTable>>,
    by_type: HashMap<TypeDescriptor, Arc<VersionTable>>,
    custom: HashMap<u32, TypeDescriptor>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_config(&RegistryConfig::default())
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            by_id: HashMap::with_capacity(capacity),
            by_type: HashMap::with_capacity(capacity),
            custom: HashMap::with_capacity(capacity),
        }
    }

    /// 按声明顺序加载全部绑定。
    ///
    /// 同一类型只采纳第一条声明，之后针对该类型的声明（无论种类）被忽略。
    pub fn from_bindings<I>(config: &RegistryConfig, bindings: I) -> Result<Self>
    where
        I: IntoIterator<Item = Binding>,
    {
        let mut registry = Self::with_config(config);
        let mut seen: HashSet<TypeId> = HashSet::new();
        for binding in bindings {
            let descriptor = binding.descriptor;
            if !seen.insert(descriptor.type_id()) {
                tracing::debug!(
                    target: "spark_schema::registry",
                    type_name = descriptor.name(),
                    "duplicate declaration ignored"
                );
                continue;
            }
            if descriptor.is_custom() {
                for id in binding.ids {
                    registry.load_custom(id, &descriptor)?;
                }
            } else {
                registry.load_type(&descriptor)?;
                for id in binding.ids {
                    registry.load(id, &descriptor)?;
                }
            }
        }
        tracing::debug!(
            target: "spark_schema::registry",
            identifiers = registry.by_id.len(),
            types = registry.by_type.len(),
            custom = registry.custom.len(),
            "schema registry loaded"
        );
        Ok(registry)
    }

    /// 取得（必要时生成）类型的版本表，但不绑定任何标识。
    pub fn load_type(&mut self, descriptor: &TypeDescriptor) -> Result<Option<Arc<VersionTable>>> {
        if let Some(table) = self.by_type.get(descriptor) {
            return Ok(Some(Arc::clone(table)));
        }
        let Some(generated) = descriptor.generate() else {
            return Ok(None);
        };
        let table = generated?;
        table.validate(descriptor.name())?;
        if table.is_empty() {
            tracing::debug!(
                target: "spark_schema::registry",
                type_name = descriptor.name(),
                "generator produced no versions"
            );
            return Ok(None);
        }
        let table = Arc::new(table);
        self.by_type.insert(*descriptor, Arc::clone(&table));
        Ok(Some(table))
    }

    /// 把 `id` 绑定到 `descriptor` 的版本表；版本表为空时标识保持未绑定。
    pub fn load(&mut self, id: u32, descriptor: &TypeDescriptor) -> Result<()> {
        if let Some(table) = self.load_type(descriptor)? {
            tracing::debug!(
                target: "spark_schema::registry",
                id,
                type_name = descriptor.name(),
                versions = table.len(),
                "identifier bound"
            );
            self.by_id.insert(id, table);
        }
        Ok(())
    }

    /// 登记自描述类型；结构化类型的描述符不能进入该地址空间。
    pub fn load_custom(&mut self, id: u32, descriptor: &TypeDescriptor) -> Result<()> {
        if !descriptor.is_custom() {
            return Err(SchemaError::binding(
                descriptor.name(),
                "structured message declared as a custom type",
            ));
        }
        tracing::debug!(
            target: "spark_schema::registry",
            id,
            type_name = descriptor.name(),
            "custom identifier bound"
        );
        self.custom.insert(id, *descriptor);
        Ok(())
    }

    /// 按类型与版本查找，未命中版本时回落到默认版本。
    pub fn schema_by_type(
        &self,
        descriptor: &TypeDescriptor,
        version: u16,
    ) -> Option<Arc<dyn DynSchema>> {
        self.by_type.get(descriptor)?.get_or_default(version).cloned()
    }

    /// [`SchemaRegistry::schema_by_type`] 的泛型便捷入口。
    pub fn schema_of<T: Message>(&self, version: u16) -> Option<Arc<dyn DynSchema>> {
        self.schema_by_type(&TypeDescriptor::message::<T>(), version)
    }

    /// 按标识与版本查找，未命中版本时回落到默认版本。
    pub fn schema_by_id(&self, id: u32, version: u16) -> Option<Arc<dyn DynSchema>> {
        self.by_id.get(&id)?.get_or_default(version).cloned()
    }

    /// 类型的完整版本表。
    pub fn versions_by_type(&self, descriptor: &TypeDescriptor) -> Option<&Arc<VersionTable>> {
        self.by_type.get(descriptor)
    }

    /// 标识的完整版本表。
    pub fn versions_by_id(&self, id: u32) -> Option<&Arc<VersionTable>> {
        self.by_id.get(&id)
    }

    /// 标识登记的自描述类型。
    pub fn custom_type(&self, id: u32) -> Option<&TypeDescriptor> {
        self.custom.get(&id)
    }

    /// 标识登记的自描述类型对应的桥接编解码器。
    pub fn custom_schema(&self, id: u32) -> Option<Arc<dyn DynSchema>> {
        self.custom.get(&id)?.bridge()
    }

    /// 已绑定版本表的标识，无序。
    pub fn identifiers(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_id.keys().copied()
    }

    /// 已绑定版本表的标识数量。
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// 两个地址空间均无登记时为真。
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.custom.is_empty()
    }
}
