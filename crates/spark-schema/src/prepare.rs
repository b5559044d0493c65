use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::schema::{CustomMessage, CustomSchema, DynSchema, Schema, TypedSchemaAdapter};

/// `SchemaMapBuilder` 收集“键 → 值编解码器”绑定，供 TLV 布局在构造期填充。
///
/// # 契约说明（What）
/// - 同一键重复登记时后者覆盖前者；
/// - [`SchemaMapBuilder::build`] 之后映射冻结为只读的 [`SchemaMap`]，不再接受修改。
pub struct SchemaMapBuilder<K> {
    schemas: HashMap<K, Arc<dyn DynSchema>>,
}

impl<K> Default for SchemaMapBuilder<K> {
    fn default() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }
}

impl<K> SchemaMapBuilder<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记泛型编解码器。
    pub fn add<S: Schema>(&mut self, key: K, schema: S) -> &mut Self {
        self.add_shared(key, TypedSchemaAdapter::shared(schema))
    }

    /// 登记已经擦除类型的编解码器，可与版本表、其他映射共享同一实例。
    pub fn add_shared(&mut self, key: K, schema: Arc<dyn DynSchema>) -> &mut Self {
        self.schemas.insert(key, schema);
        self
    }

    /// 登记自描述类型，自动套上桥接编解码器。
    pub fn add_custom<T: CustomMessage>(&mut self, key: K) -> &mut Self {
        self.add(key, CustomSchema::<T>::new())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.schemas.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// 冻结为只读映射。
    pub fn build(self) -> SchemaMap<K> {
        SchemaMap {
            schemas: self.schemas,
        }
    }
}

/// 构造完成后的只读键映射。
pub struct SchemaMap<K> {
    schemas: HashMap<K, Arc<dyn DynSchema>>,
}

impl<K> SchemaMap<K>
where
    K: Eq + Hash,
{
    pub fn get(&self, key: &K) -> Option<&Arc<dyn DynSchema>> {
        self.schemas.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.schemas.keys()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
