/// 一次 TLV 解码得到的键值对。
///
/// - 键在构造后固定；值槽位可在解码过程中填充；
/// - 每次解码都会产出新的实例，所有权交给调用方，编解码器不保留引用。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyValuePair<K, V> {
    key: K,
    value: Option<V>,
}

impl<K, V> KeyValuePair<K, V> {
    /// 只有键、尚无值的条目。
    pub fn new(key: K) -> Self {
        Self { key, value: None }
    }

    pub fn with_value(key: K, value: V) -> Self {
        Self {
            key,
            value: Some(value),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    pub fn set_value(&mut self, value: Option<V>) {
        self.value = value;
    }

    pub fn take_value(&mut self) -> Option<V> {
        self.value.take()
    }

    pub fn into_parts(self) -> (K, Option<V>) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for KeyValuePair<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::with_value(key, value)
    }
}
