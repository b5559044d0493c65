//! 可由配置文件驱动的引擎参数。
//!
//! 两个结构体都实现 `serde::Deserialize` 并带 `#[serde(default)]`，
//! 嵌入方可直接从 TOML/JSON 片段加载，缺省字段回落到默认值。

use serde::Deserialize;

use crate::length::LengthWidth;

/// 注册中心参数。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 各索引的初始容量。
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 128,
        }
    }
}

/// TLV 布局参数，经 [`crate::MapSchema::with_config`] 覆盖布局自带的长度宽度。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// 长度字段宽度，取值 1/2/4。
    pub length_width: LengthWidth,
}
