//! 诊断旁路：以注入的 [`DiagnosticSink`] 取代进程级隐式日志。
//!
//! # 设计背景（Why）
//! - TLV 编码遇到未登记的键时需要告警，但引擎本身不应依赖全局 I/O；
//! - 嵌入方在构造 [`crate::MapSchema`] 时注入接收端：默认转发到 `tracing`，测试中可替换为记录器。

use std::fmt::Debug;

/// 引擎产生的诊断事件。
#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// 编码时键没有登记值编解码器：键已写出，长度与值被丢弃。
    UnregisteredKey {
        schema: &'static str,
        key: &'a dyn Debug,
        value: Option<&'a dyn Debug>,
    },
    /// 有界条目的值编解码器未读完声明长度，剩余字节被跳过。
    UnconsumedValue {
        schema: &'static str,
        key: &'a dyn Debug,
        skipped: usize,
    },
}

/// 诊断事件接收端，需可跨线程共享。
pub trait DiagnosticSink: Send + Sync + 'static {
    fn emit(&self, diagnostic: &Diagnostic<'_>);
}

/// 转发到 `tracing` 的默认接收端。
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::UnregisteredKey { schema, key, value } => {
                tracing::warn!(
                    target: "spark_schema::map",
                    schema,
                    key = ?key,
                    value = ?value,
                    "unregistered map key, value dropped"
                );
            }
            Diagnostic::UnconsumedValue {
                schema,
                key,
                skipped,
            } => {
                tracing::warn!(
                    target: "spark_schema::map",
                    schema,
                    key = ?key,
                    skipped,
                    "value schema left bytes unconsumed, skipped to entry boundary"
                );
            }
        }
    }
}

/// 丢弃全部事件。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn emit(&self, _diagnostic: &Diagnostic<'_>) {}
}
