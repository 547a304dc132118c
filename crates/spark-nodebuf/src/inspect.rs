//! 诊断预览：`<Buffer 68 65 6c 6c 6f>`。
//!
//! 预览上限以 [`InspectOptions`] 显式传入，不存在进程级可变设置；
//! 超出上限的部分以 ` ... N more bytes` 标记。

use core::fmt::Write as _;

use crate::{config::setting_from_number, error::Result};

/// 预览选项。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InspectOptions {
    max_bytes: usize,
}

impl InspectOptions {
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// 按宿主数值语义构造：负数或 `NaN` 返回 [`BufferError::OutOfRange`](crate::BufferError::OutOfRange)，
    /// 小数向零截断，正无穷表示不截断。
    pub fn with_max_bytes(value: f64) -> Result<Self> {
        Ok(Self::new(setting_from_number("inspect_max_bytes", value)?))
    }

    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self::new(crate::BufferConfig::DEFAULT_INSPECT_MAX_BYTES)
    }
}

pub(crate) fn render(bytes: &[u8], options: &InspectOptions) -> String {
    let shown = bytes.len().min(options.max_bytes);
    let mut out = String::with_capacity(9 + shown * 3);
    out.push_str("<Buffer ");
    for (i, byte) in bytes[..shown].iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    let remaining = bytes.len() - shown;
    if remaining > 0 {
        let plural = if remaining > 1 { "s" } else { "" };
        let _ = write!(out, " ... {remaining} more byte{plural}");
    }
    out.push('>');
    out
}
