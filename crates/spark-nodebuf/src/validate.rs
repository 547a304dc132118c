//! 字节序列分类器（对应 `buffer.isAscii` / `buffer.isUtf8`）。
//!
//! UTF-8 判定遵循 RFC 3629：孤立的续字节、过长编码（如 `C0 80`）、代理码点
//! 以及超过 `U+10FFFF` 的序列均不合法；空序列合法。

use crate::buffer::Buffer;

/// 全部字节都小于 `0x80`。
pub fn is_ascii(bytes: &[u8]) -> bool {
    bytes.is_ascii()
}

/// 是否为良构的 UTF-8。
pub fn is_utf8(bytes: &[u8]) -> bool {
    core::str::from_utf8(bytes).is_ok()
}

impl Buffer {
    pub fn is_ascii(&self) -> bool {
        self.with_bytes(is_ascii)
    }

    pub fn is_utf8(&self) -> bool {
        self.with_bytes(is_utf8)
    }
}
