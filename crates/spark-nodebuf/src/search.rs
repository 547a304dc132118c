//! 字节序列查找：`index_of`、`last_index_of` 与 `includes`。
//!
//! # 偏移归一化（What）
//! - 未指定或 `NaN` 的偏移在正向查找时视为 0，反向查找时视为视图长度（即搜索整个视图）；
//! - 其余数值先钳制到 `i32` 区间再向零截断，负值自尾部计数；
//! - 正向查找时偏移越过 `len - needle.len()` 直接无匹配，反向查找时退化为从末尾开始；
//! - 空模式总是在归一化后的偏移处匹配。
//!
//! 文本模式按给定编码物化后再查找；`utf16le` 文本只在偶数字节位置匹配，与码元边界对齐。

use std::borrow::Cow;

use crate::{buffer::Buffer, encoding::Encoding, error::Result};

/// 查找的目标模式。
#[derive(Clone, Debug)]
pub enum Needle<'a> {
    Byte(u8),
    Bytes(&'a [u8]),
    Text(&'a str, Encoding),
    Buffer(&'a Buffer),
}

impl<'a> Needle<'a> {
    /// 物化为字节模式，同时返回匹配位置的步长约束。
    ///
    /// 视图模式被复制出来，因此 `haystack` 与 `needle` 共享存储时不会重入锁。
    fn materialize(&self) -> (Cow<'a, [u8]>, usize) {
        match self {
            Needle::Byte(b) => (Cow::Owned(vec![*b]), 1),
            Needle::Bytes(bytes) => (Cow::Borrowed(*bytes), 1),
            Needle::Buffer(buffer) => (Cow::Owned(buffer.to_vec()), 1),
            Needle::Text(text, encoding) => {
                let alignment = if *encoding == Encoding::Utf16Le { 2 } else { 1 };
                (Cow::Owned(encoding.to_bytes(text)), alignment)
            }
        }
    }
}

impl From<u8> for Needle<'_> {
    fn from(value: u8) -> Self {
        Needle::Byte(value)
    }
}

impl<'a> From<&'a [u8]> for Needle<'a> {
    fn from(value: &'a [u8]) -> Self {
        Needle::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Needle<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Needle::Bytes(value)
    }
}

impl<'a> From<&'a str> for Needle<'a> {
    fn from(value: &'a str) -> Self {
        Needle::Text(value, Encoding::Utf8)
    }
}

impl<'a> From<&'a Buffer> for Needle<'a> {
    fn from(value: &'a Buffer) -> Self {
        Needle::Buffer(value)
    }
}

/// 查找起点，保留宿主侧 `number` 的全部取值（含 `NaN` 与无穷）。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ByteOffset {
    /// 调用方未给出偏移。
    #[default]
    Unspecified,
    At(f64),
}

impl From<i32> for ByteOffset {
    fn from(value: i32) -> Self {
        ByteOffset::At(f64::from(value))
    }
}

impl From<i64> for ByteOffset {
    fn from(value: i64) -> Self {
        ByteOffset::At(value as f64)
    }
}

impl From<usize> for ByteOffset {
    fn from(value: usize) -> Self {
        ByteOffset::At(value as f64)
    }
}

impl From<f64> for ByteOffset {
    fn from(value: f64) -> Self {
        ByteOffset::At(value)
    }
}

impl Buffer {
    /// 返回 `needle` 首次出现的位置，找不到时为 `None`。
    pub fn index_of<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        offset: impl Into<ByteOffset>,
    ) -> Option<usize> {
        self.search(&needle.into(), offset.into(), true)
    }

    /// 返回起点不晚于 `offset` 的最后一次出现位置。
    pub fn last_index_of<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        offset: impl Into<ByteOffset>,
    ) -> Option<usize> {
        self.search(&needle.into(), offset.into(), false)
    }

    /// `index_of(..).is_some()`。
    pub fn includes<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        offset: impl Into<ByteOffset>,
    ) -> bool {
        self.index_of(needle, offset).is_some()
    }

    /// 按编码名称物化文本后正向查找；未知编码返回错误而不是“找不到”。
    pub fn index_of_text(
        &self,
        text: &str,
        offset: impl Into<ByteOffset>,
        encoding: &str,
    ) -> Result<Option<usize>> {
        let encoding = Encoding::resolve(encoding)?;
        Ok(self.index_of(Needle::Text(text, encoding), offset))
    }

    /// `index_of_text` 的反向版本。
    pub fn last_index_of_text(
        &self,
        text: &str,
        offset: impl Into<ByteOffset>,
        encoding: &str,
    ) -> Result<Option<usize>> {
        let encoding = Encoding::resolve(encoding)?;
        Ok(self.last_index_of(Needle::Text(text, encoding), offset))
    }

    fn search(&self, needle: &Needle<'_>, offset: ByteOffset, forward: bool) -> Option<usize> {
        let (pattern, step) = needle.materialize();
        let len = self.len();
        let raw = normalize_offset(offset, len, forward);
        let start = clamp_offset(len, raw, pattern.len(), forward)?;
        if pattern.is_empty() {
            return Some(start);
        }
        if pattern.len() > len || (forward && start + pattern.len() > len) {
            return None;
        }
        let start = start - start % step;
        self.with_bytes(|haystack| {
            if forward {
                find_forward(haystack, &pattern, start, step)
            } else {
                find_backward(haystack, &pattern, start, step)
            }
        })
    }
}

/// 宿主数值偏移到整数偏移；结果仍可能为负。
///
/// `NaN` 与 `±inf` 一律视为“搜索整个视图”：正向从 0 开始，反向从末尾开始。
fn normalize_offset(offset: ByteOffset, len: usize, forward: bool) -> i64 {
    let value = match offset {
        ByteOffset::Unspecified => f64::NAN,
        ByteOffset::At(value) => value,
    };
    if !value.is_finite() {
        return if forward { 0 } else { len as i64 };
    }
    value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)).trunc() as i64
}

/// 把整数偏移落到 `[0, len]`，`None` 表示不可能匹配。
fn clamp_offset(len: usize, offset: i64, needle_len: usize, forward: bool) -> Option<usize> {
    let signed_len = len as i64;
    if offset < 0 {
        if offset + signed_len >= 0 {
            Some((signed_len + offset) as usize)
        } else if forward || needle_len == 0 {
            Some(0)
        } else {
            None
        }
    } else if offset + needle_len as i64 <= signed_len {
        Some(offset as usize)
    } else if needle_len == 0 {
        Some(len)
    } else if forward {
        None
    } else {
        len.checked_sub(1)
    }
}

fn find_forward(haystack: &[u8], pattern: &[u8], start: usize, step: usize) -> Option<usize> {
    let last = haystack.len() - pattern.len();
    (start..=last)
        .step_by(step)
        .find(|&pos| haystack[pos..pos + pattern.len()] == *pattern)
}

fn find_backward(haystack: &[u8], pattern: &[u8], start: usize, step: usize) -> Option<usize> {
    let mut pos = start.min(haystack.len() - pattern.len());
    pos -= pos % step;
    loop {
        if haystack[pos..pos + pattern.len()] == *pattern {
            return Some(pos);
        }
        pos = pos.checked_sub(step)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> Buffer {
        Buffer::from(b"hello hello".to_vec())
    }

    #[test]
    fn negative_offsets_count_from_the_end() {
        assert_eq!(hello().index_of("hello", -6), Some(6));
        assert_eq!(hello().index_of("hello", -100), Some(0));
        assert_eq!(hello().last_index_of("hello", -6), Some(0));
        assert_eq!(hello().last_index_of("hello", -100), None);
    }

    #[test]
    fn huge_offsets_never_match_forward() {
        assert_eq!(hello().index_of("hello", 1e10), None);
        assert_eq!(hello().last_index_of("hello", 1e10), Some(6));
    }

    #[test]
    fn infinite_offsets_search_everything() {
        assert_eq!(hello().index_of(b'h', f64::INFINITY), Some(0));
        assert_eq!(hello().index_of(b'h', f64::NEG_INFINITY), Some(0));
        assert_eq!(hello().last_index_of("hello", f64::NEG_INFINITY), Some(6));
        assert_eq!(hello().last_index_of("hello", f64::INFINITY), Some(6));
        assert!(hello().includes("hello", f64::INFINITY));
    }

    #[test]
    fn nan_offsets_search_everything() {
        assert_eq!(hello().index_of("hello", f64::NAN), Some(0));
        assert_eq!(hello().last_index_of("hello", f64::NAN), Some(6));
        assert_eq!(hello().last_index_of(b'o', ByteOffset::Unspecified), Some(10));
    }

    #[test]
    fn empty_needle_matches_at_clamped_offset() {
        assert_eq!(hello().index_of("", 3), Some(3));
        assert_eq!(hello().index_of("", 99), Some(11));
        assert_eq!(hello().index_of("", -99), Some(0));
        assert_eq!(Buffer::from(Vec::new()).index_of("", 0), Some(0));
    }

    #[test]
    fn utf16_needles_match_on_code_unit_boundaries() {
        // "ab" 的 UTF-16LE 是 61 00 62 00；奇数位置的伪匹配必须被跳过。
        let buf = Buffer::from(vec![0x00, 0x61, 0x00, 0x62, 0x00, 0x00, 0x61, 0x00, 0x62, 0x00]);
        let needle = Needle::Text("ab", Encoding::Utf16Le);
        assert_eq!(buf.index_of(needle.clone(), 0), Some(6));
        assert_eq!(buf.index_of(Needle::Bytes(&[0x61, 0x00, 0x62, 0x00]), 0), Some(1));
        assert_eq!(buf.last_index_of(needle, ByteOffset::Unspecified), Some(6));
    }

    #[test]
    fn text_needles_resolve_encoding_names() {
        let buf = Buffer::from(vec![0x00, 0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(buf.index_of_text("adbe", 0, "HEX"), Ok(Some(2)));
        assert_eq!(buf.last_index_of_text("3q0", ByteOffset::Unspecified, "base64"), Ok(Some(1)));
        assert!(buf.index_of_text("x", 0, "ebcdic").is_err());
    }

    #[test]
    fn needle_may_alias_the_haystack() {
        let buf = hello();
        let tail = buf.subarray(6, 11);
        assert_eq!(buf.index_of(&tail, 1), Some(6));
        assert!(buf.includes(&tail, 0));
        assert!(!buf.includes("world", 0));
    }
}
