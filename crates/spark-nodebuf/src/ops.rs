//! 字节级操作：复制、填充、拼接、反转与字节序交换。
//!
//! # 重叠安全（What）
//! - 源与目标共享同一 [`Storage`] 时，`copy_to` 在一把写锁内以 `copy_within`（memmove 语义）完成，
//!   因此区间重叠时结果与“先整体读出、再整体写入”一致；
//! - 源与目标位于不同存储时按分配地址顺序加锁，避免交叉复制时出现锁序反转。

use crate::{
    buffer::Buffer,
    encoding::Encoding,
    error::{BufferError, Result},
    storage::{Storage, checked_len},
};

/// `fill` 的填充模式。
///
/// - 数值按 256 取模后作为单字节重复；
/// - 字节序列或文本被循环铺满 `[start, end)`，最后一轮不足时截断；
/// - 空模式等价于填充 0。
#[derive(Clone, Debug)]
pub enum FillValue<'a> {
    Byte(u8),
    Bytes(&'a [u8]),
    Text(&'a str, Encoding),
    Buffer(&'a Buffer),
}

impl FillValue<'_> {
    /// 物化为待重复的字节模式。
    ///
    /// 非空文本经编码后为空（例如 `"zz"` 按 `hex` 解码）时返回 [`BufferError::TypeMismatch`]。
    fn materialize(&self) -> Result<Vec<u8>> {
        let pattern = match self {
            FillValue::Byte(b) => vec![*b],
            FillValue::Bytes(bytes) => bytes.to_vec(),
            FillValue::Buffer(buffer) => buffer.to_vec(),
            FillValue::Text(text, encoding) => {
                let encoded = encoding.to_bytes(text);
                if encoded.is_empty() && !text.is_empty() {
                    return Err(BufferError::type_mismatch(
                        "value",
                        format!("a string that produces bytes in {encoding}"),
                        format!("{text:?}"),
                    ));
                }
                encoded
            }
        };
        Ok(if pattern.is_empty() { vec![0] } else { pattern })
    }
}

impl From<u8> for FillValue<'_> {
    fn from(value: u8) -> Self {
        FillValue::Byte(value)
    }
}

impl From<i32> for FillValue<'_> {
    fn from(value: i32) -> Self {
        FillValue::Byte((value & 0xff) as u8)
    }
}

impl From<u32> for FillValue<'_> {
    fn from(value: u32) -> Self {
        FillValue::Byte((value & 0xff) as u8)
    }
}

impl<'a> From<&'a [u8]> for FillValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        FillValue::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for FillValue<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        FillValue::Bytes(value)
    }
}

impl<'a> From<&'a str> for FillValue<'a> {
    fn from(value: &'a str) -> Self {
        FillValue::Text(value, Encoding::Utf8)
    }
}

impl<'a> From<&'a Buffer> for FillValue<'a> {
    fn from(value: &'a Buffer) -> Self {
        FillValue::Buffer(value)
    }
}

impl Buffer {
    /// 将 `self[source_start..source_end]` 复制到 `target[target_start..]`，返回复制的字节数。
    ///
    /// - `source_start > len` 返回 [`BufferError::OutOfRange`]；
    /// - `source_end` 被钳制到 `len`，`target_start >= target.len()` 时不复制；
    /// - 实际复制量为 `min(source_end - source_start, target.len() - target_start)`；
    /// - 源与目标可以别名重叠。
    pub fn copy_to(
        &self,
        target: &Buffer,
        target_start: usize,
        source_start: usize,
        source_end: usize,
    ) -> Result<usize> {
        if source_start > self.len() {
            return Err(BufferError::out_of_range(
                "sourceStart",
                format!(">= 0 && <= {}", self.len()),
                source_start,
            ));
        }
        let source_end = source_end.min(self.len());
        if target_start >= target.len() || source_start >= source_end {
            return Ok(0);
        }
        let count = (source_end - source_start).min(target.len() - target_start);
        let from = self.byte_offset() + source_start;
        let to = target.byte_offset() + target_start;

        if self.shares_storage_with(target) {
            let mut guard = self.storage().write();
            guard.copy_within(from..from + count, to);
        } else {
            with_distinct_pair(self.storage(), target.storage(), |src, dst| {
                dst[to..to + count].copy_from_slice(&src[from..from + count]);
            });
        }
        Ok(count)
    }

    /// 复制整个视图到 `target` 起始处。
    pub fn copy_into(&self, target: &Buffer) -> Result<usize> {
        self.copy_to(target, 0, 0, self.len())
    }

    /// 以模式循环填充 `[start, end)`，返回自身以便链式调用。
    ///
    /// `end > len` 返回 [`BufferError::OutOfRange`]；`start >= end` 时不做任何修改。
    pub fn fill<'a>(
        &self,
        value: impl Into<FillValue<'a>>,
        start: usize,
        end: usize,
    ) -> Result<&Self> {
        if end > self.len() {
            return Err(BufferError::out_of_range(
                "end",
                format!(">= 0 && <= {}", self.len()),
                end,
            ));
        }
        let pattern = value.into().materialize()?;
        if start >= end {
            return Ok(self);
        }
        self.with_bytes_mut(|bytes| {
            for (slot, b) in bytes[start..end].iter_mut().zip(pattern.iter().cycle()) {
                *slot = *b;
            }
        });
        Ok(self)
    }

    /// 填充整个视图。
    pub fn fill_all<'a>(&self, value: impl Into<FillValue<'a>>) -> Result<&Self> {
        self.fill(value, 0, self.len())
    }

    /// 原地反转字节顺序。
    pub fn reverse(&self) -> &Self {
        self.with_bytes_mut(|bytes| bytes.reverse());
        self
    }

    /// 将每个 16 位通道原地交换字节序；长度必须是 2 的倍数。
    pub fn swap16(&self) -> Result<&Self> {
        self.swap_lanes(2)
    }

    /// 将每个 32 位通道原地交换字节序；长度必须是 4 的倍数。
    pub fn swap32(&self) -> Result<&Self> {
        self.swap_lanes(4)
    }

    /// 将每个 64 位通道原地交换字节序；长度必须是 8 的倍数。
    pub fn swap64(&self) -> Result<&Self> {
        self.swap_lanes(8)
    }

    fn swap_lanes(&self, lane: usize) -> Result<&Self> {
        if self.len() % lane != 0 {
            return Err(BufferError::out_of_range(
                "length",
                format!("a multiple of {}-bits", lane * 8),
                self.len(),
            ));
        }
        self.with_bytes_mut(|bytes| bytes.chunks_exact_mut(lane).for_each(<[u8]>::reverse));
        Ok(self)
    }

    /// 拼接多个视图到一块新分配的独立存储。
    ///
    /// - `total_length` 缺省为各输入长度之和；
    /// - 大于总和时多出部分补 0，小于总和时截断复制；
    /// - 空列表得到长度为 0 的独立缓冲。
    pub fn concat(list: &[Buffer], total_length: Option<usize>) -> Result<Buffer> {
        let total = match total_length {
            Some(total) => total,
            None => list
                .iter()
                .try_fold(0usize, |acc, b| acc.checked_add(b.len()))
                .ok_or_else(|| BufferError::InvalidSize {
                    argument: "totalLength",
                    received: "overflow".to_owned(),
                    max: crate::MAX_LENGTH,
                })?,
        };
        let storage = Storage::allocate(checked_len(total)?, true)?;
        let out = Buffer::from_whole_storage(storage);
        let mut written = 0;
        for part in list {
            if written >= total {
                break;
            }
            written += part.copy_to(&out, written, 0, part.len())?;
        }
        Ok(out)
    }
}

/// 在两块不同存储上同时持有“源读锁 + 目标写锁”，按分配地址顺序加锁。
fn with_distinct_pair<R>(
    source: &Storage,
    target: &Storage,
    f: impl FnOnce(&[u8], &mut [u8]) -> R,
) -> R {
    debug_assert!(!source.ptr_eq(target));
    if source.address() < target.address() {
        let src = source.read();
        let mut dst = target.write();
        f(&src, &mut dst)
    } else {
        let mut dst = target.write();
        let src = source.read();
        f(&src, &mut dst)
    }
}
