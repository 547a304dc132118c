use core::fmt;

use bytes::Bytes;

use crate::{
    encoding::Encoding,
    error::{BufferError, Result},
    inspect::InspectOptions,
    storage::Storage,
};

/// `Buffer` 是对 [`Storage`] 的有界窗口：`(storage, byte_offset, len)` 三元组。
///
/// # 设计动机（Why）
/// - 与 Node.js `Buffer` 一致，所有缓冲实例都是视图；`subarray`/`slice` 产生的新视图与源共享内存，
///   经任一视图写入的字节对所有重叠视图立即可见，这种共享是契约的一部分；
/// - `Clone` 只复制句柄（等价于再持有一次同一窗口），需要独立副本时使用 [`Buffer::copy_of`]。
///
/// # 结构设计（How）
/// - `storage` 通过 `Arc` 共享，最后一个视图释放时底层分配随之回收；池化分配出的视图同样遵循该规则，
///   slab 只有在其上切出的全部视图都释放后才会真正归还；
/// - `byte_offset` 与 `len` 构造后不可变，构造时已校验 `byte_offset + len <= storage.capacity()`，
///   因为容量固定，该不变量此后无需再次检查。
///
/// # 契约说明（What）
/// - 所有方法只需 `&self`：写入经由存储内部的读写锁完成；
/// - 越界的字节访问返回 [`BufferError::OutOfRange`]，不存在静默的软失败；
/// - 并发写入同一存储需要调用方自行同步，核心只保证单次操作的内存安全。
#[derive(Clone)]
pub struct Buffer {
    storage: Storage,
    byte_offset: usize,
    len: usize,
}

impl Buffer {
    /// 在 `storage` 上构造视图，共享其内存（对应 `Buffer.from(arrayBuffer, offset, length)`）。
    ///
    /// `byte_offset + len` 超过容量时返回 [`BufferError::OutOfRange`]。
    pub fn from_storage(storage: Storage, byte_offset: usize, len: usize) -> Result<Self> {
        let capacity = storage.capacity();
        if byte_offset > capacity {
            return Err(BufferError::out_of_range(
                "byteOffset",
                format!("<= {capacity}"),
                byte_offset,
            ));
        }
        if len > capacity - byte_offset {
            return Err(BufferError::out_of_range(
                "length",
                format!("<= {}", capacity - byte_offset),
                len,
            ));
        }
        Ok(Self::from_parts(storage, byte_offset, len))
    }

    /// 覆盖整块存储的视图。
    pub fn from_whole_storage(storage: Storage) -> Self {
        let len = storage.capacity();
        Self::from_parts(storage, 0, len)
    }

    /// 已知不变量成立时的内部构造入口。
    pub(crate) fn from_parts(storage: Storage, byte_offset: usize, len: usize) -> Self {
        debug_assert!(byte_offset + len <= storage.capacity());
        Self {
            storage,
            byte_offset,
            len,
        }
    }

    /// 复制一段字节到新的独立存储。
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_whole_storage(Storage::from_vec(bytes.to_vec()))
    }

    /// 按编码名称物化文本；名称大小写不敏感，未知名称返回 [`BufferError::UnknownEncoding`]。
    pub fn from_text(text: &str, encoding: &str) -> Result<Self> {
        Ok(Self::from_encoded(text, Encoding::resolve(encoding)?))
    }

    /// 按已解析的编码物化文本。
    pub fn from_encoded(text: &str, encoding: Encoding) -> Self {
        Self::from(encoding.to_bytes(text))
    }

    /// 复制另一视图的内容到独立存储（对应 `Buffer.from(buffer)`），结果与源不共享内存。
    pub fn copy_of(other: &Buffer) -> Self {
        Self::from(other.to_vec())
    }

    /// 视图长度（字节）。
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 视图在底层存储中的起始偏移。
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// 底层存储句柄。
    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// 判断两个视图是否别名同一块存储（不要求区间重叠）。
    pub fn shares_storage_with(&self, other: &Buffer) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// 在不复制的前提下以只读切片访问视图内容。
    ///
    /// 闭包执行期间持有存储的读锁，闭包内不得写入任何共享同一存储的视图。
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let guard = self.storage.read();
        f(&guard[self.range()])
    }

    /// 以可变切片访问视图内容，写入对所有别名视图可见。
    ///
    /// 闭包执行期间持有存储的写锁，闭包内不得访问任何共享同一存储的视图。
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut guard = self.storage.write();
        let range = self.range();
        f(&mut guard[range])
    }

    /// 视图在存储中的绝对区间。
    pub(crate) fn range(&self) -> core::ops::Range<usize> {
        self.byte_offset..self.byte_offset + self.len
    }

    /// 读取下标 `index` 处的字节。
    pub fn get(&self, index: usize) -> Result<u8> {
        self.check_index(index)?;
        Ok(self.storage.read()[self.byte_offset + index])
    }

    /// 写入下标 `index` 处的字节。
    pub fn set(&self, index: usize, value: u8) -> Result<()> {
        self.check_index(index)?;
        self.storage.write()[self.byte_offset + index] = value;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(BufferError::out_of_range(
                "index",
                format!("< {}", self.len),
                index,
            ))
        }
    }

    /// 构造共享内存的子视图。
    ///
    /// - 负值表示自尾部计数（`len + rel`）；
    /// - 两端被钳制到 `[0, len]`，`start > end` 时结果长度为 0；
    /// - 结果与源共享 [`Storage`]，相互写入可见。
    pub fn subarray(&self, start: isize, end: isize) -> Buffer {
        let start = self.clamp_relative(start);
        let end = self.clamp_relative(end).max(start);
        Self::from_parts(self.storage.clone(), self.byte_offset + start, end - start)
    }

    /// 从 `start` 到末尾的子视图。
    pub fn subarray_from(&self, start: isize) -> Buffer {
        self.subarray(start, self.len as isize)
    }

    /// `subarray` 的别名，语义完全相同（同样共享内存）。
    pub fn slice(&self, start: isize, end: isize) -> Buffer {
        self.subarray(start, end)
    }

    fn clamp_relative(&self, rel: isize) -> usize {
        if rel < 0 {
            self.len.saturating_sub(rel.unsigned_abs())
        } else {
            (rel as usize).min(self.len)
        }
    }

    /// 复制出视图内容。
    pub fn to_vec(&self) -> Vec<u8> {
        self.with_bytes(<[u8]>::to_vec)
    }

    /// 复制为 `bytes::Bytes`，供下游协议层零拷贝传递。
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_vec())
    }

    /// 按编码解码整个视图。
    pub fn decode(&self, encoding: Encoding) -> String {
        self.with_bytes(|bytes| encoding.to_text(bytes))
    }

    /// 按编码名称解码 `[start, end)`，对应 `buf.toString(encoding, start, end)`。
    ///
    /// `end` 被钳制到视图长度，`start >= end` 时返回空串。
    pub fn to_text(&self, encoding: &str, start: usize, end: usize) -> Result<String> {
        let encoding = Encoding::resolve(encoding)?;
        let end = end.min(self.len);
        if start >= end {
            return Ok(String::new());
        }
        Ok(self.with_bytes(|bytes| encoding.to_text(&bytes[start..end])))
    }

    /// 将文本编码后写入 `offset` 起的区域，返回实际写入的字节数（对应 `buf.write`）。
    ///
    /// - `length` 为 `None` 时写到视图末尾，否则再与剩余空间取较小值；
    /// - 空间不足时只写完整的字符：`utf8` 不写半个多字节序列，`utf16le` 不写半个码元；
    /// - `offset > len` 返回 [`BufferError::OutOfRange`]。
    pub fn write_text(
        &self,
        text: &str,
        offset: usize,
        length: Option<usize>,
        encoding: Encoding,
    ) -> Result<usize> {
        if offset > self.len {
            return Err(BufferError::out_of_range(
                "offset",
                format!(">= 0 && <= {}", self.len),
                offset,
            ));
        }
        let room = length.map_or(self.len - offset, |l| l.min(self.len - offset));
        let encoded = encoding.to_bytes(text);
        let written = if encoded.len() <= room {
            encoded.len()
        } else {
            match encoding {
                Encoding::Utf8 => {
                    let mut n = room;
                    while n > 0 && encoded[n] & 0xc0 == 0x80 {
                        n -= 1;
                    }
                    n
                }
                Encoding::Utf16Le => room & !1,
                _ => room,
            }
        };
        self.with_bytes_mut(|bytes| {
            bytes[offset..offset + written].copy_from_slice(&encoded[..written]);
        });
        Ok(written)
    }

    /// 以给定限制渲染十六进制预览，例如 `<Buffer 68 65 6c 6c 6f>`。
    pub fn inspect(&self, options: &InspectOptions) -> String {
        self.with_bytes(|bytes| crate::inspect::render(bytes, options))
    }
}

impl From<Vec<u8>> for Buffer {
    /// 接管 `Vec` 作为独立存储，不发生复制。
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_whole_storage(Storage::from_vec(bytes))
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl From<Bytes> for Buffer {
    fn from(bytes: Bytes) -> Self {
        Self::from(Vec::from(bytes))
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Buffer {}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect(&InspectOptions::default()))
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("byte_offset", &self.byte_offset)
            .field("len", &self.len)
            .field("preview", &format_args!("{self}"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferErrorKind;

    #[test]
    fn subarray_aliases_source() {
        let buf = Buffer::from(vec![1, 2, 3, 4, 5]);
        let sub = buf.subarray(1, 4);
        sub.set(0, 99).expect("写入子视图");
        assert_eq!(buf.get(1), Ok(99));
        buf.set(3, 42).expect("写入源视图");
        assert_eq!(sub.get(2), Ok(42));
        assert_eq!(sub.byte_offset(), 1);
        assert!(sub.shares_storage_with(&buf));
    }

    #[test]
    fn subarray_clamps_negative_and_inverted_bounds() {
        let buf = Buffer::from(vec![1, 2, 3, 4, 5]);
        assert_eq!(buf.subarray(-2, 5).to_vec(), vec![4, 5]);
        assert_eq!(buf.subarray(-10, 2).to_vec(), vec![1, 2]);
        assert_eq!(buf.subarray(3, 1).len(), 0);
        assert_eq!(buf.subarray(2, 100).to_vec(), vec![3, 4, 5]);
        assert_eq!(buf.subarray_from(-1).to_vec(), vec![5]);
    }

    #[test]
    fn index_access_is_checked() {
        let buf = Buffer::from(vec![7]);
        assert_eq!(buf.get(1).map_err(|e| e.kind()), Err(BufferErrorKind::OutOfRange));
        assert!(buf.set(1, 0).is_err());
    }

    #[test]
    fn from_storage_rejects_windows_past_capacity() {
        let storage = Storage::from_vec(vec![0; 4]);
        assert!(Buffer::from_storage(storage.clone(), 2, 2).is_ok());
        assert!(Buffer::from_storage(storage.clone(), 2, 3).is_err());
        assert!(Buffer::from_storage(storage, 5, 0).is_err());
    }

    #[test]
    fn copy_of_is_independent() {
        let buf = Buffer::from(vec![1, 2]);
        let copy = Buffer::copy_of(&buf);
        copy.set(0, 9).expect("写入副本");
        assert_eq!(buf.get(0), Ok(1));
        assert!(!copy.shares_storage_with(&buf));
    }

    #[test]
    fn write_text_never_splits_characters() {
        let buf = Buffer::from(vec![0; 4]);
        assert_eq!(buf.write_text("a€", 0, None, Encoding::Utf8), Ok(4));
        let small = Buffer::from(vec![0; 3]);
        assert_eq!(small.write_text("a€", 0, None, Encoding::Utf8), Ok(1));
        assert_eq!(small.write_text("ab", 0, None, Encoding::Utf16Le), Ok(2));
        assert_eq!(small.write_text("ff", 2, Some(9), Encoding::Hex), Ok(1));
        assert_eq!(small.to_vec(), vec![b'a', 0, 0xff]);
        assert!(small.write_text("x", 4, None, Encoding::Utf8).is_err());
    }

    #[test]
    fn to_text_clamps_range() {
        let buf = Buffer::from_text("hello", "UTF8").expect("构造");
        assert_eq!(buf.to_text("utf8", 1, 99), Ok("ello".to_owned()));
        assert_eq!(buf.to_text("hex", 3, 1), Ok(String::new()));
        assert!(buf.to_text("nope", 0, 5).is_err());
    }
}
