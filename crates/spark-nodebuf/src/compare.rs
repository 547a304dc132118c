//! 字节序比较与类型化数组互操作。
//!
//! # 契约（What）
//! - 比较是逐字节的字典序：公共前缀相同时较短者排在前面；
//! - 与类型化数组比较时只接受 [`TypedSlice::U8`] 与 [`TypedSlice::Buffer`]，
//!   其它元素宽度一律返回 [`BufferError::TypeMismatch`]，不做隐式转换。

use core::cmp::Ordering;

use crate::{
    buffer::Buffer,
    error::{BufferError, Result},
};

/// 宿主侧类型化数组的借用视图。
#[derive(Clone, Copy, Debug)]
pub enum TypedSlice<'a> {
    U8(&'a [u8]),
    I8(&'a [i8]),
    U16(&'a [u16]),
    I16(&'a [i16]),
    U32(&'a [u32]),
    I32(&'a [i32]),
    F32(&'a [f32]),
    F64(&'a [f64]),
    Buffer(&'a Buffer),
}

impl TypedSlice<'_> {
    /// 对应的宿主类型名，用于错误信息。
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedSlice::U8(_) => "Uint8Array",
            TypedSlice::I8(_) => "Int8Array",
            TypedSlice::U16(_) => "Uint16Array",
            TypedSlice::I16(_) => "Int16Array",
            TypedSlice::U32(_) => "Uint32Array",
            TypedSlice::I32(_) => "Int32Array",
            TypedSlice::F32(_) => "Float32Array",
            TypedSlice::F64(_) => "Float64Array",
            TypedSlice::Buffer(_) => "Buffer",
        }
    }
}

impl<'a> From<&'a [u8]> for TypedSlice<'a> {
    fn from(value: &'a [u8]) -> Self {
        TypedSlice::U8(value)
    }
}

impl<'a> From<&'a Buffer> for TypedSlice<'a> {
    fn from(value: &'a Buffer) -> Self {
        TypedSlice::Buffer(value)
    }
}

/// 宿主数值转为字节（ToUint8）：非有限值为 0，其余向零截断后对 256 取模。
fn number_to_octet(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(256.0) as u8
}

impl Buffer {
    /// 两个视图的字典序比较，等价于 `Buffer.compare(a, b)`。
    pub fn compare(&self, other: &Buffer) -> Ordering {
        with_pair(self, other, |a, b| a.cmp(b))
    }

    /// 长度与内容都相同。
    pub fn equals(&self, other: &Buffer) -> bool {
        self.len() == other.len() && self.compare(other) == Ordering::Equal
    }

    /// 比较 `self[source_start..source_end]` 与 `target[target_start..target_end]`。
    ///
    /// 结束位置超过各自长度，或起始位置大于结束位置时返回 [`BufferError::OutOfRange`]。
    pub fn compare_range(
        &self,
        target: &Buffer,
        target_start: usize,
        target_end: usize,
        source_start: usize,
        source_end: usize,
    ) -> Result<Ordering> {
        check_range("targetStart", "targetEnd", target_start, target_end, target.len())?;
        check_range("sourceStart", "sourceEnd", source_start, source_end, self.len())?;
        Ok(with_pair(self, target, |a, b| {
            a[source_start..source_end].cmp(&b[target_start..target_end])
        }))
    }

    /// 与类型化数组比较；非字节元素类型返回 [`BufferError::TypeMismatch`]。
    pub fn compare_typed(&self, other: TypedSlice<'_>) -> Result<Ordering> {
        match other {
            TypedSlice::U8(bytes) => Ok(self.with_bytes(|own| own.cmp(bytes))),
            TypedSlice::Buffer(buffer) => Ok(self.compare(buffer)),
            other => Err(BufferError::type_mismatch(
                "target",
                "an instance of Buffer or Uint8Array",
                format!("an instance of {}", other.type_name()),
            )),
        }
    }

    /// `compare_typed` 的相等版本。
    pub fn equals_typed(&self, other: TypedSlice<'_>) -> Result<bool> {
        let same_len = match other {
            TypedSlice::U8(bytes) => bytes.len() == self.len(),
            TypedSlice::Buffer(buffer) => buffer.len() == self.len(),
            _ => true,
        };
        let ordering = self.compare_typed(other)?;
        Ok(same_len && ordering == Ordering::Equal)
    }

    /// 按元素值复制类型化数组，每个元素截断为低 8 位（对应 `Buffer.from(typedArray)`）。
    pub fn from_typed(source: TypedSlice<'_>) -> Buffer {
        let bytes: Vec<u8> = match source {
            TypedSlice::U8(v) => v.to_vec(),
            TypedSlice::I8(v) => v.iter().map(|x| *x as u8).collect(),
            TypedSlice::U16(v) => v.iter().map(|x| *x as u8).collect(),
            TypedSlice::I16(v) => v.iter().map(|x| *x as u8).collect(),
            TypedSlice::U32(v) => v.iter().map(|x| *x as u8).collect(),
            TypedSlice::I32(v) => v.iter().map(|x| *x as u8).collect(),
            TypedSlice::F32(v) => v.iter().map(|x| number_to_octet(f64::from(*x))).collect(),
            TypedSlice::F64(v) => v.iter().map(|x| number_to_octet(*x)).collect(),
            TypedSlice::Buffer(buffer) => buffer.to_vec(),
        };
        Buffer::from(bytes)
    }
}

fn check_range(
    start_name: &'static str,
    end_name: &'static str,
    start: usize,
    end: usize,
    len: usize,
) -> Result<()> {
    if end > len {
        return Err(BufferError::out_of_range(end_name, format!("<= {len}"), end));
    }
    if start > end {
        return Err(BufferError::out_of_range(start_name, format!("<= {end}"), start));
    }
    Ok(())
}

/// 同时以只读方式访问两个视图；共享存储时只取一把读锁。
fn with_pair<R>(a: &Buffer, b: &Buffer, f: impl FnOnce(&[u8], &[u8]) -> R) -> R {
    if a.shares_storage_with(b) {
        let guard = a.storage().read();
        return f(&guard[a.range()], &guard[b.range()]);
    }
    let (first, second) = if a.storage().address() < b.storage().address() {
        (a.storage().read(), b.storage().read())
    } else {
        let second = b.storage().read();
        (a.storage().read(), second)
    };
    f(&first[a.range()], &second[b.range()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferErrorKind;

    #[test]
    fn shorter_prefix_sorts_first() {
        let short = Buffer::from(vec![1, 2]);
        let long = Buffer::from(vec![1, 2, 0]);
        assert_eq!(short.compare(&long), Ordering::Less);
        assert_eq!(long.compare(&short), Ordering::Greater);
        assert!(!short.equals(&long));
        assert!(short.equals(&long.subarray(0, 2)));
    }

    #[test]
    fn aliased_views_compare_under_one_lock() {
        let buf = Buffer::from(vec![1, 2, 1, 2]);
        assert!(buf.subarray(0, 2).equals(&buf.subarray(2, 4)));
    }

    #[test]
    fn ranged_compare_checks_bounds() {
        let a = Buffer::from(vec![1, 2, 3, 4]);
        let b = Buffer::from(vec![3, 4]);
        assert_eq!(a.compare_range(&b, 0, 2, 2, 4), Ok(Ordering::Equal));
        assert_eq!(
            a.compare_range(&b, 0, 3, 0, 1).map_err(|e| e.kind()),
            Err(BufferErrorKind::OutOfRange)
        );
        assert_eq!(
            a.compare_range(&b, 0, 2, 3, 2).map_err(|e| e.kind()),
            Err(BufferErrorKind::OutOfRange)
        );
    }

    #[test]
    fn wide_typed_arrays_are_rejected() {
        let buf = Buffer::from(vec![1, 2]);
        let err = buf.compare_typed(TypedSlice::U16(&[0x0201])).expect_err("Uint16Array");
        assert_eq!(err.kind(), BufferErrorKind::TypeMismatch);
        assert!(err.to_string().contains("Uint16Array"));
        assert_eq!(buf.equals_typed(TypedSlice::U8(&[1, 2])), Ok(true));
        assert!(buf.equals_typed(TypedSlice::F64(&[1.0, 2.0])).is_err());
    }

    #[test]
    fn typed_elements_truncate_to_octets() {
        let from_u16 = Buffer::from_typed(TypedSlice::U16(&[0x0102, 0xffff]));
        assert_eq!(from_u16.to_vec(), vec![0x02, 0xff]);
        let from_f64 = Buffer::from_typed(TypedSlice::F64(&[-1.0, 256.9, f64::NAN]));
        assert_eq!(from_f64.to_vec(), vec![0xff, 0, 0]);
    }
}
