use std::sync::Arc;

use spin::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{BufferError, Result};

/// 单个缓冲允许的最大字节数，对齐 JavaScript 安全整数上限 `2^53 - 1`。
pub const MAX_LENGTH: u64 = (1 << 53) - 1;

/// `Storage` 是所有 [`Buffer`](crate::Buffer) 视图共享的底层字节分配，语义等价于 `ArrayBuffer`。
///
/// # 设计动机（Why）
/// - 多个视图需要别名同一块内存：经由任一视图写入的字节必须立即对其它重叠视图可见；
/// - 容量在创建时确定且永不改变，因此视图构造时的边界检查在整个生命周期内持续成立。
///
/// # 结构设计（How）
/// - `Arc<StorageInner>` 承担引用计数：最后一个视图（或池中的 slab 句柄）释放时内存随之回收；
/// - 字节区由 `spin::RwLock` 保护，读操作可并发，写操作独占，避免 `&self` 写入造成数据竞争；
/// - `capacity` 冗余存放在锁外，读取长度无需加锁。
///
/// # 契约说明（What）
/// - **前置条件**：调用方不得在持有某视图的 `with_bytes*` 闭包期间，再经由共享同一 `Storage` 的其它视图发起访问，
///   否则自旋锁将无法重入；
/// - **后置条件**：`capacity()` 自构造后恒定；`Clone` 仅增加引用计数，不复制字节。
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    capacity: usize,
    bytes: RwLock<Box<[u8]>>,
}

impl Storage {
    /// 分配 `size` 字节的新存储。
    ///
    /// - `zero = true` 时保证内容全部为 0；
    /// - `zero = false` 时内容不作任何保证（当前实现出于内存安全考虑同样清零，调用方不得依赖这一点）；
    /// - `size > MAX_LENGTH` 返回 [`BufferError::InvalidSize`]，系统内存不足返回 [`BufferError::AllocationFailed`]。
    pub fn allocate(size: usize, zero: bool) -> Result<Self> {
        let size = checked_len(size)?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| BufferError::AllocationFailed { requested: size })?;
        // 安全 Rust 下无法暴露未初始化内存，`zero` 仅表达调用方的需求。
        let _ = zero;
        bytes.resize(size, 0);
        Ok(Self::from_vec(bytes))
    }

    /// 接管一段已有字节作为存储，不发生复制。
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let bytes = bytes.into_boxed_slice();
        Self {
            inner: Arc::new(StorageInner {
                capacity: bytes.len(),
                bytes: RwLock::new(bytes),
            }),
        }
    }

    /// 返回创建时确定的容量。
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// 判断两个句柄是否指向同一块分配。
    #[inline]
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 当前仍持有该分配的句柄数量（含视图与池）。
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.inner.bytes.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.inner.bytes.write()
    }

    /// 分配地址，仅用于多把锁之间的加锁排序。
    pub(crate) fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl core::fmt::Debug for Storage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Storage")
            .field("capacity", &self.capacity())
            .field("handles", &self.handle_count())
            .finish()
    }
}

/// 校验一个以 `usize` 表示的长度不超过 [`MAX_LENGTH`]。
pub(crate) fn checked_len(size: usize) -> Result<usize> {
    if size as u64 > MAX_LENGTH {
        return Err(BufferError::InvalidSize {
            argument: "size",
            received: size.to_string(),
            max: MAX_LENGTH,
        });
    }
    Ok(size)
}

/// 将宿主侧的数值尺寸（JavaScript `number` 语义）转换为 `usize`。
///
/// # 契约说明（What）
/// - 负数、小数、`NaN`、无穷大以及超过 [`MAX_LENGTH`] 的值统一返回 [`BufferError::InvalidSize`]；
/// - `-0.0` 视为 0。
pub fn size_from_number(value: f64) -> Result<usize> {
    let valid = value.is_finite()
        && value >= 0.0
        && value.fract() == 0.0
        && value <= MAX_LENGTH as f64;
    if !valid || value > usize::MAX as f64 {
        return Err(BufferError::InvalidSize {
            argument: "size",
            received: format_number(value),
            max: MAX_LENGTH,
        });
    }
    Ok(value as usize)
}

/// 以 JavaScript 的方式渲染数值，用于错误上下文。
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "Infinity".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_owned()
    } else {
        value.to_string()
    }
}
