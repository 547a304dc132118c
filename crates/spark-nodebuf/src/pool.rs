use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicU64, Ordering},
};

use spin::Mutex;

use crate::{
    buffer::Buffer,
    config::BufferConfig,
    error::Result,
    ops::FillValue,
    storage::{Storage, checked_len},
};

/// 池化切分后偏移对齐的粒度（字节）。
const POOL_ALIGNMENT: usize = 8;

/// 分配策略令牌。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AllocPolicy {
    /// 独立存储，保证清零（`alloc`）。
    Zeroed,
    /// 小尺寸自共享 slab 切分，否则退化为独立存储（`allocUnsafe`）。
    Pooled,
    /// 总是独立存储（`allocUnsafeSlow`）。
    Unpooled,
}

/// `BufferAllocator` 在池化与非池化两种策略之间为缓冲选择底层存储。
///
/// # 模块角色（Why）
/// - 大量短小缓冲各自持有一次堆分配代价较高；`alloc_unsafe` 从当前 slab 中切出子视图，
///   把分配次数摊薄到每个 slab 一次；
/// - `alloc_unsafe_slow` 保证返回的视图独占其存储，供需要确认“没有其它视图别名这块内存”的调用方使用。
///
/// # 核心机制（How）
/// - 活跃 slab 是一个 [`Storage`] 加上 bump 偏移，整体由 `spin::Mutex` 保护，多线程分配互不踩踏；
/// - 请求 `size < pool_size / 2` 时走池：剩余空间不足则创建新 slab 并替换旧 slab，
///   切出 `[offset, offset + size)` 后偏移前进并向上对齐到 8 字节；
/// - 被替换的 slab 只由已切出的视图持有，最后一个视图释放时随 `Arc` 计数归零一并回收；
/// - `PoolMetrics` 以原子计数记录 slab 创建数与两类分配次数，供 [`BufferAllocator::stats`] 快照。
///
/// # 契约说明（What）
/// - 池化视图的内容不作保证，调用方必须在读取前写入；`Zeroed` 策略总是清零；
/// - 同一 slab 上切出的视图互不重叠，但它们共享同一 [`Storage`]（`shares_storage_with` 为真）；
/// - 尺寸超过 [`MAX_LENGTH`](crate::MAX_LENGTH) 时返回 [`BufferError::InvalidSize`](crate::BufferError::InvalidSize)。
///
/// # 设计权衡（Trade-offs）
/// - slab 不回收复用：旧 slab 的空闲尾部随其视图一起释放，换取无需追踪每个视图的归还；
/// - 使用自旋锁而非阻塞锁，临界区只有一次指针运算与可能的 slab 分配。
#[derive(Clone)]
pub struct BufferAllocator {
    inner: Arc<AllocatorInner>,
}

struct AllocatorInner {
    pool_size: usize,
    slab: Mutex<Option<Slab>>,
    metrics: PoolMetrics,
}

struct Slab {
    storage: Storage,
    offset: usize,
}

impl Slab {
    fn remaining(&self) -> usize {
        self.storage.capacity().saturating_sub(self.offset)
    }
}

/// 分配器统计快照。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub slabs_created: u64,
    pub pooled_allocations: u64,
    pub unpooled_allocations: u64,
    /// 当前 slab 的 bump 偏移；尚未创建 slab 时为 0。
    pub slab_offset: usize,
}

impl BufferAllocator {
    /// 按配置创建独立的分配器，slab 延迟到第一次池化分配时创建。
    ///
    /// 直接构造的配置可能绕过 [`BufferConfig::from_toml_str`] 的校验，
    /// 此处把 `pool_size` 截到 [`BufferConfig::MAX_POOL_SIZE`]。
    pub fn new(config: &BufferConfig) -> Self {
        Self {
            inner: Arc::new(AllocatorInner {
                pool_size: config.pool_size.min(BufferConfig::MAX_POOL_SIZE),
                slab: Mutex::new(None),
                metrics: PoolMetrics::default(),
            }),
        }
    }

    /// 进程级默认分配器，使用 [`BufferConfig::default`]。
    pub fn global() -> &'static BufferAllocator {
        static GLOBAL: OnceLock<BufferAllocator> = OnceLock::new();
        GLOBAL.get_or_init(|| BufferAllocator::new(&BufferConfig::default()))
    }

    pub fn pool_size(&self) -> usize {
        self.inner.pool_size
    }

    /// 清零的独立缓冲。
    pub fn alloc(&self, size: usize) -> Result<Buffer> {
        self.allocate(AllocPolicy::Zeroed, size, None)
    }

    /// 清零后以 `fill` 铺满的独立缓冲（对应 `Buffer.alloc(size, fill)`）。
    pub fn alloc_filled<'a>(&self, size: usize, fill: impl Into<FillValue<'a>>) -> Result<Buffer> {
        self.allocate(AllocPolicy::Zeroed, size, Some(fill.into()))
    }

    /// 内容不作保证的缓冲，小尺寸时自共享 slab 切出。
    pub fn alloc_unsafe(&self, size: usize) -> Result<Buffer> {
        self.allocate(AllocPolicy::Pooled, size, None)
    }

    /// 内容不作保证、总是独占存储的缓冲。
    pub fn alloc_unsafe_slow(&self, size: usize) -> Result<Buffer> {
        self.allocate(AllocPolicy::Unpooled, size, None)
    }

    /// 按策略分配，随后可选地以 `fill` 铺满整个视图。
    pub fn allocate(
        &self,
        policy: AllocPolicy,
        size: usize,
        fill: Option<FillValue<'_>>,
    ) -> Result<Buffer> {
        let size = checked_len(size)?;
        let buffer = match policy {
            AllocPolicy::Pooled if size > 0 && size < self.inner.pool_size >> 1 => {
                self.inner.carve(size)?
            }
            AllocPolicy::Zeroed => self.inner.unpooled(size, true)?,
            AllocPolicy::Pooled | AllocPolicy::Unpooled => self.inner.unpooled(size, false)?,
        };
        if let Some(fill) = fill {
            buffer.fill_all(fill)?;
        }
        Ok(buffer)
    }

    /// 读取统计快照。
    pub fn stats(&self) -> PoolStats {
        let slab_offset = match &*self.inner.slab.lock() {
            Some(slab) => slab.offset,
            None => 0,
        };
        PoolStats {
            slabs_created: self.inner.metrics.slabs_created.load(Ordering::Relaxed),
            pooled_allocations: self.inner.metrics.pooled.load(Ordering::Relaxed),
            unpooled_allocations: self.inner.metrics.unpooled.load(Ordering::Relaxed),
            slab_offset,
        }
    }
}

impl Default for BufferAllocator {
    fn default() -> Self {
        Self::new(&BufferConfig::default())
    }
}

impl core::fmt::Debug for BufferAllocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferAllocator")
            .field("pool_size", &self.inner.pool_size)
            .field("stats", &self.stats())
            .finish()
    }
}

impl AllocatorInner {
    /// 从活跃 slab 切出 `size` 字节，空间不足时先轮换 slab。
    fn carve(&self, size: usize) -> Result<Buffer> {
        let mut guard = self.slab.lock();
        let current: &mut Option<Slab> = &mut guard;
        if let Some(slab) = current.as_mut().filter(|slab| slab.remaining() >= size) {
            return Ok(self.take(slab, size));
        }
        if let Some(old) = current.as_ref() {
            tracing::debug!(
                remaining = old.remaining(),
                requested = size,
                "buffer slab exhausted; rotating"
            );
        }
        let storage = Storage::allocate(self.pool_size, false)?;
        self.metrics.slabs_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(pool_size = self.pool_size, "buffer slab created");
        let slab = current.insert(Slab { storage, offset: 0 });
        Ok(self.take(slab, size))
    }

    fn take(&self, slab: &mut Slab, size: usize) -> Buffer {
        let view = Buffer::from_parts(slab.storage.clone(), slab.offset, size);
        slab.offset = align_up(slab.offset + size);
        self.metrics.pooled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(size, offset = view.byte_offset(), "pooled buffer carved");
        view
    }

    fn unpooled(&self, size: usize, zero: bool) -> Result<Buffer> {
        let storage = Storage::allocate(size, zero)?;
        self.metrics.unpooled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(size, zero, "unpooled buffer allocated");
        Ok(Buffer::from_whole_storage(storage))
    }
}

#[derive(Default)]
struct PoolMetrics {
    slabs_created: AtomicU64,
    pooled: AtomicU64,
    unpooled: AtomicU64,
}

fn align_up(offset: usize) -> usize {
    offset.div_ceil(POOL_ALIGNMENT) * POOL_ALIGNMENT
}

impl Buffer {
    /// 经由 [`BufferAllocator::global`] 分配清零缓冲。
    pub fn alloc(size: usize) -> Result<Buffer> {
        BufferAllocator::global().alloc(size)
    }

    /// 经由 [`BufferAllocator::global`] 分配并填充。
    pub fn alloc_filled<'a>(size: usize, fill: impl Into<FillValue<'a>>) -> Result<Buffer> {
        BufferAllocator::global().alloc_filled(size, fill)
    }

    /// 经由 [`BufferAllocator::global`] 的池化分配。
    pub fn alloc_unsafe(size: usize) -> Result<Buffer> {
        BufferAllocator::global().alloc_unsafe(size)
    }

    /// 经由 [`BufferAllocator::global`] 的非池化分配。
    pub fn alloc_unsafe_slow(size: usize) -> Result<Buffer> {
        BufferAllocator::global().alloc_unsafe_slow(size)
    }
}
