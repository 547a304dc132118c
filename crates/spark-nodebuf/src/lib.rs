//! `spark-nodebuf` 提供与 Node.js `Buffer` 语义兼容的共享字节视图。
//!
//! # 模块定位（Why）
//! - 为协议栈、编解码器与加解密封装提供统一的字节构件：可别名的视图、定宽数值读写、
//!   多编码文本转换以及查找/复制/填充原语；
//! - 视图间共享内存是契约的一部分：`subarray` 产生的视图与源互相可见写入，
//!   `Buffer::copy_of` 则给出独立副本。
//!
//! # 设计概要（How）
//! - [`Storage`] 是引用计数的固定容量分配，[`Buffer`] 是其上的 `(offset, len)` 窗口；
//! - [`Encoding`] 经大小写不敏感的别名表解析，负责 `utf8`/`utf16le`/`latin1`/`ascii`/`hex`/
//!   `base64`/`base64url` 的双向转换，解码方向对脏输入宽松；
//! - [`BufferAllocator`] 在独立存储与共享 slab 切分之间选择，slab 随其最后一个视图释放；
//! - 诊断预览的上限以 [`InspectOptions`] 显式传入，[`BufferConfig`] 可从 TOML 加载。
//!
//! # 错误约定（What）
//! - 所有可失败操作返回 [`Result`]，错误域为 [`BufferError`]，不存在静默的软失败；
//! - 越界访问是 [`BufferError::OutOfRange`]，数值超出目标宽度是 [`BufferError::ValueOutOfRange`]。
//!
//! # 并发
//! 每个操作在存储内部的读写锁下完成，保证内存安全；跨多次调用的一致性需要调用方自行同步。

mod buffer;
mod compare;
mod config;
mod encoding;
mod error;
mod inspect;
mod json;
mod numeric;
mod ops;
mod pool;
mod search;
mod storage;
mod validate;

pub use buffer::Buffer;
pub use compare::TypedSlice;
pub use config::{BufferConfig, validate_setting};
pub use encoding::{ALIASES, Encoding};
pub use error::{BufferError, BufferErrorKind, Result};
pub use inspect::InspectOptions;
pub use numeric::{ByteOrder, to_integral};
pub use ops::FillValue;
pub use pool::{AllocPolicy, BufferAllocator, PoolStats};
pub use search::{ByteOffset, Needle};
pub use storage::{MAX_LENGTH, Storage, size_from_number};
pub use validate::{is_ascii, is_utf8};
