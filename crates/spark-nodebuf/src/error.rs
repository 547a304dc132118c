//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为字节视图、编解码、数值访问与分配器提供唯一的错误域，所有失败均在调用点同步返回；
//! - 错误语义与 Node.js `Buffer` 的 `ERR_OUT_OF_RANGE`、`ERR_UNKNOWN_ENCODING` 等分类一一对应，
//!   便于上层协议栈在不解析文本的情况下分支处理。
//!
//! ## 设计要求（What）
//! - 所有变体均派生 `thiserror::Error`，并携带结构化上下文（参数名、合法区间、实际值）；
//! - [`BufferError::kind`] 返回无字段的 [`BufferErrorKind`]，[`BufferError::code`] 返回稳定错误码；
//! - 核心内不存在致命错误，唯一与系统资源相关的失败是 [`BufferError::AllocationFailed`]。

use std::borrow::Cow;

use thiserror::Error;

/// crate 内统一的 `Result` 别名。
pub type Result<T, E = BufferError> = core::result::Result<T, E>;

/// 缓冲核心的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“尺寸非法”“越界”“数值越界”“未知编码”“类型不符”“内存耗尽”六类失败显式化，
///   取代宿主语言中返回 `undefined` 的软失败。
/// - **契约 (What)**：
///   - 变体均满足 `Send + Sync + 'static`，可跨线程传播；
///   - `argument` 字段总是指向调用方传入的参数名（如 `"offset"`、`"value"`）；
///   - 除 `AllocationFailed` 外，所有错误都可由调用方修正输入后重试。
/// - **设计权衡 (Trade-offs)**：数值类上下文统一以 `String` 记录，兼顾 `f64` 与 `i128` 两种输入域的可读性。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// 分配尺寸为负、非整数、非有限值或超过 [`MAX_LENGTH`](crate::MAX_LENGTH)。
    #[error("the \"{argument}\" argument must be an integer in 0..={max}, received {received}")]
    InvalidSize {
        argument: &'static str,
        received: String,
        max: u64,
    },

    /// 偏移、长度或索引落在视图的合法区间之外。
    #[error("the value of \"{argument}\" is out of range: must be {expected}, received {received}")]
    OutOfRange {
        argument: &'static str,
        expected: String,
        received: String,
    },

    /// 写入的数值超出目标宽度/符号性可表示的范围。
    #[error("the value of \"{argument}\" is out of range: must be >= {min} and <= {max}, received {received}")]
    ValueOutOfRange {
        argument: &'static str,
        min: String,
        max: String,
        received: String,
    },

    /// 编码名称无法经别名表解析。
    #[error("unknown encoding: {name}")]
    UnknownEncoding { name: String },

    /// 操作数不是受支持的字节视图或序列类型。
    #[error("the \"{argument}\" argument must be {expected}, received {received}")]
    TypeMismatch {
        argument: &'static str,
        expected: Cow<'static, str>,
        received: Cow<'static, str>,
    },

    /// 系统内存不足，底层存储无法分配。
    #[error("failed to allocate {requested} bytes")]
    AllocationFailed { requested: usize },

    /// 配置文本无法解析。
    #[error("invalid buffer configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// 无字段的错误分类，供调用方做 `match` 分支或打点。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferErrorKind {
    InvalidSize,
    OutOfRange,
    ValueOutOfRange,
    UnknownEncoding,
    TypeMismatch,
    AllocationFailed,
    InvalidConfig,
}

impl BufferError {
    /// 返回错误分类。
    pub fn kind(&self) -> BufferErrorKind {
        match self {
            BufferError::InvalidSize { .. } => BufferErrorKind::InvalidSize,
            BufferError::OutOfRange { .. } => BufferErrorKind::OutOfRange,
            BufferError::ValueOutOfRange { .. } => BufferErrorKind::ValueOutOfRange,
            BufferError::UnknownEncoding { .. } => BufferErrorKind::UnknownEncoding,
            BufferError::TypeMismatch { .. } => BufferErrorKind::TypeMismatch,
            BufferError::AllocationFailed { .. } => BufferErrorKind::AllocationFailed,
            BufferError::InvalidConfig { .. } => BufferErrorKind::InvalidConfig,
        }
    }

    /// 返回稳定的点分错误码，格式为 `buffer.<snake_case>`。
    pub fn code(&self) -> &'static str {
        match self.kind() {
            BufferErrorKind::InvalidSize => "buffer.invalid_size",
            BufferErrorKind::OutOfRange => "buffer.out_of_range",
            BufferErrorKind::ValueOutOfRange => "buffer.value_out_of_range",
            BufferErrorKind::UnknownEncoding => "buffer.unknown_encoding",
            BufferErrorKind::TypeMismatch => "buffer.type_mismatch",
            BufferErrorKind::AllocationFailed => "buffer.allocation_failed",
            BufferErrorKind::InvalidConfig => "buffer.invalid_config",
        }
    }

    /// 构造偏移/长度越界错误的便捷入口。
    pub(crate) fn out_of_range(
        argument: &'static str,
        expected: impl Into<String>,
        received: impl ToString,
    ) -> Self {
        BufferError::OutOfRange {
            argument,
            expected: expected.into(),
            received: received.to_string(),
        }
    }

    /// 构造数值越界错误的便捷入口。
    pub(crate) fn value_out_of_range(
        min: impl ToString,
        max: impl ToString,
        received: impl ToString,
    ) -> Self {
        BufferError::ValueOutOfRange {
            argument: "value",
            min: min.to_string(),
            max: max.to_string(),
            received: received.to_string(),
        }
    }

    /// 构造类型不符错误的便捷入口。
    pub(crate) fn type_mismatch(
        argument: &'static str,
        expected: impl Into<Cow<'static, str>>,
        received: impl Into<Cow<'static, str>>,
    ) -> Self {
        BufferError::TypeMismatch {
            argument,
            expected: expected.into(),
            received: received.into(),
        }
    }
}

/// 校验 `[offset, offset + width)` 落在长度为 `len` 的视图内。
///
/// 所有定宽访问共享这一检查，错误信息与 Node.js 的 `ERR_OUT_OF_RANGE` 文案对齐。
pub(crate) fn check_bounds(offset: usize, width: usize, len: usize) -> Result<()> {
    match len.checked_sub(width) {
        Some(last) if offset <= last => Ok(()),
        Some(last) => Err(BufferError::out_of_range(
            "offset",
            format!(">= 0 and <= {last}"),
            offset,
        )),
        None => Err(BufferError::out_of_range(
            "offset",
            format!("a view of at least {width} bytes"),
            format!("{offset} on a view of {len} bytes"),
        )),
    }
}
