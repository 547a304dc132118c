//! # config 模块说明
//!
//! ## 角色定位（Why）
//! - 汇总缓冲核心仅有的两个可调参数：池 slab 大小与诊断预览的字节上限；
//! - 取代宿主环境里的全局可变设置：配置以值的形式注入分配器与 [`InspectOptions`]，
//!   调用方可以并存多套配置而互不影响。
//!
//! ## 契约（What）
//! - [`BufferConfig`] 派生 `serde`，可嵌入上层应用的配置结构；
//! - [`BufferConfig::from_toml_str`] 对每个键做与宿主设置相同的校验：
//!   非数值返回 [`BufferError::TypeMismatch`]，负数或 `NaN` 返回 [`BufferError::OutOfRange`]，
//!   小数向零截断，`inf` 视为不设上限；
//! - `pool_size` 另有上限 [`BufferConfig::MAX_POOL_SIZE`]，超出（含 `inf`）返回
//!   [`BufferError::OutOfRange`]，避免配置阶段接受、首次池化分配才失败；
//! - 未知键与语法错误统一归入 [`BufferError::InvalidConfig`]。

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::{
    error::{BufferError, Result},
    inspect::InspectOptions,
    storage::format_number,
};

/// 缓冲核心配置。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferConfig {
    /// 池化 slab 的字节数；`alloc_unsafe` 仅对小于其一半的请求走池。
    pub pool_size: usize,
    /// `inspect` 预览的最大字节数。
    pub inspect_max_bytes: usize,
}

impl BufferConfig {
    pub const DEFAULT_POOL_SIZE: usize = 8 * 1024;
    pub const DEFAULT_INSPECT_MAX_BYTES: usize = 50;
    /// 单个 slab 的最大字节数（1 GiB）。
    pub const MAX_POOL_SIZE: usize = 1 << 30;

    /// 从 TOML 文本加载配置，缺省键取默认值。
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: Table = text.parse().map_err(|err: toml::de::Error| BufferError::InvalidConfig {
            reason: err.message().to_owned(),
        })?;
        let mut config = Self::default();
        for (key, value) in &table {
            match key.as_str() {
                "pool_size" => config.pool_size = validate_pool_size(value)?,
                "inspect_max_bytes" => {
                    config.inspect_max_bytes = validate_setting("inspect_max_bytes", value)?;
                }
                other => {
                    return Err(BufferError::InvalidConfig {
                        reason: format!("unknown field `{other}`"),
                    });
                }
            }
        }
        tracing::debug!(
            pool_size = config.pool_size,
            inspect_max_bytes = config.inspect_max_bytes,
            "buffer configuration loaded"
        );
        Ok(config)
    }

    /// 渲染为 TOML 文本。
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| BufferError::InvalidConfig {
            reason: err.to_string(),
        })
    }

    /// 派生诊断预览选项。
    pub fn inspect_options(&self) -> InspectOptions {
        InspectOptions::new(self.inspect_max_bytes)
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            pool_size: Self::DEFAULT_POOL_SIZE,
            inspect_max_bytes: Self::DEFAULT_INSPECT_MAX_BYTES,
        }
    }
}

/// 校验一个原始设置值并转换为非负整数。
///
/// 纯函数，不读取也不修改任何全局状态。
pub fn validate_setting(name: &'static str, value: &Value) -> Result<usize> {
    match value {
        Value::Integer(n) => usize::try_from(*n)
            .map_err(|_| BufferError::out_of_range(name, ">= 0", n)),
        Value::Float(f) => setting_from_number(name, *f),
        other => Err(BufferError::type_mismatch(
            name,
            "of type number",
            format!("type {}", other.type_str()),
        )),
    }
}

fn validate_pool_size(value: &Value) -> Result<usize> {
    let size = validate_setting("pool_size", value)?;
    if size > BufferConfig::MAX_POOL_SIZE {
        return Err(BufferError::out_of_range(
            "pool_size",
            format!("<= {}", BufferConfig::MAX_POOL_SIZE),
            value,
        ));
    }
    Ok(size)
}

/// 宿主数值到设置值：`NaN` 与负数越界，正无穷饱和到 `usize::MAX`，小数向零截断。
pub(crate) fn setting_from_number(name: &'static str, value: f64) -> Result<usize> {
    if value.is_nan() || value < 0.0 {
        return Err(BufferError::out_of_range(name, ">= 0", format_number(value)));
    }
    if value >= usize::MAX as f64 {
        return Ok(usize::MAX);
    }
    Ok(value.trunc() as usize)
}
