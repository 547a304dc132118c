//! 定宽数值的有界编解码。
//!
//! # 模块定位（Why）
//! - 为 8/16/32/64 位整数与 IEEE-754 浮点提供大小端两种字节序的读写，是协议编解码层最常用的原语；
//! - 所有访问都先校验 `offset + width <= len`，越界返回 [`BufferError::OutOfRange`]。
//!
//! # 输入域（How）
//! - 32 位及以下的整数写入接收 `f64`（宿主 `number` 语义）：先按原始值做范围检查，再向零截断。
//!   例如 `write_u8(255.5)` 越界，而 `write_u8(1.7)` 写入 1；`NaN` 与无穷大一律视为越界；
//! - 64 位整数写入接收 `i128`，覆盖有符号与无符号的完整区间，读取返回 `u64`/`i64`，不受 53 位精度限制；
//! - 浮点写入直接接收 `f32`/`f64`，按位写出，不做额外舍入。
//!
//! # 契约（What）
//! - 写操作返回紧随字段之后的偏移，便于链式顺序写入；
//! - 数值检查先于偏移检查执行，与 Node.js 的报错顺序一致。

use crate::{
    buffer::Buffer,
    error::{BufferError, Result, check_bounds},
    storage::format_number,
};

/// 多字节字段的字节序。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Big,
    Little,
}

/// 将宿主数值转换为待写入的整数值。
///
/// 原始值必须落在 `[min, max]` 内（`NaN`、无穷大视为越界），随后向零截断。
/// 该函数是纯函数，独立于任何缓冲状态，可单独测试截断策略。
pub fn to_integral(value: f64, min: f64, max: f64) -> Result<f64> {
    if value.is_nan() || value < min || value > max {
        return Err(BufferError::value_out_of_range(
            format_number(min),
            format_number(max),
            format_number(value),
        ));
    }
    Ok(value.trunc())
}

fn check_i128(value: i128, min: i128, max: i128) -> Result<()> {
    if value < min || value > max {
        return Err(BufferError::value_out_of_range(min, max, value));
    }
    Ok(())
}

fn check_var_width(byte_length: usize) -> Result<()> {
    if (1..=6).contains(&byte_length) {
        Ok(())
    } else {
        Err(BufferError::out_of_range(
            "byteLength",
            ">= 1 and <= 6",
            byte_length,
        ))
    }
}

macro_rules! small_int_accessors {
    ($($ty:ty => $read_be:ident, $read_le:ident, $write_be:ident, $write_le:ident;)*) => {
        $(
            pub fn $read_be(&self, offset: usize) -> Result<$ty> {
                self.read_array(offset).map(<$ty>::from_be_bytes)
            }

            pub fn $read_le(&self, offset: usize) -> Result<$ty> {
                self.read_array(offset).map(<$ty>::from_le_bytes)
            }

            pub fn $write_be(&self, value: f64, offset: usize) -> Result<usize> {
                let value = to_integral(value, <$ty>::MIN as f64, <$ty>::MAX as f64)? as $ty;
                self.write_array(offset, value.to_be_bytes())
            }

            pub fn $write_le(&self, value: f64, offset: usize) -> Result<usize> {
                let value = to_integral(value, <$ty>::MIN as f64, <$ty>::MAX as f64)? as $ty;
                self.write_array(offset, value.to_le_bytes())
            }
        )*
    };
}

macro_rules! wide_int_accessors {
    ($($ty:ty => $read_be:ident, $read_le:ident, $write_be:ident, $write_le:ident;)*) => {
        $(
            pub fn $read_be(&self, offset: usize) -> Result<$ty> {
                self.read_array(offset).map(<$ty>::from_be_bytes)
            }

            pub fn $read_le(&self, offset: usize) -> Result<$ty> {
                self.read_array(offset).map(<$ty>::from_le_bytes)
            }

            pub fn $write_be(&self, value: i128, offset: usize) -> Result<usize> {
                check_i128(value, <$ty>::MIN as i128, <$ty>::MAX as i128)?;
                self.write_array(offset, (value as $ty).to_be_bytes())
            }

            pub fn $write_le(&self, value: i128, offset: usize) -> Result<usize> {
                check_i128(value, <$ty>::MIN as i128, <$ty>::MAX as i128)?;
                self.write_array(offset, (value as $ty).to_le_bytes())
            }
        )*
    };
}

macro_rules! float_accessors {
    ($($ty:ty => $read_be:ident, $read_le:ident, $write_be:ident, $write_le:ident;)*) => {
        $(
            pub fn $read_be(&self, offset: usize) -> Result<$ty> {
                self.read_array(offset).map(<$ty>::from_be_bytes)
            }

            pub fn $read_le(&self, offset: usize) -> Result<$ty> {
                self.read_array(offset).map(<$ty>::from_le_bytes)
            }

            pub fn $write_be(&self, value: $ty, offset: usize) -> Result<usize> {
                self.write_array(offset, value.to_be_bytes())
            }

            pub fn $write_le(&self, value: $ty, offset: usize) -> Result<usize> {
                self.write_array(offset, value.to_le_bytes())
            }
        )*
    };
}

impl Buffer {
    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        check_bounds(offset, N, self.len())?;
        Ok(self.with_bytes(|bytes| {
            let mut out = [0u8; N];
            out.copy_from_slice(&bytes[offset..offset + N]);
            out
        }))
    }

    fn write_array<const N: usize>(&self, offset: usize, value: [u8; N]) -> Result<usize> {
        check_bounds(offset, N, self.len())?;
        self.with_bytes_mut(|bytes| bytes[offset..offset + N].copy_from_slice(&value));
        Ok(offset + N)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.read_array::<1>(offset).map(|[b]| b)
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8> {
        self.read_array::<1>(offset).map(|[b]| b as i8)
    }

    /// 写入无符号 8 位整数，取值区间 `[0, 255]`。
    pub fn write_u8(&self, value: f64, offset: usize) -> Result<usize> {
        let value = to_integral(value, 0.0, 255.0)? as u8;
        self.write_array(offset, [value])
    }

    /// 写入有符号 8 位整数，取值区间 `[-128, 127]`。
    pub fn write_i8(&self, value: f64, offset: usize) -> Result<usize> {
        let value = to_integral(value, -128.0, 127.0)? as i8;
        self.write_array(offset, value.to_be_bytes())
    }

    small_int_accessors! {
        u16 => read_u16_be, read_u16_le, write_u16_be, write_u16_le;
        i16 => read_i16_be, read_i16_le, write_i16_be, write_i16_le;
        u32 => read_u32_be, read_u32_le, write_u32_be, write_u32_le;
        i32 => read_i32_be, read_i32_le, write_i32_be, write_i32_le;
    }

    wide_int_accessors! {
        u64 => read_u64_be, read_u64_le, write_u64_be, write_u64_le;
        i64 => read_i64_be, read_i64_le, write_i64_be, write_i64_le;
    }

    float_accessors! {
        f32 => read_f32_be, read_f32_le, write_f32_be, write_f32_le;
        f64 => read_f64_be, read_f64_le, write_f64_be, write_f64_le;
    }

    /// 按字节序读取 `byte_length`（1..=6）字节的无符号整数。
    pub fn read_uint(&self, offset: usize, byte_length: usize, order: ByteOrder) -> Result<u64> {
        check_var_width(byte_length)?;
        check_bounds(offset, byte_length, self.len())?;
        Ok(self.with_bytes(|bytes| {
            let field = &bytes[offset..offset + byte_length];
            let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
            match order {
                ByteOrder::Big => field.iter().fold(0, fold),
                ByteOrder::Little => field.iter().rev().fold(0, fold),
            }
        }))
    }

    /// 按字节序读取 `byte_length`（1..=6）字节的有符号整数，最高位做符号扩展。
    pub fn read_int(&self, offset: usize, byte_length: usize, order: ByteOrder) -> Result<i64> {
        let raw = self.read_uint(offset, byte_length, order)?;
        let shift = 64 - 8 * byte_length as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// 按字节序写入 `byte_length`（1..=6）字节的无符号整数，取值区间 `[0, 2^(8n) - 1]`。
    pub fn write_uint(
        &self,
        value: f64,
        offset: usize,
        byte_length: usize,
        order: ByteOrder,
    ) -> Result<usize> {
        check_var_width(byte_length)?;
        let max = ((1u64 << (8 * byte_length)) - 1) as f64;
        let value = to_integral(value, 0.0, max)? as u64;
        self.write_var(value, offset, byte_length, order)
    }

    /// 按字节序写入 `byte_length`（1..=6）字节的有符号整数，取值区间 `[-2^(8n-1), 2^(8n-1) - 1]`。
    pub fn write_int(
        &self,
        value: f64,
        offset: usize,
        byte_length: usize,
        order: ByteOrder,
    ) -> Result<usize> {
        check_var_width(byte_length)?;
        let half = (1i64 << (8 * byte_length - 1)) as f64;
        let value = to_integral(value, -half, half - 1.0)? as i64;
        self.write_var(value as u64, offset, byte_length, order)
    }

    fn write_var(
        &self,
        value: u64,
        offset: usize,
        byte_length: usize,
        order: ByteOrder,
    ) -> Result<usize> {
        check_bounds(offset, byte_length, self.len())?;
        let le = value.to_le_bytes();
        self.with_bytes_mut(|bytes| {
            let field = &mut bytes[offset..offset + byte_length];
            for (i, slot) in field.iter_mut().enumerate() {
                *slot = match order {
                    ByteOrder::Little => le[i],
                    ByteOrder::Big => le[byte_length - 1 - i],
                };
            }
        });
        Ok(offset + byte_length)
    }
}
