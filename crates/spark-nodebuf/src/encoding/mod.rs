//! 文本编解码注册中心。
//!
//! # 模块定位（Why）
//! - 为字节视图提供 `utf8`、`utf16le`、`latin1`、`ascii`、`hex`、`base64`、`base64url` 七种无状态编解码；
//! - 名称解析大小写不敏感并经过别名表（`utf-8`、`ucs2`、`binary` 等），这是对外契约而非优化。
//!
//! # 方向约定（What）
//! - [`Encoding::to_bytes`]：文本 → 字节（对应 `Buffer.from(text, encoding)`）；
//! - [`Encoding::to_text`]：字节 → 文本（对应 `buf.toString(encoding)`）；
//! - 两个方向均不失败：非法输入按各编码的宽松规则截断或替换。

mod base64;
mod hex;
mod registry;
mod single_byte;
mod unicode;

use core::{fmt, str::FromStr};

use crate::error::{BufferError, Result};

pub use registry::ALIASES;

/// 已注册的规范编码。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Latin1,
    Ascii,
    Hex,
    Base64,
    Base64Url,
}

impl Encoding {
    /// 全部规范编码，按注册顺序排列。
    pub const ALL: [Encoding; 7] = [
        Encoding::Utf8,
        Encoding::Utf16Le,
        Encoding::Latin1,
        Encoding::Ascii,
        Encoding::Hex,
        Encoding::Base64,
        Encoding::Base64Url,
    ];

    /// 解析编码名称：先转小写，再查别名表；未知名称返回 [`BufferError::UnknownEncoding`]。
    pub fn resolve(name: &str) -> Result<Self> {
        registry::lookup(name).ok_or_else(|| BufferError::UnknownEncoding {
            name: name.to_owned(),
        })
    }

    /// 判断名称是否可被解析，等价于 `Buffer.isEncoding`。
    pub fn is_encoding(name: &str) -> bool {
        registry::lookup(name).is_some()
    }

    /// 规范名称。
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
            Encoding::Base64Url => "base64url",
        }
    }

    /// 将文本物化为字节序列。
    pub fn to_bytes(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Le => unicode::encode_utf16le(text),
            Encoding::Latin1 | Encoding::Ascii => single_byte::encode_low_bytes(text),
            Encoding::Hex => hex::decode_lenient(text),
            Encoding::Base64 => base64::decode_lenient(text, false),
            Encoding::Base64Url => base64::decode_lenient(text, true),
        }
    }

    /// 将字节序列渲染为文本。
    pub fn to_text(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Utf16Le => unicode::decode_utf16le(bytes),
            Encoding::Latin1 => single_byte::decode_latin1(bytes),
            Encoding::Ascii => single_byte::decode_ascii(bytes),
            Encoding::Hex => ::hex::encode(bytes),
            Encoding::Base64 => base64::encode(bytes, false),
            Encoding::Base64Url => base64::encode(bytes, true),
        }
    }

    /// 计算文本按本编码物化后的字节数，等价于 `Buffer.byteLength`。
    ///
    /// `base64`/`base64url` 采用与 Node.js 相同的估算公式：去掉末尾至多两个 `=` 后取 `len * 3 / 4`，
    /// 因此含空白的输入可能高估。
    pub fn byte_length(self, text: &str) -> usize {
        match self {
            Encoding::Utf8 => text.len(),
            Encoding::Utf16Le => text.encode_utf16().count() * 2,
            Encoding::Latin1 | Encoding::Ascii => text.encode_utf16().count(),
            Encoding::Hex => text.encode_utf16().count() >> 1,
            Encoding::Base64 | Encoding::Base64Url => base64::estimated_len(text),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = BufferError;

    fn from_str(name: &str) -> Result<Self> {
        Encoding::resolve(name)
    }
}
