//! `base64` / `base64url` 编解码。
//!
//! 编码方向直接复用 `base64` crate 的通用引擎：`base64` 带填充，`base64url` 不带填充。
//! 解码方向是宽松的：
//! - 忽略空白与不属于字母表的字符；
//! - 遇到第一个 `=` 即停止；
//! - `base64url` 同时接受 `-`/`_` 与 `+`/`/`，`base64` 只接受标准字母表；
//! - 余下字符数模 4 为 1 时丢弃最后一个字符（不足以构成一个字节）。

use base64::{
    Engine,
    alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig,
        general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    },
};

/// 清洗后的输入只包含标准字母表且无填充，允许末尾残余比特。
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

pub(super) fn encode(bytes: &[u8], url_safe: bool) -> String {
    if url_safe {
        URL_SAFE_NO_PAD.encode(bytes)
    } else {
        STANDARD.encode(bytes)
    }
}

pub(super) fn decode_lenient(text: &str, url_safe: bool) -> Vec<u8> {
    let mut cleaned = String::with_capacity(text.len());
    for byte in text.bytes() {
        let normalized = match byte {
            b'=' => break,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => byte,
            b'-' if url_safe => b'+',
            b'_' if url_safe => b'/',
            _ => continue,
        };
        cleaned.push(char::from(normalized));
    }
    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }
    match LENIENT.decode(cleaned.as_bytes()) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::trace!(error = %err, "lenient base64 decode rejected sanitized input");
            Vec::new()
        }
    }
}

pub(super) fn estimated_len(text: &str) -> usize {
    let mut len = text.encode_utf16().count();
    let tail = text.as_bytes();
    if tail.last() == Some(&b'=') {
        len -= 1;
        if len > 1 && tail.get(tail.len().wrapping_sub(2)) == Some(&b'=') {
            len -= 1;
        }
    }
    (len * 3) >> 2
}
