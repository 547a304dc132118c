//! `latin1` 与 `ascii`：每个 UTF-16 码元截断为低 8 位写入，超出 0xFF 的码点有损。

pub(super) fn encode_low_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().map(|unit| unit as u8).collect()
}

pub(super) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

/// 解码前清除每个字节的最高位。
pub(super) fn decode_ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(b & 0x7f)).collect()
}
