//! `utf16le` 编解码：每个 UTF-16 码元 2 字节，BMP 之外的字符以代理对写出共 4 字节。

pub(super) fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// 末尾落单字节被丢弃；孤立代理替换为 U+FFFD。
pub(super) fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
