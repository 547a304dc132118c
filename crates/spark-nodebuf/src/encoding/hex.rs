//! `hex` 解码：从头读取成对的十六进制字符，遇到第一个非法字符或落单字符即停止，返回已解析的部分。

pub(super) fn decode_lenient(text: &str) -> Vec<u8> {
    let valid = text.bytes().take_while(u8::is_ascii_hexdigit).count() & !1;
    // 前缀只含 ASCII，按字节下标切分不会落在字符中间。
    ::hex::decode(&text[..valid]).unwrap_or_default()
}
