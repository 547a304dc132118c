use super::Encoding;

/// 别名表：键一律为小写形式，进程内静态注册一次。
pub static ALIASES: [(&str, Encoding); 12] = [
    ("utf8", Encoding::Utf8),
    ("utf-8", Encoding::Utf8),
    ("utf16le", Encoding::Utf16Le),
    ("utf-16le", Encoding::Utf16Le),
    ("ucs2", Encoding::Utf16Le),
    ("ucs-2", Encoding::Utf16Le),
    ("latin1", Encoding::Latin1),
    ("binary", Encoding::Latin1),
    ("ascii", Encoding::Ascii),
    ("hex", Encoding::Hex),
    ("base64", Encoding::Base64),
    ("base64url", Encoding::Base64Url),
];

/// 大小写不敏感地查找编码；除大小写外不做任何裁剪。
pub(super) fn lookup(name: &str) -> Option<Encoding> {
    // 常见写法直接命中，避免为小写化分配。
    if let Some(found) = find(name) {
        return Some(found);
    }
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        return find(&name.to_ascii_lowercase());
    }
    None
}

fn find(name: &str) -> Option<Encoding> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, encoding)| *encoding)
}
