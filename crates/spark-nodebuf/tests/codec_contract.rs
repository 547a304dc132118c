//! `codec_contract` 集成测试：编码注册中心的公开契约。
//!
//! # 测试目标（Why）
//! - 编码名称大小写不敏感、别名可解析，是调用方依赖的契约；
//! - `base64url` 对填充、空白与字母表的宽松解码直接影响与外部系统的互通；
//! - 二进制安全编码（`hex`/`base64`/`base64url`/`latin1`）必须对任意字节无损往返。
//!
//! # 结构安排（How）
//! - 固定用例覆盖名称解析、宽松解码与 UTF-16 代理对；
//! - `proptest` 覆盖任意字节与任意 Unicode 文本的往返。

use proptest::prelude::*;
use spark_nodebuf::{ALIASES, Buffer, BufferErrorKind, Encoding};

#[test]
fn names_resolve_case_insensitively_through_aliases() {
    assert_eq!(Encoding::resolve("HEX"), Encoding::resolve("hex"));
    assert_eq!(Encoding::resolve("Hex"), Ok(Encoding::Hex));
    assert_eq!(Encoding::resolve("Base64URL"), Ok(Encoding::Base64Url));
    assert_eq!(Encoding::resolve("UCS-2"), Ok(Encoding::Utf16Le));
    assert_eq!(Encoding::resolve("binary"), Ok(Encoding::Latin1));
    assert_eq!("utf-8".parse::<Encoding>(), Ok(Encoding::Utf8));
    for (alias, encoding) in ALIASES {
        assert_eq!(Encoding::resolve(&alias.to_uppercase()), Ok(encoding), "alias {alias}");
    }
}

#[test]
fn unknown_names_are_errors() {
    let err = Encoding::resolve("utf 8").expect_err("含空格的名称不做清洗");
    assert_eq!(err.kind(), BufferErrorKind::UnknownEncoding);
    assert_eq!(err.code(), "buffer.unknown_encoding");
    assert!(!Encoding::is_encoding("latin-1"));
    assert!(Buffer::from_text("abc", "rot13").is_err());
}

#[test]
fn base64url_decoding_is_lenient() {
    for input in ["YWJj", "YWJj==", "Y W J j"] {
        let buf = Buffer::from_text(input, "base64url").expect("宽松解码");
        assert_eq!(buf.to_vec(), b"abc", "input {input:?}");
    }
    let url = Buffer::from_text("_-8", "base64url").expect("url 字母表");
    let standard = Buffer::from_text("/+8", "base64").expect("标准字母表");
    assert_eq!(url, standard);
}

#[test]
fn utf16le_emits_surrogate_pairs() {
    let buf = Buffer::from_text("a😀", "ucs2").expect("编码");
    assert_eq!(buf.to_vec(), vec![0x61, 0x00, 0x3d, 0xd8, 0x00, 0xde]);
    assert_eq!(Encoding::Utf16Le.byte_length("a😀"), 6);
    assert_eq!(buf.to_text("utf16le", 0, buf.len()), Ok("a😀".to_owned()));
}

#[test]
fn latin1_keeps_only_low_bytes() {
    let buf = Buffer::from_text("ÿĀ", "latin1").expect("编码");
    assert_eq!(buf.to_vec(), vec![0xff, 0x00]);
    assert_eq!(buf.decode(Encoding::Latin1), "ÿ\u{0}");
}

#[test]
fn lossy_decoders_replace_malformed_input() {
    let buf = Buffer::from(vec![b'o', 0xff, b'k']);
    assert_eq!(buf.decode(Encoding::Utf8), "o\u{fffd}k");
    assert_eq!(buf.decode(Encoding::Ascii), "o\u{7f}k");
    assert_eq!(buf.decode(Encoding::Hex), "6fff6b");
}

#[test]
fn byte_length_estimates_match_node() {
    assert_eq!(Encoding::Utf8.byte_length("€"), 3);
    assert_eq!(Encoding::Hex.byte_length("abc"), 1);
    assert_eq!(Encoding::Base64.byte_length("YWJj"), 3);
    assert_eq!(Encoding::Base64.byte_length("YQ=="), 1);
}

proptest! {
    #[test]
    fn prop_binary_safe_codecs_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..96)) {
        for encoding in [Encoding::Hex, Encoding::Base64, Encoding::Base64Url, Encoding::Latin1] {
            let text = encoding.to_text(&bytes);
            prop_assert_eq!(encoding.to_bytes(&text), bytes.clone(), "encoding {}", encoding);
        }
    }

    #[test]
    fn prop_unicode_codecs_round_trip_text(text in any::<String>()) {
        for encoding in [Encoding::Utf8, Encoding::Utf16Le] {
            let bytes = encoding.to_bytes(&text);
            prop_assert_eq!(bytes.len(), encoding.byte_length(&text));
            prop_assert_eq!(encoding.to_text(&bytes), text.clone());
        }
    }
}
