#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spark_nodebuf::{Buffer, Encoding, is_utf8};

/// Fuzz 输入：一段任意文本与一段任意字节。
///
/// - **Why**：宽松解码器（`hex`/`base64`/`base64url`）要吞下任意脏输入而不 panic；
/// - **What**：同时校验 `byte_length` 对确定性编码给出精确长度，以及 `is_utf8` 与 UTF-8 解码结果一致。
#[derive(Debug, Arbitrary)]
struct DecodeCase {
    text: String,
    bytes: Vec<u8>,
}

fuzz_target!(|case: DecodeCase| {
    for encoding in Encoding::ALL {
        let decoded = encoding.to_bytes(&case.text);
        if matches!(
            encoding,
            Encoding::Utf8 | Encoding::Utf16Le | Encoding::Latin1 | Encoding::Ascii
        ) {
            assert_eq!(decoded.len(), encoding.byte_length(&case.text));
        }
        let _ = encoding.to_text(&case.bytes);
    }

    let hex = Encoding::Hex.to_text(&case.bytes);
    assert_eq!(Encoding::Hex.to_bytes(&hex), case.bytes);

    let buf = Buffer::from(case.bytes.clone());
    assert_eq!(buf.is_utf8(), is_utf8(&case.bytes));
    if buf.is_utf8() {
        assert_eq!(buf.decode(Encoding::Utf8).as_bytes(), &case.bytes[..]);
    } else {
        assert!(buf.decode(Encoding::Utf8).contains('\u{fffd}'));
    }
});
