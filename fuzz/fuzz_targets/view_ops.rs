#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spark_nodebuf::Buffer;

/// Fuzz 指令：针对同一块存储上的两个别名视图执行字节操作。
///
/// - **Why**：重叠复制与别名写入是最容易出错的路径，用一份 `Vec<u8>` 影子模型逐步对照；
/// - **How**：`left`/`right` 为同一存储上的两个随机窗口，每条指令作用于其中一个，
///   执行后整块存储必须与模型逐字节一致。
#[derive(Debug, Arbitrary)]
struct ViewCase {
    initial: Vec<u8>,
    left: (u8, u8),
    right: (u8, u8),
    ops: Vec<ViewOp>,
}

#[derive(Debug, Arbitrary)]
enum ViewOp {
    CopyLeftToRight { target_start: u8, source_start: u8, source_end: u8 },
    FillRight { value: u8, start: u8, end: u8 },
    ReverseLeft,
    SetRight { index: u8, value: u8 },
    FindInWhole { needle_start: u8, needle_len: u8 },
}

fuzz_target!(|case: ViewCase| {
    if case.initial.is_empty() {
        return;
    }
    let mut model = case.initial.clone();
    let whole = Buffer::from(case.initial);
    let window = |(a, b): (u8, u8)| {
        let (a, b) = (usize::from(a) % model.len(), usize::from(b) % (model.len() + 1));
        (a, b.max(a))
    };
    let (l0, l1) = window(case.left);
    let (r0, r1) = window(case.right);
    let left = whole.subarray(l0 as isize, l1 as isize);
    let right = whole.subarray(r0 as isize, r1 as isize);

    for op in case.ops {
        match op {
            ViewOp::CopyLeftToRight { target_start, source_start, source_end } => {
                let (ts, ss, se) = (
                    usize::from(target_start),
                    usize::from(source_start),
                    usize::from(source_end),
                );
                let result = left.copy_to(&right, ts, ss, se);
                if ss > left.len() {
                    assert!(result.is_err());
                    continue;
                }
                let se = se.min(left.len());
                let count = if ts >= right.len() || ss >= se {
                    0
                } else {
                    (se - ss).min(right.len() - ts)
                };
                assert_eq!(result, Ok(count));
                model.copy_within(l0 + ss..l0 + ss + count, r0 + ts);
            }
            ViewOp::FillRight { value, start, end } => {
                let (start, end) = (usize::from(start), usize::from(end));
                let result = right.fill(value, start, end);
                if end > right.len() {
                    assert!(result.is_err());
                } else if start < end {
                    model[r0 + start..r0 + end].fill(value);
                }
            }
            ViewOp::ReverseLeft => {
                left.reverse();
                model[l0..l1].reverse();
            }
            ViewOp::SetRight { index, value } => {
                let index = usize::from(index);
                let ok = right.set(index, value).is_ok();
                assert_eq!(ok, index < right.len());
                if ok {
                    model[r0 + index] = value;
                }
            }
            ViewOp::FindInWhole { needle_start, needle_len } => {
                let start = usize::from(needle_start) % model.len();
                let end = (start + usize::from(needle_len)).min(model.len());
                let needle = model[start..end].to_vec();
                let expected = if needle.is_empty() {
                    Some(0)
                } else {
                    model.windows(needle.len()).position(|w| w == &needle[..])
                };
                assert_eq!(whole.index_of(&needle[..], 0), expected);
            }
        }
        assert_eq!(whole.to_vec(), model);
    }
});
