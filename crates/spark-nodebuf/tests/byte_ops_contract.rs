//! `byte_ops_contract` 集成测试：复制、填充、比较与拼接。
//!
//! # 测试目标（Why）
//! - 重叠复制是最容易出错的路径：自身子视图之间的复制必须具有 memmove 语义；
//! - 比较的字典序与类型检查决定了排序与去重逻辑能否信任 `Buffer`。

use core::cmp::Ordering;

use proptest::prelude::*;
use spark_nodebuf::{Buffer, BufferErrorKind, Encoding, FillValue, TypedSlice};

#[test]
fn overlapping_copy_behaves_like_memmove() {
    let a = Buffer::from(vec![1, 2, 3, 4, 5, 6]);
    let x = a.subarray(1, 5);
    let copied = x.copy_to(&a, 2, 0, 3).expect("重叠复制");
    assert_eq!(copied, 3);
    assert_eq!(a.to_vec(), vec![1, 2, 2, 3, 4, 6]);
}

#[test]
fn backward_overlap_is_also_safe() {
    let a = Buffer::from(vec![1, 2, 3, 4, 5, 6]);
    a.copy_to(&a.subarray(0, 6), 0, 2, 6).expect("向前搬移");
    assert_eq!(a.to_vec(), vec![3, 4, 5, 6, 5, 6]);
}

#[test]
fn fill_bounds_are_enforced() {
    let buf = Buffer::alloc(10).expect("分配");
    let err = buf.fill(0xffu8, 5, 20).expect_err("end 越界");
    assert_eq!(err.kind(), BufferErrorKind::OutOfRange);
    assert_eq!(buf.to_vec(), vec![0; 10]);
    buf.fill(FillValue::Text("AQI=", Encoding::Base64), 0, 5).expect("base64 模式");
    assert_eq!(buf.to_vec()[..5], [1, 2, 1, 2, 1]);
}

#[test]
fn fill_from_aliased_buffer_pattern() {
    let buf = Buffer::from(vec![7, 8, 0, 0, 0]);
    let head = buf.subarray(0, 2);
    buf.fill(&head, 2, 5).expect("以自身子视图为模式");
    assert_eq!(buf.to_vec(), vec![7, 8, 7, 8, 7]);
}

#[test]
fn compare_orders_by_bytes_then_length() {
    let a = Buffer::from(vec![1, 2, 3]);
    let b = Buffer::from(vec![1, 2]);
    let c = Buffer::from(vec![1, 3]);
    assert_eq!(b.compare(&a), Ordering::Less);
    assert_eq!(a.compare(&c), Ordering::Less);
    assert_eq!(a.compare(&Buffer::copy_of(&a)), Ordering::Equal);
    let mut list = vec![c.clone(), a.clone(), b.clone()];
    list.sort_by(Buffer::compare);
    assert_eq!(list, vec![b, a, c]);
}

#[test]
fn typed_comparisons_accept_only_octet_views() {
    let buf = Buffer::from(vec![1, 0]);
    assert_eq!(buf.compare_typed(TypedSlice::U8(&[1, 1])), Ok(Ordering::Less));
    assert_eq!(buf.equals_typed(TypedSlice::Buffer(&buf.subarray(0, 2))), Ok(true));
    for other in [TypedSlice::I8(&[1, 0]), TypedSlice::U16(&[1]), TypedSlice::F32(&[1.0])] {
        let err = buf.compare_typed(other).expect_err("非字节类型");
        assert_eq!(err.kind(), BufferErrorKind::TypeMismatch);
    }
}

#[test]
fn concat_yields_independent_storage() {
    let a = Buffer::from(vec![1, 2]);
    let joined = Buffer::concat(&[a.clone(), a.subarray(1, 2)], None).expect("拼接");
    assert_eq!(joined.to_vec(), vec![1, 2, 2]);
    joined.set(0, 9).expect("写入结果");
    assert_eq!(a.get(0), Ok(1));
}

#[test]
fn reverse_and_swap_chain() {
    let buf = Buffer::from((1u8..=8).collect::<Vec<_>>());
    buf.swap64().expect("swap64").reverse();
    assert_eq!(buf.to_vec(), (1u8..=8).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn prop_compare_matches_slice_ordering(
        a in proptest::collection::vec(any::<u8>(), 0..16),
        b in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        let left = Buffer::from(a.clone());
        let right = Buffer::from(b.clone());
        prop_assert_eq!(left.compare(&right), a.cmp(&b));
        prop_assert_eq!(left.equals(&right), a == b);
    }

    #[test]
    fn prop_self_copy_matches_copy_within(
        bytes in proptest::collection::vec(any::<u8>(), 1..32),
        src in 0usize..32,
        len in 0usize..32,
        dst in 0usize..32,
    ) {
        let n = bytes.len();
        let src = src % n;
        let dst = dst % n;
        let count = len.min(n - src).min(n - dst);
        let mut expected = bytes.clone();
        expected.copy_within(src..src + count, dst);

        let buf = Buffer::from(bytes);
        let copied = buf.copy_to(&buf, dst, src, src + count).expect("自复制");
        prop_assert_eq!(copied, count);
        prop_assert_eq!(buf.to_vec(), expected);
    }
}
