//! `view_aliasing` 集成测试：验证视图共享存储的契约。
//!
//! # 测试目标（Why）
//! - 子视图与源视图互相可见写入是 `Buffer` 的核心语义，一旦退化为复制，上层协议的原地改写会静默失效；
//! - `copy_of` 与 `from_storage` 分别代表“复制”与“共享”两种构造，必须保持区分。
//!
//! # 结构安排（How）
//! - 固定场景覆盖 `subarray` 双向写入、负下标与外部存储共享；
//! - `proptest` 在随机区间上断言 `sub[i]` 与 `buf[start + i]` 始终一致。

use proptest::prelude::*;
use spark_nodebuf::{Buffer, Storage};

#[test]
fn writes_through_subview_reach_the_source() {
    let buf = Buffer::from(vec![1, 2, 3, 4, 5]);
    let s = buf.subarray(1, 4);
    s.set(0, 99).expect("写入子视图");
    assert_eq!(buf.get(1), Ok(99));
    buf.set(2, 77).expect("写入源视图");
    assert_eq!(s.get(1), Ok(77));
}

#[test]
fn nested_subviews_compose_offsets() {
    let buf = Buffer::from((0u8..10).collect::<Vec<_>>());
    let outer = buf.subarray(2, 9);
    let inner = outer.subarray(-3, -1);
    assert_eq!(inner.byte_offset(), 6);
    assert_eq!(inner.to_vec(), vec![6, 7]);
    inner.fill_all(0xaau8).expect("填充内层视图");
    assert_eq!(buf.to_vec()[6..8], [0xaa, 0xaa]);
}

#[test]
fn shared_storage_views_observe_each_other() {
    let storage = Storage::allocate(8, true).expect("分配存储");
    let left = Buffer::from_storage(storage.clone(), 0, 4).expect("左视图");
    let whole = Buffer::from_whole_storage(storage.clone());
    left.write_u32_be(0xdead_beef_u32 as f64, 0).expect("写入");
    assert_eq!(whole.read_u32_be(0), Ok(0xdead_beef));
    assert_eq!(storage.handle_count(), 3);
    drop(left);
    assert_eq!(storage.handle_count(), 2);
}

#[test]
fn copies_and_clones_differ() {
    let buf = Buffer::from(vec![1, 2, 3]);
    let clone = buf.clone();
    let copy = Buffer::copy_of(&buf);
    buf.set(0, 9).expect("写入");
    assert_eq!(clone.get(0), Ok(9));
    assert_eq!(copy.get(0), Ok(1));
    assert_eq!(clone, buf);
    assert_ne!(copy, buf);
}

proptest! {
    #[test]
    fn prop_subview_indices_map_onto_source(
        bytes in proptest::collection::vec(any::<u8>(), 1..64),
        a in 0usize..64,
        b in 0usize..64,
        value in any::<u8>(),
    ) {
        let buf = Buffer::from(bytes.clone());
        let start = a.min(bytes.len());
        let end = b.min(bytes.len()).max(start);
        let sub = buf.subarray(start as isize, end as isize);
        prop_assert_eq!(sub.len(), end - start);
        for i in 0..sub.len() {
            prop_assert_eq!(sub.get(i), buf.get(start + i));
        }
        if !sub.is_empty() {
            let i = sub.len() - 1;
            sub.set(i, value).expect("写入末字节");
            prop_assert_eq!(buf.get(start + i), Ok(value));
        }
    }
}
