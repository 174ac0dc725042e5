// src/capture/order.rs
// Export ordering over captured records. Three tiers, in this priority:
//   1. both turn indexes known: turn index, then DOM position
//   2. DOM positions further apart than the noise threshold: DOM position
//   3. capture timestamp
// The comparator is not transitive across tiers, so the sort is a hand-rolled
// stable merge sort that only ever asks "is b strictly before a?" and never panics.

use std::cmp::Ordering;

use crate::config::consts::POSITION_NOISE_PX;

use super::CapturedMessage;

pub fn compare(a: &CapturedMessage, b: &CapturedMessage) -> Ordering {
    if let (Some(ta), Some(tb)) = (a.turn_index, b.turn_index) {
        return ta.cmp(&tb).then_with(|| a.dom_position.total_cmp(&b.dom_position));
    }
    if (a.dom_position - b.dom_position).abs() > POSITION_NOISE_PX {
        return a.dom_position.total_cmp(&b.dom_position);
    }
    a.captured_at_millis.cmp(&b.captured_at_millis)
}

/// Records in export order. Input order breaks ties.
pub fn order_messages(records: &[CapturedMessage]) -> Vec<CapturedMessage> {
    let mut idx: Vec<usize> = (0..records.len()).collect();
    merge_sort(&mut idx, &|x, y| compare(&records[x], &records[y]));
    idx.into_iter().map(|i| records[i].clone()).collect()
}

fn merge_sort<F>(v: &mut Vec<usize>, cmp: &F)
where
    F: Fn(usize, usize) -> Ordering,
{
    if v.len() <= 1 {
        return;
    }
    let mut right = v.split_off(v.len() / 2);
    merge_sort(v, cmp);
    merge_sort(&mut right, cmp);

    let left = std::mem::take(v);
    v.reserve(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        // take from the right only when strictly smaller: keeps equal runs stable
        if cmp(right[j], left[i]) == Ordering::Less {
            v.push(right[j]);
            j += 1;
        } else {
            v.push(left[i]);
            i += 1;
        }
    }
    v.extend_from_slice(&left[i..]);
    v.extend_from_slice(&right[j..]);
}
