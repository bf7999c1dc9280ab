use crate::common::Rid;
use crate::index::tree::DataEntry;

/// Turns raw `(key, rid)` pairs into leaves ready for
/// [`Tree::bulk_load`](crate::index::Tree::bulk_load): sorted by key,
/// duplicate keys merged into one entry, at most `2 * order` entries
/// per leaf.
///
/// The sort is stable, so rids of a duplicated key keep the order in
/// which they were collected.
pub fn build_leaves(mut pairs: Vec<(i32, Rid)>, order: usize) -> Vec<Vec<DataEntry>> {
    pairs.sort_by_key(|(key, _)| *key);

    let mut entries: Vec<DataEntry> = Vec::new();
    for (key, rid) in pairs {
        match entries.last_mut() {
            Some(entry) if entry.key == key => entry.rids.push(rid),
            _ => entries.push(DataEntry {
                key,
                rids: vec![rid],
            }),
        }
    }

    let capacity = 2 * order;
    let mut leaves = Vec::new();
    let mut current = Vec::with_capacity(capacity);
    for entry in entries {
        if current.len() == capacity {
            leaves.push(std::mem::take(&mut current));
        }
        current.push(entry);
    }
    if !current.is_empty() {
        leaves.push(current);
    }
    leaves
}
