use std::collections::HashMap;

use uuid::Uuid;

use crate::models::FileRecord;

/// Reconstruct the RAW-rooted file forest from a flat row set.
///
/// One pass indexes every record by uuid; a second pass attaches each
/// non-RAW record to its parent's `children` in input order. Only RAW
/// records are returned at the top level. A record whose parent is absent
/// from the working set is logged and dropped, never an error.
///
/// The tree is strictly two levels (RAW → transformed): a record whose
/// parent is itself transformed is dropped like an orphan. RAW records
/// never move out of their slots, so attachment does not depend on input
/// order; the root set and every children list come out the same for any
/// permutation of the rows, with children keeping their relative input
/// order.
pub fn build_file_tree(records: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut index_of: HashMap<Uuid, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        index_of.insert(record.uuid, i);
    }

    let mut slots: Vec<Option<FileRecord>> = records
        .into_iter()
        .map(|mut r| {
            r.children.clear();
            Some(r)
        })
        .collect();

    for i in 0..slots.len() {
        let (uuid, is_raw, parent_uuid) = match &slots[i] {
            Some(r) => (r.uuid, r.is_raw(), r.parent_uuid),
            None => continue,
        };
        if is_raw {
            continue;
        }

        let raw_parent = parent_uuid
            .and_then(|p| index_of.get(&p).copied())
            .filter(|&pi| pi != i && slots[pi].as_ref().is_some_and(FileRecord::is_raw));
        match raw_parent {
            Some(pi) => {
                let child = slots[i].take();
                if let (Some(child), Some(parent)) = (child, slots[pi].as_mut()) {
                    parent.children.push(child);
                }
            }
            None => {
                tracing::warn!(
                    file = %uuid,
                    parent = ?parent_uuid,
                    "transformed file has no RAW parent in the set, dropping from tree"
                );
                slots[i] = None;
            }
        }
    }

    slots
        .into_iter()
        .flatten()
        .filter(|r| r.is_raw())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RAW_CATEGORY;
    use chrono::Utc;

    fn record(uuid: Uuid, category: &str, parent: Option<Uuid>) -> FileRecord {
        FileRecord {
            uuid,
            owner_id: Uuid::new_v4(),
            original_filename: format!("{category}.pdf").to_lowercase(),
            blob_name: format!("user_x/{uuid}.pdf"),
            size: 100,
            mime_type: "application/pdf".to_string(),
            category: category.to_string(),
            module_name: "Networking".to_string(),
            parent_uuid: parent,
            uploaded_at: Utc::now(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_raw_records_become_roots() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let tree = build_file_tree(vec![
            record(a, RAW_CATEGORY, None),
            record(b, RAW_CATEGORY, None),
        ]);
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|r| r.children.is_empty()));
    }

    #[test]
    fn test_children_attach_to_their_raw_parent() {
        let raw = Uuid::new_v4();
        let summary = Uuid::new_v4();
        let quiz = Uuid::new_v4();
        let tree = build_file_tree(vec![
            record(raw, RAW_CATEGORY, None),
            record(summary, "SUMMARY", Some(raw)),
            record(quiz, "QUIZ", Some(raw)),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].uuid, raw);
        // Children follow input order
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].uuid, summary);
        assert_eq!(tree[0].children[1].uuid, quiz);
    }

    #[test]
    fn test_orphan_with_missing_parent_is_dropped() {
        let raw = Uuid::new_v4();
        let orphan = Uuid::new_v4();
        let tree = build_file_tree(vec![
            record(raw, RAW_CATEGORY, None),
            record(orphan, "SUMMARY", Some(Uuid::new_v4())),
        ]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_non_raw_with_null_parent_is_dropped() {
        let raw = Uuid::new_v4();
        let dangling = Uuid::new_v4();
        let tree = build_file_tree(vec![
            record(raw, RAW_CATEGORY, None),
            record(dangling, "SUMMARY", None),
        ]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_every_record_appears_exactly_once() {
        let raw1 = Uuid::new_v4();
        let raw2 = Uuid::new_v4();
        let child1 = Uuid::new_v4();
        let child2 = Uuid::new_v4();
        let tree = build_file_tree(vec![
            record(child1, "SUMMARY", Some(raw1)),
            record(raw1, RAW_CATEGORY, None),
            record(raw2, RAW_CATEGORY, None),
            record(child2, "QUIZ", Some(raw2)),
        ]);
        let mut seen: Vec<Uuid> = Vec::new();
        for root in &tree {
            seen.push(root.uuid);
            for child in &root.children {
                seen.push(child.uuid);
            }
        }
        seen.sort();
        let mut expected = vec![raw1, raw2, child1, child2];
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_rebuilding_same_input_is_idempotent() {
        let raw = Uuid::new_v4();
        let child = Uuid::new_v4();
        let input = vec![
            record(raw, RAW_CATEGORY, None),
            record(child, "SUMMARY", Some(raw)),
        ];
        let first = build_file_tree(input.clone());
        let second = build_file_tree(input);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_root_set_insensitive_to_input_order() {
        let raw = Uuid::new_v4();
        let child = Uuid::new_v4();
        let forward = build_file_tree(vec![
            record(raw, RAW_CATEGORY, None),
            record(child, "SUMMARY", Some(raw)),
        ]);
        let reversed = build_file_tree(vec![
            record(child, "SUMMARY", Some(raw)),
            record(raw, RAW_CATEGORY, None),
        ]);
        assert_eq!(forward.len(), 1);
        assert_eq!(reversed.len(), 1);
        assert_eq!(forward[0].children.len(), 1);
        assert_eq!(reversed[0].children.len(), 1);
    }

    #[test]
    fn test_transform_of_transform_dropped_in_any_order() {
        // A chain raw <- child <- grandchild must yield the same two-node
        // tree whether the rows arrive newest-first or oldest-first: the
        // grandchild's parent is not RAW, so it is dropped either way.
        let raw = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();

        let newest_first = build_file_tree(vec![
            record(grandchild, "QUIZ", Some(child)),
            record(child, "SUMMARY", Some(raw)),
            record(raw, RAW_CATEGORY, None),
        ]);
        let oldest_first = build_file_tree(vec![
            record(raw, RAW_CATEGORY, None),
            record(child, "SUMMARY", Some(raw)),
            record(grandchild, "QUIZ", Some(child)),
        ]);

        for tree in [&newest_first, &oldest_first] {
            assert_eq!(tree.len(), 1);
            assert_eq!(tree[0].uuid, raw);
            assert_eq!(tree[0].children.len(), 1);
            assert_eq!(tree[0].children[0].uuid, child);
            assert!(tree[0].children[0].children.is_empty());
        }
    }

    #[test]
    fn test_self_referencing_record_is_dropped() {
        let raw = Uuid::new_v4();
        let weird = Uuid::new_v4();
        let tree = build_file_tree(vec![
            record(raw, RAW_CATEGORY, None),
            record(weird, "SUMMARY", Some(weird)),
        ]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }
}
