//! Property-based tests for queue identity, removal and field grouping

use std::collections::HashSet;

use openfield_collect::egui_app::bridge::FormSnapshot;
use openfield_collect::egui_app::offline::{MemoryStorage, OfflineQueue};
use openfield_collect::shared::FieldValue;
use proptest::prelude::*;

use super::block_on;
use crate::common::visit;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_enqueue_keeps_order_and_unique_ids(names in prop::collection::vec("[a-z]{1,8}", 1..12)) {
        let entries = block_on(async {
            let queue = OfflineQueue::open(MemoryStorage::new(), "prop").await;
            for name in &names {
                queue.enqueue(visit(name, "Clinic"), None).await;
            }
            queue.entries().await
        });

        let ids: HashSet<_> = entries.iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(ids.len(), names.len());
        let order: Vec<_> = entries.iter().map(|e| e.meta.enumerator.clone()).collect();
        prop_assert_eq!(order, names);
    }

    #[test]
    fn test_remove_keeps_survivors_in_order(keep in prop::collection::vec(any::<bool>(), 1..12)) {
        let (survivors, expected) = block_on(async {
            let queue = OfflineQueue::open(MemoryStorage::new(), "prop").await;
            let mut expected = Vec::new();
            let mut doomed = Vec::new();
            for (index, kept) in keep.iter().enumerate() {
                let entry = queue.enqueue(visit(&index.to_string(), "Clinic"), None).await;
                if *kept {
                    expected.push(entry.id);
                } else {
                    doomed.push(entry.id);
                }
            }
            for id in &doomed {
                queue.remove(id).await;
            }
            let survivors: Vec<_> = queue.entries().await.into_iter().map(|e| e.id).collect();
            (survivors, expected)
        });

        prop_assert_eq!(survivors, expected);
    }

    #[test]
    fn test_repeated_names_group_in_order(values in prop::collection::vec("[a-z0-9]{1,6}", 1..6)) {
        let mut snapshot = FormSnapshot::new();
        for value in &values {
            snapshot.push("services", value.clone());
        }
        let submission = snapshot.to_fields();

        let expected = if values.len() == 1 {
            FieldValue::Scalar(values[0].clone())
        } else {
            FieldValue::List(values.clone())
        };
        prop_assert_eq!(submission.get("services"), Some(&expected));
    }
}
