//! Property-based tests for drain delivery rules
//!
//! Random queues mix failing deliveries, entries already in flight and entries
//! withdrawn while the drain runs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use openfield_collect::egui_app::offline::{EntryStatus, MemoryStorage, OfflineQueue};
use openfield_collect::egui_app::sync::{DeliveryError, IngestTransport, SyncEngine};
use openfield_collect::shared::{fields, IngestAck, SubmissionFields};
use proptest::prelude::*;

use super::block_on;
use crate::common::visit;

/// Fails the listed enumerators and removes the queued `withdraw` ids from
/// the queue while the first delivery is in flight
struct DrainScript {
    queue: Arc<OfflineQueue<MemoryStorage>>,
    failing: HashSet<String>,
    withdraw: Mutex<Vec<String>>,
    posted: Mutex<Vec<String>>,
}

impl IngestTransport for DrainScript {
    async fn post_submission(&self, submission: &SubmissionFields) -> Result<IngestAck, DeliveryError> {
        let name = submission.text(fields::ENUMERATOR_NAME).unwrap_or_default().to_string();
        self.posted.lock().unwrap().push(name.clone());

        let withdrawn = std::mem::take(&mut *self.withdraw.lock().unwrap());
        for id in &withdrawn {
            self.queue.remove(id).await;
        }

        if self.failing.contains(&name) {
            Err(DeliveryError::Status {
                code: 503,
                body: String::new(),
            })
        } else {
            Ok(IngestAck::accepted(1, false))
        }
    }
}

/// Per entry: delivery fails, already syncing, withdrawn mid-drain
type Plan = Vec<(bool, bool, bool)>;

struct DrainResult {
    posted: Vec<String>,
    survivors: Vec<(String, EntryStatus, u32, String)>,
}

fn run_drain(plan: &Plan) -> DrainResult {
    block_on(async {
        let queue = Arc::new(OfflineQueue::open(MemoryStorage::new(), "prop").await);
        let mut ids = Vec::new();
        for (index, (_, syncing, _)) in plan.iter().enumerate() {
            let entry = queue.enqueue(visit(&index.to_string(), "Clinic"), None).await;
            if *syncing {
                queue.begin_attempt(&entry.id).await.unwrap();
            }
            ids.push(entry.id);
        }

        let script = DrainScript {
            queue: queue.clone(),
            failing: plan
                .iter()
                .enumerate()
                .filter(|(_, (fails, _, _))| *fails)
                .map(|(index, _)| index.to_string())
                .collect(),
            withdraw: Mutex::new(
                plan.iter()
                    .zip(&ids)
                    .filter(|((_, _, withdrawn), _)| *withdrawn)
                    .map(|(_, id)| id.clone())
                    .collect(),
            ),
            posted: Mutex::new(Vec::new()),
        };
        let engine = SyncEngine::new(script);
        engine.sync_all(&*queue).await;

        let posted = engine.transport().posted.lock().unwrap().clone();
        let survivors = queue
            .entries()
            .await
            .into_iter()
            .map(|e| (e.meta.enumerator, e.status, e.attempts, e.last_error))
            .collect();
        DrainResult { posted, survivors }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_drain_removes_only_acknowledged_entries(
        plan in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..10)
    ) {
        let result = run_drain(&plan);

        // Newest first, entries already syncing are never posted
        let eligible: Vec<usize> = (0..plan.len()).rev().filter(|&i| !plan[i].1).collect();
        let (expected_posted, withdrawn): (Vec<usize>, HashSet<usize>) = match eligible.split_first() {
            Some((&first, rest)) => {
                let mut posted = vec![first];
                posted.extend(rest.iter().copied().filter(|&i| !plan[i].2));
                (posted, (0..plan.len()).filter(|&i| plan[i].2).collect())
            }
            None => (Vec::new(), HashSet::new()),
        };
        let posted_names: Vec<String> = expected_posted.iter().map(|i| i.to_string()).collect();
        prop_assert_eq!(&result.posted, &posted_names);

        let delivered: HashSet<usize> =
            expected_posted.iter().copied().filter(|&i| !plan[i].0).collect();
        let expected_survivors: Vec<String> = (0..plan.len())
            .filter(|i| !delivered.contains(i) && !withdrawn.contains(i))
            .map(|i| i.to_string())
            .collect();
        let survivor_names: Vec<String> = result.survivors.iter().map(|s| s.0.clone()).collect();
        prop_assert_eq!(survivor_names, expected_survivors);

        for (name, status, attempts, last_error) in &result.survivors {
            let index: usize = name.parse().unwrap();
            prop_assert_eq!(*attempts, 1);
            if plan[index].1 {
                prop_assert_eq!(*status, EntryStatus::Syncing);
            } else {
                prop_assert!(plan[index].0);
                prop_assert_eq!(*status, EntryStatus::Error);
                prop_assert!(!last_error.is_empty());
            }
        }
    }
}
