//! Diff/reconcile laws over arbitrary snapshots

use fixity::reconcile::apply;
use fixity::store::locate;
use fixity::{Diff, FileSnapshotStore, Snapshot, SnapshotStore};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tempfile::TempDir;

fn name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(\\.txt)?"
}

fn fixity() -> impl Strategy<Value = String> {
    "[0-9a-f]{64}"
}

/// Snapshot at `path` whose directory and file names never overlap
fn snapshot(path: &'static str) -> impl Strategy<Value = Snapshot> {
    (
        prop::collection::btree_set(name(), 0..8),
        prop::collection::btree_map(name(), fixity(), 0..12),
    )
        .prop_map(move |(dirs, mut files)| {
            files.retain(|n, _| !dirs.contains(n));
            Snapshot::new(path, dirs, files, fixity::types::now()).unwrap()
        })
}

proptest! {
    #[test]
    fn reconcile_inverts_diff(baseline in snapshot("p"), observed in snapshot("p")) {
        let diff = Diff::between(&observed, &baseline).unwrap();
        let updated = apply(&baseline, &diff, None).unwrap();
        prop_assert!(updated.same_contents(&observed));
    }

    #[test]
    fn identical_snapshots_have_empty_diff(s in snapshot("p")) {
        let diff = Diff::between(&s, &s).unwrap();
        prop_assert!(!diff.has_changes());
        let updated = apply(&s, &diff, None).unwrap();
        prop_assert!(updated.same_contents(&s));
    }

    #[test]
    fn diff_against_empty_lists_everything(observed in snapshot("p")) {
        let diff = Diff::between(&observed, &Snapshot::empty("p")).unwrap();
        prop_assert_eq!(&diff.directories_missing_from_baseline, observed.directory_names());
        prop_assert_eq!(&diff.files_missing_from_baseline, observed.file_digests());
        prop_assert!(diff.fixity_mismatch.is_empty());
    }

    #[test]
    fn store_round_trip(s in snapshot("some/dir")) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path());
        store.write(&s).unwrap();
        prop_assert_eq!(store.read("some/dir").unwrap(), s);
    }

    #[test]
    fn locate_is_deterministic(path in "[a-z/]{1,20}") {
        prop_assert_eq!(locate(&path), locate(&path));
    }

    #[test]
    fn disjoint_categories(baseline in snapshot("p"), observed in snapshot("p")) {
        let diff = Diff::between(&observed, &baseline).unwrap();
        let new: BTreeSet<_> = diff.files_missing_from_baseline.keys().collect();
        let gone: BTreeSet<_> = diff.files_missing_from_observed.keys().collect();
        let changed: BTreeSet<_> = diff.fixity_mismatch.keys().collect();
        prop_assert!(new.is_disjoint(&gone));
        prop_assert!(new.is_disjoint(&changed));
        prop_assert!(gone.is_disjoint(&changed));
        let unchanged: BTreeMap<_, _> = observed
            .file_digests()
            .iter()
            .filter(|(n, f)| baseline.file_digests().get(*n) == Some(*f))
            .collect();
        for name in unchanged.keys() {
            prop_assert!(!changed.contains(name));
        }
    }
}
