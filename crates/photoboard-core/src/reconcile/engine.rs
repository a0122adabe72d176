//! Snapshot reconciliation.

use crate::area::{AreaCollection, AreaStore};
use crate::error::Result;
use crate::sync::Snapshot;

use super::plan::{Directive, MutationPlan};

/// Turns incoming snapshots into [`MutationPlan`]s and applies them.
///
/// Tracks the version of the last applied remote snapshot so that an older
/// snapshot arriving late is reported as stale instead of rolling state back.
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    last_applied: Option<u64>,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    /// Computes the plan for `snapshot` against `current`. Pure.
    ///
    /// # Returns
    ///
    /// - `ClearToEmpty` when the snapshot is absent and `current` has areas
    /// - an empty `Patch` at the snapshot version when both are empty
    /// - `FullRebuild` when the area count differs
    /// - `Patch` with one directive per differing field otherwise
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when a present snapshot breaks the id invariant.
    pub fn plan(current: &AreaCollection, snapshot: &Snapshot) -> Result<MutationPlan> {
        let incoming = match &snapshot.areas {
            Some(areas) if !areas.is_empty() => areas,
            _ if current.is_empty() => {
                return Ok(MutationPlan::Patch {
                    directives: Vec::new(),
                    version: snapshot.version,
                });
            }
            _ => {
                return Ok(MutationPlan::ClearToEmpty {
                    version: snapshot.version,
                });
            }
        };

        AreaCollection::validate_count(incoming.len())?;
        AreaCollection::validate_sequence(incoming)?;

        if incoming.len() != current.len() {
            let collection = AreaCollection::from_areas(incoming.clone(), snapshot.version)?;
            let renders = collection
                .with_media()
                .map(|area| Directive::Render {
                    id: area.id,
                    media: area.media.clone(),
                })
                .collect();
            return Ok(MutationPlan::FullRebuild {
                collection,
                renders,
            });
        }

        let mut directives = Vec::new();
        for (existing, wanted) in current.iter().zip(incoming.iter()) {
            if existing.name != wanted.name {
                directives.push(Directive::Rename {
                    id: wanted.id,
                    name: wanted.name.clone(),
                });
            }
            if existing.media != wanted.media {
                directives.push(Directive::Render {
                    id: wanted.id,
                    media: wanted.media.clone(),
                });
            }
        }

        Ok(MutationPlan::Patch {
            directives,
            version: snapshot.version,
        })
    }

    /// Reconciles a remote snapshot into `store`.
    ///
    /// A snapshot whose version is below the last applied one yields
    /// `Stale` and leaves the store untouched. Equal versions are applied.
    pub fn reconcile(&mut self, store: &mut AreaStore, snapshot: &Snapshot) -> Result<MutationPlan> {
        if let Some(applied) = self.last_applied {
            if snapshot.version < applied {
                tracing::debug!(
                    "[Reconcile] Ignoring stale snapshot v{} (applied v{})",
                    snapshot.version,
                    applied
                );
                return Ok(MutationPlan::Stale {
                    incoming: snapshot.version,
                    applied,
                });
            }
        }

        let plan = Self::plan(store.collection(), snapshot)?;
        plan.apply(store)?;
        self.last_applied = Some(snapshot.version);

        tracing::debug!(
            "[Reconcile] Applied v{}: {} directive(s)",
            snapshot.version,
            plan.directives().len()
        );
        Ok(plan)
    }

    /// Applies a persisted snapshot at startup. No staleness check and the
    /// version is not recorded, because local counters and server versions
    /// are not comparable.
    pub fn restore(&self, store: &mut AreaStore, snapshot: &Snapshot) -> Result<MutationPlan> {
        let plan = Self::plan(store.collection(), snapshot)?;
        plan.apply(store)?;
        Ok(plan)
    }

    /// Records a version the backend assigned to one of our own publishes.
    pub fn acknowledge(&mut self, version: u64) {
        self.last_applied = Some(self.last_applied.map_or(version, |v| v.max(version)));
    }

    /// Forgets the last applied version (new subscription).
    pub fn reset(&mut self) {
        self.last_applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Area, MAX_AREAS, Media, MediaKind};

    fn png(tag: &str) -> Media {
        Media::inline(format!("data:image/png;base64,{}", tag), MediaKind::Image)
    }

    fn store_with(n: usize) -> AreaStore {
        AreaStore::with_collection(AreaCollection::create(n).unwrap()).unwrap()
    }

    #[test]
    fn test_absent_snapshot_clears() {
        let mut store = store_with(3);
        let mut engine = ReconciliationEngine::new();

        let plan = engine.reconcile(&mut store, &Snapshot::absent(4)).unwrap();
        assert_eq!(plan, MutationPlan::ClearToEmpty { version: 4 });
        assert!(store.is_empty());

    }

    #[test]
    fn test_absent_snapshot_on_empty_store_is_noop() {
        let mut store = store_with(3);
        let mut engine = ReconciliationEngine::new();
        engine.reconcile(&mut store, &Snapshot::absent(4)).unwrap();

        let plan = engine.reconcile(&mut store, &Snapshot::absent(5)).unwrap();
        assert_eq!(
            plan,
            MutationPlan::Patch {
                directives: vec![],
                version: 5
            }
        );
        assert!(plan.is_noop());
        assert!(store.is_empty());
        assert_eq!(store.version(), 5);
        assert_eq!(engine.last_applied(), Some(5));
    }

    #[test]
    fn test_count_change_triggers_rebuild() {
        let current = AreaCollection::create(2).unwrap();
        let mut areas = AreaCollection::create(4).unwrap().into_areas();
        areas[2].media = Some(png("C"));

        let plan = ReconciliationEngine::plan(&current, &Snapshot::present(areas, 9)).unwrap();
        match plan {
            MutationPlan::FullRebuild {
                collection,
                renders,
            } => {
                assert_eq!(collection.len(), 4);
                assert_eq!(collection.version(), 9);
                assert_eq!(renders.len(), 1);
                assert_eq!(renders[0].area_id(), 3);
            }
            other => panic!("expected rebuild, got {:?}", other),
        }
    }

    #[test]
    fn test_identical_snapshot_is_empty_patch() {
        let current = AreaCollection::create(5).unwrap();
        let snapshot = Snapshot::of(&current.clone().with_version(2));
        let plan = ReconciliationEngine::plan(&current, &snapshot).unwrap();
        assert!(plan.is_noop());
        assert_eq!(plan.version(), Some(2));
    }

    #[test]
    fn test_patch_touches_only_changed_fields() {
        for n in 1..=MAX_AREAS {
            let current = AreaCollection::create(n).unwrap();
            let mut areas = current.clone().into_areas();
            let last = n - 1;
            areas[last].name = "Renamed".to_string();
            areas[0].media = Some(png("A"));

            let plan = ReconciliationEngine::plan(&current, &Snapshot::present(areas, 1)).unwrap();
            let directives = plan.directives();

            let renames: Vec<_> = directives
                .iter()
                .filter(|d| matches!(d, Directive::Rename { .. }))
                .collect();
            let renders: Vec<_> = directives
                .iter()
                .filter(|d| matches!(d, Directive::Render { .. }))
                .collect();
            assert_eq!(renames.len(), 1, "n = {}", n);
            assert_eq!(renames[0].area_id(), n as u32);
            assert_eq!(renders.len(), 1, "n = {}", n);
            assert_eq!(renders[0].area_id(), 1);
        }
    }

    #[test]
    fn test_applying_twice_is_idempotent() {
        let mut store = store_with(3);
        let mut engine = ReconciliationEngine::new();
        let mut areas = store.collection().clone().into_areas();
        areas[1] = Area::new(2).with_name("Garden").with_media(png("G"));
        let snapshot = Snapshot::present(areas, 3);

        let first = engine.reconcile(&mut store, &snapshot).unwrap();
        assert_eq!(first.directives().len(), 2);

        let second = engine.reconcile(&mut store, &snapshot).unwrap();
        assert!(second.is_noop());
        assert!(!second.is_stale());
    }

    #[test]
    fn test_older_snapshot_is_stale() {
        let mut store = store_with(2);
        let mut engine = ReconciliationEngine::new();
        engine.acknowledge(10);

        let plan = engine.reconcile(&mut store, &Snapshot::absent(7)).unwrap();
        assert_eq!(
            plan,
            MutationPlan::Stale {
                incoming: 7,
                applied: 10
            }
        );
        assert_eq!(store.collection().len(), 2);
    }

    #[test]
    fn test_invalid_snapshot_is_rejected() {
        let current = AreaCollection::create(2).unwrap();
        let areas = vec![Area::new(1), Area::new(5)];
        let err = ReconciliationEngine::plan(&current, &Snapshot::present(areas, 1)).unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_create_rename_attach_sequence() {
        let mut store = AreaStore::new();
        let mut engine = ReconciliationEngine::new();

        let mut remote = AreaCollection::create(4).unwrap().with_version(1);
        let plan = engine.reconcile(&mut store, &Snapshot::of(&remote)).unwrap();
        assert!(matches!(plan, MutationPlan::FullRebuild { .. }));

        remote.get_mut(2).unwrap().name = "Stage".to_string();
        remote.set_version(2);
        let plan = engine.reconcile(&mut store, &Snapshot::of(&remote)).unwrap();
        assert_eq!(
            plan.directives(),
            &[Directive::Rename {
                id: 2,
                name: "Stage".to_string()
            }]
        );

        remote.get_mut(4).unwrap().media = Some(png("D"));
        remote.set_version(3);
        let plan = engine.reconcile(&mut store, &Snapshot::of(&remote)).unwrap();
        assert_eq!(plan.directives().len(), 1);
        assert!(matches!(plan.directives()[0], Directive::Render { id: 4, .. }));

        assert_eq!(store.collection(), &remote);
    }

    #[test]
    fn test_restore_does_not_record_version() {
        let mut store = AreaStore::new();
        let engine = ReconciliationEngine::new();
        let persisted = AreaCollection::create(2).unwrap().with_version(42);
        engine.restore(&mut store, &Snapshot::of(&persisted)).unwrap();
        assert_eq!(store.version(), 42);
        assert_eq!(engine.last_applied(), None);
    }
}
