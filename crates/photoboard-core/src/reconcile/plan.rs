//! Mutation plans produced by reconciliation.

use serde::Serialize;

use crate::area::{AreaCollection, AreaId, AreaStore, Media};
use crate::error::Result;

/// A single per-area change for the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Update the label only.
    Rename { id: AreaId, name: String },
    /// Replace the media element (`None` removes it).
    Render { id: AreaId, media: Option<Media> },
}

impl Directive {
    pub fn area_id(&self) -> AreaId {
        match self {
            Directive::Rename { id, .. } | Directive::Render { id, .. } => *id,
        }
    }
}

/// Minimal set of changes that brings the store and view to an incoming snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationPlan {
    /// The document is gone; remove every area.
    ClearToEmpty { version: u64 },
    /// Area count changed; rebuild the layout, then render each area's media.
    FullRebuild {
        collection: AreaCollection,
        renders: Vec<Directive>,
    },
    /// Same count; touch only the fields that differ.
    Patch {
        directives: Vec<Directive>,
        version: u64,
    },
    /// Snapshot older than the last applied one; nothing happens.
    Stale { incoming: u64, applied: u64 },
}

impl MutationPlan {
    /// True when applying the plan would not change anything visible.
    pub fn is_noop(&self) -> bool {
        match self {
            MutationPlan::Patch { directives, .. } => directives.is_empty(),
            MutationPlan::Stale { .. } => true,
            _ => false,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, MutationPlan::Stale { .. })
    }

    /// Directives carried by the plan (rebuild renders or patch directives).
    pub fn directives(&self) -> &[Directive] {
        match self {
            MutationPlan::FullRebuild { renders, .. } => renders,
            MutationPlan::Patch { directives, .. } => directives,
            _ => &[],
        }
    }

    pub fn version(&self) -> Option<u64> {
        match self {
            MutationPlan::ClearToEmpty { version } | MutationPlan::Patch { version, .. } => {
                Some(*version)
            }
            MutationPlan::FullRebuild { collection, .. } => Some(collection.version()),
            MutationPlan::Stale { .. } => None,
        }
    }

    /// Applies the plan to `store`.
    pub fn apply(&self, store: &mut AreaStore) -> Result<()> {
        match self {
            MutationPlan::ClearToEmpty { version } => {
                store.clear();
                store.set_version(*version);
            }
            MutationPlan::FullRebuild { collection, .. } => {
                store.replace_all(collection.clone())?;
            }
            MutationPlan::Patch {
                directives,
                version,
            } => {
                for directive in directives {
                    match directive {
                        Directive::Rename { id, name } => {
                            store.mutate(*id, |area| area.name = name.clone())?;
                        }
                        Directive::Render { id, media } => {
                            store.mutate(*id, |area| area.media = media.clone())?;
                        }
                    }
                }
                store.set_version(*version);
            }
            MutationPlan::Stale { .. } => {}
        }
        Ok(())
    }
}
