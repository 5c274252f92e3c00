use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::item::WorkItem;
use crate::model::state::StateGroup;

/// Load progress of one parent's sub-issue tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

/// Per-state-group rollup of one parent's children, for progress
/// headers and collapsed-group counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateDistribution {
    pub backlog: IndexSet<String>,
    pub unstarted: IndexSet<String>,
    pub started: IndexSet<String>,
    pub completed: IndexSet<String>,
    pub cancelled: IndexSet<String>,
}

impl StateDistribution {
    pub fn bucket(&self, group: StateGroup) -> &IndexSet<String> {
        match group {
            StateGroup::Backlog => &self.backlog,
            StateGroup::Unstarted => &self.unstarted,
            StateGroup::Started => &self.started,
            StateGroup::Completed => &self.completed,
            StateGroup::Cancelled => &self.cancelled,
        }
    }

    fn bucket_mut(&mut self, group: StateGroup) -> &mut IndexSet<String> {
        match group {
            StateGroup::Backlog => &mut self.backlog,
            StateGroup::Unstarted => &mut self.unstarted,
            StateGroup::Started => &mut self.started,
            StateGroup::Completed => &mut self.completed,
            StateGroup::Cancelled => &mut self.cancelled,
        }
    }

    /// The bucket currently holding `child_id`, if any.
    pub fn group_of(&self, child_id: &str) -> Option<StateGroup> {
        StateGroup::ALL
            .iter()
            .copied()
            .find(|group| self.bucket(*group).contains(child_id))
    }

    /// Drop `child_id` from whichever bucket holds it.
    fn remove(&mut self, child_id: &str) -> bool {
        StateGroup::ALL
            .iter()
            .any(|group| self.bucket_mut(*group).shift_remove(child_id))
    }

    pub fn total(&self) -> usize {
        StateGroup::ALL
            .iter()
            .map(|group| self.bucket(*group).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Child lists and state-group rollups for items with sub-issues.
///
/// Each parent advances `Unloaded → Loading → Loaded`; only loaded
/// parents are maintained incrementally. Bookkeeping calls against a
/// parent whose children were never fetched are skipped, since the
/// fetch that eventually loads them rebuilds both caches from scratch.
#[derive(Default)]
pub struct SubIssueStore {
    load_states: IndexMap<String, LoadState>,
    children: IndexMap<String, Vec<String>>,
    distributions: IndexMap<String, StateDistribution>,
}

impl SubIssueStore {
    pub fn new() -> Self {
        SubIssueStore::default()
    }

    pub fn load_state(&self, parent_id: &str) -> LoadState {
        self.load_states.get(parent_id).copied().unwrap_or_default()
    }

    /// Mark a fetch as started. Returns true when the caller should go
    /// fetch; false when a fetch is already in flight or done.
    pub fn begin_load(&mut self, parent_id: &str) -> bool {
        match self.load_state(parent_id) {
            LoadState::Unloaded => {
                self.load_states
                    .insert(parent_id.to_string(), LoadState::Loading);
                true
            }
            LoadState::Loading | LoadState::Loaded => false,
        }
    }

    /// Roll a failed fetch back to `Unloaded` so it can be retried.
    pub fn abandon_load(&mut self, parent_id: &str) {
        if self.load_state(parent_id) == LoadState::Loading {
            self.load_states
                .insert(parent_id.to_string(), LoadState::Unloaded);
        }
    }

    /// Record a parent's fetched (or bulk-created) children and mark it
    /// loaded.
    ///
    /// Ids the parent already lists are not duplicated, so re-fetching
    /// is idempotent. Each child is rebucketed by its resolved state
    /// group; children whose state does not resolve are left out of the
    /// distribution. A child still listed under some other parent is
    /// detached from it first, keeping every child under at most one
    /// parent.
    pub fn attach_children(
        &mut self,
        parent_id: &str,
        children: &[WorkItem],
        resolve_group: impl Fn(&str) -> Option<StateGroup>,
    ) {
        for child in children {
            let stale: Vec<String> = self
                .children
                .iter()
                .filter(|(other, ids)| {
                    other.as_str() != parent_id && ids.iter().any(|id| *id == child.id)
                })
                .map(|(other, _)| other.clone())
                .collect();
            for other in stale {
                self.detach(&other, &child.id);
            }
        }

        self.load_states
            .insert(parent_id.to_string(), LoadState::Loaded);

        let list = self.children.entry(parent_id.to_string()).or_default();
        for child in children {
            if !list.iter().any(|id| *id == child.id) {
                list.push(child.id.clone());
            }
        }

        let distribution = self.distributions.entry(parent_id.to_string()).or_default();
        for child in children {
            let resolved = child
                .state_id
                .as_deref()
                .and_then(|state_id| resolve_group(state_id));
            if distribution.group_of(&child.id) != resolved {
                distribution.remove(&child.id);
                if let Some(group) = resolved {
                    distribution.bucket_mut(group).insert(child.id.clone());
                }
            }
        }
    }

    /// Move a child between parents' lists. Either side may be `None`
    /// (attach-only or detach-only). A side whose children were never
    /// loaded is skipped; the eventual fetch will include the change.
    pub fn reparent(
        &mut self,
        child_id: &str,
        old_parent_id: Option<&str>,
        new_parent_id: Option<&str>,
    ) {
        if let Some(old_parent) = old_parent_id {
            if self.load_state(old_parent) == LoadState::Loaded {
                if let Some(list) = self.children.get_mut(old_parent) {
                    list.retain(|id| id != child_id);
                }
            } else {
                debug!(parent = old_parent, child = child_id, "reparent: source not loaded");
            }
        }
        if let Some(new_parent) = new_parent_id {
            if self.load_state(new_parent) == LoadState::Loaded {
                let list = self.children.entry(new_parent.to_string()).or_default();
                if !list.iter().any(|id| id == child_id) {
                    list.push(child_id.to_string());
                }
            } else {
                debug!(parent = new_parent, child = child_id, "reparent: destination not loaded");
            }
        }
    }

    /// Move a child between distribution buckets under one parent.
    ///
    /// Removal applies whenever the old group is known. Insertion
    /// additionally requires the child to be in the parent's list, so a
    /// stray call can never grow the rollup past the actual children.
    pub fn reclassify(
        &mut self,
        parent_id: &str,
        child_id: &str,
        old_group: Option<StateGroup>,
        new_group: Option<StateGroup>,
    ) {
        if self.load_state(parent_id) != LoadState::Loaded {
            debug!(parent = parent_id, child = child_id, "reclassify: parent not loaded");
            return;
        }
        if old_group == new_group {
            return;
        }

        let is_child = self
            .children
            .get(parent_id)
            .is_some_and(|list| list.iter().any(|id| id == child_id));
        let distribution = self.distributions.entry(parent_id.to_string()).or_default();
        if let Some(group) = old_group {
            distribution.bucket_mut(group).shift_remove(child_id);
        }
        if let Some(group) = new_group {
            if is_child {
                distribution.bucket_mut(group).insert(child_id.to_string());
            } else {
                debug!(parent = parent_id, child = child_id, "reclassify: not a listed child");
            }
        }
    }

    /// Remove a child from a parent's list and rollup. Used both when
    /// the child is detached to stand alone and when it is deleted; the
    /// difference is what the caller does with the child's own record.
    pub fn detach(&mut self, parent_id: &str, child_id: &str) {
        if self.load_state(parent_id) != LoadState::Loaded {
            warn!(parent = parent_id, child = child_id, "detach on a parent with no loaded children");
            return;
        }
        if let Some(list) = self.children.get_mut(parent_id) {
            list.retain(|id| id != child_id);
        }
        if let Some(distribution) = self.distributions.get_mut(parent_id) {
            distribution.remove(child_id);
        }
    }

    /// Child ids in display order; empty for unloaded parents.
    pub fn child_ids(&self, parent_id: &str) -> &[String] {
        self.children
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn distribution(&self, parent_id: &str) -> Option<&StateDistribution> {
        self.distributions.get(parent_id)
    }

    /// The parent currently listing `child_id`, if any.
    pub fn parent_of(&self, child_id: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|(_, ids)| ids.iter().any(|id| id == child_id))
            .map(|(parent_id, _)| parent_id.as_str())
    }
}
