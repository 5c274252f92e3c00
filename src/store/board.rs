use std::cmp::Ordering;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::model::config::{OrderBy, ViewConfig};
use crate::model::item::WorkItem;
use crate::model::patch::ItemPatch;
use crate::model::state::{StateGroup, WorkflowState};
use crate::ops::drag_drop::{plan_move, DragLocation, MovePlan};
use crate::ops::MoveError;
use crate::store::events::{ChangeEvent, EventBus, SubscriberId};
use crate::store::sub_issues::{LoadState, SubIssueStore};

/// Why the persistence collaborator refused a call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PersistError(pub String);

/// Store-level failures surfaced to the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    UnknownItem(String),
    #[error(transparent)]
    Rejected(#[from] PersistError),
}

/// External persistence API. The store computes patches and cache
/// bookkeeping; everything durable happens behind this trait, injected
/// per call so tests can substitute a recording fake.
pub trait Persistence {
    fn update_item(
        &mut self,
        project_id: &str,
        item_id: &str,
        patch: &ItemPatch,
    ) -> Result<(), PersistError>;

    fn delete_item(&mut self, project_id: &str, item_id: &str) -> Result<(), PersistError>;

    fn fetch_children(&mut self, parent_id: &str) -> Result<Vec<WorkItem>, PersistError>;

    /// Warm state/member/label caches for projects that show up via
    /// cross-project sub-issues.
    fn fetch_sibling_metadata(&mut self, project_ids: &[String]) -> Result<(), PersistError>;
}

/// Handle for an optimistically applied move awaiting persistence.
///
/// Produced by [`BoardStore::begin_move`]; must be settled with either
/// [`BoardStore::complete_move`] or [`BoardStore::abort_move`].
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub item_id: String,
    pub project_id: String,
    inverse: ItemPatch,
}

/// The authoritative in-memory item collection plus the caches derived
/// from it.
///
/// All mutation goes through the store so that item fields, child
/// lists, and state-group rollups change together, and each public
/// operation delivers its change events as one batch.
#[derive(Default)]
pub struct BoardStore {
    items: IndexMap<String, WorkItem>,
    states: IndexMap<String, WorkflowState>,
    sub_issues: SubIssueStore,
    events: EventBus,
}

impl BoardStore {
    pub fn new() -> Self {
        BoardStore::default()
    }

    // -----------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------

    pub fn subscribe(&mut self, subscriber: impl FnMut(&[ChangeEvent]) + 'static) -> SubscriberId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.events.unsubscribe(id);
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    pub fn item(&self, id: &str) -> Option<&WorkItem> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.values()
    }

    pub fn state(&self, id: &str) -> Option<&WorkflowState> {
        self.states.get(id)
    }

    pub fn resolve_state_group(&self, state_id: &str) -> Option<StateGroup> {
        self.states.get(state_id).map(|state| state.group)
    }

    pub fn sub_issues(&self) -> &SubIssueStore {
        &self.sub_issues
    }

    /// Item ids of one bucket, recomputed from the live collection in
    /// the view's display order. Nothing is cached, so a bucket read
    /// between two rapid moves sees the latest optimistic state.
    pub fn bucket_ids(
        &self,
        view: &ViewConfig,
        group_id: &str,
        sub_group_id: Option<&str>,
    ) -> Vec<String> {
        let Some(group_by) = view.group_by else {
            return Vec::new();
        };
        let mut members: Vec<&WorkItem> = self
            .items
            .values()
            .filter(|item| group_by.membership(item).contains(group_id))
            .filter(|item| match (view.sub_group_by, sub_group_id) {
                (Some(sub_dimension), Some(sub_id)) => {
                    sub_dimension.membership(item).contains(sub_id)
                }
                _ => true,
            })
            .collect();
        sort_for_view(&mut members, view.order_by);
        members.into_iter().map(|item| item.id.clone()).collect()
    }

    // -----------------------------------------------------------------
    // Bulk ingest
    // -----------------------------------------------------------------

    pub fn upsert_states(&mut self, states: Vec<WorkflowState>) {
        for state in states {
            self.states.insert(state.id.clone(), state);
        }
    }

    /// Insert or refresh items wholesale. A refreshed item overwrites
    /// the local copy (last write wins) and any parent or state change
    /// it carries is folded into the hierarchy caches. An item arriving
    /// for the first time is diffed from nothing, so a freshly created
    /// sub-issue joins its parent's loaded child list right away.
    pub fn upsert_items(&mut self, items: Vec<WorkItem>) {
        if items.is_empty() {
            return;
        }
        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        for item in items {
            let id = item.id.clone();
            let new_parent = item.parent_id.clone();
            let new_state = item.state_id.clone();
            let (old_parent, old_state) = match self.items.insert(id.clone(), item) {
                Some(old) => (old.parent_id, old.state_id),
                None => (None, None),
            };
            self.sync_hierarchy(&id, old_parent, new_parent, old_state, new_state);
        }
        self.events.push(ChangeEvent::ItemsUpserted { ids });
        self.events.flush();
    }

    /// Fold a server-authoritative copy of one item into the store.
    pub fn reconcile_item(&mut self, item: WorkItem) {
        self.upsert_items(vec![item]);
    }

    // -----------------------------------------------------------------
    // Moves (optimistic, two-phase)
    // -----------------------------------------------------------------

    /// Plan a drag against this store's items and the view's buckets.
    pub fn plan_view_move(
        &self,
        view: &ViewConfig,
        source: &DragLocation,
        destination: &DragLocation,
    ) -> Result<MovePlan, MoveError> {
        let group_by = view.group_by.ok_or(MoveError::UngroupedView)?;
        plan_move(
            source,
            destination,
            group_by,
            view.sub_group_by,
            view.insert_at_top,
            |id| self.items.get(id),
            |group_id, sub_group_id| self.bucket_ids(view, group_id, sub_group_id),
        )
    }

    /// Phase one: apply a planned move locally and hand back the token
    /// that settles it.
    pub fn begin_move(&mut self, plan: &MovePlan) -> Result<PendingMove, StoreError> {
        let inverse = self.integrate(&plan.item_id, &plan.patch)?;
        self.events.flush();
        Ok(PendingMove {
            item_id: plan.item_id.clone(),
            project_id: plan.project_id.clone(),
            inverse,
        })
    }

    /// Phase two, success: the server accepted the patch the local
    /// state already reflects.
    pub fn complete_move(&mut self, pending: PendingMove) {
        debug!(item = pending.item_id.as_str(), "move persisted");
    }

    /// Phase two, failure: restore the pre-move state and announce the
    /// rejection.
    pub fn abort_move(&mut self, pending: PendingMove) {
        if let Err(err) = self.integrate(&pending.item_id, &pending.inverse) {
            warn!(item = pending.item_id.as_str(), error = %err, "rollback target vanished");
        }
        self.events.push(ChangeEvent::MoveRejected {
            item_id: pending.item_id,
        });
        self.events.flush();
    }

    /// Drive a planned move through both phases against a persistence
    /// collaborator.
    pub fn dispatch_move<P: Persistence>(
        &mut self,
        plan: MovePlan,
        persist: &mut P,
    ) -> Result<(), StoreError> {
        let pending = self.begin_move(&plan)?;
        match persist.update_item(&pending.project_id, &pending.item_id, &plan.patch) {
            Ok(()) => {
                self.complete_move(pending);
                Ok(())
            }
            Err(err) => {
                self.abort_move(pending);
                Err(StoreError::Rejected(err))
            }
        }
    }

    // -----------------------------------------------------------------
    // Field updates (pessimistic)
    // -----------------------------------------------------------------

    /// Persist a field update first, then fold it into the local
    /// caches. On rejection nothing local changes.
    pub fn apply_update<P: Persistence>(
        &mut self,
        item_id: &str,
        patch: ItemPatch,
        persist: &mut P,
    ) -> Result<(), StoreError> {
        let project_id = self
            .items
            .get(item_id)
            .ok_or_else(|| StoreError::UnknownItem(item_id.to_string()))?
            .project_id
            .clone();
        persist.update_item(&project_id, item_id, &patch)?;
        self.integrate(item_id, &patch)?;
        self.events.flush();
        Ok(())
    }

    // -----------------------------------------------------------------
    // Sub-issue loading
    // -----------------------------------------------------------------

    /// Fetch and attach a parent's sub-issues. Calls while a fetch is
    /// in flight, or after one completed, are no-ops.
    pub fn load_children<P: Persistence>(
        &mut self,
        parent_id: &str,
        persist: &mut P,
    ) -> Result<(), StoreError> {
        if !self.sub_issues.begin_load(parent_id) {
            return Ok(());
        }
        let children = match persist.fetch_children(parent_id) {
            Ok(children) => children,
            Err(err) => {
                self.sub_issues.abandon_load(parent_id);
                return Err(StoreError::Rejected(err));
            }
        };
        self.finish_children_load(parent_id, children, persist);
        Ok(())
    }

    fn finish_children_load<P: Persistence>(
        &mut self,
        parent_id: &str,
        children: Vec<WorkItem>,
        persist: &mut P,
    ) {
        // children from sibling projects get a best-effort metadata
        // warmup; failure only degrades secondary display data
        let parent_project = self.items.get(parent_id).map(|item| item.project_id.clone());
        let mut sibling_projects: Vec<String> = Vec::new();
        for child in &children {
            let foreign = parent_project
                .as_deref()
                .is_some_and(|project_id| project_id != child.project_id);
            if foreign && !sibling_projects.contains(&child.project_id) {
                sibling_projects.push(child.project_id.clone());
            }
        }
        if !sibling_projects.is_empty() {
            if let Err(err) = persist.fetch_sibling_metadata(&sibling_projects) {
                warn!(error = %err, "sibling project metadata prefetch failed");
            }
        }

        let ids: Vec<String> = children.iter().map(|child| child.id.clone()).collect();
        let states = &self.states;
        self.sub_issues.attach_children(parent_id, &children, |state_id| {
            states.get(state_id).map(|state| state.group)
        });
        for child in children {
            self.items.insert(child.id.clone(), child);
        }

        self.events.push(ChangeEvent::ItemsUpserted { ids });
        self.events.push(ChangeEvent::ChildrenLoaded {
            parent_id: parent_id.to_string(),
        });
        self.events.push(ChangeEvent::DistributionChanged {
            parent_id: parent_id.to_string(),
        });
        self.events.flush();
    }

    // -----------------------------------------------------------------
    // Sub-issue removal
    // -----------------------------------------------------------------

    /// Detach a child from its parent but keep it as a standalone item.
    /// Persists first; local caches change only after the server
    /// accepts.
    pub fn remove_sub_issue<P: Persistence>(
        &mut self,
        parent_id: &str,
        child_id: &str,
        persist: &mut P,
    ) -> Result<(), StoreError> {
        let recorded = self
            .items
            .get(child_id)
            .and_then(|item| item.parent_id.as_deref());
        if recorded != Some(parent_id) {
            warn!(parent = parent_id, child = child_id, "removing child whose recorded parent differs");
        }
        let patch = ItemPatch {
            parent_id: Some(None),
            ..ItemPatch::default()
        };
        self.apply_update(child_id, patch, persist)
    }

    /// Delete a child outright. The record is dropped only after the
    /// server confirms.
    pub fn delete_sub_issue<P: Persistence>(
        &mut self,
        parent_id: &str,
        child_id: &str,
        persist: &mut P,
    ) -> Result<(), StoreError> {
        let project_id = self
            .items
            .get(child_id)
            .ok_or_else(|| StoreError::UnknownItem(child_id.to_string()))?
            .project_id
            .clone();
        persist.delete_item(&project_id, child_id)?;

        self.sub_issues.detach(parent_id, child_id);
        self.items.shift_remove(child_id);
        self.events.push(ChangeEvent::ItemRemoved {
            id: child_id.to_string(),
        });
        self.events.push(ChangeEvent::DistributionChanged {
            parent_id: parent_id.to_string(),
        });
        self.events.flush();
        Ok(())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Apply a patch to an item and mirror any parent or state change
    /// into the hierarchy caches. Returns the inverse patch for
    /// rollback. Queues events without flushing; the public operation
    /// decides when the batch goes out.
    fn integrate(&mut self, item_id: &str, patch: &ItemPatch) -> Result<ItemPatch, StoreError> {
        let item = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| StoreError::UnknownItem(item_id.to_string()))?;
        let inverse = patch.inverse_of(item);
        let old_parent = item.parent_id.clone();
        let old_state = item.state_id.clone();
        patch.apply_to(item);
        let new_parent = item.parent_id.clone();
        let new_state = item.state_id.clone();

        self.events.push(ChangeEvent::ItemPatched {
            id: item_id.to_string(),
        });
        self.sync_hierarchy(item_id, old_parent, new_parent, old_state, new_state);
        Ok(inverse)
    }

    /// Mirror an item's parent/state transition into child lists and
    /// distributions. The moves land before any event is delivered, so
    /// subscribers never see a child under two parents or counted
    /// twice.
    fn sync_hierarchy(
        &mut self,
        child_id: &str,
        old_parent: Option<String>,
        new_parent: Option<String>,
        old_state: Option<String>,
        new_state: Option<String>,
    ) {
        let old_group = old_state
            .as_deref()
            .and_then(|id| self.resolve_state_group(id));
        let new_group = new_state
            .as_deref()
            .and_then(|id| self.resolve_state_group(id));

        if old_parent != new_parent {
            self.sub_issues
                .reparent(child_id, old_parent.as_deref(), new_parent.as_deref());

            let loaded = |parent: Option<&str>| {
                parent.is_some_and(|id| self.sub_issues.load_state(id) == LoadState::Loaded)
            };
            if loaded(old_parent.as_deref()) || loaded(new_parent.as_deref()) {
                self.events.push(ChangeEvent::ChildMoved {
                    child_id: child_id.to_string(),
                    old_parent_id: old_parent.clone(),
                    new_parent_id: new_parent.clone(),
                });
            }
            if let Some(parent) = old_parent.as_deref() {
                self.sub_issues.reclassify(parent, child_id, old_group, None);
                if self.sub_issues.load_state(parent) == LoadState::Loaded {
                    self.events.push(ChangeEvent::DistributionChanged {
                        parent_id: parent.to_string(),
                    });
                }
            }
            if let Some(parent) = new_parent.as_deref() {
                self.sub_issues.reclassify(parent, child_id, None, new_group);
                if self.sub_issues.load_state(parent) == LoadState::Loaded {
                    self.events.push(ChangeEvent::DistributionChanged {
                        parent_id: parent.to_string(),
                    });
                }
            }
        } else if old_state != new_state && old_group != new_group {
            if let Some(parent) = new_parent.as_deref() {
                self.sub_issues
                    .reclassify(parent, child_id, old_group, new_group);
                if self.sub_issues.load_state(parent) == LoadState::Loaded {
                    self.events.push(ChangeEvent::DistributionChanged {
                        parent_id: parent.to_string(),
                    });
                }
            }
        }
    }
}

fn sort_for_view(members: &mut [&WorkItem], order_by: OrderBy) {
    members.sort_by(|a, b| {
        let primary = match order_by {
            OrderBy::SortOrder => a.sort_order.total_cmp(&b.sort_order),
            OrderBy::Priority => a
                .priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| a.sort_order.total_cmp(&b.sort_order)),
            OrderBy::TargetDate => cmp_target_date(a, b)
                .then_with(|| a.sort_order.total_cmp(&b.sort_order)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

// scheduled items first, soonest due date on top
fn cmp_target_date(a: &WorkItem, b: &WorkItem) -> Ordering {
    match (a.target_date, b.target_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
