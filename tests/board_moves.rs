//! Integration tests for planning and dispatching board moves.
//!
//! Each test builds a small in-memory board, drives a drag gesture
//! through the store, and verifies the resulting patch, the cache
//! state, and the event batches subscribers observe.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use swimlane::model::{
    GroupDimension, ItemPatch, StateGroup, ViewConfig, WorkItem, WorkflowState,
};
use swimlane::ops::{DragLocation, MoveError};
use swimlane::store::{BoardStore, ChangeEvent, PersistError, Persistence, StoreError};

/// Records every persistence call; optionally refuses updates.
#[derive(Default)]
struct RecordingPersist {
    updates: Vec<(String, ItemPatch)>,
    children: IndexMap<String, Vec<WorkItem>>,
    refuse_updates: bool,
}

impl Persistence for RecordingPersist {
    fn update_item(
        &mut self,
        _project_id: &str,
        item_id: &str,
        patch: &ItemPatch,
    ) -> Result<(), PersistError> {
        if self.refuse_updates {
            return Err(PersistError("server said no".to_string()));
        }
        self.updates.push((item_id.to_string(), patch.clone()));
        Ok(())
    }

    fn delete_item(&mut self, _project_id: &str, _item_id: &str) -> Result<(), PersistError> {
        Ok(())
    }

    fn fetch_children(&mut self, parent_id: &str) -> Result<Vec<WorkItem>, PersistError> {
        Ok(self.children.get(parent_id).cloned().unwrap_or_default())
    }

    fn fetch_sibling_metadata(&mut self, _project_ids: &[String]) -> Result<(), PersistError> {
        Ok(())
    }
}

fn item(id: &str, state_id: &str, sort_order: f64) -> WorkItem {
    let mut item = WorkItem::new(id, "P1", &format!("Item {id}"), sort_order);
    item.state_id = Some(state_id.to_string());
    item
}

/// Three states, two populated columns, one empty.
fn board() -> BoardStore {
    let mut store = BoardStore::new();
    store.upsert_states(vec![
        WorkflowState::new("S1", "Todo", StateGroup::Unstarted, "P1"),
        WorkflowState::new("S2", "In Progress", StateGroup::Started, "P1"),
        WorkflowState::new("S3", "Done", StateGroup::Completed, "P1"),
    ]);
    store.upsert_items(vec![
        item("I1", "S1", 100.0),
        item("I2", "S1", 200.0),
        item("I3", "S2", 300.0),
    ]);
    store
}

fn grab(group_id: &str, item_id: &str) -> DragLocation {
    DragLocation {
        item_id: Some(item_id.to_string()),
        ..DragLocation::new(group_id)
    }
}

fn drop_on(group_id: &str, item_id: &str) -> DragLocation {
    grab(group_id, item_id)
}

fn record_batches(store: &mut BoardStore) -> Rc<RefCell<Vec<Vec<ChangeEvent>>>> {
    let batches: Rc<RefCell<Vec<Vec<ChangeEvent>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&batches);
    store.subscribe(move |batch| sink.borrow_mut().push(batch.to_vec()));
    batches
}

// --- Sort key scenarios ---

#[test]
fn drop_past_the_end_appends_one_gap_below() {
    let store = board();
    let view = ViewConfig::kanban();

    // I3 comes from S2; S1's bucket is [I1(100), I2(200)]
    let plan = store
        .plan_view_move(&view, &grab("S2", "I3"), &DragLocation::new("S1"))
        .unwrap();
    assert_eq!(plan.patch.sort_order, Some(65735.0));
    assert_eq!(plan.patch.state_id, Some(Some("S1".to_string())));
}

#[test]
fn drop_between_neighbors_takes_the_midpoint() {
    let mut store = board();
    let view = ViewConfig::kanban();
    store.upsert_items(vec![item("I2B", "S1", 300.0)]);
    // S1 bucket is now [I1(100), I2(200), I2B(300)]; drop I3 on I2B
    let plan = store
        .plan_view_move(&view, &grab("S2", "I3"), &drop_on("S1", "I2B"))
        .unwrap();
    assert_eq!(plan.patch.sort_order, Some(250.0));
}

#[test]
fn drop_into_an_empty_column_gets_the_default_key() {
    let store = board();
    let view = ViewConfig::kanban();
    let plan = store
        .plan_view_move(&view, &grab("S2", "I3"), &DragLocation::new("S3"))
        .unwrap();
    assert_eq!(plan.patch.sort_order, Some(65535.0));
}

#[test]
fn drop_on_own_slot_preserves_the_column_order() {
    let mut store = board();
    let view = ViewConfig::kanban();
    let mut persist = RecordingPersist::default();

    let before = store.bucket_ids(&view, "S1", None);
    let plan = store
        .plan_view_move(&view, &grab("S1", "I1"), &drop_on("S1", "I1"))
        .unwrap();
    store.dispatch_move(plan, &mut persist).unwrap();
    assert_eq!(store.bucket_ids(&view, "S1", None), before);
}

#[test]
fn moved_item_lands_strictly_between_its_new_neighbors() {
    let mut store = board();
    let view = ViewConfig::kanban();
    let mut persist = RecordingPersist::default();
    store.upsert_items(vec![item("I2B", "S1", 300.0)]);

    // drag the bottom item up between I1 and I2
    let plan = store
        .plan_view_move(&view, &grab("S1", "I2B"), &drop_on("S1", "I2"))
        .unwrap();
    store.dispatch_move(plan, &mut persist).unwrap();

    assert_eq!(store.bucket_ids(&view, "S1", None), ["I1", "I2B", "I2"]);
    let key = store.item("I2B").unwrap().sort_order;
    assert!(key > 100.0 && key < 200.0);
}

// --- Regrouping ---

#[test]
fn cross_column_move_patches_the_state_field() {
    let mut store = board();
    let view = ViewConfig::kanban();
    let mut persist = RecordingPersist::default();

    let plan = store
        .plan_view_move(&view, &grab("S1", "I1"), &DragLocation::new("S2"))
        .unwrap();
    store.dispatch_move(plan, &mut persist).unwrap();

    let moved = store.item("I1").unwrap();
    assert_eq!(moved.state_id.as_deref(), Some("S2"));
    assert_eq!(store.bucket_ids(&view, "S2", None), ["I3", "I1"]);
    assert_eq!(store.bucket_ids(&view, "S1", None), ["I2"]);

    // the server saw one patch carrying both writes
    assert_eq!(persist.updates.len(), 1);
    let (id, patch) = &persist.updates[0];
    assert_eq!(id, "I1");
    assert_eq!(patch.state_id, Some(Some("S2".to_string())));
    assert!(patch.sort_order.is_some());
}

#[test]
fn multi_valued_move_edits_the_set() {
    let mut store = board();
    let mut moduled = item("I9", "S1", 400.0);
    moduled.module_ids = vec!["MA".to_string(), "MB".to_string()];
    store.upsert_items(vec![moduled]);

    let mut view = ViewConfig::kanban();
    view.group_by = Some(GroupDimension::Module);

    let plan = store
        .plan_view_move(&view, &grab("MA", "I9"), &DragLocation::new("MC"))
        .unwrap();
    assert_eq!(
        plan.patch.module_ids,
        Some(vec!["MB".to_string(), "MC".to_string()])
    );
}

// --- Cancelled gestures ---

#[test]
fn vanished_drop_target_cancels_the_move() {
    let store = board();
    let view = ViewConfig::kanban();
    let err = store
        .plan_view_move(&view, &grab("S1", "I1"), &drop_on("S2", "GONE"))
        .unwrap_err();
    assert_eq!(err, MoveError::TargetNotInBucket("GONE".to_string()));
}

#[test]
fn ungrouped_view_cannot_plan_a_move() {
    let store = board();
    let mut view = ViewConfig::kanban();
    view.group_by = None;
    let err = store
        .plan_view_move(&view, &grab("S1", "I1"), &DragLocation::new("S2"))
        .unwrap_err();
    assert_eq!(err, MoveError::UngroupedView);
}

// --- Persistence outcomes ---

#[test]
fn rejected_move_rolls_the_board_back() {
    let mut store = board();
    let view = ViewConfig::kanban();
    let batches = record_batches(&mut store);
    let mut persist = RecordingPersist {
        refuse_updates: true,
        ..RecordingPersist::default()
    };

    let plan = store
        .plan_view_move(&view, &grab("S1", "I1"), &DragLocation::new("S2"))
        .unwrap();
    let err = store.dispatch_move(plan, &mut persist).unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)));

    // board back to the pre-drag state
    assert_eq!(store.item("I1").unwrap().state_id.as_deref(), Some("S1"));
    assert_eq!(store.item("I1").unwrap().sort_order, 100.0);
    assert_eq!(store.bucket_ids(&view, "S1", None), ["I1", "I2"]);
    assert_eq!(store.bucket_ids(&view, "S2", None), ["I3"]);

    // optimistic batch, then a rollback batch ending in the rejection
    let batches = batches.borrow();
    assert_eq!(batches.len(), 2);
    assert_eq!(
        batches[1].last(),
        Some(&ChangeEvent::MoveRejected {
            item_id: "I1".to_string()
        })
    );
}

#[test]
fn successful_move_delivers_one_batch() {
    let mut store = board();
    let view = ViewConfig::kanban();
    let batches = record_batches(&mut store);
    let mut persist = RecordingPersist::default();

    let plan = store
        .plan_view_move(&view, &grab("S1", "I1"), &DragLocation::new("S2"))
        .unwrap();
    store.dispatch_move(plan, &mut persist).unwrap();

    let batches = batches.borrow();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0].first(),
        Some(&ChangeEvent::ItemPatched {
            id: "I1".to_string()
        })
    );
}

#[test]
fn rapid_successive_drags_compute_against_optimistic_state() {
    let mut store = board();
    let view = ViewConfig::kanban();
    let mut persist = RecordingPersist::default();

    // both drags run before any server echo arrives
    let plan = store
        .plan_view_move(&view, &grab("S1", "I1"), &DragLocation::new("S2"))
        .unwrap();
    store.dispatch_move(plan, &mut persist).unwrap();

    let plan = store
        .plan_view_move(&view, &grab("S1", "I2"), &DragLocation::new("S2"))
        .unwrap();
    // second key computed against the bucket that already holds I1
    assert_eq!(plan.patch.sort_order, Some(300.0 + 2.0 * 65535.0));
    store.dispatch_move(plan, &mut persist).unwrap();

    assert_eq!(store.bucket_ids(&view, "S2", None), ["I3", "I1", "I2"]);
    assert!(store.bucket_ids(&view, "S1", None).is_empty());
}
