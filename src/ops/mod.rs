use chrono::NaiveDate;

pub mod sort_order;
pub mod drag_drop;
pub mod calendar;
pub mod gantt;
pub mod search;

pub use sort_order::{compute_sort_order, reorder_key, SORT_ORDER_GAP};
pub use drag_drop::{plan_move, DragLocation, MovePlan};
pub use calendar::{group_by_target_date, is_weekend, plan_calendar_move};
pub use gantt::{
    block_for_item, plan_block_resize, plan_block_shift, plan_timeline_reorder,
    total_days_in_range, BlockEdge, GanttBlock,
};
pub use search::{build_query, matching_ids, search_items, MatchField, SearchHit};

/// Error type for move planning. Every variant means the gesture is
/// treated as cancelled: no patch is produced and nothing is mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoveError {
    #[error("item not found: {0}")]
    UnknownItem(String),
    #[error("drop target not in destination bucket: {0}")]
    TargetNotInBucket(String),
    #[error("move intent has no source item")]
    MissingSource,
    #[error("view has no grouping dimension")]
    UngroupedView,
    #[error("sub-grouped views require a sub-group on both ends of a move")]
    MissingSubGroup,
    #[error("group id not valid for the active dimension: {0}")]
    UnknownGroup(String),
    #[error("item has no scheduled dates: {0}")]
    Unscheduled(String),
    #[error("start date {start} is after target date {target}")]
    InvalidDateRange { start: NaiveDate, target: NaiveDate },
    #[error("date shift out of calendar range")]
    DateOutOfRange,
}
