use crate::model::group::GroupDimension;
use crate::model::item::WorkItem;
use crate::model::patch::ItemPatch;
use crate::ops::sort_order::reorder_key;
use crate::ops::MoveError;

/// One end of a drag gesture on a grouped board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DragLocation {
    /// Bucket the gesture starts or ends in
    pub group_id: String,
    /// Swimlane row within the bucket, on sub-grouped boards only
    pub sub_group_id: Option<String>,
    /// At the source, the dragged item. At the destination, the item
    /// under the drop slot; `None` drops past the end of the bucket.
    pub item_id: Option<String>,
}

impl DragLocation {
    pub fn new(group_id: &str) -> Self {
        DragLocation {
            group_id: group_id.to_string(),
            sub_group_id: None,
            item_id: None,
        }
    }
}

/// Outcome of a planned move: the patch to persist for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    pub item_id: String,
    pub project_id: String,
    pub patch: ItemPatch,
}

/// Plan a drag between two board locations.
///
/// Produces a patch that always carries a fresh `sort_order`, plus the
/// grouping field writes implied by crossing buckets: the `group_by`
/// attribute when the group changed, the `sub_group_by` attribute when
/// the row changed. Multi-valued attributes are edited with set
/// semantics (source id removed, destination id added once).
///
/// The planner never mutates anything; an `Err` means the gesture is
/// abandoned and the board stays as it was.
pub fn plan_move<'a>(
    source: &DragLocation,
    destination: &DragLocation,
    group_by: GroupDimension,
    sub_group_by: Option<GroupDimension>,
    insert_at_top: bool,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
    lookup_bucket: impl Fn(&str, Option<&str>) -> Vec<String>,
) -> Result<MovePlan, MoveError> {
    let moved_id = source.item_id.as_deref().ok_or(MoveError::MissingSource)?;

    let sub_move = match sub_group_by {
        Some(dimension) => match (
            source.sub_group_id.as_deref(),
            destination.sub_group_id.as_deref(),
        ) {
            (Some(from), Some(to)) => Some((dimension, from, to)),
            _ => return Err(MoveError::MissingSubGroup),
        },
        None => None,
    };

    let item = lookup_item(moved_id)
        .ok_or_else(|| MoveError::UnknownItem(moved_id.to_string()))?;

    let bucket = lookup_bucket(&destination.group_id, destination.sub_group_id.as_deref());
    let key = reorder_key(
        &bucket,
        moved_id,
        destination.item_id.as_deref(),
        insert_at_top,
        lookup_item,
    )?;

    let mut patch = ItemPatch {
        sort_order: Some(key),
        ..ItemPatch::default()
    };

    if destination.group_id != source.group_id
        && !group_by.write_regroup(item, &source.group_id, &destination.group_id, &mut patch)
    {
        return Err(MoveError::UnknownGroup(destination.group_id.clone()));
    }

    if let Some((dimension, from, to)) = sub_move {
        if from != to && !dimension.write_regroup(item, from, to, &mut patch) {
            return Err(MoveError::UnknownGroup(to.to_string()));
        }
    }

    Ok(MovePlan {
        item_id: moved_id.to_string(),
        project_id: item.project_id.clone(),
        patch,
    })
}
