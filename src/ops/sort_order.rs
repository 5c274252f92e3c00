use crate::model::item::WorkItem;
use crate::ops::MoveError;

/// Gap between adjacent keys when appending or prepending, and the key
/// assigned to the first item of an empty bucket.
pub const SORT_ORDER_GAP: f64 = 65535.0;

/// Compute the sort key for an item dropped into `destination_ids`.
///
/// `destination_ids` is the destination bucket in display order with the
/// moved item already removed (see [`reorder_key`] for the variant that
/// handles removal). `target_item_id` names the item currently occupying
/// the drop slot; `None` appends, or prepends when `insert_at_top` is
/// set. The key lands strictly between the resulting neighbors, outside
/// the current range at either boundary.
///
/// Interior drops take the midpoint of the neighboring keys. Repeated
/// insertion at the same boundary therefore halves the available gap
/// each time; keys are never renormalized, so the subdivision depth is
/// bounded only by f64 precision.
pub fn compute_sort_order<'a>(
    destination_ids: &[String],
    target_item_id: Option<&str>,
    insert_at_top: bool,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
) -> Result<f64, MoveError> {
    if destination_ids.is_empty() {
        return Ok(SORT_ORDER_GAP);
    }

    let index = match target_item_id {
        Some(target) => destination_ids
            .iter()
            .position(|id| id == target)
            .ok_or_else(|| MoveError::TargetNotInBucket(target.to_string()))?,
        None if insert_at_top => 0,
        None => destination_ids.len(),
    };

    let key_of = |id: &str| {
        lookup_item(id)
            .map(|item| item.sort_order)
            .ok_or_else(|| MoveError::UnknownItem(id.to_string()))
    };

    if index == 0 {
        Ok(key_of(&destination_ids[0])? - SORT_ORDER_GAP)
    } else if index == destination_ids.len() {
        Ok(key_of(&destination_ids[destination_ids.len() - 1])? + SORT_ORDER_GAP)
    } else {
        let above = key_of(&destination_ids[index - 1])?;
        let below = key_of(&destination_ids[index])?;
        Ok((above + below) / 2.0)
    }
}

/// Sort key for moving `moved_id` within (or into) `bucket_ids`.
///
/// Removes the moved item's own entry before computing, and treats a
/// drop onto the item's own card as "keep the current slot", so a move
/// that lands where it started recomputes a key that preserves the
/// existing order.
pub fn reorder_key<'a>(
    bucket_ids: &[String],
    moved_id: &str,
    target_item_id: Option<&str>,
    insert_at_top: bool,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
) -> Result<f64, MoveError> {
    let moved_position = bucket_ids.iter().position(|id| id == moved_id);
    let remaining: Vec<String> = bucket_ids
        .iter()
        .filter(|id| id.as_str() != moved_id)
        .cloned()
        .collect();

    let target = match target_item_id {
        // after removal, the moved item's slot is held by its old successor
        Some(target) if target == moved_id => moved_position
            .and_then(|position| remaining.get(position))
            .map(|id| id.as_str()),
        other => other,
    };

    compute_sort_order(&remaining, target, insert_at_top, lookup_item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn sample_items(keys: &[(&str, f64)]) -> IndexMap<String, WorkItem> {
        keys.iter()
            .map(|(id, sort_order)| {
                (
                    id.to_string(),
                    WorkItem::new(id, "P1", &format!("Item {id}"), *sort_order),
                )
            })
            .collect()
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_empty_bucket_uses_default_gap() {
        let items = sample_items(&[]);
        let key = compute_sort_order(&[], None, false, |id| items.get(id)).unwrap();
        assert_eq!(key, 65535.0);
        // the same regardless of the top flag
        let key = compute_sort_order(&[], None, true, |id| items.get(id)).unwrap();
        assert_eq!(key, 65535.0);
    }

    #[test]
    fn test_append_offsets_past_last() {
        let items = sample_items(&[("I1", 100.0), ("I2", 200.0)]);
        let bucket = ids(&["I1", "I2"]);
        let key = compute_sort_order(&bucket, None, false, |id| items.get(id)).unwrap();
        assert_eq!(key, 65735.0);
    }

    #[test]
    fn test_insert_at_top_offsets_before_first() {
        let items = sample_items(&[("I1", 100.0), ("I2", 200.0)]);
        let bucket = ids(&["I1", "I2"]);
        let key = compute_sort_order(&bucket, None, true, |id| items.get(id)).unwrap();
        assert_eq!(key, 100.0 - 65535.0);
    }

    #[test]
    fn test_drop_on_first_item_prepends() {
        let items = sample_items(&[("I1", 100.0), ("I2", 200.0)]);
        let bucket = ids(&["I1", "I2"]);
        let key = compute_sort_order(&bucket, Some("I1"), false, |id| items.get(id)).unwrap();
        assert_eq!(key, 100.0 - 65535.0);
    }

    #[test]
    fn test_interior_drop_takes_midpoint() {
        let items = sample_items(&[("I1", 100.0), ("I2", 300.0)]);
        let bucket = ids(&["I1", "I2"]);
        let key = compute_sort_order(&bucket, Some("I2"), false, |id| items.get(id)).unwrap();
        assert_eq!(key, 200.0);
    }

    #[test]
    fn test_unknown_target_aborts() {
        let items = sample_items(&[("I1", 100.0)]);
        let bucket = ids(&["I1"]);
        let err = compute_sort_order(&bucket, Some("I9"), false, |id| items.get(id)).unwrap_err();
        assert_eq!(err, MoveError::TargetNotInBucket("I9".to_string()));
    }

    #[test]
    fn test_unresolvable_neighbor_aborts() {
        let items = sample_items(&[("I1", 100.0)]);
        // bucket names an id the collection no longer has
        let bucket = ids(&["I1", "GONE"]);
        let err = compute_sort_order(&bucket, None, false, |id| items.get(id)).unwrap_err();
        assert_eq!(err, MoveError::UnknownItem("GONE".to_string()));
    }

    #[test]
    fn test_repeated_interior_insertion_stays_strictly_between() {
        let mut items = sample_items(&[("LOW", 100.0), ("PREV", 300.0)]);
        let bucket = ids(&["LOW", "PREV"]);

        // repeatedly insert just above LOW, each inserted card becoming
        // the next drop target; keys halve toward LOW but must keep
        // strict order every round
        let mut upper = 300.0;
        for _ in 0..30 {
            let key =
                compute_sort_order(&bucket, Some("PREV"), false, |id| items.get(id)).unwrap();
            assert!(key > 100.0);
            assert!(key < upper);
            upper = key;
            items.get_mut("PREV").unwrap().sort_order = key;
        }
    }

    #[test]
    fn test_reorder_removes_own_entry() {
        let items = sample_items(&[("I1", 100.0), ("I2", 200.0), ("I3", 300.0)]);
        let bucket = ids(&["I1", "I2", "I3"]);
        // move I1 below I3: with I1 removed, appending lands past 300
        let key = reorder_key(&bucket, "I1", None, false, |id| items.get(id)).unwrap();
        assert_eq!(key, 300.0 + 65535.0);
    }

    #[test]
    fn test_reorder_onto_own_card_keeps_slot() {
        let items = sample_items(&[("I1", 100.0), ("I2", 200.0), ("I3", 300.0)]);
        let bucket = ids(&["I1", "I2", "I3"]);

        // I2 dropped on itself: new key stays strictly between I1 and I3
        let key = reorder_key(&bucket, "I2", Some("I2"), false, |id| items.get(id)).unwrap();
        assert!(key > 100.0 && key < 300.0);

        // last item dropped on itself stays last
        let key = reorder_key(&bucket, "I3", Some("I3"), false, |id| items.get(id)).unwrap();
        assert!(key > 200.0);

        // first item dropped on itself stays first
        let key = reorder_key(&bucket, "I1", Some("I1"), false, |id| items.get(id)).unwrap();
        assert!(key < 200.0);
    }

    #[test]
    fn test_reorder_drop_before_successor_matches_own_slot() {
        let items = sample_items(&[("I1", 100.0), ("I2", 200.0), ("I3", 300.0)]);
        let bucket = ids(&["I1", "I2", "I3"]);
        let own = reorder_key(&bucket, "I2", Some("I2"), false, |id| items.get(id)).unwrap();
        let explicit = reorder_key(&bucket, "I2", Some("I3"), false, |id| items.get(id)).unwrap();
        assert_eq!(own, explicit);
    }
}
