use std::mem;

/// A change notification emitted by the board store.
///
/// Every public store operation delivers its events as one batch, after
/// all of the operation's mutations have landed. Subscribers therefore
/// never observe a half-applied update, and a multi-part change such as
/// a reparent arrives as a single batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Items inserted or refreshed wholesale (initial load, child fetch)
    ItemsUpserted { ids: Vec<String> },
    /// An item's fields changed via a patch
    ItemPatched { id: String },
    /// An item ceased to exist
    ItemRemoved { id: String },
    /// A parent's child list finished loading
    ChildrenLoaded { parent_id: String },
    /// A child switched parents; either side may be detached (`None`)
    ChildMoved {
        child_id: String,
        old_parent_id: Option<String>,
        new_parent_id: Option<String>,
    },
    /// A parent's per-state-group rollup changed
    DistributionChanged { parent_id: String },
    /// An optimistic move was rolled back after persistence failed
    MoveRejected { item_id: String },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(usize);

type Subscriber = Box<dyn FnMut(&[ChangeEvent])>;

/// Collects events during a store operation and delivers them in one
/// batch when the operation flushes.
#[derive(Default)]
pub struct EventBus {
    pending: Vec<ChangeEvent>,
    subscribers: Vec<(usize, Subscriber)>,
    next_id: usize,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&[ChangeEvent]) + 'static) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        SubscriberId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id.0);
    }

    /// Queue an event for the current batch.
    pub fn push(&mut self, event: ChangeEvent) {
        self.pending.push(event);
    }

    /// Deliver the queued batch to every subscriber. Does nothing when
    /// no events are pending, so an operation that turned out to be a
    /// no-op stays silent.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let batch = mem::take(&mut self.pending);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&batch);
        }
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<Vec<ChangeEvent>>>>, impl FnMut(&[ChangeEvent])) {
        let batches: Rc<RefCell<Vec<Vec<ChangeEvent>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&batches);
        (batches, move |batch: &[ChangeEvent]| {
            sink.borrow_mut().push(batch.to_vec());
        })
    }

    #[test]
    fn flush_delivers_one_batch() {
        let mut bus = EventBus::new();
        let (batches, sink) = recorder();
        bus.subscribe(sink);

        bus.push(ChangeEvent::ItemPatched {
            id: "I1".to_string(),
        });
        bus.push(ChangeEvent::DistributionChanged {
            parent_id: "P1".to_string(),
        });
        assert!(batches.borrow().is_empty());

        bus.flush();
        let batches = batches.borrow();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn flush_clears_pending() {
        let mut bus = EventBus::new();
        let (batches, sink) = recorder();
        bus.subscribe(sink);

        bus.push(ChangeEvent::ItemRemoved {
            id: "I1".to_string(),
        });
        bus.flush();
        assert_eq!(bus.pending_len(), 0);

        bus.flush();
        assert_eq!(batches.borrow().len(), 1);
    }

    #[test]
    fn empty_flush_is_silent() {
        let mut bus = EventBus::new();
        let (batches, sink) = recorder();
        bus.subscribe(sink);

        bus.flush();
        assert!(batches.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let (batches, sink) = recorder();
        let id = bus.subscribe(sink);

        bus.push(ChangeEvent::ItemPatched {
            id: "I1".to_string(),
        });
        bus.flush();
        assert_eq!(batches.borrow().len(), 1);

        bus.unsubscribe(id);
        bus.push(ChangeEvent::ItemPatched {
            id: "I2".to_string(),
        });
        bus.flush();
        assert_eq!(batches.borrow().len(), 1);
    }

    #[test]
    fn multiple_subscribers_each_get_the_batch() {
        let mut bus = EventBus::new();
        let (first, first_sink) = recorder();
        let (second, second_sink) = recorder();
        bus.subscribe(first_sink);
        bus.subscribe(second_sink);

        bus.push(ChangeEvent::ChildrenLoaded {
            parent_id: "P1".to_string(),
        });
        bus.flush();
        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 1);
    }
}
