//! Change notification for presentation layers.
//!
//! # Responsibility
//! - Let an external view observe which schedule property changed.
//! - Keep subscribe/unsubscribe paired through stable observer ids.
//!
//! # Invariants
//! - Observers are notified synchronously, in subscription order.
//! - An unsubscribed observer is dropped and never notified again.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// Tracked property of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleProperty {
    WindowStart,
    WindowEnd,
    /// The block sequence changed structurally (rebuild, reflow, insert,
    /// decode).
    Blocks,
    BlockStart(usize),
    BlockEnd(usize),
    BlockLabel(usize),
    SummaryText,
    IsSummaryEmpty,
    CompressedBlocks,
}

/// Receiver of schedule change notifications.
pub trait ScheduleObserver {
    fn property_changed(&mut self, property: ScheduleProperty);
}

impl<F> ScheduleObserver for F
where
    F: FnMut(ScheduleProperty),
{
    fn property_changed(&mut self, property: ScheduleProperty) {
        self(property);
    }
}

/// Handle returned by `subscribe`, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

/// Ordered set of subscribed observers.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: BTreeMap<ObserverId, Box<dyn ScheduleObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ScheduleObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Removes one observer. Returns `false` for an unknown id.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub fn notify(&mut self, property: ScheduleProperty) {
        for observer in self.observers.values_mut() {
            observer.property_changed(property);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Debug for ObserverRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ObserverRegistry, ScheduleProperty};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_observer_is_not_notified() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();

        let sink = Rc::clone(&seen);
        let id = registry.subscribe(Box::new(move |property: ScheduleProperty| {
            sink.borrow_mut().push(property)
        }));
        registry.notify(ScheduleProperty::SummaryText);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.notify(ScheduleProperty::Blocks);

        assert_eq!(*seen.borrow(), vec![ScheduleProperty::SummaryText]);
        assert!(registry.is_empty());
    }
}
