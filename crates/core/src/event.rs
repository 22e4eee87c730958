//! Collection notifications.
//!
//! Event names such as `"change:sweet"` are decoded once, at the boundary
//! where a collaborator hands them over, into the typed [`Event`] enum. Every
//! handler downstream matches on variants instead of re-parsing strings.

use alloc::borrow::Cow;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::fmt;

/// Prefix of per-property change notifications.
pub const CHANGE_PREFIX: &str = "change:";

/// A notification emitted by a collection or a view.
pub enum Event<M: ?Sized> {
    /// A record joined the collection.
    Add(Rc<M>),
    /// A record left the collection.
    Remove(Rc<M>),
    /// The collection's membership was replaced wholesale.
    Reset,
    /// The collection's order changed.
    Sort,
    /// A property of a member record changed.
    PropertyChanged { record: Rc<M>, field: String },
    /// Any other domain event.
    Other { name: String, record: Option<Rc<M>> },
}

impl<M: ?Sized> Event<M> {
    /// Decodes a named notification.
    ///
    /// `add`, `remove` and `change:<field>` need a record; without one they
    /// decode as [`Event::Other`].
    pub fn decode(name: &str, record: Option<Rc<M>>) -> Self {
        match (name, record) {
            ("add", Some(record)) => Event::Add(record),
            ("remove", Some(record)) => Event::Remove(record),
            ("reset", _) => Event::Reset,
            ("sort", _) => Event::Sort,
            (name, Some(record)) if name.len() > CHANGE_PREFIX.len() && name.starts_with(CHANGE_PREFIX) => {
                Event::PropertyChanged {
                    record,
                    field: name[CHANGE_PREFIX.len()..].to_string(),
                }
            }
            (name, record) => Event::Other {
                name: name.to_string(),
                record,
            },
        }
    }

    /// Returns the event's name in `change:<field>` notation.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Event::Add(_) => Cow::Borrowed("add"),
            Event::Remove(_) => Cow::Borrowed("remove"),
            Event::Reset => Cow::Borrowed("reset"),
            Event::Sort => Cow::Borrowed("sort"),
            Event::PropertyChanged { field, .. } => Cow::Owned(format!("{}{}", CHANGE_PREFIX, field)),
            Event::Other { name, .. } => Cow::Borrowed(name.as_str()),
        }
    }

    /// Returns the record this event names, if any.
    pub fn record(&self) -> Option<&Rc<M>> {
        match self {
            Event::Add(record) | Event::Remove(record) => Some(record),
            Event::PropertyChanged { record, .. } => Some(record),
            Event::Other { record, .. } => record.as_ref(),
            Event::Reset | Event::Sort => None,
        }
    }

    /// Returns the changed property for `PropertyChanged`.
    pub fn changed_field(&self) -> Option<&str> {
        match self {
            Event::PropertyChanged { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Returns true for raw membership transitions.
    #[inline]
    pub fn is_membership(&self) -> bool {
        matches!(self, Event::Add(_) | Event::Remove(_))
    }
}

impl<M: ?Sized> Clone for Event<M> {
    fn clone(&self) -> Self {
        match self {
            Event::Add(record) => Event::Add(record.clone()),
            Event::Remove(record) => Event::Remove(record.clone()),
            Event::Reset => Event::Reset,
            Event::Sort => Event::Sort,
            Event::PropertyChanged { record, field } => Event::PropertyChanged {
                record: record.clone(),
                field: field.clone(),
            },
            Event::Other { name, record } => Event::Other {
                name: name.clone(),
                record: record.clone(),
            },
        }
    }
}

impl<M: ?Sized> fmt::Debug for Event<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_membership() {
        let record = Rc::new(1u32);
        assert!(matches!(Event::decode("add", Some(record.clone())), Event::Add(_)));
        assert!(matches!(Event::decode("remove", Some(record)), Event::Remove(_)));
        assert!(matches!(Event::<u32>::decode("reset", None), Event::Reset));
        assert!(matches!(Event::<u32>::decode("sort", None), Event::Sort));
    }

    #[test]
    fn test_decode_property_change() {
        let event = Event::decode("change:sweet", Some(Rc::new(1u32)));
        assert_eq!(event.changed_field(), Some("sweet"));
        assert_eq!(event.name(), "change:sweet");
        assert!(!event.is_membership());
    }

    #[test]
    fn test_decode_without_record_is_other() {
        let event = Event::<u32>::decode("add", None);
        assert!(matches!(event, Event::Other { ref name, record: None } if name == "add"));

        let event = Event::<u32>::decode("change:", Some(Rc::new(3)));
        assert!(matches!(event, Event::Other { .. }));
        assert_eq!(event.record().map(|r| **r), Some(3));
    }

    #[test]
    fn test_decode_domain_event() {
        let event = Event::decode("highlight", Some(Rc::new(5u32)));
        assert_eq!(event.name(), "highlight");
        assert_eq!(event.record().map(|r| **r), Some(5));
        assert_eq!(alloc::format!("{:?}", event), "Event(highlight)");
    }
}
