//! Source events re-published to view subscribers.

use crate::state::ViewState;
use prism_core::{Event, Record};

/// Returns true if a source event should be re-published verbatim.
///
/// Membership and sort events are never passed through, since the view
/// publishes its own. `Reset` always is. Anything else is passed through
/// when it names a record currently visible in the view.
pub fn should_proxy<M: Record + 'static>(state: &ViewState<M>, event: &Event<M>) -> bool {
    if event.is_membership() {
        return false;
    }
    match event {
        Event::Sort => false,
        Event::Reset => true,
        other => other
            .record()
            .is_some_and(|record| state.visible.contains(&record.cid())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::SortCheck;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use prism_core::{Cid, Value};

    struct Item(Cid);

    impl Record for Item {
        fn cid(&self) -> Cid {
            self.0
        }

        fn field(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn test_proxy_rules() {
        let member = Rc::new(Item(1));
        let outsider = Rc::new(Item(2));
        let mut state = ViewState::new(vec!["id".to_string()]);
        state.replace(vec![member.clone()], SortCheck::Never);

        assert!(should_proxy(&state, &Event::Reset));
        assert!(!should_proxy(&state, &Event::Sort));
        assert!(!should_proxy(&state, &Event::Add(member.clone())));
        assert!(!should_proxy(&state, &Event::Remove(member.clone())));
        assert!(should_proxy(&state, &Event::decode("change:name", Some(member.clone()))));
        assert!(should_proxy(&state, &Event::decode("highlight", Some(member))));
        assert!(!should_proxy(&state, &Event::decode("highlight", Some(outsider))));
        assert!(!should_proxy(&state, &Event::decode("highlight", None)));
    }
}
