use crate::core::FieldId;
use std::collections::HashMap;
use std::rc::Rc;

/// Handle to a field's presentation element, owned by the UI layer.
pub trait FieldRef {
    fn scroll_into_view(&self);
    fn focus(&self);
}

#[derive(Default)]
pub struct FieldRefs {
    refs: HashMap<FieldId, Rc<dyn FieldRef>>,
}

impl FieldRefs {
    /// `None` drops the association, e.g. when the element unmounts.
    pub fn register(&mut self, id: impl Into<FieldId>, field_ref: Option<Rc<dyn FieldRef>>) {
        let id = id.into();
        match field_ref {
            Some(field_ref) => {
                self.refs.insert(id, field_ref);
            }
            None => {
                self.refs.remove(id.as_str());
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Rc<dyn FieldRef>> {
        self.refs.get(id).cloned()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{FieldRef, FieldRefs};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records scroll/focus requests as `"scroll:<name>"` / `"focus:<name>"`.
    pub(crate) struct RecordingRef {
        pub name: &'static str,
        pub log: Rc<RefCell<Vec<String>>>,
    }

    impl FieldRef for RecordingRef {
        fn scroll_into_view(&self) {
            self.log.borrow_mut().push(format!("scroll:{}", self.name));
        }

        fn focus(&self) {
            self.log.borrow_mut().push(format!("focus:{}", self.name));
        }
    }

    #[test]
    fn registering_none_removes_ref() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut refs = FieldRefs::default();
        refs.register(
            "email",
            Some(Rc::new(RecordingRef {
                name: "email",
                log: Rc::clone(&log),
            })),
        );
        assert!(refs.get("email").is_some());

        refs.register("email", None);
        assert!(refs.get("email").is_none());
    }
}
