use crate::core::FieldId;

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    ValueChanged { id: FieldId },
    Touched { id: FieldId },
    ErrorSet { id: FieldId, message: String },
    ErrorCleared { id: FieldId },
    ErrorsReset,
    SubmittingChanged(bool),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&FormEvent)>;

/// Observers notified synchronously, in subscription order, after each state change.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: FormEvent) {
        for (_, listener) in &mut self.entries {
            listener(&event);
        }
    }
}
