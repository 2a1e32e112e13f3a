use crate::core::FieldId;
use crate::core::field_props::{FieldBinding, FieldProps};
use crate::core::field_ref::{FieldRef, FieldRefs};
use crate::core::form_event::{FormEvent, Listener, Listeners, SubscriptionId};
use crate::core::scheduler::{Deferred, FOCUS_DELAY, Scheduler};
use crate::core::validation::{ValidationSchema, run_rules};
use crate::core::value::{FieldValues, Value};
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub type SubmitHandler = Box<dyn FnMut(FieldValues) -> LocalBoxFuture<'static, anyhow::Result<()>>>;

/// The adapter's submit event, if the host has a default action to suppress.
pub trait SubmitEvent {
    fn prevent_default(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the handler was not called.
    Invalid,
    /// Validation passed and the handler, if any, completed.
    Submitted,
    /// The handler returned an error or panicked. Already logged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub values: FieldValues,
    pub errors: IndexMap<FieldId, String>,
    pub touched: IndexSet<FieldId>,
    pub dirty: IndexSet<FieldId>,
    pub is_valid: bool,
    pub is_submitting: bool,
}

/// Form state: values, per-field errors, touched/dirty tracking and submission.
///
/// Single-threaded. Callers must not start a second `handle_submit` while
/// `is_submitting()` is true; the engine does not deduplicate submissions.
pub struct FormEngine {
    initial: FieldValues,
    values: FieldValues,
    errors: IndexMap<FieldId, String>,
    touched: IndexSet<FieldId>,
    dirty: IndexSet<FieldId>,
    is_submitting: bool,
    schema: Option<ValidationSchema>,
    on_submit: Option<SubmitHandler>,
    validate_on_change: bool,
    validate_on_blur: bool,
    refs: FieldRefs,
    scheduler: Scheduler,
    listeners: Listeners,
}

impl FormEngine {
    pub fn new<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<FieldId>,
        V: Into<Value>,
    {
        let initial: FieldValues = initial
            .into_iter()
            .map(|(id, value)| (id.into(), value.into()))
            .collect();

        Self {
            values: initial.clone(),
            initial,
            errors: IndexMap::new(),
            touched: IndexSet::new(),
            dirty: IndexSet::new(),
            is_submitting: false,
            schema: None,
            on_submit: None,
            validate_on_change: true,
            validate_on_blur: true,
            refs: FieldRefs::default(),
            scheduler: Scheduler::new(),
            listeners: Listeners::default(),
        }
    }

    pub fn with_schema(mut self, schema: ValidationSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_submit<F, Fut>(mut self, mut handler: F) -> Self
    where
        F: FnMut(FieldValues) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.on_submit = Some(Box::new(move |values| handler(values).boxed_local()));
        self
    }

    pub fn validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    pub fn validate_on_blur(mut self, enabled: bool) -> Self {
        self.validate_on_blur = enabled;
        self
    }

    // ── Observation ─────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&FormEvent) + 'static) -> SubscriptionId {
        let listener: Listener = Box::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn errors(&self) -> &IndexMap<FieldId, String> {
        &self.errors
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn touched(&self) -> &IndexSet<FieldId> {
        &self.touched
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.touched.contains(id)
    }

    pub fn dirty(&self) -> &IndexSet<FieldId> {
        &self.dirty
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.dirty.contains(id)
    }

    pub fn is_form_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// True when no field in the value set has a non-empty error.
    /// Fields that were never validated count as valid.
    pub fn is_valid(&self) -> bool {
        self.values
            .keys()
            .all(|id| self.errors.get(id).is_none_or(String::is_empty))
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            errors: self.errors.clone(),
            touched: self.touched.clone(),
            dirty: self.dirty.clone(),
            is_valid: self.is_valid(),
            is_submitting: self.is_submitting,
        }
    }

    pub fn field_props(&self, id: impl Into<FieldId>) -> FieldProps {
        let id = id.into();
        FieldProps {
            value: self.values.get(id.as_str()).cloned().unwrap_or_default(),
            error: self.errors.get(id.as_str()).cloned(),
            touched: self.touched.contains(id.as_str()),
            dirty: self.dirty.contains(id.as_str()),
            binding: FieldBinding::new(id.clone()),
            id,
        }
    }

    // ── Value changes ───────────────────────────────────────────────────

    /// Marks the field dirty even when the value is unchanged.
    pub fn set_value(&mut self, id: impl Into<FieldId>, value: impl Into<Value>) {
        let id = id.into();
        self.values.insert(id.clone(), value.into());
        self.dirty.insert(id.clone());
        self.listeners.emit(FormEvent::ValueChanged { id: id.clone() });

        if self.validate_on_change && self.touched.contains(id.as_str()) {
            self.clear_error(id.as_str());
            self.validate_field(id.as_str());
        }
    }

    pub fn handle_change(&mut self, id: impl Into<FieldId>, value: impl Into<Value>) {
        self.set_value(id, value);
    }

    pub fn handle_blur(&mut self, id: impl Into<FieldId>) {
        let id = id.into();
        self.touch(id.clone());
        if self.validate_on_blur {
            self.validate_field(id.as_str());
        }
    }

    /// Marks the field touched without validating it.
    pub fn touch(&mut self, id: impl Into<FieldId>) {
        let id = id.into();
        if self.touched.insert(id.clone()) {
            self.listeners.emit(FormEvent::Touched { id });
        }
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Runs the field's rules in order, keeping only the first failure.
    /// Fields without rules pass and leave the error map alone.
    pub fn validate_field(&mut self, id: &str) -> bool {
        let result = {
            let Some(rules) = self.schema.as_ref().and_then(|s| s.rules_for(id)) else {
                return true;
            };
            let value = Value::normalized(self.values.get(id));
            run_rules(rules, &value, &self.values)
        };

        match result {
            Ok(()) => {
                self.clear_error(id);
                true
            }
            Err(message) => {
                log::trace!("field `{id}` failed validation: {message}");
                self.set_error(id, message);
                false
            }
        }
    }

    /// Touches every field, then validates, in value order, every field that has rules.
    /// Rules for fields outside the value set are not run.
    pub fn validate_form(&mut self) -> bool {
        let ids: Vec<FieldId> = self.values.keys().cloned().collect();
        for id in &ids {
            self.touch(id.clone());
        }

        let Some(schema) = self.schema.as_ref() else {
            return true;
        };

        let targets: Vec<FieldId> = ids
            .into_iter()
            .filter(|id| schema.contains(id.as_str()))
            .collect();

        let mut valid = true;
        for id in &targets {
            if !self.validate_field(id.as_str()) {
                valid = false;
            }
        }
        valid
    }

    pub fn set_error(&mut self, id: impl Into<FieldId>, message: impl Into<String>) {
        let id = id.into();
        let message = message.into();
        self.errors.insert(id.clone(), message.clone());
        self.listeners.emit(FormEvent::ErrorSet { id, message });
    }

    pub fn clear_error(&mut self, id: &str) {
        if let Some((id, _)) = self.errors.shift_remove_entry(id) {
            self.listeners.emit(FormEvent::ErrorCleared { id });
        }
    }

    pub fn reset_errors(&mut self) {
        self.errors.clear();
        self.listeners.emit(FormEvent::ErrorsReset);
    }

    /// Back to the initial snapshot. Leaves `is_submitting` alone.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
        self.dirty.clear();
        self.listeners.emit(FormEvent::Reset);
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Validates the form and, when valid, awaits the submit handler with a copy of the values.
    ///
    /// Handler errors and panics are logged and reported as [`SubmitOutcome::Failed`];
    /// they never propagate. `is_submitting` is released on every path, including when
    /// this future is dropped before completion.
    pub async fn handle_submit(&mut self, event: Option<&mut dyn SubmitEvent>) -> SubmitOutcome {
        if let Some(event) = event {
            event.prevent_default();
        }

        self.set_submitting(true);
        let guard = SubmittingGuard { engine: self };

        if !guard.engine.validate_form() {
            log::debug!(
                "submit blocked by {} invalid field(s)",
                guard.engine.errors.values().filter(|m| !m.is_empty()).count()
            );
            guard
                .engine
                .scheduler
                .schedule(Deferred::ScrollToFirstError, Instant::now(), Duration::ZERO);
            return SubmitOutcome::Invalid;
        }

        let values = guard.engine.values.clone();
        let Some(handler) = guard.engine.on_submit.as_mut() else {
            return SubmitOutcome::Submitted;
        };

        log::debug!("submitting {} field(s)", values.len());
        let pending = match panic::catch_unwind(AssertUnwindSafe(|| handler(values))) {
            Ok(pending) => pending,
            Err(payload) => {
                log::error!("submit handler panicked: {}", panic_message(payload.as_ref()));
                return SubmitOutcome::Failed;
            }
        };

        match AssertUnwindSafe(pending).catch_unwind().await {
            Ok(Ok(())) => SubmitOutcome::Submitted,
            Ok(Err(err)) => {
                log::error!("submit handler failed: {err:#}");
                SubmitOutcome::Failed
            }
            Err(payload) => {
                log::error!("submit handler panicked: {}", panic_message(payload.as_ref()));
                SubmitOutcome::Failed
            }
        }
    }

    fn set_submitting(&mut self, submitting: bool) {
        if self.is_submitting != submitting {
            self.is_submitting = submitting;
            self.listeners.emit(FormEvent::SubmittingChanged(submitting));
        }
    }

    // ── Scroll & focus ──────────────────────────────────────────────────

    /// `None` removes the field's ref.
    pub fn register_field_ref(&mut self, id: impl Into<FieldId>, field_ref: Option<Rc<dyn FieldRef>>) {
        self.refs.register(id, field_ref);
    }

    /// Scrolls the first erroring field (error-map order) into view and
    /// schedules focus after [`FOCUS_DELAY`]. No-op without an error or a ref.
    pub fn scroll_to_first_error(&mut self) {
        self.scroll_to_first_error_at(Instant::now());
    }

    /// Runs deferred scroll/focus work that is due. Returns how many tasks ran.
    pub fn run_pending(&mut self, now: Instant) -> usize {
        let tasks = self.scheduler.drain_ready(now);
        let count = tasks.len();
        for task in tasks {
            match task {
                Deferred::ScrollToFirstError => self.scroll_to_first_error_at(now),
                Deferred::Focus(id) => {
                    if let Some(field_ref) = self.refs.get(id.as_str()) {
                        field_ref.focus();
                    }
                }
            }
        }
        count
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.scheduler.poll_timeout(now, default_timeout)
    }

    fn scroll_to_first_error_at(&mut self, now: Instant) {
        let Some(id) = self
            .errors
            .iter()
            .find(|(_, message)| !message.is_empty())
            .map(|(id, _)| id.clone())
        else {
            return;
        };
        let Some(field_ref) = self.refs.get(id.as_str()) else {
            return;
        };

        field_ref.scroll_into_view();
        self.scheduler.schedule(Deferred::Focus(id), now, FOCUS_DELAY);
    }
}

struct SubmittingGuard<'a> {
    engine: &'a mut FormEngine,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.engine.set_submitting(false);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
