//! Change notification plumbing.
//!
//! The model does not know about controls; it emits [`ModelEvent`]s through
//! a [`Notifier`] and whoever registered a listener reacts. Controls use
//! this to flip their redraw flag when scene content changes.
//!
//! [`Notifications`] is the user-facing channel: recoverable failures that
//! the user should see (a view file that would not save, a malformed paste
//! buffer) are queued there for the embedder to surface as toasts, status
//! bar text, whatever fits the host UI.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Coarse-grained model change events.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// The whole model was invalidated and will rebuild on next render.
    Invalidated,
    /// Figures were added, removed or structurally changed.
    FiguresChanged,
    /// Lights were added, removed or re-parameterized.
    LightsChanged,
    /// The selection set changed.
    SelectionChanged,
}

/// Handle for unsubscribing a listener.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener registry with explicit subscribe/unsubscribe.
///
/// Listeners run synchronously on the emitting thread, in subscription
/// order. Re-entrant emission from inside a listener is not supported;
/// queue the work instead.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<(ListenerId, Box<dyn FnMut(ModelEvent)>)>,
    next: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, f: impl FnMut(ModelEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    /// Removes a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn emit(&mut self, event: ModelEvent) {
        for (_, f) in &mut self.listeners {
            f(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Shared "needs redraw" flag.
///
/// One clone lives inside a model listener, the other in the control's
/// render loop. Any model event sets the flag; the control consumes it at
/// frame start with [`take`]. Clones share the same flag.
///
/// [`take`]: RedrawSignal::take
#[derive(Debug, Clone, Default)]
pub struct RedrawSignal(Arc<AtomicBool>);

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Reads and clears the flag in one step.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Severity of a user-visible notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), severity: Severity::Info }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), severity: Severity::Warning }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), severity: Severity::Error }
    }
}

/// FIFO queue of pending notifications.
///
/// Pushes also mirror to the log so headless runs keep a trace of what the
/// user would have seen.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, n: Notification) {
        match n.severity {
            Severity::Info => log::info!("{}: {}", n.title, n.message),
            Severity::Warning => log::warn!("{}: {}", n.title, n.message),
            Severity::Error => log::error!("{}: {}", n.title, n.message),
        }
        self.queue.push_back(n);
    }

    /// Drains all pending notifications in FIFO order.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
