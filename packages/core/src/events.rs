//! Generic event dispatch and bubbling.
//!
//! This core is renderer-agnostic: it does not catalogue a fixed set of
//! HTML event shapes (`MouseEvent`, `KeyboardEvent`, ...); a host binding
//! that knows what its document backend actually emits defines its own
//! event payload types and feeds them in through
//! [`VirtualDom::handle_event`](crate::virtual_dom::VirtualDom::handle_event).
//! What lives here is the host-independent part: routing a raw event up
//! from the element it targeted to the nearest ancestor holding a matching
//! listener, exactly like DOM event bubbling, and wrapping the listener
//! call so a handler panic can't take down the flush loop.
//!
//! There is no priority lane picking which scheduler slot an event's
//! resulting update lands in (see `scheduler.rs`) - every event handler's
//! resulting update is scheduled the same way any other update is, through
//! `Scope::schedule_update`.

use crate::arena::ElementId;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

/// An event delivered to a listener, carrying the element it was dispatched
/// to (which may differ from the element the listener was registered on,
/// if the event bubbled) and the host-supplied payload.
pub struct UiEvent {
    pub target: ElementId,
    pub name: &'static str,
    pub data: Box<dyn Any>,
}

pub(crate) type ListenerFn = Rc<dyn Fn(&dyn Any)>;

/// Invokes a listener closure, catching a panic so a single bad handler
/// doesn't abort the event dispatch or poison the surrounding flush.
pub(crate) fn call_listener(f: &ListenerFn, event: &UiEvent) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| f(event.data.as_ref())));
    if let Err(payload) = result {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "event listener panicked".to_string());
        tracing::error!(event = event.name, %detail, "event listener panicked");
    }
}
