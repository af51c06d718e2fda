use tracing::debug;

use crate::manager::WmState;
use crate::x::{
    event::{ConfigureRequestData, PointerEvent, PropertyEvent},
    Atom, XConn, XEvent, XWindowID,
};

/// Actions that should be taken by the `WindowManager`.
///
/// These are automatically translated within the `WindowManager`
/// from [`XEvent`]s, and you generally shouldn't have to use this
/// directly.
#[derive(Debug, Clone)]
pub enum EventAction {
    /// Focus the specified client.
    ClientFocus(XWindowID),
    /// Resolve focus to the stack head, or the root if none.
    ClearFocus,
    /// Put input focus back on the specified client.
    ReassertFocus(XWindowID),
    /// Map the specified client and track it internally.
    ///
    /// Applies to normal top-level windows.
    MapTrackedClient(XWindowID),
    /// Stop managing the specified client.
    UnmanageClient(XWindowID),
    /// Handle a configure request for the specified client.
    ConfigureClient(ConfigureRequestData),
    /// The root window was resized; relayout everything.
    ScreenReconfigure(i32, i32),
    /// Re-evaluate a client's transient-for relation.
    UpdateTransient(XWindowID),
    /// Recompute a client's size constraints.
    UpdateSizeHints(XWindowID),
    /// Recompute a client's urgency state.
    UpdateUrgency(XWindowID),
}

impl EventAction {
    pub(crate) fn from_xevent<X: XConn>(
        event: XEvent,
        state: WmState<'_, X>,
    ) -> Option<Vec<EventAction>> {
        use EventAction::*;
        use XEvent::*;
        match event {
            ConfigureNotify(event) => {
                if event.is_root {
                    debug!(target: "manager::event", "configure notify for root");
                    Some(vec![ScreenReconfigure(event.geom.height, event.geom.width)])
                } else {
                    None
                }
            }
            ConfigureRequest(event) => {
                debug!(target: "manager::event", "configure request for window {}", event.id);
                Some(vec![ConfigureClient(event)])
            }
            MapRequest(id, override_redirect) => {
                debug!(target: "manager::event", "map request for window {}", id);
                process_map_request(id, override_redirect, state)
            }
            UnmapNotify(id) => {
                debug!(target: "manager::event", "unmap notify for window {}", id);
                Some(vec![UnmanageClient(id)])
            }
            DestroyNotify(id) => {
                debug!(target: "manager::event", "destroy notify for window {}", id);
                Some(vec![UnmanageClient(id)])
            }
            EnterNotify(ev) => {
                debug!(target: "manager::event", "enter notify for window {}", ev.id);
                process_enter_notify(ev, state)
            }
            FocusIn(id) => match state.selected {
                // a client pulled focus away from the selected window
                Some(sel) if sel != id => Some(vec![ReassertFocus(sel)]),
                _ => None,
            },
            PropertyNotify(event) => process_property_notify(event, state),
            Unknown(code) => {
                debug!(target: "manager::event", "unrecognised event: {}", code);
                None
            }
        }
    }
}

fn process_map_request<X: XConn>(
    id: XWindowID,
    override_redirect: Option<bool>,
    state: WmState<'_, X>,
) -> Option<Vec<EventAction>> {
    use EventAction::*;

    // ignore the request if we already have the window, if it
    // manages itself, or if it vanished before we could ask
    if state.clients.contains(id) {
        return None;
    }
    match override_redirect {
        Some(false) => Some(vec![MapTrackedClient(id)]),
        _ => None,
    }
}

fn process_enter_notify<X: XConn>(
    ev: PointerEvent,
    state: WmState<'_, X>,
) -> Option<Vec<EventAction>> {
    use EventAction::*;

    // crossings synthesized by grabs, and crossings that merely left
    // a child window, only count when they land on the root
    if (ev.grab || ev.inferior) && ev.id != state.root.id {
        return None;
    }

    if state.clients.contains(ev.id) {
        Some(vec![ClientFocus(ev.id)])
    } else {
        Some(vec![ClearFocus])
    }
}

fn process_property_notify<X: XConn>(
    event: PropertyEvent,
    state: WmState<'_, X>,
) -> Option<Vec<EventAction>> {
    use EventAction::*;

    if event.deleted || event.id == state.root.id {
        return None;
    }
    if !state.clients.contains(event.id) {
        return None;
    }

    let atom = state.conn.lookup_interned_atom(event.atom)?;
    debug!(target: "manager::event", "property notify for window {}: {}", event.id, atom);

    match atom.as_str() {
        a if a == Atom::WmTransientFor.as_ref() => Some(vec![UpdateTransient(event.id)]),
        a if a == Atom::WmNormalHints.as_ref() => Some(vec![UpdateSizeHints(event.id)]),
        a if a == Atom::WmHints.as_ref() => Some(vec![UpdateUrgency(event.id)]),
        _ => None,
    }
}
