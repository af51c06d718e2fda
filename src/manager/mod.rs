//! The window manager itself, and associated types.
//!
//! [`WindowManager`] is the main object of this crate. It owns the
//! X connection, the client registry and the active layout, and it
//! runs the event loop that reacts to everything the server reports.

pub mod event;

#[doc(inline)]
pub use event::EventAction;

use std::fmt;

use tracing::{debug, info, warn};

use crate::core::types::{Geometry, Result, WmError};
use crate::core::{Client, ClientSet, Screen};
use crate::layouts::{LayoutStrategy, Monocle};
use crate::x::atom::EWMH_SUPPORTED_ATOMS;
use crate::x::core::{
    ClientAttrs, ClientConfig, StackMode, WindowSnapshot, XConn, XWindow, XWindowID,
};
use crate::x::event::ConfigureRequestData;
use crate::x::property::WindowState;
use crate::x::XEvent;

/// A read-only view of manager state, used while translating events.
pub struct WmState<'wm, X: XConn> {
    pub conn: &'wm X,
    pub clients: &'wm ClientSet,
    pub root: XWindow,
    pub selected: Option<XWindowID>,
}

/// Strips the expected-race error out of a result.
///
/// A window can be destroyed between our request and the server
/// acting on it; requests that lose that race are not failures.
fn tolerate_gone(res: crate::x::core::Result<()>) -> crate::x::core::Result<()> {
    match res {
        Err(e) if e.is_window_gone() => Ok(()),
        other => other,
    }
}

/// A scoped whole-server grab.
///
/// While a value of this type is live, the server processes requests
/// from no client but us. The grab is released when the value drops,
/// on every exit path.
struct ServerGrab<'c, X: XConn> {
    conn: &'c X,
}

impl<'c, X: XConn> ServerGrab<'c, X> {
    fn new(conn: &'c X) -> crate::x::core::Result<Self> {
        conn.grab_server()?;
        Ok(Self { conn })
    }
}

impl<X: XConn> Drop for ServerGrab<'_, X> {
    fn drop(&mut self) {
        if let Err(e) = self.conn.ungrab_server() {
            warn!("failed to release server grab: {}", e);
        }
    }
}

/// The main window manager object that receives and responds to events.
///
/// It is generic over its connection, so any type implementing
/// [`XConn`] can back it.
pub struct WindowManager<X: XConn> {
    conn: X,
    clients: ClientSet,
    screen: Screen,
    layout: Box<dyn LayoutStrategy>,
    selected: Option<XWindowID>,
}

impl<X: XConn> WindowManager<X> {
    /// Constructs a new WindowManager with the default (monocle) layout.
    pub fn new(conn: X) -> Self {
        Self::with_layout(conn, Box::new(Monocle))
    }

    /// Constructs a new WindowManager with the given layout.
    pub fn with_layout(conn: X, layout: Box<dyn LayoutStrategy>) -> Self {
        let root = conn.get_root();
        Self {
            conn,
            clients: ClientSet::new(),
            screen: Screen::new(root),
            layout,
            selected: None,
        }
    }

    /// Registers self as the window manager and adopts pre-existing
    /// windows.
    ///
    /// This has to be called before [`run`](Self::run).
    pub fn register(&mut self) -> Result<()> {
        let root = self.screen.root_id();
        info!("Registering window manager on root {}", root);

        // substructure redirection on the root can be owned by one
        // client only; failing to get it means another wm is running
        self.conn
            .change_window_attributes(root, &[ClientAttrs::RootRedirect])
            .map_err(|_| WmError::OtherWm)?;

        self.conn.set_supported(EWMH_SUPPORTED_ATOMS)?;
        self.conn
            .change_window_attributes(root, &[ClientAttrs::RootEventMask])?;

        self.scan()?;
        self.focus(None)?;
        Ok(())
    }

    /// Runs the main event loop until the connection shuts down.
    pub fn run(&mut self) -> Result<()> {
        info!("Entering main event loop");
        loop {
            let Some(event) = self.conn.poll_next_event()? else {
                info!("Connection closed, exiting");
                return Ok(());
            };
            self.handle_event(event)?;
        }
    }

    /// Translates one event into actions and runs them.
    pub fn handle_event(&mut self, event: XEvent) -> Result<()> {
        let Some(actions) = EventAction::from_xevent(event, self.state()) else {
            return Ok(());
        };
        for action in actions {
            self.run_action(action)?;
        }
        Ok(())
    }

    /// Provides a WmState for introspection.
    pub fn state(&self) -> WmState<'_, X> {
        WmState {
            conn: &self.conn,
            clients: &self.clients,
            root: self.screen.root,
            selected: self.selected,
        }
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &X {
        &self.conn
    }

    #[cfg(test)]
    pub(crate) fn clients(&self) -> &ClientSet {
        &self.clients
    }

    #[cfg(test)]
    pub(crate) fn selected(&self) -> Option<XWindowID> {
        self.selected
    }

    fn run_action(&mut self, action: EventAction) -> Result<()> {
        use EventAction::*;
        match action {
            ClientFocus(id) => self.focus(Some(id)),
            ClearFocus => self.focus(None),
            ReassertFocus(id) => Ok(tolerate_gone(self.conn.set_input_focus(id))?),
            MapTrackedClient(id) => self.manage(id),
            UnmanageClient(id) => self.unmanage(id),
            ConfigureClient(data) => self.configure_client(data),
            ScreenReconfigure(height, width) => {
                if self.screen.update_size(height, width) {
                    self.arrange()
                } else {
                    Ok(())
                }
            }
            UpdateTransient(id) => self.update_transient(id),
            UpdateSizeHints(id) => self.update_size_hints(id),
            UpdateUrgency(id) => self.update_urgency(id),
        }
    }

    /// Starts managing the given window.
    ///
    /// Aborts silently if the window vanished before we could query
    /// its geometry.
    pub fn manage(&mut self, id: XWindowID) -> Result<()> {
        if self.clients.contains(id) {
            return Ok(());
        }

        let wg = match self.conn.get_geometry(id) {
            Ok(wg) => wg,
            Err(e) => {
                debug!("not managing {}: {}", id, e);
                return Ok(());
            }
        };
        debug!("managing window {} at {:?}", id, wg.geom);

        let mut client = Client::new(id, wg.geom, wg.border_width);

        // windows that exactly cover the screen keep their position;
        // everything else is nudged fully on-screen
        if wg.geom != self.screen.true_geom() {
            let (geom, _) = client.apply_size_hints(&self.screen, wg.geom);
            client.set_geometry(geom);
        }

        tolerate_gone(
            self.conn
                .configure_window(id, &[ClientConfig::BorderWidth(0)]),
        )?;
        client.set_border_width(0);

        client.update_constraints(self.conn.get_wm_size_hints(id).as_ref());

        // we cannot manage a window we cannot receive events for
        self.conn
            .change_window_attributes(id, &[ClientAttrs::EnableClientEvents])?;

        let transient = self.conn.get_wm_transient_for(id);
        client.set_transient_for(transient);
        if transient.map(|t| self.clients.contains(t)).unwrap_or(false) {
            client.set_floating(true);
        }

        if client.is_floating() {
            tolerate_gone(self.conn.configure_window(
                id,
                &[ClientConfig::StackingMode(StackMode::Above(None))],
            ))?;
        }

        self.clients.register(client);

        self.conn.map_window(id)?;
        tolerate_gone(self.conn.set_wm_state(id, WindowState::Normal))?;

        self.arrange()
    }

    /// Stops managing the given window.
    ///
    /// Unknown windows are a harmless no-op.
    pub fn unmanage(&mut self, id: XWindowID) -> Result<()> {
        let Some(old_bw) = self.clients.lookup(id).map(|c| c.old_border_width()) else {
            return Ok(());
        };
        debug!("unmanaging window {}", id);

        {
            // no other client gets to map or reconfigure while this
            // one is torn down
            let _grab = ServerGrab::new(&self.conn)?;

            tolerate_gone(
                self.conn
                    .configure_window(id, &[ClientConfig::BorderWidth(old_bw)]),
            )?;

            let Self {
                ref conn,
                ref mut clients,
                ref screen,
                ref mut selected,
                ..
            } = *self;

            clients.unregister(id);
            if *selected == Some(id) {
                refocus(conn, clients, screen.root_id(), selected, None)?;
            }
            tolerate_gone(conn.set_wm_state(id, WindowState::Withdrawn))?;
        }

        self.arrange()
    }

    /// Focuses the given window, or the focus stack head if `None`.
    ///
    /// If neither resolves to a managed client, input focus reverts
    /// to the root window.
    pub fn focus(&mut self, window: Option<XWindowID>) -> Result<()> {
        refocus(
            &self.conn,
            &mut self.clients,
            self.screen.root_id(),
            &mut self.selected,
            window,
        )
    }

    /// The single re-layout entry point, run after every membership,
    /// classification or screen change.
    ///
    /// Always runs all four steps: float placement, focus clear,
    /// layout, restack.
    pub fn arrange(&mut self) -> Result<()> {
        for id in self.clients.floating_ids() {
            let Some(client) = self.clients.lookup(id) else {
                continue;
            };
            let (geom, changed) = client.apply_size_hints(&self.screen, client.geometry());
            if changed {
                self.reconfigure(id, geom)?;
            }
        }

        // focus is dropped here and reacquired by the next pointer
        // crossing or an explicit focus call
        self.selected = None;

        let actions = self
            .layout
            .layout(self.screen.effective_geom(), &self.clients.tiled_in_zorder());
        for action in actions {
            let Some(client) = self.clients.lookup(action.id) else {
                continue;
            };
            let (geom, changed) = client.apply_size_hints(&self.screen, action.geom);
            if changed {
                self.reconfigure(action.id, geom)?;
            }
        }

        self.restack()
    }

    /// Rebuilds the visual stacking order.
    ///
    /// A selected floating client rides on top; tiled clients are
    /// chained beneath it in focus order.
    fn restack(&mut self) -> Result<()> {
        let mut anchor: Option<XWindowID> = None;

        if let Some(sel) = self.selected {
            let floating = self
                .clients
                .lookup(sel)
                .map(|c| c.is_floating())
                .unwrap_or(false);
            if floating {
                tolerate_gone(self.conn.configure_window(
                    sel,
                    &[ClientConfig::StackingMode(StackMode::Above(None))],
                ))?;
                anchor = Some(sel);
            }
        }

        let tiled: Vec<XWindowID> = self
            .clients
            .in_focus_order()
            .filter(|id| {
                self.clients
                    .lookup(*id)
                    .map(|c| !c.is_floating())
                    .unwrap_or(false)
            })
            .collect();

        for id in tiled {
            if let Some(prev) = anchor {
                tolerate_gone(self.conn.configure_window(
                    id,
                    &[ClientConfig::StackingMode(StackMode::Below(Some(prev)))],
                ))?;
            }
            anchor = Some(id);
        }
        Ok(())
    }

    /// Moves a client to the given geometry, recording it and telling
    /// the server about exactly the fields that changed.
    fn reconfigure(&mut self, id: XWindowID, target: Geometry) -> Result<()> {
        let Some(client) = self.clients.lookup_mut(id) else {
            return Ok(());
        };
        let current = client.geometry();
        let moved = (target.x, target.y) != (current.x, current.y);
        let resized = !target.same_size(&current);
        let border = client.border_width() != 0;

        client.set_geometry(target);
        client.set_border_width(0);

        let mut cfg = Vec::with_capacity(3);
        if moved {
            cfg.push(ClientConfig::Position {
                x: target.x,
                y: target.y,
            });
        }
        if resized {
            cfg.push(ClientConfig::Resize {
                h: target.height,
                w: target.width,
            });
        }
        if border {
            cfg.push(ClientConfig::BorderWidth(0));
        }
        if !cfg.is_empty() {
            tolerate_gone(self.conn.configure_window(id, &cfg))?;
        }

        // the server only implies a notification when size or border
        // changed; otherwise we must tell the client ourselves
        if !resized && !border {
            tolerate_gone(self.conn.send_configure_notify(id, target))?;
        }
        Ok(())
    }

    /// Handles a configure request, managed or not.
    fn configure_client(&mut self, data: ConfigureRequestData) -> Result<()> {
        if !self.clients.contains(data.id) {
            // not our business, pass it through with its exact mask
            return Ok(tolerate_gone(self.conn.forward_configure_request(&data))?);
        }

        // a single request can carry both a move and a stacking change;
        // the geometry is honored first, then the raise
        let has_geometry = data.x.is_some()
            || data.y.is_some()
            || data.height.is_some()
            || data.width.is_some();
        if has_geometry || !data.is_raise() {
            self.configure_managed(&data)?;
        }

        if data.is_raise() {
            self.raise(data.id)?;
        }
        Ok(())
    }

    /// Applies the geometry part of a configure request to a managed
    /// client.
    fn configure_managed(&mut self, data: &ConfigureRequestData) -> Result<()> {
        let Some(client) = self.clients.lookup(data.id) else {
            return Ok(());
        };

        if !client.is_floating() {
            // tiled clients cannot self-resize; restate their geometry
            return Ok(tolerate_gone(
                self.conn.send_configure_notify(data.id, client.geometry()),
            )?);
        }

        let mut geom = client.geometry();
        if let Some(x) = data.x {
            geom.x = x;
        }
        if let Some(y) = data.y {
            geom.y = y;
        }
        if let Some(h) = data.height {
            geom.height = h;
        }
        if let Some(w) = data.width {
            geom.width = w;
        }

        // floating windows pushed past an edge are centered on that axis
        let scr = self.screen.true_geom();
        if geom.right() > scr.right() {
            geom.x = scr.x + (scr.width / 2 - geom.width / 2);
        }
        if geom.bottom() > scr.bottom() {
            geom.y = scr.y + (scr.height / 2 - geom.height / 2);
        }

        let (geom, changed) = client.apply_size_hints(&self.screen, geom);
        if changed {
            self.reconfigure(data.id, geom)
        } else {
            Ok(tolerate_gone(
                self.conn.send_configure_notify(data.id, geom),
            )?)
        }
    }

    /// Raises a client to the top of the stack and selects it.
    ///
    /// A raise request aimed at a tiled client pulls it out of the
    /// layout first.
    fn raise(&mut self, id: XWindowID) -> Result<()> {
        let refloat = self
            .clients
            .lookup(id)
            .map(|c| !c.is_floating())
            .unwrap_or(false);
        if refloat {
            if let Some(client) = self.clients.lookup_mut(id) {
                client.set_floating(true);
            }
            self.arrange()?;
        }

        tolerate_gone(self.conn.configure_window(
            id,
            &[ClientConfig::StackingMode(StackMode::Above(None))],
        ))?;
        self.focus(Some(id))
    }

    /// Re-evaluates a client's floating classification after its
    /// transient-for property changed.
    fn update_transient(&mut self, id: XWindowID) -> Result<()> {
        let Some(target) = self.conn.get_wm_transient_for(id) else {
            return Ok(());
        };
        let target_managed = self.clients.contains(target);

        let Some(client) = self.clients.lookup_mut(id) else {
            return Ok(());
        };
        client.set_transient_for(Some(target));

        let floating = client.is_fixed() || target_managed;
        if floating != client.is_floating() {
            client.set_floating(floating);
            self.arrange()?;
        }
        Ok(())
    }

    /// Re-parses a client's size constraints after its WM_NORMAL_HINTS
    /// property changed.
    ///
    /// Hints that pin the client to one size force it floating, which
    /// is a layout change and rearranges like any other.
    fn update_size_hints(&mut self, id: XWindowID) -> Result<()> {
        let hints = self.conn.get_wm_size_hints(id);
        let Some(client) = self.clients.lookup_mut(id) else {
            return Ok(());
        };

        let was_floating = client.is_floating();
        client.update_constraints(hints.as_ref());
        if client.is_floating() != was_floating {
            self.arrange()?;
        }
        Ok(())
    }

    /// Recomputes a client's urgency from its hints.
    ///
    /// An urgency bit raised on the selected client is cleared right
    /// away, since it already has our attention.
    fn update_urgency(&mut self, id: XWindowID) -> Result<()> {
        let Some(mut hints) = self.conn.get_wm_hints(id) else {
            return Ok(());
        };

        if self.selected == Some(id) && hints.urgent() {
            hints.set_urgent(false);
            tolerate_gone(self.conn.set_wm_hints(id, hints))?;
            if let Some(client) = self.clients.lookup_mut(id) {
                client.set_urgent(false);
            }
        } else if let Some(client) = self.clients.lookup_mut(id) {
            client.set_urgent(hints.urgent());
        }
        Ok(())
    }

    /// Adopts pre-existing top-level windows.
    ///
    /// Queries for all children are pipelined; transient windows are
    /// managed in a second pass so their targets exist first.
    fn scan(&mut self) -> Result<()> {
        let children = self.conn.query_tree(self.screen.root_id())?;
        debug!("scanning {} top-level windows", children.len());

        let snapshots = self.conn.window_snapshots(&children)?;

        let adoptable = |snap: &&WindowSnapshot| {
            !snap.override_redirect && snap.viewable && !snap.initial_iconic
        };

        let (transient, normal): (Vec<&WindowSnapshot>, Vec<&WindowSnapshot>) = snapshots
            .iter()
            .filter(adoptable)
            .partition(|s| s.transient_for.is_some());

        for snap in normal {
            self.manage(snap.id)?;
        }
        for snap in transient {
            self.manage(snap.id)?;
        }
        Ok(())
    }
}

/// The focus operation, split out so it can run under a server grab
/// held by the caller.
fn refocus<X: XConn>(
    conn: &X,
    clients: &mut ClientSet,
    root: XWindowID,
    selected: &mut Option<XWindowID>,
    window: Option<XWindowID>,
) -> Result<()> {
    let target = window
        .filter(|id| clients.contains(*id))
        .or_else(|| clients.stack_head());

    match target {
        Some(id) => {
            debug!("focusing window {}", id);

            // entering an urgent window resolves its urgency
            let urgent = clients.lookup(id).map(|c| c.is_urgent()).unwrap_or(false);
            if urgent {
                if let Some(client) = clients.lookup_mut(id) {
                    client.set_urgent(false);
                }
                if let Some(mut hints) = conn.get_wm_hints(id) {
                    if hints.urgent() {
                        hints.set_urgent(false);
                        tolerate_gone(conn.set_wm_hints(id, hints))?;
                    }
                }
            }

            clients.promote(id);
            tolerate_gone(conn.set_input_focus(id))?;
            *selected = Some(id);
        }
        None => {
            debug!("no client to focus, focusing root");
            conn.set_input_focus(root)?;
            *selected = None;
        }
    }
    Ok(())
}

impl<X: XConn> fmt::Debug for WindowManager<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("clients", &self.clients)
            .field("screen", &self.screen)
            .field("layout", &self.layout.name())
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::x::dummy::{DummyConn, DummyWindow, Request};
    use crate::x::event::{ConfigureEvent, PointerEvent, PropertyEvent};
    use crate::x::property::{WmHints, WmSizeHints};
    use crate::x::Atom;

    fn screen_geom() -> Geometry {
        Geometry::new(0, 0, 1080, 1920)
    }

    fn win(geom: Geometry) -> DummyWindow {
        DummyWindow::viewable(geom)
    }

    fn wm_with(windows: Vec<(XWindowID, DummyWindow)>) -> WindowManager<DummyConn> {
        let conn = DummyConn::new(screen_geom());
        for (id, window) in windows {
            conn.add_window(id, window);
        }
        WindowManager::new(conn)
    }

    fn raise_request(id: XWindowID, root: XWindowID) -> ConfigureRequestData {
        ConfigureRequestData {
            id,
            parent: root,
            sibling: None,
            x: None,
            y: None,
            height: None,
            width: None,
            border_width: None,
            stack_mode: Some(StackMode::Above(None)),
        }
    }

    fn geometry_request(id: XWindowID, root: XWindowID) -> ConfigureRequestData {
        ConfigureRequestData {
            id,
            parent: root,
            sibling: None,
            x: None,
            y: None,
            height: None,
            width: None,
            border_width: None,
            stack_mode: None,
        }
    }

    #[test]
    fn test_monocle_assigns_full_screen() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(10, 10, 300, 400))),
            (2, win(Geometry::new(50, 50, 200, 200))),
        ]);

        wm.manage(1).unwrap();
        wm.manage(2).unwrap();

        assert_eq!(wm.clients().lookup(1).unwrap().geometry(), screen_geom());
        assert_eq!(wm.clients().lookup(2).unwrap().geometry(), screen_geom());
        assert_eq!(wm.clients().stack_head(), Some(2));
    }

    #[test]
    fn test_unmanage_focuses_next_in_stack() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(10, 10, 300, 400))),
            (2, win(Geometry::new(50, 50, 200, 200))),
        ]);
        wm.manage(1).unwrap();
        wm.manage(2).unwrap();
        wm.focus(Some(2)).unwrap();
        wm.conn().clear_requests();

        wm.unmanage(2).unwrap();

        assert_eq!(wm.clients().stack_head(), Some(1));
        let requests = wm.conn().requests();
        assert!(matches!(requests.first(), Some(Request::GrabServer)));
        assert!(requests
            .iter()
            .any(|r| matches!(r, Request::SetFocus(1))));
        assert!(requests
            .iter()
            .any(|r| matches!(r, Request::UngrabServer)));
    }

    #[test]
    fn test_unmanage_unknown_is_noop() {
        let mut wm = wm_with(vec![]);

        wm.unmanage(99).unwrap();

        assert!(wm.conn().requests().is_empty());
    }

    #[test]
    fn test_manage_forces_zero_border() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(10, 10, 300, 400)))]);

        wm.manage(1).unwrap();

        assert_eq!(wm.clients().lookup(1).unwrap().border_width(), 0);
        assert!(wm.conn().requests().iter().any(|r| matches!(
            r,
            Request::Configure(1, cfgs) if cfgs.contains(&ClientConfig::BorderWidth(0))
        )));
    }

    #[test]
    fn test_manage_vanished_window_aborts() {
        let mut wm = wm_with(vec![]);

        wm.manage(5).unwrap();

        assert!(wm.clients().is_empty());
        assert!(!wm
            .conn()
            .requests()
            .iter()
            .any(|r| matches!(r, Request::Map(_))));
    }

    #[test]
    fn test_transient_window_floats_and_raises() {
        let mut transient = win(Geometry::new(100, 100, 200, 300));
        transient.transient_for = Some(1);
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500))), (10, transient)]);

        wm.manage(1).unwrap();
        wm.manage(10).unwrap();

        let t = wm.clients().lookup(10).unwrap();
        assert!(t.is_floating());
        // untouched by the layout
        assert_eq!(t.geometry(), Geometry::new(100, 100, 200, 300));
        assert_eq!(wm.clients().lookup(1).unwrap().geometry(), screen_geom());

        let root = wm.state().root.id;
        wm.conn().clear_requests();
        wm.handle_event(XEvent::ConfigureRequest(raise_request(10, root)))
            .unwrap();

        assert_eq!(wm.selected(), Some(10));
        assert!(wm.conn().requests().iter().any(|r| matches!(
            r,
            Request::Configure(10, cfgs)
                if cfgs.contains(&ClientConfig::StackingMode(StackMode::Above(None)))
        )));
    }

    #[test]
    fn test_raise_pulls_tiled_client_out_of_layout() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500)))]);
        wm.manage(1).unwrap();
        assert!(!wm.clients().lookup(1).unwrap().is_floating());

        let root = wm.state().root.id;
        wm.handle_event(XEvent::ConfigureRequest(raise_request(1, root)))
            .unwrap();

        assert!(wm.clients().lookup(1).unwrap().is_floating());
        assert_eq!(wm.selected(), Some(1));
    }

    #[test]
    fn test_fixed_size_window_floats() {
        let mut fixed = win(Geometry::new(10, 10, 200, 300));
        fixed.size_hints = Some({
            let mut h = WmSizeHints::new();
            h.min_size = Some((300, 200));
            h.max_size = Some((300, 200));
            h
        });
        let mut wm = wm_with(vec![(1, fixed)]);

        wm.manage(1).unwrap();

        let client = wm.clients().lookup(1).unwrap();
        assert!(client.is_fixed());
        assert!(client.is_floating());
        assert_eq!(client.geometry(), Geometry::new(10, 10, 200, 300));
    }

    #[test]
    fn test_tiled_configure_request_gets_synthetic_only() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500)))]);
        wm.manage(1).unwrap();
        wm.conn().clear_requests();

        let root = wm.state().root.id;
        let mut req = geometry_request(1, root);
        req.width = Some(500);
        req.height = Some(500);
        wm.handle_event(XEvent::ConfigureRequest(req)).unwrap();

        let requests = wm.conn().requests();
        assert!(
            matches!(&requests[..], [Request::SyntheticNotify(1, g)] if *g == screen_geom()),
            "got {:?}",
            requests
        );
        assert_eq!(wm.clients().lookup(1).unwrap().geometry(), screen_geom());
    }

    #[test]
    fn test_floating_configure_request_centers_on_overflow() {
        let mut transient = win(Geometry::new(100, 100, 200, 400));
        transient.transient_for = Some(1);
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500))), (10, transient)]);
        wm.manage(1).unwrap();
        wm.manage(10).unwrap();
        wm.conn().clear_requests();

        let root = wm.state().root.id;
        let mut req = geometry_request(10, root);
        req.x = Some(1900);
        wm.handle_event(XEvent::ConfigureRequest(req)).unwrap();

        // 1900 + 400 overflows 1920, so the window is centered:
        // x = 1920/2 - 400/2 = 760
        assert_eq!(wm.clients().lookup(10).unwrap().geometry().x, 760);
    }

    #[test]
    fn test_floating_move_only_sends_synthetic_notify() {
        let mut transient = win(Geometry::new(100, 100, 200, 300));
        transient.transient_for = Some(1);
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500))), (10, transient)]);
        wm.manage(1).unwrap();
        wm.manage(10).unwrap();
        wm.conn().clear_requests();

        let root = wm.state().root.id;
        let mut req = geometry_request(10, root);
        req.x = Some(40);
        req.y = Some(60);
        wm.handle_event(XEvent::ConfigureRequest(req)).unwrap();

        let requests = wm.conn().requests();
        assert!(requests.iter().any(|r| matches!(
            r,
            Request::Configure(10, cfgs) if cfgs.contains(&ClientConfig::Position { x: 40, y: 60 })
        )));
        assert!(requests
            .iter()
            .any(|r| matches!(r, Request::SyntheticNotify(10, _))));
    }

    #[test]
    fn test_configure_request_with_move_and_raise_keeps_both() {
        let mut transient = win(Geometry::new(100, 100, 200, 300));
        transient.transient_for = Some(1);
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500))), (10, transient)]);
        wm.manage(1).unwrap();
        wm.manage(10).unwrap();
        wm.conn().clear_requests();

        let root = wm.state().root.id;
        let mut req = raise_request(10, root);
        req.x = Some(40);
        req.y = Some(60);
        wm.handle_event(XEvent::ConfigureRequest(req)).unwrap();

        // the move is applied, not swallowed by the raise
        let geom = wm.clients().lookup(10).unwrap().geometry();
        assert_eq!((geom.x, geom.y), (40, 60));
        assert_eq!(wm.selected(), Some(10));
        assert!(wm.conn().requests().iter().any(|r| matches!(
            r,
            Request::Configure(10, cfgs)
                if cfgs.contains(&ClientConfig::StackingMode(StackMode::Above(None)))
        )));
    }

    #[test]
    fn test_raise_with_zero_sibling_is_a_plain_raise() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 500, 500)))]);
        wm.manage(1).unwrap();

        let root = wm.state().root.id;
        let mut req = raise_request(1, root);
        req.sibling = Some(0);
        req.stack_mode = Some(StackMode::Above(Some(0)));
        wm.handle_event(XEvent::ConfigureRequest(req)).unwrap();

        assert!(wm.clients().lookup(1).unwrap().is_floating());
        assert_eq!(wm.selected(), Some(1));
    }

    #[test]
    fn test_unmanaged_configure_request_passes_through() {
        let wm_windows = vec![(77, win(Geometry::new(0, 0, 100, 100)))];
        let mut wm = wm_with(wm_windows);

        let root = wm.state().root.id;
        let mut req = geometry_request(77, root);
        req.x = Some(5);
        req.width = Some(300);
        req.border_width = Some(2);
        wm.handle_event(XEvent::ConfigureRequest(req)).unwrap();

        let requests = wm.conn().requests();
        match &requests[..] {
            [Request::ForwardConfigure(fwd)] => {
                assert_eq!(fwd.x, Some(5));
                assert_eq!(fwd.y, None);
                assert_eq!(fwd.width, Some(300));
                assert_eq!(fwd.height, None);
                assert_eq!(fwd.border_width, Some(2));
                assert_eq!(fwd.sibling, None);
                assert_eq!(fwd.stack_mode, None);
            }
            other => panic!("expected a single forwarded request, got {:?}", other),
        }
    }

    #[test]
    fn test_enter_notify_focus_rules() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(0, 0, 100, 100))),
            (2, win(Geometry::new(0, 0, 100, 100))),
        ]);
        wm.manage(1).unwrap();
        wm.manage(2).unwrap();
        let root = wm.state().root.id;

        wm.handle_event(XEvent::EnterNotify(PointerEvent {
            id: 1,
            grab: false,
            inferior: false,
        }))
        .unwrap();
        assert_eq!(wm.selected(), Some(1));

        // grab-synthesized crossings on ordinary windows are ignored
        wm.handle_event(XEvent::EnterNotify(PointerEvent {
            id: 2,
            grab: true,
            inferior: false,
        }))
        .unwrap();
        assert_eq!(wm.selected(), Some(1));

        // but the root is always honored
        wm.conn().clear_requests();
        wm.handle_event(XEvent::EnterNotify(PointerEvent {
            id: root,
            grab: true,
            inferior: false,
        }))
        .unwrap();
        assert_eq!(wm.selected(), Some(1));
        assert!(wm
            .conn()
            .requests()
            .iter()
            .any(|r| matches!(r, Request::SetFocus(1))));
    }

    #[test]
    fn test_focus_in_reasserts_selection() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(0, 0, 100, 100))),
            (2, win(Geometry::new(0, 0, 100, 100))),
        ]);
        wm.manage(1).unwrap();
        wm.manage(2).unwrap();
        wm.focus(Some(1)).unwrap();
        wm.conn().clear_requests();

        wm.handle_event(XEvent::FocusIn(2)).unwrap();

        assert_eq!(wm.selected(), Some(1));
        assert!(wm
            .conn()
            .requests()
            .iter()
            .any(|r| matches!(r, Request::SetFocus(1))));
    }

    #[test]
    fn test_urgency_on_selected_client_is_cleared() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 100, 100)))]);
        wm.manage(1).unwrap();
        wm.focus(Some(1)).unwrap();

        let mut hints = WmHints::default();
        hints.set_urgent(true);
        wm.conn().set_hints(1, hints);

        let atom = wm.conn().atom(Atom::WmHints.as_ref()).unwrap();
        wm.handle_event(XEvent::PropertyNotify(PropertyEvent {
            id: 1,
            atom,
            time: 0,
            deleted: false,
        }))
        .unwrap();

        assert!(!wm.conn().hints(1).unwrap().urgent());
        assert!(!wm.clients().lookup(1).unwrap().is_urgent());
    }

    #[test]
    fn test_urgency_cleared_when_focused_later() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(0, 0, 100, 100))),
            (2, win(Geometry::new(0, 0, 100, 100))),
        ]);
        wm.manage(1).unwrap();
        wm.manage(2).unwrap();
        wm.focus(Some(2)).unwrap();

        let mut hints = WmHints::default();
        hints.set_urgent(true);
        wm.conn().set_hints(1, hints);
        let atom = wm.conn().atom(Atom::WmHints.as_ref()).unwrap();
        wm.handle_event(XEvent::PropertyNotify(PropertyEvent {
            id: 1,
            atom,
            time: 0,
            deleted: false,
        }))
        .unwrap();
        assert!(wm.clients().lookup(1).unwrap().is_urgent());

        wm.focus(Some(1)).unwrap();

        assert!(!wm.clients().lookup(1).unwrap().is_urgent());
        assert!(!wm.conn().hints(1).unwrap().urgent());
    }

    #[test]
    fn test_transient_change_refloats() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(0, 0, 100, 100))),
            (10, win(Geometry::new(5, 5, 200, 200))),
        ]);
        wm.manage(1).unwrap();
        wm.manage(10).unwrap();
        assert!(!wm.clients().lookup(10).unwrap().is_floating());

        wm.conn().set_transient(10, Some(1));
        let atom = wm.conn().atom(Atom::WmTransientFor.as_ref()).unwrap();
        wm.handle_event(XEvent::PropertyNotify(PropertyEvent {
            id: 10,
            atom,
            time: 0,
            deleted: false,
        }))
        .unwrap();

        assert!(wm.clients().lookup(10).unwrap().is_floating());
        // the remaining tiled client now covers the screen alone
        assert_eq!(wm.clients().lookup(1).unwrap().geometry(), screen_geom());
    }

    #[test]
    fn test_size_hint_change_refloats() {
        let mut wm = wm_with(vec![
            (1, win(Geometry::new(0, 0, 100, 100))),
            (10, win(Geometry::new(5, 5, 200, 200))),
        ]);
        wm.manage(1).unwrap();
        wm.manage(10).unwrap();
        assert!(!wm.clients().lookup(10).unwrap().is_floating());

        let mut hints = WmSizeHints::new();
        hints.min_size = Some((300, 200));
        hints.max_size = Some((300, 200));
        wm.conn().set_size_hints(10, hints);
        let atom = wm.conn().atom(Atom::WmNormalHints.as_ref()).unwrap();
        wm.handle_event(XEvent::PropertyNotify(PropertyEvent {
            id: 10,
            atom,
            time: 0,
            deleted: false,
        }))
        .unwrap();

        let client = wm.clients().lookup(10).unwrap();
        assert!(client.is_fixed());
        assert!(client.is_floating());
        // the rearrange shrank it out of the tiled geometry
        assert_eq!(client.geometry(), Geometry::new(0, 0, 200, 300));
    }

    #[test]
    fn test_root_resize_rearranges() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 100, 100)))]);
        wm.manage(1).unwrap();
        let root = wm.state().root.id;

        wm.handle_event(XEvent::ConfigureNotify(ConfigureEvent {
            id: root,
            geom: Geometry::new(0, 0, 800, 1280),
            is_root: true,
        }))
        .unwrap();

        assert_eq!(
            wm.clients().lookup(1).unwrap().geometry(),
            Geometry::new(0, 0, 800, 1280)
        );
    }

    #[test]
    fn test_register_adopts_existing_windows() {
        let mut skipped_ovrd = win(Geometry::new(0, 0, 50, 50));
        skipped_ovrd.override_redirect = true;
        let mut skipped_hidden = win(Geometry::new(0, 0, 50, 50));
        skipped_hidden.viewable = false;
        let mut transient = win(Geometry::new(30, 30, 50, 50));
        transient.transient_for = Some(1);

        let mut wm = wm_with(vec![
            (1, win(Geometry::new(0, 0, 100, 100))),
            (2, skipped_ovrd),
            (3, skipped_hidden),
            (4, transient),
        ]);

        wm.register().unwrap();

        assert!(wm.clients().contains(1));
        assert!(!wm.clients().contains(2));
        assert!(!wm.clients().contains(3));
        assert!(wm.clients().contains(4));
        assert!(wm.clients().lookup(4).unwrap().is_floating());
        assert_eq!(wm.selected(), wm.clients().stack_head());
    }

    #[test]
    fn test_map_request_is_idempotent() {
        let mut wm = wm_with(vec![(1, win(Geometry::new(0, 0, 100, 100)))]);

        wm.handle_event(XEvent::MapRequest(1, Some(false))).unwrap();
        assert_eq!(wm.clients().len(), 1);

        wm.conn().clear_requests();
        wm.handle_event(XEvent::MapRequest(1, Some(false))).unwrap();
        assert_eq!(wm.clients().len(), 1);
        assert!(wm.conn().requests().is_empty());

        // override-redirect windows manage themselves
        wm.handle_event(XEvent::MapRequest(8, Some(true))).unwrap();
        assert!(!wm.clients().contains(8));
    }
}
