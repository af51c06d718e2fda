//! A stub `XConn` implementation for testing higher-level code.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use super::{
    atom::{Atom, Atoms},
    core::{
        ClientAttrs, ClientConfig, Result, WindowGeometry, WindowSnapshot, XAtom, XConn,
        XError, XWindow, XWindowID,
    },
    event::{ConfigureRequestData, XEvent},
    property::{Property, WmHints, WmSizeHints},
};
use crate::core::types::Geometry;

/// Server state for a single fake window.
#[derive(Debug, Clone, Default)]
pub(crate) struct DummyWindow {
    pub geom: Geometry,
    pub border_width: u32,
    pub override_redirect: bool,
    pub viewable: bool,
    pub mapped: bool,
    pub hints: Option<WmHints>,
    pub size_hints: Option<WmSizeHints>,
    pub transient_for: Option<XWindowID>,
}

impl DummyWindow {
    pub(crate) fn viewable(geom: Geometry) -> Self {
        Self {
            geom,
            border_width: 1,
            viewable: true,
            ..Default::default()
        }
    }
}

/// Every server-visible request a `DummyConn` records.
#[derive(Debug, Clone)]
pub(crate) enum Request {
    Configure(XWindowID, Vec<ClientConfig>),
    ForwardConfigure(ConfigureRequestData),
    ChangeAttrs(XWindowID, Vec<ClientAttrs>),
    SetFocus(XWindowID),
    Map(XWindowID),
    SyntheticNotify(XWindowID, Geometry),
    SetProperty(XWindowID, String, Property),
    GrabServer,
    UngrabServer,
}

/// A connection implementing `XConn` that does not interface with
/// an X server at all.
///
/// `DummyConn` holds an internal queue of events dequeued by
/// `poll_next_event`, a store of fake top-level windows, and a log
/// of every request issued against it, so tests can assert on the
/// requests the manager would have sent to a real server.
pub(crate) struct DummyConn {
    root: XWindow,
    events: RefCell<VecDeque<XEvent>>,
    windows: RefCell<HashMap<XWindowID, DummyWindow>>,
    requests: RefCell<Vec<Request>>,
    atoms: RefCell<Atoms>,
    next_atom: Cell<XAtom>,
}

impl DummyConn {
    pub(crate) fn new(root_geom: Geometry) -> Self {
        let atoms = RefCell::new(Atoms::new());
        let mut next = 1;
        for atom in <Atom as strum::IntoEnumIterator>::iter() {
            atoms.borrow_mut().insert(atom.as_ref(), next);
            next += 1;
        }
        Self {
            root: XWindow::with_data(1000, root_geom),
            events: RefCell::new(VecDeque::new()),
            windows: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            atoms,
            next_atom: Cell::new(next),
        }
    }

    pub(crate) fn add_event(&self, event: XEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub(crate) fn add_window(&self, id: XWindowID, window: DummyWindow) {
        self.windows.borrow_mut().insert(id, window);
    }

    pub(crate) fn remove_window(&self, id: XWindowID) {
        self.windows.borrow_mut().remove(&id);
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub(crate) fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    pub(crate) fn set_hints(&self, id: XWindowID, hints: WmHints) {
        if let Some(win) = self.windows.borrow_mut().get_mut(&id) {
            win.hints = Some(hints);
        }
    }

    pub(crate) fn set_size_hints(&self, id: XWindowID, hints: WmSizeHints) {
        if let Some(win) = self.windows.borrow_mut().get_mut(&id) {
            win.size_hints = Some(hints);
        }
    }

    pub(crate) fn set_transient(&self, id: XWindowID, target: Option<XWindowID>) {
        if let Some(win) = self.windows.borrow_mut().get_mut(&id) {
            win.transient_for = target;
        }
    }

    pub(crate) fn hints(&self, id: XWindowID) -> Option<WmHints> {
        self.windows.borrow().get(&id).and_then(|w| w.hints)
    }

    fn record(&self, req: Request) {
        self.requests.borrow_mut().push(req);
    }

    fn known(&self, window: XWindowID) -> Result<()> {
        if window == self.root.id || self.windows.borrow().contains_key(&window) {
            Ok(())
        } else {
            Err(XError::WindowGone(window))
        }
    }
}

impl XConn for DummyConn {
    fn poll_next_event(&self) -> Result<Option<XEvent>> {
        Ok(self.events.borrow_mut().pop_front())
    }

    fn get_root(&self) -> XWindow {
        self.root
    }

    fn get_geometry(&self, window: XWindowID) -> Result<WindowGeometry> {
        if window == self.root.id {
            return Ok(WindowGeometry {
                geom: self.root.geom,
                border_width: 0,
            });
        }
        self.windows
            .borrow()
            .get(&window)
            .map(|w| WindowGeometry {
                geom: w.geom,
                border_width: w.border_width,
            })
            .ok_or(XError::WindowGone(window))
    }

    fn query_tree(&self, _window: XWindowID) -> Result<Vec<XWindowID>> {
        let mut ids: Vec<XWindowID> = self.windows.borrow().keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn window_snapshots(&self, windows: &[XWindowID]) -> Result<Vec<WindowSnapshot>> {
        let store = self.windows.borrow();
        Ok(windows
            .iter()
            .filter_map(|id| store.get(id).map(|w| (id, w)))
            .map(|(id, w)| WindowSnapshot {
                id: *id,
                override_redirect: w.override_redirect,
                viewable: w.viewable,
                initial_iconic: w.hints.map(|h| h.initial_iconic()).unwrap_or(false),
                transient_for: w.transient_for,
            })
            .collect())
    }

    fn atom(&self, atom: &str) -> Result<XAtom> {
        if let Some(known) = self.atoms.borrow().retrieve(atom) {
            return Ok(known);
        }
        let new = self.next_atom.get();
        self.next_atom.set(new + 1);
        self.atoms.borrow_mut().insert(atom, new);
        Ok(new)
    }

    fn lookup_interned_atom(&self, atom: XAtom) -> Option<String> {
        self.atoms.borrow().retrieve_by_value(atom)
    }

    fn grab_server(&self) -> Result<()> {
        self.record(Request::GrabServer);
        Ok(())
    }

    fn ungrab_server(&self) -> Result<()> {
        self.record(Request::UngrabServer);
        Ok(())
    }

    fn map_window(&self, window: XWindowID) -> Result<()> {
        self.known(window)?;
        self.record(Request::Map(window));
        if let Some(win) = self.windows.borrow_mut().get_mut(&window) {
            win.mapped = true;
            win.viewable = true;
        }
        Ok(())
    }

    fn configure_window(&self, window: XWindowID, attrs: &[ClientConfig]) -> Result<()> {
        self.known(window)?;
        self.record(Request::Configure(window, attrs.to_vec()));
        if let Some(win) = self.windows.borrow_mut().get_mut(&window) {
            for attr in attrs {
                match attr {
                    ClientConfig::BorderWidth(bw) => win.border_width = *bw,
                    ClientConfig::Position { x, y } => {
                        win.geom.x = *x;
                        win.geom.y = *y;
                    }
                    ClientConfig::Resize { h, w } => {
                        win.geom.height = *h;
                        win.geom.width = *w;
                    }
                    ClientConfig::StackingMode(_) => {}
                }
            }
        }
        Ok(())
    }

    fn forward_configure_request(&self, data: &ConfigureRequestData) -> Result<()> {
        self.known(data.id)?;
        self.record(Request::ForwardConfigure(data.clone()));
        Ok(())
    }

    fn change_window_attributes(&self, window: XWindowID, attrs: &[ClientAttrs]) -> Result<()> {
        self.known(window)?;
        self.record(Request::ChangeAttrs(window, attrs.to_vec()));
        Ok(())
    }

    fn set_input_focus(&self, window: XWindowID) -> Result<()> {
        self.record(Request::SetFocus(window));
        Ok(())
    }

    fn send_configure_notify(&self, window: XWindowID, geom: Geometry) -> Result<()> {
        self.known(window)?;
        self.record(Request::SyntheticNotify(window, geom));
        Ok(())
    }

    fn get_property(&self, prop: &str, window: XWindowID) -> Result<Option<Property>> {
        self.known(window)?;
        let store = self.windows.borrow();
        let Some(win) = store.get(&window) else {
            return Ok(None);
        };
        Ok(match prop {
            "WM_HINTS" => win.hints.map(Property::WMHints),
            "WM_NORMAL_HINTS" => win.size_hints.map(Property::WMSizeHints),
            "WM_TRANSIENT_FOR" => win
                .transient_for
                .map(|id| Property::Window(vec![id])),
            _ => None,
        })
    }

    fn set_property(&self, window: XWindowID, prop: &str, data: Property) -> Result<()> {
        self.known(window)?;
        if let Property::WMHints(hints) = &data {
            if let Some(win) = self.windows.borrow_mut().get_mut(&window) {
                win.hints = Some(*hints);
            }
        }
        self.record(Request::SetProperty(window, prop.into(), data));
        Ok(())
    }
}
