use core::marker::PhantomData;

use std::cell::RefCell;
use std::fmt;

use x11rb::connection::Connection;
use x11rb::protocol::{
    xproto::{self, ConnectionExt as XConnectionExt, EventMask},
    Event,
};
use x11rb::rust_connection::RustConnection;

use byteorder::{LittleEndian, WriteBytesExt};

use tracing::{error, trace};

use strum::*;

use super::{
    atom::Atom,
    core::{
        ClientAttrs, ClientConfig, Result, StackMode, WindowGeometry, WindowSnapshot, XAtom,
        XConn, XError, XWindow, XWindowID,
    },
    event::{ConfigureEvent, ConfigureRequestData, PointerEvent, PropertyEvent, XEvent},
    property::{Property, WindowState, WmHints, WmSizeHints},
    Atoms, ConnStatus, Initialized, Uninitialized,
};
use crate::core::types::Geometry;

mod convert;

const MAX_LONG_LENGTH: u32 = 1024;

/// A connection to an X server, backed by the x11rb library.
///
/// This is a very simple connection to the X server and is
/// completely synchronous.
///
/// It implements [XConn][1] and thus can be used with a
/// [WindowManager][2].
///
/// # Usage
///
/// ```no_run
/// use monowm::x::x11rb::X11RBConn;
///
/// let conn = X11RBConn::connect().expect("Connection error");
/// let mut conn = conn.init().expect("Could not initialize");
///
/// /* or: */
/// let mut conn = X11RBConn::new().expect("Connection error");
/// ```
///
/// [1]: crate::x::core::XConn
/// [2]: crate::manager::WindowManager
pub struct X11RBConn<S: ConnStatus> {
    conn: RustConnection,
    root: XWindow,
    idx: usize,
    atoms: RefCell<Atoms>, // wrap in RefCell for interior mutability
    _marker: PhantomData<S>,
}

impl X11RBConn<Uninitialized> {
    /// Connect to the X server and allocate a new Connection.
    pub fn connect() -> Result<Self> {
        let (conn, idx) = x11rb::connect(None)?;
        trace!("Connected to x server, got preferred screen {}", idx);

        // initialize our atom handler
        let atoms = RefCell::new(Atoms::new());

        Ok(Self {
            conn,
            root: XWindow::from(0),
            idx,
            atoms,
            _marker: PhantomData,
        })
    }

    /// Initializes the connection.
    ///
    /// It does the following:
    ///
    /// - Initializes the root window and its dimensions.
    /// - Interns all known [atoms][1].
    ///
    /// [1]: crate::x::atom::Atom
    pub fn init(mut self) -> Result<X11RBConn<Initialized>> {
        // get root window id and dimensions
        let root = match self.conn.setup().roots.get(self.idx) {
            Some(screen) => {
                let id = screen.root;
                let geom = self.get_geometry_inner(id)?.geom;
                XWindow::with_data(id, geom)
            }
            None => return Err(XError::NoScreens),
        };
        trace!("Got root: {:?}", root);

        let atomcount = Atom::iter().count();
        let mut atomvec = Vec::with_capacity(atomcount);

        // intern all known atoms: get cookies for all first
        for atom in Atom::iter() {
            atomvec.push((
                atom.to_string(),
                self.conn.intern_atom(false, atom.as_ref().as_bytes())?,
            ));
        }

        let atoms = self.atoms.get_mut();

        // then get replies
        for (name, cookie) in atomvec {
            atoms.insert(&name, cookie.reply()?.atom);
        }

        Ok(X11RBConn {
            conn: self.conn,
            root,
            idx: self.idx,
            atoms: self.atoms,
            _marker: PhantomData,
        })
    }
}

impl<S: ConnStatus> X11RBConn<S> {
    #[inline]
    pub(crate) fn get_geometry_inner(&self, window: XWindowID) -> Result<WindowGeometry> {
        trace!("Getting geometry for window {}", window);

        Ok(self
            .conn
            .get_geometry(window)?
            .reply()
            .map(|ok| WindowGeometry {
                geom: Geometry {
                    x: ok.x as i32,
                    y: ok.y as i32,
                    height: ok.height as i32,
                    width: ok.width as i32,
                },
                border_width: ok.border_width as u32,
            })?)
    }
}

impl X11RBConn<Initialized> {
    /// Shortcut static method for directly creating
    /// an initialized connection.
    pub fn new() -> Result<Self> {
        X11RBConn::connect()?.init()
    }

    /// Adds an atom to internal atom storage.
    pub fn add_atom<S: AsRef<str>>(&mut self, name: S, atom: XAtom) {
        self.atoms.get_mut().insert(name.as_ref(), atom);
    }

    /// Returns a reference to its internal atom storage.
    pub fn atoms(&self) -> &Atoms {
        // SAFETY: returns an immutable reference
        unsafe { &*self.atoms.as_ptr() }
    }

    /// Exposes `X11RBConn`'s internal connection.
    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    fn process_raw_event(&self, event: Event) -> Result<XEvent> {
        match event {
            Event::ConfigureNotify(event) => Ok(XEvent::ConfigureNotify(ConfigureEvent {
                id: event.window,
                geom: Geometry {
                    x: event.x as i32,
                    y: event.y as i32,
                    height: event.height as i32,
                    width: event.width as i32,
                },
                is_root: event.window == self.root.id,
            })),
            Event::ConfigureRequest(req) => {
                use xproto::{ConfigWindow as CWMask, StackMode as XStackMode};

                // extract window ids
                let id = req.window;
                let parent = req.parent;
                if parent == self.root.id {
                    trace!("Top level window configuration request");
                }

                // extract relevant values using the value mask
                let vmask = req.value_mask;
                let x = vmask.contains(CWMask::X).then_some(req.x as i32);
                let y = vmask.contains(CWMask::Y).then_some(req.y as i32);
                let height = vmask
                    .contains(CWMask::HEIGHT)
                    .then_some(req.height as i32);
                let width = vmask.contains(CWMask::WIDTH).then_some(req.width as i32);
                let border_width = vmask
                    .contains(CWMask::BORDER_WIDTH)
                    .then_some(req.border_width as u32);
                let sibling = vmask.contains(CWMask::SIBLING).then_some(req.sibling);
                let stack_mode = if vmask.contains(CWMask::STACK_MODE) {
                    match req.stack_mode {
                        XStackMode::ABOVE => Some(StackMode::Above(sibling)),
                        XStackMode::BELOW => Some(StackMode::Below(sibling)),
                        XStackMode::TOP_IF => Some(StackMode::TopIf(sibling)),
                        XStackMode::BOTTOM_IF => Some(StackMode::BottomIf(sibling)),
                        XStackMode::OPPOSITE => Some(StackMode::Opposite(sibling)),
                        other => {
                            return Err(XError::ConversionError(format!(
                                "invalid stack mode {:?}",
                                other
                            )))
                        }
                    }
                } else {
                    None
                };

                Ok(XEvent::ConfigureRequest(ConfigureRequestData {
                    id,
                    parent,
                    sibling,
                    x,
                    y,
                    height,
                    width,
                    border_width,
                    stack_mode,
                }))
            }
            Event::MapRequest(req) => {
                // the window can die between the request and our query
                let override_redirect = match self.conn.get_window_attributes(req.window)?.reply()
                {
                    Ok(reply) => Some(reply.override_redirect),
                    Err(_) => None,
                };

                Ok(XEvent::MapRequest(req.window, override_redirect))
            }
            Event::UnmapNotify(event) => Ok(XEvent::UnmapNotify(event.window)),
            Event::DestroyNotify(event) => Ok(XEvent::DestroyNotify(event.window)),
            Event::EnterNotify(event) => {
                let ptrev = PointerEvent {
                    id: event.event,
                    grab: event.mode != xproto::NotifyMode::NORMAL,
                    inferior: event.detail == xproto::NotifyDetail::INFERIOR,
                };

                Ok(XEvent::EnterNotify(ptrev))
            }
            Event::FocusIn(event) => Ok(XEvent::FocusIn(event.event)),
            Event::PropertyNotify(event) => Ok(XEvent::PropertyNotify(PropertyEvent {
                id: event.window,
                atom: event.atom,
                time: event.time,
                deleted: event.state == xproto::Property::DELETE,
            })),
            unk => Ok(XEvent::Unknown(unk.response_type())),
        }
    }

    fn get_prop_atom(&self, prop: XAtom, window: XWindowID) -> Result<Option<Property>> {
        let r = self
            .conn
            .get_property(
                false,
                window,
                prop,
                xproto::AtomEnum::ANY,
                // start at offset 0
                0,
                // allow for up to 4 * MAX_LONG_LENGTH bytes of information
                MAX_LONG_LENGTH,
            )?
            .reply()?;

        if r.type_ == x11rb::NONE {
            trace!("prop type is none");
            return Ok(None);
        }

        let prop_type = self.lookup_atom(r.type_)?;
        trace!("got prop_type {}", prop_type);

        let value32 = || {
            r.value32()
                .map(|v| v.collect::<Vec<u32>>())
                .ok_or_else(|| XError::InvalidPropertyData("expected format 32".into()))
        };

        Ok(match prop_type.as_str() {
            "ATOM" => Some(Property::Atom(
                value32()?
                    .into_iter()
                    .map(|a| self.lookup_atom(a).unwrap_or_else(|_| "".into()))
                    .collect(),
            )),
            "CARDINAL" => Some(Property::Cardinal(
                value32()?.first().copied().unwrap_or(0),
            )),
            "STRING" => Some(Property::String(
                String::from_utf8_lossy(&r.value)
                    .trim_matches('\0')
                    .split('\0')
                    .map(|a| a.to_string())
                    .collect(),
            )),
            "UTF8_STRING" => Some(Property::UTF8String(
                String::from_utf8(r.value)?
                    .trim_matches('\0')
                    .split('\0')
                    .map(|a| a.to_string())
                    .collect(),
            )),
            "WINDOW" => Some(Property::Window(value32()?)),
            "WM_HINTS" => Some(Property::WMHints(WmHints::try_from_bytes(&value32()?)?)),
            "WM_SIZE_HINTS" => Some(Property::WMSizeHints(WmSizeHints::try_from_bytes(
                &value32()?,
            )?)),
            n => match r.format {
                8 => Some(Property::U8List(
                    n.into(),
                    r.value8().ok_or_else(invalid_format)?.collect(),
                )),
                16 => Some(Property::U16List(
                    n.into(),
                    r.value16().ok_or_else(invalid_format)?.collect(),
                )),
                32 => Some(Property::U32List(n.into(), value32()?)),
                n => {
                    return Err(XError::InvalidPropertyData(format!(
                        "received format {}",
                        n
                    )))
                }
            },
        })
    }

    fn lookup_atom(&self, atom: XAtom) -> Result<String> {
        trace!("Looking up atom {}", atom);
        if let Some(name) = self.atoms().retrieve_by_value(atom) {
            return Ok(name);
        }
        trace!("Name not known, looking up via X connection");
        let name = String::from_utf8(self.conn.get_atom_name(atom)?.reply()?.name)?;

        trace!("Got name {}", name);
        if let Ok(mut atoms) = self.atoms.try_borrow_mut() {
            atoms.insert(&name, atom);
        }

        Ok(name)
    }
}

fn invalid_format() -> XError {
    XError::InvalidPropertyData("reply format did not match".into())
}

impl XConn for X11RBConn<Initialized> {
    fn poll_next_event(&self) -> Result<Option<XEvent>> {
        self.conn.flush()?;

        let event = self.conn.wait_for_event()?;
        Ok(Some(self.process_raw_event(event)?))
    }

    fn get_root(&self) -> XWindow {
        self.root
    }

    fn get_geometry(&self, window: XWindowID) -> Result<WindowGeometry> {
        self.get_geometry_inner(window)
    }

    fn query_tree(&self, window: XWindowID) -> Result<Vec<XWindowID>> {
        trace!("Querying tree");

        Ok(self.conn.query_tree(window)?.reply()?.children)
    }

    fn window_snapshots(&self, windows: &[XWindowID]) -> Result<Vec<WindowSnapshot>> {
        let transient = self
            .atom(Atom::WmTransientFor.as_ref())?;
        let hints = self.atom(Atom::WmHints.as_ref())?;

        // scatter: queue every request before collecting any reply
        let mut cookies = Vec::with_capacity(windows.len());
        for win in windows {
            let attrs = self.conn.get_window_attributes(*win)?;
            let trans = self.conn.get_property(
                false,
                *win,
                transient,
                xproto::AtomEnum::WINDOW,
                0,
                1,
            )?;
            let wmh =
                self.conn
                    .get_property(false, *win, hints, xproto::AtomEnum::ANY, 0, 9)?;
            cookies.push((*win, attrs, trans, wmh));
        }

        // gather
        let mut snapshots = Vec::with_capacity(windows.len());
        for (id, attrs, trans, wmh) in cookies {
            // the window may already be gone; skip it
            let Ok(attrs) = attrs.reply() else {
                continue;
            };

            let transient_for = trans
                .reply()
                .ok()
                .and_then(|r| r.value32().and_then(|mut v| v.next()))
                .filter(|id| *id != 0);

            let initial_iconic = wmh
                .reply()
                .ok()
                .and_then(|r| r.value32().map(|v| v.collect::<Vec<u32>>()))
                .and_then(|raw| WmHints::try_from_bytes(&raw).ok())
                .map(|h| h.initial_iconic())
                .unwrap_or(false);

            snapshots.push(WindowSnapshot {
                id,
                override_redirect: attrs.override_redirect,
                viewable: attrs.map_state == xproto::MapState::VIEWABLE,
                initial_iconic,
                transient_for,
            });
        }

        Ok(snapshots)
    }

    fn atom(&self, atom: &str) -> Result<XAtom> {
        if let Some(known) = self.atoms().retrieve(atom) {
            return Ok(known);
        }
        trace!("Interning atom {}", atom);
        let x = self.conn.intern_atom(false, atom.as_bytes())?.reply()?;
        trace!("Atom name: {}, atom: {}", atom, x.atom);

        if let Ok(mut atoms) = self.atoms.try_borrow_mut() {
            atoms.insert(atom, x.atom);
        }
        Ok(x.atom)
    }

    fn lookup_interned_atom(&self, atom: XAtom) -> Option<String> {
        self.atoms().retrieve_by_value(atom)
    }

    fn grab_server(&self) -> Result<()> {
        trace!("Grabbing server");
        Ok(self.conn.grab_server()?.check()?)
    }

    fn ungrab_server(&self) -> Result<()> {
        trace!("Ungrabbing server");
        self.conn.ungrab_server()?.check()?;
        Ok(self.conn.flush()?)
    }

    fn map_window(&self, window: XWindowID) -> Result<()> {
        trace!("Mapping window {}", window);

        let cookie = self.conn.map_window(window)?.check();
        if let Err(e) = cookie {
            error!("Could not map window {}: {}", window, e);
            Err(e.into())
        } else {
            Ok(())
        }
    }

    fn configure_window(&self, window: XWindowID, attrs: &[ClientConfig]) -> Result<()> {
        trace!("Configuring window {} with attrs {:?}", window, attrs);
        for attr in attrs {
            let aux = attr.into();
            self.conn.configure_window(window, &aux)?.check()?;
        }
        Ok(())
    }

    fn forward_configure_request(&self, data: &ConfigureRequestData) -> Result<()> {
        use xproto::{ConfigureWindowAux, StackMode as XStackMode};

        trace!("Forwarding configure request for {}", data.id);

        let mut aux = ConfigureWindowAux::new()
            .x(data.x)
            .y(data.y)
            .width(data.width.map(|w| w as u32))
            .height(data.height.map(|h| h as u32))
            .border_width(data.border_width)
            .sibling(data.sibling);

        if let Some(sm) = data.stack_mode {
            aux = aux.stack_mode(match sm {
                StackMode::Above(_) => XStackMode::ABOVE,
                StackMode::Below(_) => XStackMode::BELOW,
                StackMode::TopIf(_) => XStackMode::TOP_IF,
                StackMode::BottomIf(_) => XStackMode::BOTTOM_IF,
                StackMode::Opposite(_) => XStackMode::OPPOSITE,
            });
        }

        Ok(self.conn.configure_window(data.id, &aux)?.check()?)
    }

    fn change_window_attributes(&self, window: XWindowID, attrs: &[ClientAttrs]) -> Result<()> {
        trace!("Changing window attributes on {}", window);
        let attrs = convert::convert_cws(attrs);
        Ok(self
            .conn
            .change_window_attributes(window, &attrs)?
            .check()?)
    }

    fn set_input_focus(&self, window: XWindowID) -> Result<()> {
        trace!("Setting focus for window {}", window);
        self.conn
            .set_input_focus(xproto::InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)?
            .check()?;
        Ok(())
    }

    fn send_configure_notify(&self, window: XWindowID, geom: Geometry) -> Result<()> {
        trace!("Sending synthetic configure notify to {}", window);

        let event = xproto::ConfigureNotifyEvent {
            response_type: xproto::CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: geom.x as i16,
            y: geom.y as i16,
            width: geom.width as u16,
            height: geom.height as u16,
            border_width: 0,
            override_redirect: false,
        };

        Ok(self
            .conn
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?
            .check()?)
    }

    fn get_property(&self, prop: &str, window: XWindowID) -> Result<Option<Property>> {
        let atom = self.atom(prop)?;
        self.get_prop_atom(atom, window)
    }

    fn set_property(&self, window: XWindowID, prop: &str, data: Property) -> Result<()> {
        use Property::*;

        // replace the property
        let mode = xproto::PropMode::REPLACE;
        let prop = self.atom(prop)?;

        /* (type of property, format (bits), actual data) */
        let (ty, format, data): (XAtom, u8, Vec<u32>) = match data {
            Atom(atoms) => (
                xproto::AtomEnum::ATOM.into(),
                32,
                atoms
                    .iter()
                    .map(|a| self.atom(a).unwrap_or(0))
                    .collect(),
            ),
            Cardinal(card) => (xproto::AtomEnum::CARDINAL.into(), 32, vec![card]),
            String(strs) | UTF8String(strs) => {
                let string = strs.join("\0");
                self.conn
                    .change_property(
                        mode,
                        window,
                        prop,
                        xproto::AtomEnum::STRING,
                        8, //format
                        string.len() as u32,
                        string.as_bytes(),
                    )?
                    .check()?;
                return Ok(());
            }
            Window(ids) => (xproto::AtomEnum::WINDOW.into(), 32, ids),
            WMHints(hints) => (
                self.atom(super::Atom::WmHints.as_ref())?,
                32,
                hints.to_raw().to_vec(),
            ),
            U32List(ty, data) => (self.atom(&ty)?, 32, data),
            _ => {
                return Err(XError::InvalidPropertyData(
                    "cannot convert non-standard types".into(),
                ))
            }
        };

        let data_len = data.len();

        let mut new_data = Vec::<u8>::with_capacity(data_len * 4);
        for dword in data {
            new_data.write_u32::<LittleEndian>(dword)?;
        }

        Ok(self
            .conn
            .change_property(mode, window, prop, ty, format, data_len as u32, &new_data)?
            .check()?)
    }
}

impl<S: ConnStatus + fmt::Debug> fmt::Debug for X11RBConn<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X11RBConn")
            .field("root", &self.root)
            .field("idx", &self.idx)
            .finish()
    }
}

use std::io::Error;

impl From<Error> for XError {
    fn from(e: Error) -> XError {
        XError::ConversionError(e.to_string())
    }
}

use x11rb::errors;
use x11rb::protocol::ErrorKind;
use x11rb::x11_utils::X11Error;

fn convert_x11_error(err: X11Error) -> XError {
    // requests against dead windows come back as Window errors; this
    // is the race every window manager has to tolerate
    if err.error_kind == ErrorKind::Window {
        XError::WindowGone(err.bad_value)
    } else {
        XError::ServerError(format!(
            "{:?} (bad value {})",
            err.error_kind, err.bad_value
        ))
    }
}

impl From<errors::ConnectionError> for XError {
    fn from(e: errors::ConnectionError) -> XError {
        use errors::ConnectionError::*;
        match e {
            UnknownError | InsufficientMemory | FdPassingFailed => {
                XError::Connection(e.to_string())
            }
            IoError(e) => XError::Connection(e.to_string()),
            other => XError::Protocol(other.to_string()),
        }
    }
}

impl From<errors::ConnectError> for XError {
    fn from(e: errors::ConnectError) -> XError {
        XError::Connection(e.to_string())
    }
}

impl From<errors::ReplyError> for XError {
    fn from(e: errors::ReplyError) -> XError {
        match e {
            errors::ReplyError::X11Error(err) => convert_x11_error(err),
            errors::ReplyError::ConnectionError(err) => err.into(),
        }
    }
}

impl From<errors::ReplyOrIdError> for XError {
    fn from(e: errors::ReplyOrIdError) -> XError {
        match e {
            errors::ReplyOrIdError::X11Error(err) => convert_x11_error(err),
            errors::ReplyOrIdError::ConnectionError(err) => err.into(),
            other => XError::ServerError(other.to_string()),
        }
    }
}
