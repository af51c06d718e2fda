//! Types and traits providing a unified interface with the X server.
//!
//! The core of this module is the `XConn` trait, which defines the
//! interface by which the window manager retrieves data from and
//! sets data on the X server, using crate types for abstraction.
//!
//! The one live implementation is backed by the `x11rb` library.
//!
//! ## Connection Object Initialization
//!
//! The `XConn` implementor has two states: uninitialized, and
//! initialized, marked in its type constructor. Uninitialized
//! connections have only established a connection to the server and
//! have not set up the internal state (atoms, root data) required for
//! their methods to be safely callable. `XConn` is therefore only
//! implemented for initialized connections, and users have to call
//! `init` before the connection object is usable.

pub mod atom;
pub mod core;
pub mod event;
pub mod property;

/// Implementation of `XConn` backed by the `x11rb` library.
pub mod x11rb;

#[doc(inline)]
pub use self::core::{Result, XAtom, XConn, XError, XWindow, XWindowID};
#[doc(inline)]
pub use atom::{Atom, Atoms};
#[doc(inline)]
pub use event::XEvent;

#[doc(inline)]
pub use self::x11rb::X11RBConn;
#[doc(inline)]
pub use status::ConnStatus;
pub(crate) use status::{Initialized, Uninitialized};

/* the dummy connection is used for testing higher-level code and
does not actually talk to an X server, so it stays enabled for
standard testing */
#[cfg(test)]
pub(crate) mod dummy;

pub mod status {
    //! Types for representing connection status.
    //!
    //! This module contains the [`ConnStatus`] sealed trait,
    //! as well as its two implementors, [`Initialized`] and
    //! [`Uninitialized`]. These are used to mark the state of
    //! a connection object, and act as guards to only
    //! expose [`XConn`](crate::x::XConn) methods when safe
    //! to do so.
    mod private {
        pub trait Sealed {}
    }

    /// A trait defining marker types `Uninitialized` and `Initialized`.
    pub trait ConnStatus: private::Sealed {}

    /// A marker struct indicating a connection is uninitialized.
    ///
    /// Uninitialized connections do not expose any methods.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Uninitialized;

    impl ConnStatus for Uninitialized {}
    impl private::Sealed for Uninitialized {}

    /// A marker type indicating a connection is initialized and can be used.
    ///
    /// Initialized connections expose all available methods.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Initialized;

    impl ConnStatus for Initialized {}
    impl private::Sealed for Initialized {}
}

// backend-agnostic conversion implementations

use std::string::FromUtf8Error;

impl From<FromUtf8Error> for XError {
    fn from(e: FromUtf8Error) -> XError {
        XError::InvalidPropertyData(format!("Invalid UTF8 data: {}", e))
    }
}
