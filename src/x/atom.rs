use std::collections::HashMap;
use std::str::FromStr;

use strum::*;
use strum_macros::EnumIter;

use super::core::XAtom;

/// Internal representations of the X atoms this window manager touches.
///
/// This allows for some measure of type safety around dealing with atoms.
#[derive(AsRefStr, Display, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Atom {
    /// ATOM
    #[strum(serialize = "ATOM")]
    Atom,
    /// WINDOW
    #[strum(serialize = "WINDOW")]
    Window,
    /// CARDINAL
    #[strum(serialize = "CARDINAL")]
    Cardinal,
    /// STRING
    #[strum(serialize = "STRING")]
    String,
    /// UTF8_STRING
    #[strum(serialize = "UTF8_STRING")]
    UTF8String,
    /// WM_HINTS
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    /// WM_NORMAL_HINTS
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    /// WM_SIZE_HINTS
    #[strum(serialize = "WM_SIZE_HINTS")]
    WmSizeHints,
    /// WM_PROTOCOLS
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    /// WM_DELETE_WINDOW
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    /// WM_STATE
    #[strum(serialize = "WM_STATE")]
    WmState,
    /// WM_NAME
    #[strum(serialize = "WM_NAME")]
    WmName,
    /// WM_TRANSIENT_FOR
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
    /// _NET_SUPPORTED
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    /// _NET_WM_NAME
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
}

/// The EWMH atoms advertised in _NET_SUPPORTED on the root.
pub const EWMH_SUPPORTED_ATOMS: &[Atom] = &[Atom::NetSupported, Atom::NetWmName];

/// A type that associates either an Atom or a String with
/// an X-defined atom.
#[derive(Debug, Default, Clone)]
pub struct Atoms {
    /// Known atoms that can be managed as their enum variants.
    known: HashMap<Atom, XAtom>,
    /// Unknown atoms that have to be managed as strings.
    interned: HashMap<String, XAtom>,
}

impl Atoms {
    pub fn new() -> Self {
        Self {
            known: HashMap::new(),
            interned: HashMap::new(),
        }
    }

    pub fn insert(&mut self, atom: &str, val: XAtom) {
        if let Ok(known) = Atom::from_str(atom) {
            self.known.insert(known, val);
        } else {
            self.interned.insert(atom.into(), val);
        }
    }

    pub fn retrieve(&self, atom: &str) -> Option<XAtom> {
        if let Ok(known) = Atom::from_str(atom) {
            self.known.get(&known).copied()
        } else {
            self.interned.get(&atom.to_string()).copied()
        }
    }

    pub fn retrieve_by_value(&self, atom: XAtom) -> Option<String> {
        if let Some((known, _)) = self.known.iter().find(|(_, v)| **v == atom) {
            Some(known.to_string())
        } else {
            self.interned
                .iter()
                .find(|(_, v)| **v == atom)
                .map(|(k, _)| k.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms_round_trip() {
        let mut atoms = Atoms::new();

        atoms.insert("WM_STATE", 71);
        atoms.insert("_SOME_VENDOR_THING", 300);

        assert_eq!(atoms.retrieve(Atom::WmState.as_ref()), Some(71));
        assert_eq!(atoms.retrieve("_SOME_VENDOR_THING"), Some(300));
        assert_eq!(atoms.retrieve_by_value(71).as_deref(), Some("WM_STATE"));
        assert_eq!(
            atoms.retrieve_by_value(300).as_deref(),
            Some("_SOME_VENDOR_THING")
        );
        assert_eq!(atoms.retrieve("WM_HINTS"), None);
    }
}
