//! Conversions between our request types and x11rb types.

use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConfigureWindowAux, EventMask, StackMode as XStackMode,
};

use crate::x::core::{ClientAttrs, ClientConfig};

macro_rules! enable_client_events {
    () => {
        EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY
    };
}

macro_rules! root_redirect_mask {
    () => {
        EventMask::SUBSTRUCTURE_REDIRECT
    };
}

macro_rules! root_event_mask {
    () => {
        EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::PROPERTY_CHANGE
    };
}

impl From<&ClientConfig> for ConfigureWindowAux {
    fn from(from: &ClientConfig) -> ConfigureWindowAux {
        use crate::x::core::StackMode::*;
        use ClientConfig::*;

        match from {
            BorderWidth(px) => ConfigureWindowAux::new().border_width(*px),
            Position { x, y } => ConfigureWindowAux::new().x(*x).y(*y),
            Resize { h, w } => ConfigureWindowAux::new().height(*h as u32).width(*w as u32),
            StackingMode(sm) => {
                let new = ConfigureWindowAux::new();
                match sm {
                    Above(sib) => new.stack_mode(XStackMode::ABOVE).sibling(*sib),
                    Below(sib) => new.stack_mode(XStackMode::BELOW).sibling(*sib),
                    TopIf(sib) => new.stack_mode(XStackMode::TOP_IF).sibling(*sib),
                    BottomIf(sib) => new.stack_mode(XStackMode::BOTTOM_IF).sibling(*sib),
                    Opposite(sib) => new.stack_mode(XStackMode::OPPOSITE).sibling(*sib),
                }
            }
        }
    }
}

impl From<&ClientAttrs> for ChangeWindowAttributesAux {
    fn from(from: &ClientAttrs) -> ChangeWindowAttributesAux {
        use ClientAttrs::*;

        let new = ChangeWindowAttributesAux::new();
        match from {
            EnableClientEvents => new.event_mask(enable_client_events!()),
            RootRedirect => new.event_mask(root_redirect_mask!()),
            RootEventMask => new.event_mask(root_event_mask!()),
        }
    }
}

pub(super) fn convert_cws(attrs: &[ClientAttrs]) -> ChangeWindowAttributesAux {
    use ClientAttrs::*;

    let new = ChangeWindowAttributesAux::new();
    attrs.iter().fold(new, |cw, attr| match *attr {
        EnableClientEvents => cw.event_mask(enable_client_events!()),
        RootRedirect => cw.event_mask(root_redirect_mask!()),
        RootEventMask => cw.event_mask(root_event_mask!()),
    })
}
