//! This module contains the core types used within the window manager.
//! It contains high-level types used directly to track and manage
//! clients.

/// Types used to represent individual managed windows.
pub mod client;
/// The registry of managed clients.
pub mod registry;
/// Types for representing the output we are managing.
pub mod screen;
/// Basic types used throughout the crate.
pub mod types;

pub use client::{Client, SizeConstraints};
pub use registry::ClientSet;
pub use screen::Screen;
