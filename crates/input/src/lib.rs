//! Pointer input mapped to camera actions, and the damped orbit controls
//! that consume them.
//!
//! # Invariants
//! - Controls never read raw window events; hosts translate them into
//!   [`PointerAction`]s through a [`PointerTracker`].
//! - Input only accumulates deltas. The camera moves in
//!   [`OrbitControls::update`], once per frame.

pub mod action;
pub mod orbit;
pub mod pointer;

pub use action::PointerAction;
pub use orbit::{OrbitControls, OrbitSettings};
pub use pointer::{PointerButton, PointerTracker};

pub fn crate_info() -> &'static str {
    concat!("moonfield-input v", env!("CARGO_PKG_VERSION"))
}
