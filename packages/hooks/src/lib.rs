//! Hook sugar built on top of `weave_core::Scope::use_hook`.
//!
//! `weave-core` only provides the foundational hook-slot primitive plus the
//! two cells it backs ([`weave_core::StateCell`], [`weave_core::ResourceCell`]);
//! this crate is the thin, ergonomic layer a component author actually calls.

mod use_derive;
mod use_effect;
mod use_resource;
mod use_state;

pub use use_derive::{use_derive, use_derive_from};
pub use use_effect::use_effect;
pub use use_resource::{use_resource, UseResource};
pub use use_state::{use_state, UseState};
