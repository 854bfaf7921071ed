//! expirekit: timestamp-ordered expiry tracking primitives.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod ds;
pub mod error;
pub mod prelude;
pub mod tracker;
