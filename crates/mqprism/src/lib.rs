//! Top-level facade crate for mqPrism.
//!
//! Re-exports the core and bus libraries so users can depend on a single crate.

pub mod core {
    pub use mqprism_core::*;
}

pub mod bus {
    pub use mqprism_bus::*;
}
