//! Top-level facade crate for obsapp.
//!
//! Re-exports the core models and the server library so users can depend on a single crate.

pub mod core {
    pub use obsapp_core::*;
}

pub mod server {
    pub use obsapp_server::*;
}
