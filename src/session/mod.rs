//! Connected sessions and the roles they hold

pub mod registry;

pub use registry::SessionRegistry;
