pub mod resident_handler;

pub use resident_handler::{__path_resolve_resident, resolve_resident};
