pub mod container;
pub mod controller;
pub mod data_stream;
pub mod error;
pub mod router;

pub use container::{Container, ContainerConfig};
pub use error::{ApiError, FORBIDDEN_MESSAGE};
pub use router::build_router;
