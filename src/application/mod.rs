// Application layer - use cases and orchestration over the repository.

pub mod error;
pub mod reporting;
pub mod seed;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use seed::*;
pub use service::*;
