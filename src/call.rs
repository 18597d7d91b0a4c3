//! Per-call request model: logical API ids, header sets, descriptors, and results.

pub mod api;
pub mod descriptor;
pub mod headers;
pub mod result;

pub use api::*;
pub use descriptor::*;
pub use headers::*;
pub use result::*;
