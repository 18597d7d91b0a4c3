//! Auth tokens, the provider contract, and header attachment.

pub mod attach;
pub mod cached;
pub mod provider;
pub mod token;

pub use attach::*;
pub use cached::*;
pub use provider::*;
pub use token::*;
