//! Collaborators the engine reaches through narrow interfaces: HTTP, databases, and
//! the clock. Callers can swap any of them for their own implementation.

pub mod clock;
pub mod database;
pub mod http;

pub use clock::*;
pub use database::*;
pub use http::*;
