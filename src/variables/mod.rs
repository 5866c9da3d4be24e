pub mod store;
pub mod substitution;
pub mod value;

pub use store::*;
pub use substitution::*;
pub use value::*;
