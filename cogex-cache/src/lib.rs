pub mod cache;

pub use cache::{Atom, ContentRef};
