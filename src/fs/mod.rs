pub mod store;

pub use store::{FileStore, LocalStore};
