#![forbid(unsafe_code)]

pub mod catalog;
pub mod csv;
pub mod error;
pub mod export;
pub mod model;
pub mod search;
pub mod summary;
pub mod time;
pub mod tree;

pub use catalog::QuizCatalog;
pub use error::Error;
pub use time::Clock;
