pub mod catalog;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod patterns;
pub mod render;
pub mod report;
pub mod solver;
pub mod types;

pub use error::{Error, Result};
pub use optimizer::{optimize, solve};
