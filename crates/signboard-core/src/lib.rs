pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod io;
pub mod pack;
pub mod paths;
pub mod record;
pub mod refresh;
pub mod render;
pub mod types;

pub use error::{Result, SignError};
