mod config;

pub use config::{Backend, Completion, Config};
