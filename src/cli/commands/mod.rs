pub mod common_names;
pub mod config;
pub mod map;
