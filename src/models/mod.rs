pub mod complaint;
pub mod config;
pub mod reset;
