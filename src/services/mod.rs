pub mod api;
pub mod dashboard;
pub mod navigation;
pub mod notify;
pub mod projection;
pub mod reset;
pub mod token;
