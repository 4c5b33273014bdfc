pub mod admin;
pub mod api;
pub mod catalog;
pub mod player;

pub use admin::*;
pub use api::*;
pub use catalog::*;
pub use player::*;
