pub mod daily;
pub mod events;
pub mod formatting;
pub mod rolling;
pub mod summary;
