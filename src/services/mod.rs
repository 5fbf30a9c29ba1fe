pub mod media;
pub mod mutations;
pub mod views;
