pub mod application;
pub mod driver;
pub mod order;
pub mod user;
