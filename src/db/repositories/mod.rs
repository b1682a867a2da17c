pub mod cascade;
pub mod food;
pub mod order;
pub mod shop;
pub mod user;
