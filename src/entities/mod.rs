pub mod prelude;

pub mod foods;
pub mod order_items;
pub mod orders;
pub mod shops;
pub mod users;

pub use orders::OrderStatus;
pub use users::Role;
