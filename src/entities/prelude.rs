pub use super::foods::Entity as Foods;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::shops::Entity as Shops;
pub use super::users::Entity as Users;
