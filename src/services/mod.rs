pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{AdminDashboard, AdminError, AdminService, PlatformStats};
pub use admin_service_impl::SeaOrmAdminService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AccountUpdate, AuthError, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService, ShopDashboard, ShopDetail, ShopSummary};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod order_service;
pub mod order_service_impl;
pub use order_service::{
    CancelOutcome, Cancellation, CartContents, CartLine, OrderDetails, OrderError, OrderService,
};
pub use order_service_impl::SeaOrmOrderService;
