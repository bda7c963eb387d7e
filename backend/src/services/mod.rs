//! Business logic services for the Store Management Platform

pub mod auth;
pub mod brand;
pub mod category;
pub mod customer;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod role;
pub mod seed;
pub mod stock;
pub mod supplier;
pub mod user;

pub use auth::AuthService;
pub use brand::BrandService;
pub use category::CategoryService;
pub use customer::CustomerService;
pub use dashboard::DashboardService;
pub use order::OrderService;
pub use product::ProductService;
pub use role::RoleService;
pub use stock::StockService;
pub use supplier::SupplierService;
pub use user::UserService;
