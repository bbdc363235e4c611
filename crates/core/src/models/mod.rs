pub mod cart;
pub mod order;
pub mod product;
pub mod settings;
pub mod shipping;
