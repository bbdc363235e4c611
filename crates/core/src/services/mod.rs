pub mod cart_store;
pub mod catalog_service;
pub mod checkout_service;
pub mod notifier;
pub mod shipping_store;
