pub mod auth;
pub mod catalog;
pub mod contracts;
pub mod customers;
pub mod dashboard;
pub mod deliveries;
pub mod documents;
pub mod inventory;
pub mod payments;
pub mod tickets;
pub mod users;
pub mod vendors;
