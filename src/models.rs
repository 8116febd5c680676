pub mod auth;
pub mod catalog;
pub mod contract;
pub mod customer;
pub mod dashboard;
pub mod delivery;
pub mod inventory;
pub mod party;
pub mod payment;
pub mod ticket;
pub mod vendor;
