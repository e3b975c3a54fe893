pub mod employee;
pub mod holiday;
pub mod inventory;
pub mod role;
pub mod ticket;
pub mod user;
