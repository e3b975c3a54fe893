pub mod holiday;
pub mod inventory;
pub mod ticket;
