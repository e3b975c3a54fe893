pub mod agent;
pub mod holiday;
pub mod inventory;
pub mod ticket;
