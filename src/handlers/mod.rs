pub mod balance;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod shared;
pub mod sweep;
