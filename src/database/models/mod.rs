mod macros;

pub mod balance;
pub mod employee;
pub mod holiday;
pub mod leave;

pub use balance::{LeaveBalance, RolloverValues};
pub use employee::{Employee, EmployeeInput};
pub use holiday::{Holiday, HolidayInput};
pub use leave::{
    LeaveConflict, LeaveRequest, LeaveRequestEvent, LeaveRequestInput, LeaveStatus, LeaveType,
};
