pub mod employee;
pub mod holiday;
pub mod leave_balance;
pub mod leave_request;

pub use employee::EmployeeRepository;
pub use holiday::HolidayRepository;
pub use leave_balance::LeaveBalanceRepository;
pub use leave_request::LeaveRequestRepository;
