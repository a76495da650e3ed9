pub mod attendance;
pub mod employee;
pub mod inventory;
pub mod leave_request;
pub mod role;
pub mod user;
