pub mod attendance;
pub mod clock;
pub mod employee;
pub mod role;
