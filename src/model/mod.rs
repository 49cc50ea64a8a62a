pub mod attendance;
pub mod correction;
pub mod employee;
pub mod notification;
pub mod role;
pub mod settings;
pub mod shift;
pub mod user;
