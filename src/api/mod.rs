pub mod attendance;
pub mod correction;
pub mod notification;
pub mod policy;
pub mod shift;
