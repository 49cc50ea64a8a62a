pub mod employee_cache;
pub mod policy_cache;
