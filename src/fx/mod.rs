pub mod rate_interval;
pub mod rate_table;
