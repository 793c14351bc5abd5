pub mod basis_reporter;
pub mod rate_reporter;
pub mod table;
