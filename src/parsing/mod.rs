pub mod filesystem;
pub mod sales_schema;
pub mod tables;
