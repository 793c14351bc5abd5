pub mod amount;
pub mod date;
pub mod quant;
