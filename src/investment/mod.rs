pub mod event;
pub mod event_buffer;
pub mod ledger;
pub mod pool;
pub mod release;
pub mod sale;
