pub mod error;
pub mod protocol;
pub mod table_state;
