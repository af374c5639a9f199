pub mod errors;
pub mod money;
pub mod ports;
pub mod records;
pub mod sale;
pub mod shift;
pub mod vehicle;
