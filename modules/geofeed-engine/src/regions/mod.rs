pub mod aggregate;
pub mod spatial;
