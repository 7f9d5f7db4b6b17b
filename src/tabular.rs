//! reading the measurements file and deriving new columns
pub mod frame;
pub mod values_csv;
