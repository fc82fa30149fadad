pub mod aggregate;
pub mod dataset;
