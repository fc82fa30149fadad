pub mod charts;
pub mod data;
pub mod page;
pub mod palette;
