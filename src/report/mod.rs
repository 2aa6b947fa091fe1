pub mod cell;
pub mod store;
pub mod tables;
pub mod workbook;
