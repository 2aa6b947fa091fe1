pub mod attendance;
pub mod process;
pub mod report;
