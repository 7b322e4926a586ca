// Integration tests for dirmirror
// Grouped by concern; shared fixtures live in common.rs

mod fault_tests;
mod log_file_tests;
mod scheduler_tests;
