pub mod exercise;
pub mod report;
pub mod user;
