pub mod deserialize;
pub mod error;
pub mod helpers;
pub mod parser;
pub mod placeholders;
pub mod report;
pub mod result_check;
pub mod runner;
pub mod types;
