pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod review;
pub mod scanner;
pub mod store;
pub mod submission;
