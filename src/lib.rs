pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loadings;
pub mod output;
pub mod parser;
pub mod stats;
