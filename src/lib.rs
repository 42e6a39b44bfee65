pub mod config;
pub mod dates;
pub mod fetch;
pub mod known;
pub mod model;
pub mod names;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod similar;
