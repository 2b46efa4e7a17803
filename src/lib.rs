#![forbid(unsafe_code)]

pub mod assemble;
pub mod cli;
pub mod defaults;
pub mod formats;
pub mod generate;
pub mod hierarchy;
pub mod logging;
pub mod ownership;
pub mod page_id;
pub mod page_table;
pub mod render;
pub mod report;
pub mod resources;
pub mod text;
