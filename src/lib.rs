pub mod analysis;
pub mod charts;
pub mod commands;
pub mod config;
pub mod formats;
pub mod model;
pub mod reports;
pub mod timing;
pub mod util;
