//! different utility modules used throughout the project
/// cafe settings from a TOML file
pub mod config;
/// tiny module to save the sampled surface into a file
pub mod logger;
/// terminal and file logging setup
pub mod logging;
/// 3D surface plot of the recipe
pub mod plots;
