//! different utility modules used throughout the project
/// logger setup: terminal and optional log file
pub mod logger;
/// iteration tables: rendering with tabled, csv export, capping and downsampling
pub mod tables;
/// solver settings read from TOML
pub mod config;
