pub mod anomaly;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod entity;
pub mod graph;
pub mod model;
pub mod patterns;
pub mod units;
