pub mod agent;
pub mod behavior;
pub mod color;
pub mod config;
pub mod consciousness;
pub mod environment;
pub mod error;
pub mod evolution;
pub mod resource;
pub mod sim;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod vector;
pub mod world;
