pub mod cli;
pub mod error;
pub mod events;
pub mod state;
