pub mod creation;
pub mod eventbus;
pub mod prompt;
pub mod service;
pub mod session;
pub mod staging;
