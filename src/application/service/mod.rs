mod group_service;
mod membership_ops;
mod reminder_ops;


pub use group_service::{CommitReport, GroupService, SEARCH_LIMIT};
