mod group;
mod ids;
mod membership;
mod reminder;

pub use group::{non_empty, Group, GroupSummary, NewGroup};
pub use ids::{AccountId, GroupId, MembershipId, ReminderId};
pub use membership::{AccountProfile, Membership, NewMembership, Role};
pub use reminder::{GroupReminder, NewGroupReminder, ReminderDraft, Repeat, TimeOfDay};
