//! Terminal output formatting.

use time::macros::format_description;
use time::OffsetDateTime;

use crate::application::session::GroupSession;
use crate::domain::model::{AccountProfile, GroupReminder, GroupSummary, Membership};

fn date(t: OffsetDateTime) -> String {
    t.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| t.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Print groups as a table.
pub fn print_groups(groups: &[GroupSummary]) {
    if groups.is_empty() {
        println!("You are not in any group yet.");
        return;
    }

    println!("{:<26} {:<30} {:>7} {:>9}  {}", "ID", "Name", "Members", "Reminders", "Created");
    println!("{}", "-".repeat(92));

    for g in groups {
        println!(
            "{:<26} {:<30} {:>7} {:>9}  {}",
            g.id(),
            truncate(&g.group.name, 30),
            g.member_count,
            g.reminder_count,
            date(g.group.created_at)
        );
    }
}

/// Print the selected group with its members and reminders.
pub fn print_group_detail(session: &GroupSession) {
    let Some(summary) = session.selected_group() else {
        println!("No group selected.");
        return;
    };

    println!("{} ({})", summary.group.name, summary.id());
    if let Some(desc) = &summary.group.description {
        println!("{}", desc);
    }
    println!();
    print_members(session.members());
    println!();
    print_reminders(session.reminders());
}

pub fn print_members(members: &[Membership]) {
    println!("Members ({})", members.len());
    for m in members {
        println!(
            "  {:<26} {:<8} {:<30} {}",
            m.id,
            m.role,
            truncate(m.display_name(), 30),
            m.email
        );
    }
}

pub fn print_reminders(reminders: &[GroupReminder]) {
    if reminders.is_empty() {
        println!("No reminders.");
        return;
    }

    println!("Reminders ({})", reminders.len());
    for r in reminders {
        println!("  {:<26} {}  {:<7} {}", r.id, r.time, r.repeat, r.title);
        if let Some(why) = &r.why {
            println!("  {:<26} {}", "", why);
        }
    }
}

pub fn print_accounts(accounts: &[AccountProfile]) {
    if accounts.is_empty() {
        println!("No matching accounts.");
        return;
    }

    for a in accounts {
        println!("{:<26} {:<30} {}", a.id, a.email, a.name.as_deref().unwrap_or(""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long group name", 10), "a rathe...");
    }

    #[test]
    fn test_date() {
        let t = time::macros::datetime!(2024-05-01 08:30 UTC);
        assert_eq!(date(t), "2024-05-01 08:30");
    }
}
