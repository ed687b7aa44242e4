use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::application::eventbus::SharedEventBus;
use crate::domain::event::DomainEvent;

/// Start listening to the event bus and print events for the user.
///
/// Status lines and alerts go to stderr. The task ends once every sender is
/// dropped and yields the number of alerts it showed.
pub fn start_event_forwarder(event_bus: SharedEventBus) -> JoinHandle<usize> {
    let mut receiver = event_bus.subscribe();

    tokio::spawn(async move {
        let mut alerts = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if matches!(event, DomainEvent::Alert { .. }) {
                        alerts += 1;
                    }
                    forward_event(&event);
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Event forwarder lagged by {} events", n);
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Event bus closed, stopping forwarder");
                    break;
                }
            }
        }
        alerts
    })
}

fn forward_event(event: &DomainEvent) {
    tracing::debug!(event = event.event_name(), group = ?event.group_id(), "Domain event");

    if let Some(line) = render(event) {
        eprintln!("{}", line);
    }
}

/// User-facing line for an event. Refresh and selection events are silent.
fn render(event: &DomainEvent) -> Option<String> {
    match event {
        DomainEvent::Alert { title, message } => Some(format!("{}: {}", title, message)),
        DomainEvent::GroupCreated { group_id, name } => {
            Some(format!("Created group '{}' ({})", name, group_id))
        }
        DomainEvent::MembersCommitted { added, failed, .. } => Some(if *failed == 0 {
            format!("Added {} member(s)", added)
        } else {
            format!("Added {} member(s), {} could not be added", added, failed)
        }),
        DomainEvent::MemberAdded { email, .. } => Some(format!("Added {}", email)),
        DomainEvent::MemberRemoved { .. } => Some("Member removed".to_string()),
        DomainEvent::GroupLeft { group_id } => Some(format!("Left group {}", group_id)),
        DomainEvent::ReminderCreated { reminder_id, .. } => {
            Some(format!("Created reminder {}", reminder_id))
        }
        DomainEvent::ReminderDeleted { .. } => Some("Reminder deleted".to_string()),
        DomainEvent::GroupsRefreshed { .. }
        | DomainEvent::GroupSelected { .. }
        | DomainEvent::DetailRefreshed { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::eventbus::create_event_bus;
    use crate::domain::model::GroupId;

    #[test]
    fn test_render() {
        let alert = DomainEvent::Alert {
            title: "Error".to_string(),
            message: "Failed".to_string(),
        };
        assert_eq!(render(&alert).as_deref(), Some("Error: Failed"));

        let committed = DomainEvent::MembersCommitted {
            group_id: GroupId::from("g1"),
            added: 2,
            failed: 1,
        };
        assert_eq!(
            render(&committed).as_deref(),
            Some("Added 2 member(s), 1 could not be added")
        );

        assert!(render(&DomainEvent::GroupsRefreshed { count: 3 }).is_none());
    }

    #[tokio::test]
    async fn test_forwarder_counts_alerts_and_stops_when_bus_drops() {
        let bus = create_event_bus();
        let handle = start_event_forwarder(bus.clone());

        bus.alert("Error", "first");
        bus.publish(DomainEvent::GroupsRefreshed { count: 0 });
        bus.alert("Error", "second");
        drop(bus);

        assert_eq!(handle.await.unwrap(), 2);
    }
}
