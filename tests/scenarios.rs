//! End-to-end group flows against the local backends.

use std::sync::Arc;

use remindly::application::eventbus::create_event_bus;
use remindly::application::prompt::FixedAnswer;
use remindly::application::service::GroupService;
use remindly::domain::error::DomainError;
use remindly::domain::model::{AccountProfile, GroupId, ReminderDraft, Repeat, Role};
use remindly::domain::repository::{
    AccountDirectory, GroupRepository, GroupStore, MembershipRepository, ProfileRegistry,
};
use remindly::infrastructure::persistence::memory::MemoryStore;
use remindly::infrastructure::persistence::sqlite::SqliteStore;

fn me() -> AccountProfile {
    AccountProfile::new("me", "me@x.com", Some("Me"))
}

async fn service<S>(store: Arc<S>) -> GroupService<S>
where
    S: GroupStore + AccountDirectory + ProfileRegistry + 'static,
{
    for (id, email, name) in [
        ("a", "a@x.com", Some("Ann")),
        ("b", "b@x.com", Some("Bo")),
        ("c", "c@x.com", None),
    ] {
        store
            .save_profile(&AccountProfile::new(id, email, name))
            .await
            .unwrap();
    }
    store.save_profile(&me()).await.unwrap();

    let directory: Arc<dyn AccountDirectory> = store.clone();
    GroupService::new(
        store,
        directory,
        Arc::new(FixedAnswer(true)),
        create_event_bus(),
        me(),
    )
}

async fn create<S: GroupStore + ?Sized>(service: &mut GroupService<S>, name: &str) -> GroupId {
    service.start_group_creation();
    service.set_group_details(name, "").unwrap();
    service.create_group().await.unwrap().unwrap()
}

async fn family_fitness<S: GroupStore + ?Sized>(mut service: GroupService<S>) {
    let group_id = create(&mut service, "Family Fitness").await;
    service.skip_members().await.unwrap();
    assert_eq!(service.session().group(&group_id).unwrap().member_count, 1);

    let candidate = service.search_accounts("a@x.com").await.unwrap().remove(0);
    service.choose_member(Some(candidate));
    assert!(service.add_member().await.unwrap());
    service.refresh_groups().await;

    assert_eq!(service.session().group(&group_id).unwrap().member_count, 2);
}

async fn study_group<S: GroupStore + ?Sized>(mut service: GroupService<S>) {
    let group_id = create(&mut service, "Study Group").await;
    for term in ["Bo", "Ann"] {
        let candidate = service.search_accounts(term).await.unwrap().remove(0);
        service.stage_member(candidate).unwrap();
    }

    let report = service.commit_members().await.unwrap();
    assert_eq!(report.added.len(), 2);

    let members = service.session().members();
    assert_eq!(members.len(), 3);
    let roles: Vec<(&str, Role)> = members
        .iter()
        .map(|m| (m.user_id.as_str(), m.role))
        .collect();
    assert_eq!(
        roles,
        vec![("me", Role::Admin), ("b", Role::Member), ("a", Role::Member)]
    );
    assert_eq!(service.session().group(&group_id).unwrap().member_count, 3);
}

async fn daily_reminders<S: GroupStore + ?Sized>(mut service: GroupService<S>) {
    let group_id = create(&mut service, "Mornings").await;
    service.skip_members().await.unwrap();

    for (title, at) in [("Evening walk", "18:00"), ("Stretch", "09:00")] {
        *service.reminder_form_mut() =
            ReminderDraft::new(title, at.parse().unwrap(), Repeat::Daily).with_why("Health");
        service.create_reminder().await.unwrap().unwrap();
    }

    let reminders = service.session().reminders();
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].title, "Stretch");
    assert_eq!(reminders[0].time.to_string(), "09:00");
    assert_eq!(reminders[0].why.as_deref(), Some("Health"));

    // Deleting twice: the second delete finds nothing and the list stays consistent
    let id = reminders[1].id.clone();
    assert!(service.delete_reminder(&id).await.unwrap());
    assert!(service.delete_reminder(&id).await.unwrap());
    assert_eq!(service.session().reminders().len(), 1);

    service.refresh_groups().await;
    assert_eq!(service.session().group(&group_id).unwrap().reminder_count, 1);
}

async fn sole_member_leaves<S: GroupStore + ?Sized>(mut service: GroupService<S>, store: &S) {
    let group_id = create(&mut service, "Temporary").await;
    service.skip_members().await.unwrap();

    assert!(service.leave_group(&group_id).await.unwrap());
    assert!(service.session().groups().is_empty());
    let left = store
        .memberships_for_groups(std::slice::from_ref(&group_id))
        .await
        .unwrap();
    assert!(left.is_empty());
}

async fn add_to_vanished_group<S: GroupStore + ?Sized>(mut service: GroupService<S>, store: &S) {
    let group_id = create(&mut service, "Gone Soon").await;
    service.skip_members().await.unwrap();
    store.delete_group(&group_id).await.unwrap();

    let candidate = service.search_accounts("a@x.com").await.unwrap().remove(0);
    service.choose_member(Some(candidate));
    let err = service.add_member().await.unwrap_err();

    assert!(!matches!(err, DomainError::AlreadyMember(_)), "got {:?}", err);
    assert!(!err.user_message().contains("already a member"));
    assert!(service.session().member_selection().is_some());
}

#[tokio::test]
async fn test_memory_family_fitness() {
    family_fitness(service(Arc::new(MemoryStore::new())).await).await;
}

#[tokio::test]
async fn test_memory_study_group() {
    study_group(service(Arc::new(MemoryStore::new())).await).await;
}

#[tokio::test]
async fn test_memory_daily_reminders() {
    daily_reminders(service(Arc::new(MemoryStore::new())).await).await;
}

#[tokio::test]
async fn test_memory_sole_member_leaves() {
    let store = Arc::new(MemoryStore::new());
    sole_member_leaves(service(store.clone()).await, store.as_ref()).await;
}

#[tokio::test]
async fn test_sqlite_family_fitness() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    family_fitness(service(store).await).await;
}

#[tokio::test]
async fn test_sqlite_study_group() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    study_group(service(store).await).await;
}

#[tokio::test]
async fn test_sqlite_daily_reminders() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    daily_reminders(service(store).await).await;
}

#[tokio::test]
async fn test_sqlite_sole_member_leaves() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    sole_member_leaves(service(store.clone()).await, store.as_ref()).await;
}

#[tokio::test]
async fn test_memory_add_to_vanished_group() {
    let store = Arc::new(MemoryStore::new());
    add_to_vanished_group(service(store.clone()).await, store.as_ref()).await;
}

#[tokio::test]
async fn test_sqlite_add_to_vanished_group() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    add_to_vanished_group(service(store.clone()).await, store.as_ref()).await;
}
