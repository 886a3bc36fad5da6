use rusqlite::Connection;
use student_portal_core::db::open_db_in_memory;
use student_portal_core::{
    DateOfBirth, Principal, RegistryError, RegistryEvent, SqliteStudentRepository,
    StudentProfile, StudentRegistry,
};

fn owner() -> Principal {
    Principal::parse("owner").unwrap()
}

fn deploy(conn: &Connection) -> StudentRegistry<SqliteStudentRepository<'_>> {
    let repo = SqliteStudentRepository::try_new(conn).unwrap();
    StudentRegistry::deploy(repo, owner()).unwrap()
}

fn alice() -> StudentProfile {
    StudentProfile::new(
        "Alice",
        "alice@example.com",
        DateOfBirth::from_u64(946_684_800),
        "LGA1",
        "Country1",
        "State1",
    )
}

fn bob() -> StudentProfile {
    StudentProfile::new(
        "Bob",
        "bob@example.com",
        DateOfBirth::from_u64(946_684_800),
        "LGA2",
        "Country2",
        "State2",
    )
}

fn alice_updated() -> StudentProfile {
    StudentProfile::new(
        "Alice Updated",
        "alice.updated@example.com",
        DateOfBirth::from_u64(978_307_200),
        "LGA1 Updated",
        "Country1 Updated",
        "State1 Updated",
    )
}

#[test]
fn deploy_sets_owner_and_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);

    assert_eq!(registry.owner(), &owner());
    assert_eq!(registry.get_student_count().unwrap(), 0);
    assert!(registry.get_all_students().unwrap().is_empty());
    assert!(registry.events().unwrap().is_empty());
}

#[test]
fn deploying_twice_on_one_store_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let _registry = deploy(&conn);

    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let err = StudentRegistry::deploy(repo, Principal::parse("someone_else").unwrap())
        .err()
        .expect("second deploy must fail");
    assert!(matches!(err, RegistryError::AlreadyDeployed { owner: existing } if existing == owner()));
}

#[test]
fn attach_requires_prior_deploy() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let err = StudentRegistry::attach(repo).err().expect("attach must fail");
    assert!(matches!(err, RegistryError::NotDeployed));
}

#[test]
fn register_returns_sequential_ids_and_emits_event() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);

    assert_eq!(registry.register_student(&owner(), bob()).unwrap(), 1);
    assert_eq!(registry.get_student_count().unwrap(), 1);

    let events = registry.events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].seq, 1);
    assert_eq!(events[0].event, RegistryEvent::StudentRegistered(1));
}

#[test]
fn kth_registration_gets_id_k() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);

    for k in 1..=100u64 {
        let profile = StudentProfile::new(
            format!("Student{k}"),
            format!("student{k}@example.com"),
            DateOfBirth::from_u64(946_684_800),
            "LGA",
            "Country",
            "State",
        );
        assert_eq!(registry.register_student(&owner(), profile).unwrap(), k);
    }
    assert_eq!(registry.get_student_count().unwrap(), 100);
}

#[test]
fn get_student_returns_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();

    let student = registry.get_student(1).unwrap();
    assert_eq!(student.id, 1);
    assert_eq!(student.name, "Alice");
    assert_eq!(student.email, "alice@example.com");
    assert_eq!(student.date_of_birth, DateOfBirth::from_u64(946_684_800));
    assert_eq!(student.local_government_area, "LGA1");
    assert_eq!(student.country, "Country1");
    assert_eq!(student.state, "State1");
    assert!(!student.is_deleted);
}

#[test]
fn get_student_rejects_out_of_range_ids() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();

    assert!(matches!(registry.get_student(0), Err(RegistryError::InvalidId(0))));
    assert!(matches!(registry.get_student(2), Err(RegistryError::InvalidId(2))));
    assert!(matches!(
        registry.get_student(u64::MAX),
        Err(RegistryError::InvalidId(u64::MAX))
    ));
}

#[test]
fn get_all_students_returns_slots_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();
    registry.register_student(&owner(), bob()).unwrap();

    let students = registry.get_all_students().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].name, "Alice");
    assert_eq!(students[1].name, "Bob");
    for student in &students {
        assert_eq!(&registry.get_student(student.id).unwrap(), student);
    }
}

#[test]
fn update_overwrites_fields_and_emits_event() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();

    registry
        .update_student(&owner(), 1, alice_updated())
        .unwrap();

    let student = registry.get_student(1).unwrap();
    assert_eq!(student.profile(), alice_updated());
    assert_eq!(
        registry.events().unwrap().last().map(|recorded| recorded.event),
        Some(RegistryEvent::StudentUpdated(1))
    );
}

#[test]
fn update_rejects_unallocated_id() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();

    let err = registry
        .update_student(&owner(), 2, alice_updated())
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidId(2)));
    assert_eq!(err.to_string(), "Invalid student ID");
    assert_eq!(registry.get_student_count().unwrap(), 1);
}

#[test]
fn delete_hides_student_but_keeps_cleared_slot() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();

    registry.delete_student(&owner(), 1).unwrap();

    let err = registry.get_student(1).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(1)));
    assert_eq!(err.to_string(), "Student not found");

    let slots = registry.get_all_students().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, 1);
    assert!(slots[0].is_deleted);
    assert_eq!(slots[0].profile(), StudentProfile::default());
    assert_eq!(
        registry.events().unwrap().last().map(|recorded| recorded.event),
        Some(RegistryEvent::StudentDeleted(1))
    );
}

#[test]
fn delete_is_not_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();

    registry.delete_student(&owner(), 1).unwrap();
    let err = registry.delete_student(&owner(), 1).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyDeleted(1)));
    assert_eq!(err.to_string(), "Student already deleted");

    // The failed call must not append a notification.
    assert_eq!(registry.events().unwrap().len(), 2);
}

#[test]
fn delete_rejects_unallocated_id() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);

    assert!(matches!(
        registry.delete_student(&owner(), 1),
        Err(RegistryError::InvalidId(1))
    ));
    assert!(matches!(
        registry.delete_student(&owner(), 0),
        Err(RegistryError::InvalidId(0))
    ));
}

#[test]
fn deleting_all_students_keeps_count() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();
    registry.register_student(&owner(), bob()).unwrap();

    registry.delete_student(&owner(), 1).unwrap();
    registry.delete_student(&owner(), 2).unwrap();

    assert_eq!(registry.get_student_count().unwrap(), 2);
    let students = registry.get_all_students().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].name, "");
    assert_eq!(students[1].name, "");
}

#[test]
fn update_restores_deleted_student() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    registry.register_student(&owner(), alice()).unwrap();
    registry.delete_student(&owner(), 1).unwrap();

    let restored = StudentProfile::new(
        "Alice Restored",
        "alice.restored@example.com",
        DateOfBirth::from_u64(978_307_200),
        "LGA1 Restored",
        "Country1 Restored",
        "State1 Restored",
    );
    registry
        .update_student(&owner(), 1, restored.clone())
        .unwrap();

    let student = registry.get_student(1).unwrap();
    assert!(!student.is_deleted);
    assert_eq!(student.profile(), restored);
    assert_eq!(registry.get_all_students().unwrap()[0], student);

    // Active again, so a fresh delete succeeds.
    registry.delete_student(&owner(), 1).unwrap();
}

#[test]
fn large_date_of_birth_round_trips_exactly() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);
    let far_future: DateOfBirth =
        "57896044618658097711785492504343953926634992332820282019728792003956564819967"
            .parse()
            .unwrap();

    let profile = StudentProfile {
        date_of_birth: far_future,
        ..StudentProfile::new(
            "Future Student",
            "future@example.com",
            DateOfBirth::from_u64(0),
            "LGA",
            "Country",
            "State",
        )
    };
    registry.register_student(&owner(), profile).unwrap();

    let student = registry.get_student(1).unwrap();
    assert_eq!(student.date_of_birth, far_future);
    assert_eq!(
        student.date_of_birth.to_string(),
        "57896044618658097711785492504343953926634992332820282019728792003956564819967"
    );

    registry
        .update_student(
            &owner(),
            1,
            StudentProfile {
                date_of_birth: DateOfBirth::MAX,
                ..student.profile()
            },
        )
        .unwrap();
    assert_eq!(registry.get_student(1).unwrap().date_of_birth, DateOfBirth::MAX);
}

#[test]
fn empty_fields_are_accepted() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);

    let id = registry
        .register_student(&owner(), StudentProfile::default())
        .unwrap();
    let student = registry.get_student(id).unwrap();
    assert_eq!(student.profile(), StudentProfile::default());
    assert!(!student.is_deleted);
}

#[test]
fn alice_and_bob_lifecycle_scenario() {
    let conn = open_db_in_memory().unwrap();
    let registry = deploy(&conn);

    assert_eq!(registry.register_student(&owner(), alice()).unwrap(), 1);
    assert_eq!(registry.get_student_count().unwrap(), 1);
    assert_eq!(registry.register_student(&owner(), bob()).unwrap(), 2);
    assert_eq!(registry.get_student_count().unwrap(), 2);

    registry.delete_student(&owner(), 1).unwrap();
    assert!(matches!(registry.get_student(1), Err(RegistryError::NotFound(1))));
    assert_eq!(registry.get_all_students().unwrap()[0].name, "");
    assert_eq!(registry.get_student_count().unwrap(), 2);

    registry
        .update_student(&owner(), 1, alice_updated())
        .unwrap();
    assert_eq!(registry.get_student(1).unwrap().profile(), alice_updated());

    registry.delete_student(&owner(), 1).unwrap();
    assert!(matches!(
        registry.delete_student(&owner(), 1),
        Err(RegistryError::AlreadyDeleted(1))
    ));
    assert!(matches!(registry.get_student(3), Err(RegistryError::InvalidId(3))));

    let emitted: Vec<_> = registry
        .events()
        .unwrap()
        .into_iter()
        .map(|recorded| recorded.event)
        .collect();
    assert_eq!(
        emitted,
        vec![
            RegistryEvent::StudentRegistered(1),
            RegistryEvent::StudentRegistered(2),
            RegistryEvent::StudentDeleted(1),
            RegistryEvent::StudentUpdated(1),
            RegistryEvent::StudentDeleted(1),
        ]
    );
}
