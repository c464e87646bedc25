//! Integration tests for user account creation.

mod test_utils;

use estates::error::RepositoryError;
use estates::models::User;
use estates::password::is_usable_password;
use estates::repositories::{ExtraFields, NewUser, UserRepository};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, PaginatorTrait, Set};
use test_utils::{create_test_property, create_test_user, setup_test_db};

#[tokio::test]
async fn create_user_normalizes_email_and_defaults_flags() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);

    let user = repo
        .create_user(NewUser::new("alice", "A", "B", "ALICE@Example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    assert!(user.is_active);
    assert_ne!(user.password, "pw");
    assert!(user.password.starts_with("$argon2"));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn empty_username_fails_and_persists_nothing() {
    let db = setup_test_db().await.unwrap();

    let err = UserRepository::new(&db)
        .create_user(NewUser::new("", "A", "B", "a@example.com", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Validation { field: "username", .. }));
    assert_eq!(User::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_or_missing_email_fails() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);

    let err = repo
        .create_user(NewUser::new("alice", "A", "B", "not-an-email", "pw"))
        .await
        .unwrap_err();
    match err {
        RepositoryError::Validation { field, message } => {
            assert_eq!(field, "email");
            assert_eq!(message, "You must provide a valid email address");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = repo
        .create_user(NewUser::new("alice", "A", "B", "   ", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { field: "email", .. }));

    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_username_or_email_is_a_uniqueness_error() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);

    repo.create_user(NewUser::new("alice", "A", "B", "alice@example.com", "pw"))
        .await
        .unwrap();

    let err = repo
        .create_user(NewUser::new("alice", "A", "B", "other@example.com", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Uniqueness { field: "username" }));

    let err = repo
        .create_user(NewUser::new("alice2", "A", "B", "Alice@EXAMPLE.com", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Uniqueness { field: "email" }));

    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn extra_fields_override_defaults() {
    let db = setup_test_db().await.unwrap();

    let user = UserRepository::new(&db)
        .create_user(
            NewUser::new("staffer", "S", "T", "staff@example.com", "pw").with_extra(ExtraFields {
                is_staff: Some(true),
                is_active: Some(false),
                ..ExtraFields::default()
            }),
        )
        .await
        .unwrap();

    assert!(user.is_staff);
    assert!(!user.is_superuser);
    assert!(!user.is_active);
}

#[tokio::test]
async fn missing_password_stores_unusable_hash() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);

    let request = NewUser {
        password: None,
        ..NewUser::new("nopass", "N", "P", "nopass@example.com", "")
    };
    let user = repo.create_user(request).await.unwrap();

    assert!(!is_usable_password(&user.password));
    assert!(repo.authenticate("nopass@example.com", "").await.unwrap().is_none());
}

#[tokio::test]
async fn authenticate_checks_hash_and_active_flag() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);
    let user = create_test_user(&db, "bob").await.unwrap();

    let found = repo
        .authenticate("BOB@example.com", "correct horse battery staple")
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    assert!(
        repo.authenticate("bob@example.com", "wrong")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.authenticate("nobody@example.com", "whatever")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn find_by_email_and_username() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);
    let user = create_test_user(&db, "carol").await.unwrap();

    let by_email = repo.find_by_email(" Carol@Example.com ").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.full_name(), "Test User");

    let by_username = repo.find_by_username("carol").await.unwrap().unwrap();
    assert_eq!(by_username.id, user.id);

    assert!(repo.find_by_username("dave").await.unwrap().is_none());
    assert_eq!(repo.get_by_id(user.id).await.unwrap().map(|u| u.id), Some(user.id));
}

#[tokio::test]
async fn create_superuser_forces_flags() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);

    let admin = repo
        .create_superuser(NewUser::new("root", "Root", "Admin", "root@example.com", "s3cret"))
        .await
        .unwrap();

    assert!(admin.is_staff);
    assert!(admin.is_superuser);
    assert!(admin.is_active);
}

#[tokio::test]
async fn create_superuser_rejects_contradicting_flags_and_missing_password() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);

    let err = repo
        .create_superuser(
            NewUser::new("root", "Root", "Admin", "root@example.com", "pw").with_extra(
                ExtraFields {
                    is_staff: Some(false),
                    ..ExtraFields::default()
                },
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { field: "is_staff", .. }));

    let err = repo
        .create_superuser(
            NewUser::new("root", "Root", "Admin", "root@example.com", "pw").with_extra(
                ExtraFields {
                    is_superuser: Some(false),
                    ..ExtraFields::default()
                },
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Validation { field: "is_superuser", .. }
    ));

    let err = repo
        .create_superuser(NewUser::new("root", "Root", "Admin", "root@example.com", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { field: "password", .. }));

    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn users_owning_listings_cannot_be_deleted() {
    let db = setup_test_db().await.unwrap();
    let repo = UserRepository::new(&db);
    let owner = create_test_user(&db, "owner").await.unwrap();
    create_test_property(&db, &owner, "Owned flat", false)
        .await
        .unwrap();

    let err = repo.delete(owner.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::InUse(_)));

    // The store itself refuses too.
    assert!(User::delete_by_id(owner.id).exec(&db).await.is_err());
    assert!(repo.get_by_id(owner.id).await.unwrap().is_some());

    let free = create_test_user(&db, "free").await.unwrap();
    repo.delete(free.id).await.unwrap();
    assert!(repo.get_by_id(free.id).await.unwrap().is_none());
}

#[tokio::test]
async fn store_unique_violation_reports_the_indexed_field() {
    let db = setup_test_db().await.unwrap();
    let existing = create_test_user(&db, "username").await.unwrap();

    let mut duplicate = existing.clone().into_active_model();
    duplicate.id = Set(uuid::Uuid::new_v4());
    duplicate.username = Set("someone-else".to_string());
    let db_err = duplicate.insert(&db).await.unwrap_err();

    let err = RepositoryError::from(db_err);
    assert!(matches!(err, RepositoryError::Uniqueness { field: "email" }));
}
