//! Integration tests for enquiries.

mod test_utils;

use std::time::Duration;

use estates::error::RepositoryError;
use estates::repositories::{EnquiryRepository, NewEnquiry};
use test_utils::setup_test_db;

fn enquiry(name: &str, message: &str) -> NewEnquiry {
    NewEnquiry {
        name: name.to_string(),
        phone_number: "+7 495 000-00-00".to_string(),
        subject: "Viewing".to_string(),
        message: message.to_string(),
        ..NewEnquiry::default()
    }
}

#[tokio::test]
async fn admin_listing_projects_fields_newest_first() {
    let db = setup_test_db().await.unwrap();
    let repo = EnquiryRepository::new(&db);

    repo.create(NewEnquiry {
        number: Some("AB12CD34EF".to_string()),
        email: Some("Buyer@Example.com".to_string()),
        ..enquiry("Ivan", "Is the flat still available?")
    })
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    repo.create(enquiry("Olga", "Can I visit on Saturday?"))
        .await
        .unwrap();

    let listing = repo.list_admin().await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].name, "Olga");
    assert_eq!(listing[0].number, None);
    assert_eq!(listing[1].name, "Ivan");
    assert_eq!(listing[1].number.as_deref(), Some("AB12CD34EF"));
    assert_eq!(listing[1].phone_number, "+7 495 000-00-00");
    assert_eq!(listing[1].message, "Is the flat still available?");
}

#[tokio::test]
async fn create_normalizes_optional_email() {
    let db = setup_test_db().await.unwrap();

    let created = EnquiryRepository::new(&db)
        .create(NewEnquiry {
            email: Some(" Buyer@Example.com ".to_string()),
            number: Some("   ".to_string()),
            ..enquiry("Ivan", "Hello")
        })
        .await
        .unwrap();

    assert_eq!(created.email.as_deref(), Some("buyer@example.com"));
    assert_eq!(created.number, None);
}

#[tokio::test]
async fn create_requires_name_phone_and_message() {
    let db = setup_test_db().await.unwrap();
    let repo = EnquiryRepository::new(&db);

    let err = repo.create(enquiry("", "Hello")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { field: "name", .. }));

    let err = repo
        .create(NewEnquiry {
            phone_number: String::new(),
            ..enquiry("Ivan", "Hello")
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Validation { field: "phone_number", .. }
    ));

    let err = repo.create(enquiry("Ivan", "  ")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { field: "message", .. }));

    let err = repo
        .create(NewEnquiry {
            email: Some("not-an-email".to_string()),
            ..enquiry("Ivan", "Hello")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { field: "email", .. }));

    assert!(repo.list_admin().await.unwrap().is_empty());
}
