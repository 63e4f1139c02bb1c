use std::fs;
use std::sync::Arc;

use gdoc_core::{ContentId, RemoteId};
use gdoc_engine::{
    object_file_stem, ContentCreate, ContentRepository, FieldValue, Fields, FileRepository,
    InMemoryRepository, Lookup, Operation, RepositoryError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn text_fields(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::Text(value.to_string())))
        .collect()
}

fn create(remote_id: &RemoteId, fields: Fields) -> ContentCreate {
    ContentCreate {
        content_type: "gdoc".to_string(),
        remote_id: remote_id.clone(),
        parent_location: 2,
        language_code: "eng-GB".to_string(),
        fields,
    }
}

async fn publish_new(repo: &dyn ContentRepository, remote_id: &RemoteId, title: &str) {
    let draft = repo
        .create_draft(create(remote_id, text_fields(&[("title", title)])))
        .await
        .unwrap();
    repo.publish(&draft).await.unwrap();
}

async fn publish_update(repo: &dyn ContentRepository, remote_id: &RemoteId, title: &str) -> u32 {
    let Lookup::Found(current) = repo.load_by_remote_id(remote_id).await.unwrap() else {
        panic!("object {remote_id} missing");
    };
    let draft = repo.create_draft_from(&current).await.unwrap();
    let draft = repo
        .update_draft(&draft, text_fields(&[("title", title)]))
        .await
        .unwrap();
    repo.publish(&draft).await.unwrap().version
}

/// Behavior both repositories share.
async fn check_lifecycle(repo: &dyn ContentRepository) {
    let remote_id = RemoteId::for_document("doc-1");
    assert!(matches!(
        repo.load_by_remote_id(&remote_id).await.unwrap(),
        Lookup::NotFound
    ));

    publish_new(repo, &remote_id, "First").await;
    assert_eq!(publish_update(repo, &remote_id, "Second").await, 2);

    let Lookup::Found(object) = repo.load_by_remote_id(&remote_id).await.unwrap() else {
        panic!("object missing after publish");
    };
    assert_eq!(object.id, ContentId(1));
    assert_eq!(object.version, 2);
    assert_eq!(object.content_type, "gdoc");
    assert_eq!(
        object.field("title"),
        Some(&FieldValue::Text("Second".to_string()))
    );

    // Second create for the same remote id is refused at publish.
    let duplicate = repo
        .create_draft(create(&remote_id, Fields::new()))
        .await
        .unwrap();
    assert!(matches!(
        repo.publish(&duplicate).await,
        Err(RepositoryError::DuplicateRemoteId(ref id)) if *id == remote_id
    ));

    // A discarded draft can no longer be published.
    let Lookup::Found(current) = repo.load_by_remote_id(&remote_id).await.unwrap() else {
        panic!("object missing");
    };
    let draft = repo.create_draft_from(&current).await.unwrap();
    repo.discard_draft(&draft).await.unwrap();
    assert!(matches!(
        repo.publish(&draft).await,
        Err(RepositoryError::DraftNotOpen(_))
    ));
    let Lookup::Found(after) = repo.load_by_remote_id(&remote_id).await.unwrap() else {
        panic!("object missing");
    };
    assert_eq!(after.version, 2);
}

#[tokio::test]
async fn memory_repository_lifecycle() {
    let repo = InMemoryRepository::new();
    check_lifecycle(&repo).await;
    assert_eq!(repo.history(&RemoteId::for_document("doc-1")).len(), 2);
}

#[tokio::test]
async fn file_repository_lifecycle() {
    let temp = TempDir::new().unwrap();
    let repo = FileRepository::open(temp.path()).unwrap();
    check_lifecycle(&repo).await;
    assert_eq!(
        repo.versions(&RemoteId::for_document("doc-1")).unwrap(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn memory_repository_injected_failure_leaves_state() {
    let repo = InMemoryRepository::new();
    let remote_id = RemoteId::for_document("doc-2");
    publish_new(&repo, &remote_id, "Kept").await;

    repo.fail_on(Operation::UpdateDraft);
    let current = repo.object(&remote_id).unwrap();
    let draft = repo.create_draft_from(&current).await.unwrap();
    assert!(matches!(
        repo.update_draft(&draft, text_fields(&[("title", "Lost")]))
            .await,
        Err(RepositoryError::Storage(_))
    ));
    repo.discard_draft(&draft).await.unwrap();

    repo.recover();
    assert_eq!(repo.object(&remote_id).unwrap().version, 1);
    assert_eq!(repo.open_draft_count(), 0);
}

#[tokio::test]
async fn restricted_content_types_are_enforced() {
    let repo = InMemoryRepository::new().with_content_types(["image"]);
    let err = repo
        .create_draft(create(&RemoteId::for_document("doc-3"), Fields::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UnknownContentType(ref ct) if ct == "gdoc"));

    let temp = TempDir::new().unwrap();
    let files = FileRepository::open(temp.path())
        .unwrap()
        .with_content_types(["image"]);
    assert!(files
        .create_draft(create(&RemoteId::for_document("doc-3"), Fields::new()))
        .await
        .is_err());
}

#[tokio::test]
async fn file_repository_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let first = RemoteId::for_document("a");
    let second = RemoteId::for_image("kix.9");
    {
        let repo = FileRepository::open(temp.path()).unwrap();
        publish_new(&repo, &first, "A").await;

        let mut fields = text_fields(&[("name", "Google Docs image (kix.9)")]);
        fields.insert(
            "image".to_string(),
            FieldValue::Image {
                filename: "pic.png".to_string(),
                data: vec![1, 2, 3],
            },
        );
        let draft = repo.create_draft(create(&second, fields)).await.unwrap();
        repo.publish(&draft).await.unwrap();
    }

    let repo: Arc<dyn ContentRepository> = Arc::new(FileRepository::open(temp.path()).unwrap());
    let Lookup::Found(image) = repo.load_by_remote_id(&second).await.unwrap() else {
        panic!("image missing after reopen");
    };
    assert_eq!(image.id, ContentId(2));
    assert_eq!(
        image.field("image"),
        Some(&FieldValue::Image {
            filename: "pic.png".to_string(),
            data: vec![1, 2, 3],
        })
    );

    let stem = object_file_stem(&second);
    assert!(temp.path().join(format!("{stem}.json")).is_file());
    assert_eq!(
        fs::read(temp.path().join(format!("{stem}.v1.image.bin"))).unwrap(),
        vec![1, 2, 3]
    );

    publish_new(repo.as_ref(), &RemoteId::for_document("b"), "B").await;
    let Lookup::Found(third) = repo
        .load_by_remote_id(&RemoteId::for_document("b"))
        .await
        .unwrap()
    else {
        panic!("third object missing");
    };
    assert_eq!(third.id, ContentId(3));
}

#[tokio::test]
async fn file_repository_records_publish_time() {
    let temp = TempDir::new().unwrap();
    let repo = FileRepository::open(temp.path())
        .unwrap()
        .with_clock(Arc::new(|| "2026-03-01T12:00:00Z".to_string()));
    let remote_id = RemoteId::for_document("timed");
    publish_new(&repo, &remote_id, "T").await;

    assert_eq!(
        repo.published_utc(&remote_id).unwrap().as_deref(),
        Some("2026-03-01T12:00:00Z")
    );
    assert_eq!(
        repo.published_utc(&RemoteId::for_document("absent")).unwrap(),
        None
    );
}

#[test]
fn file_stems_are_safe_and_distinct() {
    let plain = object_file_stem(&RemoteId::for_document("1AbC"));
    assert!(plain.starts_with("gdoc-1AbC--"));
    assert_eq!(plain.len(), "gdoc-1AbC--".len() + 8);

    let slashed = object_file_stem(&RemoteId::for_document("a/b"));
    let colon = object_file_stem(&RemoteId::for_document("a:b"));
    assert!(slashed.starts_with("gdoc-a_b--"));
    assert!(!slashed.contains('/'));
    assert_ne!(slashed, colon);
    assert_eq!(slashed, object_file_stem(&RemoteId::for_document("a/b")));
}
