use std::sync::Arc;

use curator_core::model::{ApprovalStatus, FeedbackDraft, QuizId, ReviewerName};
use curator_core::time::fixed_now;
use services::{
    AppServices, AssignmentError, Clock, CuratorConfig, CurationError, FeedbackServiceError,
    QuizApiClient,
};
use storage::repository::{AssignmentFilter, FeedbackFilter, Storage, StorageError};

const WEEK1: &str = "Quiz Link,Domain,Topic,Standard,Score\n\
                     https://quizizz.com/admin/quiz/abcdefabcdefabcdefab,Math,Algebra,STD1,2.5\n\
                     abcdefabcdefabcdefac,Math,Algebra,STD1,1.0\n";

async fn services() -> AppServices {
    let storage = Storage::sqlite("sqlite:file:memdb_curation_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let config = CuratorConfig::default();
    AppServices::from_storage(
        &storage,
        &config,
        Clock::fixed(fixed_now()),
        Arc::new(QuizApiClient::new(None)),
    )
    .unwrap()
}

#[tokio::test]
async fn upload_browse_rename_and_assign() {
    let app = services().await;
    let curation = app.curation();

    let upload = curation
        .upload_batch("week1.csv", WEEK1, false)
        .await
        .expect("upload");
    assert_eq!(upload.quiz_count, 2);
    assert_eq!(upload.meta.bucket, "quiz-batches");

    let err = curation.upload_batch("week1.csv", WEEK1, false).await.unwrap_err();
    assert!(matches!(err, CurationError::Storage(StorageError::Conflict)));

    let err = curation
        .upload_batch("empty.csv", "title,notes\nno ids,here\n", false)
        .await
        .unwrap_err();
    assert!(matches!(err, CurationError::NoQuizIds(_)));

    let mut catalog = curation.load_batch("week1.csv").await.expect("load");
    assert_eq!(catalog.len(), 2);
    let hits = catalog.search("abcdefac");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].expanded);

    curation
        .upload_batch("week2.csv", WEEK1, false)
        .await
        .unwrap();
    let err = curation
        .rename_batch("week1.csv", "week2.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, CurationError::Storage(StorageError::Conflict)));
    curation
        .rename_batch("week1.csv", "algebra.csv")
        .await
        .expect("rename");

    let names: Vec<_> = curation
        .list_batches()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["algebra.csv", "week2.csv"]);

    let assignments = app.assignments();
    let err = assignments.assign("week1.csv", "ana").await.unwrap_err();
    assert!(matches!(err, AssignmentError::UnknownBatch(_)));
    assignments.assign("algebra.csv", "ana").await.expect("assign");
    let listed = assignments
        .list(&AssignmentFilter {
            reviewer: Some(ReviewerName::new("ana").unwrap()),
            ..AssignmentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].batch, "algebra.csv");

    curation.delete_batch("week2.csv").await.expect("delete");
    assert!(matches!(
        curation.download_batch("week2.csv").await.unwrap_err(),
        CurationError::Storage(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn feedback_resubmission_and_export() {
    let storage = Storage::in_memory();
    let config = CuratorConfig::default();
    let quiz = QuizId::new("abcdefabcdefabcdefab").unwrap();

    let first_app = AppServices::from_storage(
        &storage,
        &config,
        Clock::fixed(fixed_now()),
        Arc::new(QuizApiClient::new(None)),
    )
    .unwrap();
    first_app
        .feedback()
        .submit(
            quiz.clone(),
            FeedbackDraft {
                reviewer: "ana".into(),
                stars: Some(3),
                ..FeedbackDraft::default()
            },
        )
        .await
        .expect("first submit");

    let later = fixed_now() + chrono::Duration::hours(1);
    let second_app = AppServices::from_storage(
        &storage,
        &config,
        Clock::fixed(later),
        Arc::new(QuizApiClient::new(None)),
    )
    .unwrap();
    let feedback = second_app.feedback();
    let updated = feedback
        .submit(
            quiz.clone(),
            FeedbackDraft {
                reviewer: "ana".into(),
                stars: Some(5),
                approval: ApprovalStatus::Approved,
                comment: Some("uses \"real\" data".into()),
                batch: Some("week1.csv".into()),
            },
        )
        .await
        .expect("resubmit");
    assert_eq!(updated.created_at, fixed_now());
    assert_eq!(updated.updated_at, later);

    let err = feedback
        .submit(
            quiz.clone(),
            FeedbackDraft {
                reviewer: "ana".into(),
                stars: Some(9),
                ..FeedbackDraft::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FeedbackServiceError::Invalid(_)));

    let all = feedback.list(&FeedbackFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);

    let csv = feedback
        .export_csv(&FeedbackFilter::default())
        .await
        .unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"uses \"\"real\"\" data\""));
    assert!(lines[1].contains("\"approved\""));

    let nobody = FeedbackFilter {
        reviewer: Some(ReviewerName::new("ben").unwrap()),
        ..FeedbackFilter::default()
    };
    assert_eq!(feedback.export_csv(&nobody).await.unwrap(), "");

    let ana = ReviewerName::new("ana").unwrap();
    feedback.delete(&quiz, &ana).await.unwrap();
    assert!(feedback.get(&quiz, &ana).await.unwrap().is_none());
}
