use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use curator_core::model::QuizId;
use services::{QuizApiError, QuizDetail, QuizPreviewService, QuizSource, RetryPolicy};

/// Replays scripted failures per quiz before answering with a detail.
#[derive(Default)]
struct ScriptedSource {
    failures: Mutex<HashMap<String, Vec<QuizApiError>>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl ScriptedSource {
    fn fail_with(self, id: &str, errors: Vec<QuizApiError>) -> Self {
        self.failures.lock().unwrap().insert(id.to_string(), errors);
        self
    }

    fn calls(&self, id: &str) -> u32 {
        self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl QuizSource for ScriptedSource {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<QuizDetail, QuizApiError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default() += 1;

        let next = {
            let mut failures = self.failures.lock().unwrap();
            failures.get_mut(id.as_str()).and_then(|queue| {
                if queue.is_empty() {
                    None
                } else {
                    Some(queue.remove(0))
                }
            })
        };
        match next {
            Some(err) => Err(err),
            None => Ok(QuizDetail {
                id: id.clone(),
                name: format!("Quiz {id}"),
                question_count: 10,
                image_url: None,
                subject: None,
                grade: None,
            }),
        }
    }
}

fn quiz(id: &str) -> QuizId {
    QuizId::new(id).unwrap()
}

fn network() -> QuizApiError {
    QuizApiError::Network("connection reset".into())
}

fn service(source: Arc<ScriptedSource>) -> QuizPreviewService {
    QuizPreviewService::new(source, RetryPolicy::default(), "https://quizizz.com/embed/quiz")
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_exactly_twice() {
    let id = "aaaaaaaaaaaaaaaaaaaa";
    let source = Arc::new(
        ScriptedSource::default().fail_with(id, vec![network(), network(), network(), network()]),
    );
    let previews = service(Arc::clone(&source));

    let started = tokio::time::Instant::now();
    let err = previews.fetch(&quiz(id)).await.unwrap_err();
    assert!(matches!(err, QuizApiError::Network(_)));
    assert_eq!(source.calls(id), 3);
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn recovers_after_one_network_failure() {
    let id = "aaaaaaaaaaaaaaaaaaaa";
    let source = Arc::new(ScriptedSource::default().fail_with(id, vec![network()]));
    let previews = service(Arc::clone(&source));

    let detail = previews.fetch(&quiz(id)).await.unwrap();
    assert_eq!(detail.question_count, 10);
    assert_eq!(source.calls(id), 2);
}

#[tokio::test(start_paused = true)]
async fn not_found_is_not_retried() {
    let id = "bbbbbbbbbbbbbbbbbbbb";
    let source = Arc::new(
        ScriptedSource::default().fail_with(id, vec![QuizApiError::NotFound(quiz(id))]),
    );
    let previews = service(Arc::clone(&source));

    let err = previews.fetch(&quiz(id)).await.unwrap_err();
    assert!(matches!(err, QuizApiError::NotFound(_)));
    assert_eq!(source.calls(id), 1);
}

#[tokio::test(start_paused = true)]
async fn batch_fetch_reports_each_quiz() {
    let missing = "bbbbbbbbbbbbbbbbbbbb";
    let source = Arc::new(
        ScriptedSource::default().fail_with(missing, vec![QuizApiError::NotFound(quiz(missing))]),
    );
    let previews = service(source);

    let ids = [quiz("aaaaaaaaaaaaaaaaaaaa"), quiz(missing), quiz("cccccccccccccccccccc")];
    let results = previews.fetch_many(&ids).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].detail.is_ok());
    assert!(matches!(results[1].detail, Err(QuizApiError::NotFound(_))));
    assert!(results[2].detail.is_ok());
    assert_eq!(
        results[1].embed_url,
        "https://quizizz.com/embed/quiz/bbbbbbbbbbbbbbbbbbbb"
    );
}

#[test]
fn embed_url_escapes_typed_ids() {
    let previews = service(Arc::new(ScriptedSource::default()));
    assert_eq!(
        previews.preview_url(&quiz("../admin")),
        "https://quizizz.com/embed/quiz/..%2Fadmin"
    );
    assert!(
        QuizPreviewService::new(
            Arc::new(ScriptedSource::default()),
            RetryPolicy::default(),
            "not a url",
        )
        .is_err()
    );
}
