use std::sync::Arc;

use async_trait::async_trait;
use exam_core::QuestionStatus;
use exam_core::model::{
    Answer, ExamConfiguration, ExamConfigurationDraft, ExamId, Question, QuestionId, QuestionType,
    Section, SectionId,
};
use exam_core::time::fixed_clock;
use services::ExamSessionStore;
use storage::repository::{
    InMemorySessionStore, SessionRecord, SessionStore, StorageError,
};

fn question(id: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        question_type: QuestionType::SingleChoice,
        marks: 1.0,
        negative_marks: 0.25,
        question_set: None,
    }
}

fn config(exam_id: &str, question_ids: &[&str]) -> ExamConfiguration {
    ExamConfigurationDraft {
        id: ExamId::new(exam_id),
        duration_minutes: 60,
        sections: vec![Section {
            id: SectionId::new("s1"),
            name: "General".to_owned(),
            questions: question_ids.iter().map(|id| question(id)).collect(),
        }],
        instructions: Vec::new(),
        languages: vec!["en".to_owned()],
    }
    .validate()
    .unwrap()
}

fn qid(id: &str) -> QuestionId {
    QuestionId::new(id)
}

#[tokio::test]
async fn progress_survives_reinitialization() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let config_v1 = config("e1", &["q1", "q2", "q3"]);

    let mut store = ExamSessionStore::initialize(
        config_v1.clone(),
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    store
        .save_and_navigate(&qid("q1"), Some(Answer::single("opt-a")), false, 1)
        .await;
    let attempt_id = store.snapshot().attempt_id;
    drop(store);

    let store = ExamSessionStore::initialize(
        config_v1,
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    let state = store.snapshot();

    assert_eq!(state.attempt_id, attempt_id);
    assert_eq!(state.current_question_index, 1);
    assert_eq!(
        state.question(&qid("q1")).unwrap().selected_answer,
        Some(Answer::single("opt-a"))
    );
}

#[tokio::test]
async fn different_exam_id_discards_persisted_progress() {
    let sessions = Arc::new(InMemorySessionStore::new());

    let mut store = ExamSessionStore::initialize(
        config("e1", &["q1", "q2"]),
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    store.save_answer(&qid("q1"), Answer::single("opt-a")).await;
    drop(store);

    let store = ExamSessionStore::initialize(
        config("e2", &["q1", "q2"]),
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    let state = store.snapshot();

    assert_eq!(state.exam_id, ExamId::new("e2"));
    assert_eq!(state.current_question_index, 0);
    assert!(
        state
            .question_states
            .values()
            .all(|question| question.status() == QuestionStatus::NotVisited)
    );
}

#[tokio::test]
async fn changed_question_set_discards_persisted_progress() {
    let sessions = Arc::new(InMemorySessionStore::new());

    let mut store = ExamSessionStore::initialize(
        config("e1", &["q1", "q2"]),
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    store.save_answer(&qid("q1"), Answer::single("opt-a")).await;
    drop(store);

    // same exam id, but the question list grew since last load
    let store = ExamSessionStore::initialize(
        config("e1", &["q1", "q2", "q3"]),
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    let state = store.snapshot();

    assert_eq!(state.question_states.len(), 3);
    assert_eq!(state.current_question_index, 0);
    assert_eq!(
        state.question(&qid("q1")).unwrap().status(),
        QuestionStatus::NotVisited
    );
}

#[tokio::test]
async fn compound_commit_is_one_persisted_snapshot() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let exam = config("e1", &["q1", "q2", "q3"]);

    let mut store = ExamSessionStore::initialize(
        exam.clone(),
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;
    store
        .save_and_navigate(&qid("q1"), Some(Answer::single("opt-b")), false, 1)
        .await;

    // what hit durable storage is exactly the in-memory snapshot: the
    // answer commit and the destination visit landed together
    let persisted = sessions
        .load(exam.id())
        .await
        .unwrap()
        .expect("session persisted")
        .into_state();
    assert_eq!(persisted, *store.snapshot());
    assert_eq!(
        persisted.question(&qid("q1")).unwrap().status(),
        QuestionStatus::Answered
    );
    assert!(persisted.question(&qid("q2")).unwrap().is_visited);
}

#[tokio::test]
async fn submission_maps_every_question() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let mut store = ExamSessionStore::initialize(
        config("e1", &["q1", "q2", "q3", "q4", "q5", "q6"]),
        sessions as Arc<dyn SessionStore>,
        fixed_clock(),
    )
    .await;

    for n in 1..=5 {
        store
            .save_answer(&qid(&format!("q{n}")), Answer::single(format!("a{n}")))
            .await;
    }
    // q6 is never visited

    let answers = store.submit_answers();
    assert_eq!(answers.len(), 6);
    for n in 1..=5 {
        assert_eq!(
            answers[&qid(&format!("q{n}"))],
            Some(Answer::single(format!("a{n}")))
        );
    }
    assert_eq!(answers[&qid("q6")], None);
}

//
// ─── FAILING STORE DOUBLES ─────────────────────────────────────────────────────
//

struct WriteFailingStore;

#[async_trait]
impl SessionStore for WriteFailingStore {
    async fn load(&self, _exam_id: &ExamId) -> Result<Option<SessionRecord>, StorageError> {
        Ok(None)
    }

    async fn save(&self, _exam_id: &ExamId, _record: &SessionRecord) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".to_owned()))
    }

    async fn delete(&self, _exam_id: &ExamId) -> Result<(), StorageError> {
        Ok(())
    }
}

struct ReadFailingStore;

#[async_trait]
impl SessionStore for ReadFailingStore {
    async fn load(&self, _exam_id: &ExamId) -> Result<Option<SessionRecord>, StorageError> {
        Err(StorageError::Serialization("corrupt payload".to_owned()))
    }

    async fn save(&self, _exam_id: &ExamId, _record: &SessionRecord) -> Result<(), StorageError> {
        Ok(())
    }

    async fn delete(&self, _exam_id: &ExamId) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test]
async fn write_failure_never_blocks_the_attempt() {
    let mut store = ExamSessionStore::initialize(
        config("e1", &["q1", "q2"]),
        Arc::new(WriteFailingStore),
        fixed_clock(),
    )
    .await;

    let state = store
        .save_and_navigate(&qid("q1"), Some(Answer::single("opt-a")), false, 1)
        .await;

    // in-memory canonical state advanced despite every write failing
    assert_eq!(
        state.question(&qid("q1")).unwrap().status(),
        QuestionStatus::Answered
    );
    assert_eq!(state.current_question_index, 1);
}

#[tokio::test]
async fn unreadable_persisted_session_starts_fresh() {
    let store = ExamSessionStore::initialize(
        config("e1", &["q1", "q2"]),
        Arc::new(ReadFailingStore),
        fixed_clock(),
    )
    .await;

    let state = store.snapshot();
    assert_eq!(state.current_question_index, 0);
    assert_eq!(state.question_states.len(), 2);
}
