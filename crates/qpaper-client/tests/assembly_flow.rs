//! End-to-end assembly tests: a session driven against the mock client and
//! against the HTTP client talking to a stub server.

use std::sync::Arc;

use qpaper_client::{HttpGenerationClient, MockGenerationClient, MockReply};
use qpaper_core::assembly::{CONNECTIVITY_MESSAGE, DOCUMENT_CONTENT_TYPE, GENERIC_FAILURE_MESSAGE};
use qpaper_core::error::AssemblyError;
use qpaper_core::filter::FilterCriteria;
use qpaper_core::ledger::Section;
use qpaper_core::model::{CourseContext, ExamType, Question, QuestionId, Role, SessionContext};
use qpaper_core::session::AssemblySession;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn course() -> CourseContext {
    CourseContext {
        course_id: "CS301".into(),
        course_code: "CS301".into(),
        course_title: "Operating Systems".into(),
    }
}

fn bank() -> Vec<Question> {
    serde_json::from_value(serde_json::json!([
        {"id": 11, "text": "Define a process.", "unit_id": 1, "co": "CO1", "bt": "L1", "marks": 2},
        {"id": 12, "text": "Define a thread.", "unit_id": 1, "co": "CO1", "bt": "L1", "marks": 2},
        {"id": 21, "text": "Explain paging.", "unit_id": 2, "co": "CO2", "bt": "L2", "marks": 10},
        {"id": 31, "text": "Compare schedulers.", "unit_id": 3, "co": "CO3", "bt": "L4", "marks": 10}
    ]))
    .unwrap()
}

fn faculty() -> SessionContext {
    SessionContext::new("tok", Role::Faculty)
}

fn is_filename(name: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix("question_paper_")
        .and_then(|rest| rest.strip_suffix(".docx"))
    else {
        return false;
    };
    let bytes = stamp.as_bytes();
    bytes.len() > 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

#[tokio::test]
async fn assemble_across_filters_with_mock() {
    let mock = Arc::new(MockGenerationClient::new(course(), bank()));
    let mut form = AssemblySession::open(faculty(), mock.clone(), "CS301")
        .await
        .unwrap();
    form.refresh().await.unwrap();

    form.criteria = FilterCriteria::default().with_marks("2");
    form.apply_filter().await.unwrap();
    for q in form.pool().filtered().to_vec() {
        form.toggle(q.id, Section::PartA);
    }

    form.criteria = FilterCriteria::default().with_marks("10").with_units("2, 3");
    form.apply_filter().await.unwrap();
    assert_eq!(form.pool().filtered().len(), 2);
    form.toggle(QuestionId::new(21), Section::PartB);
    form.toggle(QuestionId::new(31), Section::PartB);
    // Moving a part A question into part B and back.
    form.toggle(QuestionId::new(12), Section::PartB);
    form.toggle(QuestionId::new(12), Section::PartA);

    form.metadata.exam_type = ExamType::See;
    form.metadata.max_marks = "24".into();
    form.metadata.duration = "3 hours".into();
    form.metadata.semester = "V".into();

    let paper = form.submit().await.unwrap();
    assert!(is_filename(&paper.filename), "bad filename {}", paper.filename);

    let sent = mock.last_request().unwrap();
    assert_eq!(sent.selected_questions.part_a, vec![11, 12]);
    assert_eq!(sent.selected_questions.part_b, vec![21, 31]);
    assert_eq!(sent.max_marks, Some(24));
    assert_eq!(sent.exam_type, ExamType::See);
    assert_eq!(mock.fetch_calls(), 1);
    assert_eq!(mock.filter_calls(), 2);
}

#[tokio::test]
async fn empty_selection_never_reaches_service() {
    let mock = Arc::new(MockGenerationClient::new(course(), bank()));
    let form = AssemblySession::open(faculty(), mock.clone(), "CS301")
        .await
        .unwrap();

    assert_eq!(form.submit().await.unwrap_err(), AssemblyError::EmptySelection);
    assert_eq!(mock.generate_calls(), 0);
}

#[tokio::test]
async fn unreachable_generation_keeps_form_state() {
    let mock = Arc::new(MockGenerationClient::new(course(), bank()));
    mock.set_reply(MockReply::Unreachable);
    let mut form = AssemblySession::open(faculty(), mock.clone(), "CS301")
        .await
        .unwrap();
    form.toggle(QuestionId::new(11), Section::PartA);
    form.metadata.semester = "V".into();

    let err = form.submit().await.unwrap_err();
    assert_eq!(err, AssemblyError::TransportFailed(CONNECTIVITY_MESSAGE.into()));
    assert!(form.is_selected(QuestionId::new(11), Section::PartA));
    assert_eq!(form.metadata.semester, "V");
}

async fn mount_course(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/faculty-courses/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "mappings": [{"course_id": "CS301"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/faculty-dashboard/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "courses": [{"id": "CS301", "name": "Operating Systems"}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn http_validation_error_is_decoded_from_binary_body() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    Mock::given(method("POST"))
        .and(path("/generate-paper/"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            br#"{"error":"Course code required"}"#.to_vec(),
            "application/octet-stream",
        ))
        .mount(&server)
        .await;

    let client = Arc::new(HttpGenerationClient::new(&server.uri(), faculty()));
    let mut form = AssemblySession::open(faculty(), client, "CS301").await.unwrap();
    form.toggle(QuestionId::new(11), Section::PartA);

    let err = form.submit().await.unwrap_err();
    assert_eq!(
        err,
        AssemblyError::ValidationFailed("Course code required".into())
    );
}

#[tokio::test]
async fn http_document_is_saved() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    Mock::given(method("POST"))
        .and(path("/generate-paper/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"PK\x03\x04paper".to_vec(), DOCUMENT_CONTENT_TYPE),
        )
        .mount(&server)
        .await;

    let client = Arc::new(HttpGenerationClient::new(&server.uri(), faculty()));
    let mut form = AssemblySession::open(faculty(), client, "CS301").await.unwrap();
    form.toggle(QuestionId::new(21), Section::PartB);

    let paper = form.submit().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let saved = paper.save_to(dir.path()).await.unwrap();
    assert_eq!(std::fs::read(saved).unwrap(), b"PK\x03\x04paper");
}

#[tokio::test]
async fn http_html_not_found_page_gives_generic_message() {
    let server = MockServer::start().await;
    mount_course(&server).await;
    Mock::given(method("POST"))
        .and(path("/generate-paper/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("<html><body>Page not found</body></html>"),
        )
        .mount(&server)
        .await;

    let client = Arc::new(HttpGenerationClient::new(&server.uri(), faculty()));
    let mut form = AssemblySession::open(faculty(), client, "CS301").await.unwrap();
    form.toggle(QuestionId::new(11), Section::PartA);

    let err = form.submit().await.unwrap_err();
    assert_eq!(
        err,
        AssemblyError::TransportFailed(GENERIC_FAILURE_MESSAGE.into())
    );
    assert!(form.is_selected(QuestionId::new(11), Section::PartA));
}
