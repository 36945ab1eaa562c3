use std::{cell::Cell, sync::Arc};

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::{
    domain::{blogs, events},
    form::{
        DraftValue, EntityForm, FormCommand, FormMode, FormSession, UploadResolution,
        apply_command,
    },
    upload::{ImageUploader, UploadError, UploadFile, UploadPolicy, UploadedImage},
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn blog_form() -> Arc<EntityForm> {
    EntityForm::new(blogs()).unwrap()
}

fn event_form() -> Arc<EntityForm> {
    EntityForm::new(events()).unwrap()
}

fn png(size: usize) -> UploadFile {
    UploadFile::new("cover.png", "image/png", vec![0; size])
}

struct FixedUploader(&'static str);

impl ImageUploader for FixedUploader {
    fn upload(&self, _file: &UploadFile) -> Result<UploadedImage, UploadError> {
        Ok(UploadedImage {
            url: self.0.to_string(),
        })
    }
}

struct FailingUploader;

impl ImageUploader for FailingUploader {
    fn upload(&self, _file: &UploadFile) -> Result<UploadedImage, UploadError> {
        Err(UploadError::Rejected("network unreachable".into()))
    }
}

#[test]
fn submit_with_empty_title_redirects_to_its_tab() {
    let mut session = FormSession::open(blog_form(), Some(&json!({"content": "Body"})), today());
    assert!(session.advance_tab());
    assert!(session.advance_tab());
    assert_eq!(session.active_tab(), "media");

    let called = Cell::new(false);
    let result = session.submit(|_| called.set(true));

    let failure = result.unwrap_err();
    assert!(!called.get(), "save callback must not run");
    assert_eq!(failure.field, "title");
    assert_eq!(session.active_tab(), "basic");
    assert_eq!(session.status(), Some("Title is required"));
    assert_eq!(session.field_error("title"), Some("Title is required"));
}

#[test]
fn editing_the_failing_field_clears_its_error() {
    let mut session = FormSession::open(blog_form(), None, today());
    let _ = session.submit(|_| ());
    assert!(session.field_error("title").is_some());
    assert!(session.set_text("title", "Hello"));
    assert_eq!(session.field_error("title"), None);
    assert!(session.is_dirty());
}

#[test]
fn successful_submit_hands_dehydrated_payload_to_callback() {
    let record = json!({
        "_id": "b-7",
        "title": "Hello",
        "author": "Ann",
        "content": "Body",
        "tags": ["rust"],
        "views": 3
    });
    let mut session = FormSession::open(blog_form(), Some(&record), today());
    assert_eq!(session.mode(), FormMode::Edit("b-7".into()));
    assert!(session.set_text("tags", "rust, cli ,, tui"));

    let payload = session.submit(|payload| payload).unwrap();
    assert_eq!(payload.entity, "blogs");
    assert_eq!(payload.record_id.as_deref(), Some("b-7"));
    assert_eq!(payload.record["tags"], json!(["rust", "cli", "tui"]));
    assert_eq!(payload.record["views"], json!(3));
    assert_eq!(session.status(), None);
}

#[test]
fn sessions_always_open_on_the_first_tab() {
    let form = event_form();
    let mut first = FormSession::open(Arc::clone(&form), None, today());
    first.advance_tab();
    first.cancel();
    let reopened = FormSession::open(form, Some(&json!({"_id": "e1"})), today());
    assert_eq!(reopened.active_tab(), "basic");
    assert!(!reopened.has_previous_tab());
}

#[test]
fn setters_reject_mismatched_fields() {
    let mut session = FormSession::open(event_form(), None, today());
    assert!(!session.set_text("speakers", "Ada"));
    assert!(!session.set_bool("title", true));
    assert!(!session.add_item("title"));
    assert!(!session.set_text("missing", "x"));
    assert!(!session.is_dirty());
}

#[test]
fn collection_commands_edit_by_index() {
    let record = json!({"speakers": [{"name": "A"}, {"name": "B"}, {"name": "C"}]});
    let mut session = FormSession::open(event_form(), Some(&record), today());
    assert!(apply_command(
        &mut session,
        FormCommand::RemoveItem {
            collection: "speakers".into(),
            index: 1
        }
    ));
    assert!(apply_command(
        &mut session,
        FormCommand::AddItem {
            collection: "speakers".into()
        }
    ));
    assert!(apply_command(
        &mut session,
        FormCommand::UpdateItem {
            collection: "speakers".into(),
            index: 2,
            field: "role".into(),
            value: "Panelist".into()
        }
    ));
    let speakers = session.draft().collection("speakers").unwrap();
    let names: Vec<_> = speakers
        .items()
        .iter()
        .map(|item| item.get("name").unwrap())
        .collect();
    assert_eq!(names, vec!["A", "C", ""]);
    let payload = session.payload();
    assert_eq!(
        payload.record["speakers"],
        json!([
            {"name": "A", "role": "", "description": "", "image": ""},
            {"name": "C", "role": "", "description": "", "image": ""}
        ])
    );
}

#[test]
fn choices_cycle_and_clamp() {
    let mut session = FormSession::open(event_form(), None, today());
    assert!(session.cycle_choice("status", -1));
    assert_eq!(
        session.value("status").and_then(DraftValue::selected_option),
        Some("completed")
    );
    assert!(session.select_choice("status", 99));
    assert_eq!(
        session.value("status").and_then(DraftValue::selected_option),
        Some("completed")
    );
}

#[test]
fn huge_cycle_steps_wrap_without_overflow() {
    let mut session = FormSession::open(event_form(), None, today());
    assert!(session.cycle_choice("status", i32::MAX));
    assert_eq!(
        session.value("status").and_then(DraftValue::selected_option),
        Some("ongoing")
    );
    assert!(session.cycle_choice("status", i32::MIN));
    assert_eq!(
        session.value("status").and_then(DraftValue::selected_option),
        Some("completed")
    );
}

#[test]
fn upload_policy_violation_keeps_prior_value() {
    let record = json!({"image": "/media/old.png"});
    let mut session = FormSession::open(blog_form(), Some(&record), today());
    let policy = UploadPolicy::default();
    let err = session
        .begin_upload("image", &png(6 * 1024 * 1024), &policy)
        .unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { .. }));
    assert_eq!(session.text("image"), Some("/media/old.png"));
    assert_eq!(session.field_error("image"), Some("Image must be smaller than 5 MB"));
    assert!(!session.is_uploading("image"));
}

#[test]
fn only_upload_fields_accept_uploads() {
    let mut session = FormSession::open(blog_form(), None, today());
    let err = session
        .begin_upload("title", &png(10), &UploadPolicy::default())
        .unwrap_err();
    assert!(matches!(err, UploadError::NotUploadField { .. }));
}

#[test]
fn pending_upload_blocks_only_its_field() {
    let mut session = FormSession::open(blog_form(), None, today());
    let policy = UploadPolicy::default();
    let ticket = session.begin_upload("image", &png(10), &policy).unwrap();
    assert!(matches!(
        session.begin_upload("image", &png(10), &policy),
        Err(UploadError::InProgress { .. })
    ));
    assert!(session.set_text("title", "Still editable"));
    let resolution = session.finish_upload(
        ticket,
        Ok(UploadedImage {
            url: "/media/new.png".into(),
        }),
    );
    assert_eq!(resolution, UploadResolution::Applied("/media/new.png".into()));
    assert_eq!(session.text("image"), Some("/media/new.png"));
    assert!(!session.is_uploading("image"));
}

#[test]
fn list_upload_fields_append_urls() {
    let record = json!({"gallery": ["/media/a.png"]});
    let mut session = FormSession::open(blog_form(), Some(&record), today());
    let resolution = session
        .upload_with(
            "gallery",
            &png(10),
            &UploadPolicy::default(),
            &FixedUploader("/media/b.png"),
        )
        .unwrap();
    assert_eq!(resolution, UploadResolution::Applied("/media/b.png".into()));
    assert_eq!(
        session.payload().record["gallery"],
        json!(["/media/a.png", "/media/b.png"])
    );
}

#[test]
fn failed_upload_reports_inline_and_keeps_value() {
    let record = json!({"image": "/media/old.png"});
    let mut session = FormSession::open(blog_form(), Some(&record), today());
    let resolution = session
        .upload_with("image", &png(10), &UploadPolicy::default(), &FailingUploader)
        .unwrap();
    assert_eq!(
        resolution,
        UploadResolution::Failed("Upload failed: network unreachable".into())
    );
    assert_eq!(session.text("image"), Some("/media/old.png"));
    assert_eq!(
        session.field_error("image"),
        Some("Upload failed: network unreachable")
    );
}

#[test]
fn upload_results_for_other_sessions_are_dropped() {
    let form = blog_form();
    let mut closed = FormSession::open(Arc::clone(&form), None, today());
    let ticket = closed
        .begin_upload("image", &png(10), &UploadPolicy::default())
        .unwrap();
    closed.cancel();

    let mut reopened = FormSession::open(form, None, today());
    let resolution = reopened.finish_upload(
        ticket,
        Ok(UploadedImage {
            url: "/media/late.png".into(),
        }),
    );
    assert_eq!(resolution, UploadResolution::Stale);
    assert_eq!(reopened.text("image"), Some(""));
    assert!(!reopened.is_dirty());
}

#[test]
fn draft_view_keeps_joined_strings() {
    let record = json!({"agenda": ["Intro", "Talk"], "tags": ["a", "b"]});
    let session = FormSession::open(event_form(), Some(&record), today());
    let view = session.draft().to_view();
    assert_eq!(view["agenda"], Value::String("Intro\nTalk".into()));
    assert_eq!(view["tags"], Value::String("a, b".into()));
}
