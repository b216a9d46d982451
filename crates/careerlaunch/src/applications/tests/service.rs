use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use super::common::*;
use crate::applications::{
    ApplicationFilters, ApplicationId, ApplicationServiceError, ApplicationStatus, BulkStatusUpdate,
    InterviewFormat, InterviewSchedule, StatusUpdate,
};
use crate::catalog::{JobCatalogService, JobRepository};
use crate::memory::MemoryOutbox;
use crate::notifications::Notification;

#[test]
fn submit_records_history_match_and_counter() {
    let (service, store, outbox) = build_service();
    let job = post_job(&store, json!({}));

    let record = submit(&service, &student(), &job);

    assert_eq!(record.status, ApplicationStatus::Submitted);
    assert_eq!(record.company_id.0, "co-1");
    assert_eq!(record.skills_match_percentage, Some(50));
    assert_eq!(record.status_history.len(), 1);
    assert_eq!(
        record.status_history[0].notes.as_deref(),
        Some("application submitted")
    );

    let stored_job = store
        .fetch_job(&job.id)
        .expect("lookup")
        .expect("job exists");
    assert_eq!(stored_job.application_count, 1);

    match outbox.notifications().as_slice() {
        [Notification::ApplicationStatusChanged { status, job_title, .. }] => {
            assert_eq!(*status, ApplicationStatus::Submitted);
            assert_eq!(job_title, "Backend Intern");
        }
        other => panic!("unexpected notifications {other:?}"),
    }
}

#[test]
fn submit_rejects_duplicates() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    submit(&service, &student(), &job);

    match service.submit(&student(), submission(&job)) {
        Err(ApplicationServiceError::BadRequest(message)) => {
            assert_eq!(message, "you have already applied to this job")
        }
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
    let stored_job = store
        .fetch_job(&job.id)
        .expect("lookup")
        .expect("job exists");
    assert_eq!(stored_job.application_count, 1);
}

#[test]
fn submit_requires_an_open_active_job() {
    let (service, store, _) = build_service();
    let draft = post_job(&store, json!({ "draft": true }));
    let expired = post_job(
        &store,
        json!({ "deadline": (Utc::now() - Duration::days(1)).to_rfc3339() }),
    );

    assert!(matches!(
        service.submit(&student(), submission(&draft)),
        Err(ApplicationServiceError::BadRequest(_))
    ));
    match service.submit(&student(), submission(&expired)) {
        Err(ApplicationServiceError::BadRequest(message)) => {
            assert_eq!(message, "application deadline has passed")
        }
        other => panic!("expected deadline rejection, got {other:?}"),
    }
}

#[test]
fn only_students_submit() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));

    assert!(matches!(
        service.submit(&recruiter(), submission(&job)),
        Err(ApplicationServiceError::Forbidden(_))
    ));
}

#[test]
fn status_moves_forward_but_never_back() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    let record = submit(&service, &student(), &job);

    let shortlisted = service
        .update_status(
            &record.id,
            StatusUpdate::to(ApplicationStatus::Shortlisted),
            &recruiter(),
        )
        .expect("skip ahead allowed");
    assert_eq!(shortlisted.status_history.len(), 2);

    assert!(matches!(
        service.update_status(
            &record.id,
            StatusUpdate::to(ApplicationStatus::UnderReview),
            &recruiter(),
        ),
        Err(ApplicationServiceError::BadRequest(_))
    ));
    assert!(matches!(
        service.update_status(
            &record.id,
            StatusUpdate::to(ApplicationStatus::Withdrawn),
            &recruiter(),
        ),
        Err(ApplicationServiceError::BadRequest(_))
    ));

    let mut accept = StatusUpdate::to(ApplicationStatus::Accepted);
    accept.score = Some(92);
    let accepted = service
        .update_status(&record.id, accept, &platform_admin())
        .expect("admin decides");
    assert_eq!(accepted.score, Some(92));
    assert!(matches!(
        service.update_status(
            &record.id,
            StatusUpdate::to(ApplicationStatus::Rejected),
            &recruiter(),
        ),
        Err(ApplicationServiceError::BadRequest(_))
    ));
}

#[test]
fn status_updates_are_scoped_to_the_recruiters_company() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    let record = submit(&service, &student(), &job);
    let update = StatusUpdate::to(ApplicationStatus::UnderReview);

    for caller in [rival_recruiter(), student(), university_admin()] {
        assert!(matches!(
            service.update_status(&record.id, update.clone(), &caller),
            Err(ApplicationServiceError::Forbidden(_))
        ));
    }
}

#[test]
fn scores_above_one_hundred_are_rejected() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    let record = submit(&service, &student(), &job);
    let mut update = StatusUpdate::to(ApplicationStatus::UnderReview);
    update.score = Some(101);

    assert!(matches!(
        service.update_status(&record.id, update, &recruiter()),
        Err(ApplicationServiceError::BadRequest(_))
    ));
}

#[test]
fn scheduling_an_interview_sends_both_notifications() {
    let (service, store, outbox) = build_service();
    let job = post_job(&store, json!({}));
    let record = submit(&service, &student(), &job);
    let scheduled_for = Utc::now() + Duration::days(3);

    let mut update = StatusUpdate::to(ApplicationStatus::Interviewed);
    update.interview_date = Some(scheduled_for);
    update.interview = Some(InterviewSchedule {
        format: Some(InterviewFormat::Video),
        interviewer_name: Some("Dana".to_string()),
        ..InterviewSchedule::default()
    });
    let updated = service
        .update_status(&record.id, update, &recruiter())
        .expect("interview scheduled");

    let interview = updated.interview.expect("interview stored");
    assert_eq!(interview.scheduled_date, Some(scheduled_for));
    assert_eq!(interview.format, Some(InterviewFormat::Video));

    let kinds: Vec<_> = outbox
        .notifications()
        .iter()
        .map(|notification| notification.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "application_status_changed",
            "application_status_changed",
            "interview_scheduled"
        ]
    );
}

#[test]
fn withdraw_is_limited_to_the_owner_and_undecided_applications() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    let record = submit(&service, &student(), &job);

    assert!(matches!(
        service.withdraw(&record.id, &other_student()),
        Err(ApplicationServiceError::NotFound(_))
    ));

    let withdrawn = service
        .withdraw(&record.id, &student())
        .expect("withdrawn");
    assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);

    match service.withdraw(&record.id, &student()) {
        Err(ApplicationServiceError::BadRequest(message)) => {
            assert_eq!(message, "application already withdrawn")
        }
        other => panic!("expected bad request, got {other:?}"),
    }

    let second_job = post_job(&store, json!({ "title": "Data Intern" }));
    let decided = submit(&service, &student(), &second_job);
    service
        .update_status(
            &decided.id,
            StatusUpdate::to(ApplicationStatus::Rejected),
            &recruiter(),
        )
        .expect("rejected");
    assert!(matches!(
        service.withdraw(&decided.id, &student()),
        Err(ApplicationServiceError::BadRequest(_))
    ));
}

#[test]
fn listings_follow_the_callers_scope() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    submit(&service, &student(), &job);
    submit(&service, &other_student(), &job);

    let filters = ApplicationFilters::default();
    assert_eq!(service.list(&filters, &student()).expect("list").total, 1);
    assert_eq!(service.list(&filters, &recruiter()).expect("list").total, 2);
    assert_eq!(
        service
            .list(&filters, &rival_recruiter())
            .expect("list")
            .total,
        0
    );
    assert_eq!(
        service
            .list(&filters, &university_admin())
            .expect("list")
            .total,
        2
    );

    let submitted_only = ApplicationFilters {
        status: Some(ApplicationStatus::Accepted),
        ..ApplicationFilters::default()
    };
    assert_eq!(
        service
            .list(&submitted_only, &platform_admin())
            .expect("list")
            .total,
        0
    );
}

#[test]
fn bulk_updates_count_successes_and_failures() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    let first = submit(&service, &student(), &job);
    let second = submit(&service, &other_student(), &job);
    service
        .withdraw(&second.id, &other_student())
        .expect("withdrawn");

    let summary = service.bulk_update_status(
        BulkStatusUpdate {
            application_ids: vec![
                first.id.clone(),
                second.id.clone(),
                ApplicationId("app-missing".to_string()),
            ],
            status: ApplicationStatus::UnderReview,
            notes: Some("batch triage".to_string()),
        },
        &recruiter(),
    );

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 2);
    let refreshed = service.get(&first.id, &recruiter()).expect("readable");
    assert_eq!(refreshed.recruiter_notes.as_deref(), Some("batch triage"));
}

#[test]
fn stats_cover_every_status() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    submit(&service, &student(), &job);

    let stats = service.stats(&recruiter()).expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.recent, 1);
    assert_eq!(stats.by_status.len(), ApplicationStatus::ALL.len());
    assert_eq!(stats.by_status.get("submitted"), Some(&1));
    assert_eq!(stats.by_status.get("rejected"), Some(&0));
}

#[test]
fn closing_a_job_stops_new_applications() {
    let (service, store, _) = build_service();
    let job = post_job(&store, json!({}));
    let catalog = JobCatalogService::new(store.clone(), Arc::new(MemoryOutbox::new()));
    catalog.close(&job.id, &recruiter()).expect("closed");

    assert!(matches!(
        service.submit(&student(), submission(&job)),
        Err(ApplicationServiceError::BadRequest(_))
    ));
}
