use super::common::*;
use crate::workflows::screening::{
    select, CandidateReportView, FilterOptions, ScreeningStatus, SortDirection, SortField,
    SortSpec, StatusFilter,
};

fn roster_fixture() -> Vec<crate::workflows::screening::Candidate> {
    vec![
        candidate_with_outcome("Ada Lovelace", 85.0, false, ScreeningStatus::Completed),
        candidate_with_outcome("Grace Hopper", 45.0, false, ScreeningStatus::Completed),
        candidate_with_outcome("Linus Torvalds", 45.0, false, ScreeningStatus::Completed),
        candidate_with_outcome("Barbara Liskov", 70.0, true, ScreeningStatus::Completed),
        candidate_with_outcome("Ken Thompson", 0.0, false, ScreeningStatus::Pending),
        candidate_with_outcome("Dennis Ritchie", 0.0, false, ScreeningStatus::Processing),
        candidate_with_outcome("Margaret Hamilton", 0.0, false, ScreeningStatus::Error),
    ]
}

fn names(selected: &[crate::workflows::screening::Candidate]) -> Vec<&str> {
    selected
        .iter()
        .map(|candidate| candidate.name.as_str())
        .collect()
}

#[test]
fn search_is_a_case_insensitive_substring_match() {
    let filters = FilterOptions {
        search: "ADA".to_string(),
        ..FilterOptions::default()
    };

    let selected = select(&roster_fixture(), &filters, &SortSpec::default());
    assert_eq!(names(&selected), vec!["Ada Lovelace"]);
}

#[test]
fn score_range_buckets_are_half_open() {
    let filters = FilterOptions {
        score_range: Some(40.0),
        ..FilterOptions::default()
    };
    let sort = SortSpec {
        sort_by: SortField::Name,
        direction: SortDirection::Asc,
    };

    // 45.0 falls in [40, 60); 85.0 and 70.0 do not; 0.0 does not.
    let selected = select(&roster_fixture(), &filters, &sort);
    assert_eq!(names(&selected), vec!["Grace Hopper", "Linus Torvalds"]);

    let edge = vec![
        candidate_with_outcome("Lower Edge", 40.0, false, ScreeningStatus::Completed),
        candidate_with_outcome("Upper Edge", 60.0, false, ScreeningStatus::Completed),
    ];
    let selected = select(&edge, &filters, &sort);
    assert_eq!(names(&selected), vec!["Lower Edge"]);
}

#[test]
fn pending_bucket_covers_queued_and_in_flight_candidates() {
    let filters = FilterOptions {
        status: StatusFilter::Pending,
        ..FilterOptions::default()
    };

    let selected = select(
        &roster_fixture(),
        &filters,
        &SortSpec {
            sort_by: SortField::Name,
            direction: SortDirection::Asc,
        },
    );
    assert_eq!(names(&selected), vec!["Dennis Ritchie", "Ken Thompson"]);
}

#[test]
fn error_bucket_matches_failed_candidates_only() {
    let filters = FilterOptions {
        status: StatusFilter::Error,
        ..FilterOptions::default()
    };

    let selected = select(&roster_fixture(), &filters, &SortSpec::default());
    assert_eq!(names(&selected), vec!["Margaret Hamilton"]);
}

#[test]
fn excluded_bucket_ignores_score_range_but_keeps_the_name_match() {
    // Barbara sits at 70%, outside the requested [0, 20) bucket; the
    // excluded bucket must still return her.
    let filters = FilterOptions {
        score_range: Some(0.0),
        status: StatusFilter::Excluded,
        ..FilterOptions::default()
    };
    let selected = select(&roster_fixture(), &filters, &SortSpec::default());
    assert_eq!(names(&selected), vec!["Barbara Liskov"]);

    let filters = FilterOptions {
        search: "nobody".to_string(),
        status: StatusFilter::Excluded,
        ..FilterOptions::default()
    };
    let selected = select(&roster_fixture(), &filters, &SortSpec::default());
    assert!(selected.is_empty());
}

#[test]
fn hiding_excluded_candidates_hides_them_in_every_bucket() {
    let filters = FilterOptions {
        show_excluded: false,
        ..FilterOptions::default()
    };
    let selected = select(&roster_fixture(), &filters, &SortSpec::default());
    assert!(!names(&selected).contains(&"Barbara Liskov"));

    let filters = FilterOptions {
        show_excluded: false,
        status: StatusFilter::Excluded,
        ..FilterOptions::default()
    };
    let selected = select(&roster_fixture(), &filters, &SortSpec::default());
    assert!(selected.is_empty());
}

#[test]
fn sorts_by_name_in_both_directions() {
    let sort = SortSpec {
        sort_by: SortField::Name,
        direction: SortDirection::Asc,
    };
    let selected = select(&roster_fixture(), &FilterOptions::default(), &sort);
    assert_eq!(selected[0].name, "Ada Lovelace");
    assert_eq!(selected.last().expect("non-empty").name, "Margaret Hamilton");

    let sort = SortSpec {
        sort_by: SortField::Name,
        direction: SortDirection::Desc,
    };
    let selected = select(&roster_fixture(), &FilterOptions::default(), &sort);
    assert_eq!(selected[0].name, "Margaret Hamilton");
}

#[test]
fn sorts_by_percentage_with_stable_ties() {
    let sort = SortSpec {
        sort_by: SortField::Score,
        direction: SortDirection::Desc,
    };
    let selected = select(&roster_fixture(), &FilterOptions::default(), &sort);
    assert_eq!(selected[0].name, "Ada Lovelace");
    assert_eq!(selected[1].name, "Barbara Liskov");
    // Grace and Linus both sit at 45%; input order decides.
    assert_eq!(selected[2].name, "Grace Hopper");
    assert_eq!(selected[3].name, "Linus Torvalds");

    let sort = SortSpec {
        sort_by: SortField::Score,
        direction: SortDirection::Asc,
    };
    let selected = select(&roster_fixture(), &FilterOptions::default(), &sort);
    let grace = selected
        .iter()
        .position(|candidate| candidate.name == "Grace Hopper")
        .expect("present");
    let linus = selected
        .iter()
        .position(|candidate| candidate.name == "Linus Torvalds")
        .expect("present");
    assert!(grace < linus, "ties keep input order in both directions");
}

#[test]
fn selection_is_idempotent() {
    let candidates = roster_fixture();
    let filters = FilterOptions {
        search: "a".to_string(),
        score_range: Some(40.0),
        ..FilterOptions::default()
    };
    let sort = SortSpec::default();

    let first = select(&candidates, &filters, &sort);
    let second = select(&candidates, &filters, &sort);
    assert_eq!(first, second);
}

#[test]
fn report_views_carry_labels_and_never_the_document_text() {
    let candidate = candidate_with_outcome("Ada Lovelace", 85.0, false, ScreeningStatus::Completed);
    let view = CandidateReportView::from(&candidate);

    assert_eq!(view.name, "Ada Lovelace");
    assert_eq!(view.status, "completed");
    assert_eq!(view.score.as_deref(), Some("85/100"));
    assert_eq!(view.percentage, 85.0);

    let serialized = serde_json::to_string(&view).expect("serializes");
    assert!(!serialized.contains("\"text\""));
}
