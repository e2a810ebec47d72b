mod common;

use std::sync::Arc;
use std::time::Duration;

use candidate_scout::core::analyzer::ProfileAnalyzer;
use candidate_scout::core::errors::CoreError;
use candidate_scout::core::extractor::ProfileExtractor;
use candidate_scout::core::row_store::RowStore;
use candidate_scout::{run_with_session, ScoutService};

use common::{browser_settings, CannedModel, FakePage, Fixture, MemorySheet, PROFILE_PAGE, SIGN_IN_PAGE};

const URL_A: &str = "https://profiles.test/users/a";
const URL_B: &str = "https://profiles.test/users/b";
const URL_C: &str = "https://profiles.test/users/c";

fn service(sheet: &Arc<MemorySheet>, page: &Arc<FakePage>, model: &Arc<CannedModel>) -> ScoutService {
    let analyzer = ProfileAnalyzer::new(model.clone());
    let extractor = ProfileExtractor::new(page.clone(), analyzer.clone(), &browser_settings());
    ScoutService::new(RowStore::new(sheet.clone()), extractor, analyzer, Duration::ZERO)
}

fn extractor(page: &Arc<FakePage>, model: &Arc<CannedModel>) -> ProfileExtractor {
    ProfileExtractor::new(page.clone(), ProfileAnalyzer::new(model.clone()), &browser_settings())
}

#[tokio::test]
async fn pending_rows_are_scraped_rated_and_completed() {
    let sheet = MemorySheet::queue(&[("a", "pending"), ("b", "completed"), ("c", "")]);
    let page = FakePage::new(vec![
        (URL_A, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_B, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_C, Fixture::Html(PROFILE_PAGE.to_string())),
    ]);
    let model = CannedModel::new();

    service(&sheet, &page, &model).run().await.unwrap();

    assert_eq!(page.visited(), vec![URL_A, URL_C]);

    for index in [0, 2] {
        assert_eq!(sheet.cell(index, "status"), "completed");
        assert_eq!(sheet.cell(index, "age"), "29歳");
        assert_eq!(sheet.cell(index, "skills"), "Rust, TypeScript, AWS");
        assert_eq!(sheet.cell(index, "preferredLocation"), "東京都");
        assert_eq!(sheet.cell(index, "preferredSalary"), "800万円");
        assert_eq!(
            sheet.cell(index, "ambition"),
            "プロダクトの技術責任者として事業を伸ばしたい"
        );
        assert_eq!(
            sheet.cell(index, "careerSummary"),
            "決済領域に強いバックエンドエンジニア"
        );
        assert_eq!(
            sheet.cell(index, "careerSummaryAnalysis"),
            "決済領域に強いバックエンドエンジニア"
        );
        assert_eq!(
            sheet.cell(index, "careerSummaryHighlights"),
            r#"[{"point":"決済基盤の刷新","reason":"事業の中核","impact":"設計力"}]"#
        );
        assert_eq!(sheet.cell(index, "motivationLevel"), "4");
        assert_eq!(sheet.cell(index, "ambitionSummary"), "技術責任者を目指している");
        assert_eq!(sheet.cell(index, "recommendPoint"), "7");
        assert!(!sheet.cell(index, "lastUpdated").is_empty());
        assert_eq!(sheet.cell(index, "id"), if index == 0 { "a" } else { "c" });
    }

    assert_eq!(sheet.cell(1, "status"), "completed");
    assert_eq!(sheet.cell(1, "age"), "");
    assert_eq!(sheet.cell(1, "lastUpdated"), "");
    assert!(!sheet.written_rows().contains(&1));

    // processing + completed for each of the two rows
    assert_eq!(sheet.written_rows(), vec![0, 0, 2, 2]);
    assert_eq!(
        model.calls(),
        vec!["career", "career", "rating", "career", "career", "rating"]
    );
}

#[tokio::test]
async fn failed_extraction_marks_only_that_row_as_error() {
    let sheet = MemorySheet::queue(&[("a", "pending"), ("b", "completed"), ("c", "pending")]);
    let page = FakePage::new(vec![
        (URL_A, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_C, Fixture::Unreachable),
    ]);
    let model = CannedModel::new();

    service(&sheet, &page, &model).run().await.unwrap();

    assert_eq!(sheet.cell(0, "status"), "completed");
    assert_eq!(sheet.cell(1, "status"), "completed");
    assert_eq!(sheet.cell(2, "status"), "error");
    assert_eq!(sheet.cell(2, "age"), "");
    assert_eq!(sheet.cell(2, "id"), "c");
}

#[tokio::test]
async fn rating_failure_marks_row_as_error_and_batch_continues() {
    let sheet = MemorySheet::queue(&[("a", "pending"), ("c", "pending")]);
    let page = FakePage::new(vec![
        (URL_A, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_C, Fixture::Html(PROFILE_PAGE.to_string())),
    ]);
    let model = CannedModel::failing_rating();

    service(&sheet, &page, &model).run().await.unwrap();

    assert_eq!(sheet.cell(0, "status"), "error");
    assert_eq!(sheet.cell(1, "status"), "error");
    assert_eq!(page.visited(), vec![URL_A, URL_C]);
}

#[tokio::test]
async fn sign_in_failure_on_every_page_still_finishes_the_batch() {
    let sheet = MemorySheet::queue(&[("a", "pending"), ("c", "pending")]);
    let page = FakePage::new(vec![
        (URL_A, Fixture::Html(SIGN_IN_PAGE.to_string())),
        (URL_C, Fixture::Html(SIGN_IN_PAGE.to_string())),
    ]);
    let model = CannedModel::new();

    service(&sheet, &page, &model).run().await.unwrap();

    assert_eq!(sheet.cell(0, "status"), "error");
    assert_eq!(sheet.cell(1, "status"), "error");
    assert_eq!(page.content_reads(), 0);
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn unreachable_spreadsheet_aborts_before_any_page_is_opened() {
    let sheet = MemorySheet::unreachable();
    let page = FakePage::new(vec![]);
    let model = CannedModel::new();

    let err = service(&sheet, &page, &model).run().await.unwrap_err();

    assert!(format!("{err:#}").contains("Spreadsheet initialization failed"));
    assert!(page.visited().is_empty());
}

#[tokio::test]
async fn empty_queue_is_a_successful_run() {
    let sheet = MemorySheet::queue(&[("a", "completed"), ("b", "error")]);
    let page = FakePage::new(vec![]);
    let model = CannedModel::new();

    service(&sheet, &page, &model).run().await.unwrap();

    assert!(page.visited().is_empty());
    assert_eq!(sheet.write_count(), 0);
}

#[tokio::test]
async fn sign_in_redirect_is_not_authenticated_and_skips_content() {
    let page = FakePage::new(vec![(URL_A, Fixture::Html(SIGN_IN_PAGE.to_string()))]);
    let model = CannedModel::new();

    let err = extractor(&page, &model).extract("a").await.unwrap_err();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotAuthenticated { url }) => assert_eq!(url, URL_A),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(page.content_reads(), 0);
}

#[tokio::test]
async fn missing_content_box_is_element_not_found() {
    let html = "<html><body><div class=\"p-resume-header\"><h1>user</h1></div></body></html>";
    let page = FakePage::new(vec![(URL_A, Fixture::Html(html.to_string()))]);
    let model = CannedModel::new();

    let err = extractor(&page, &model).extract("a").await.unwrap_err();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::ElementNotFound { selector, url }) => {
            assert_eq!(selector, ".ibox");
            assert_eq!(url, URL_A);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(page.content_reads(), 0);
}

#[tokio::test]
async fn extraction_returns_scraped_fields_and_career_analysis() {
    let page = FakePage::new(vec![(URL_A, Fixture::Html(PROFILE_PAGE.to_string()))]);
    let model = CannedModel::new();

    let profile = extractor(&page, &model).extract("a").await.unwrap();

    assert_eq!(profile.age, "29歳");
    assert_eq!(profile.skills, "Rust, TypeScript, AWS");
    assert_eq!(profile.preferred_location, "東京都");
    assert_eq!(profile.preferred_salary, "800万円");
    assert_eq!(profile.career_summary, "決済領域に強いバックエンドエンジニア");
    assert_eq!(profile.recommend_point.as_deref(), Some("7"));
    assert_eq!(page.content_reads(), 1);
    assert_eq!(model.calls(), vec!["career"]);
}

#[tokio::test]
async fn page_is_closed_when_spreadsheet_setup_fails() {
    let sheet = MemorySheet::unreachable();
    let page = FakePage::new(vec![]);
    let model = CannedModel::new();

    let result = run_with_session(
        page.clone(),
        RowStore::new(sheet.clone()),
        ProfileAnalyzer::new(model.clone()),
        &browser_settings(),
        Duration::ZERO,
    )
    .await;

    assert!(result.is_err());
    assert!(page.is_closed());
    assert!(page.visited().is_empty());
}

#[tokio::test]
async fn page_is_closed_after_a_completed_batch() {
    let sheet = MemorySheet::queue(&[("a", "pending")]);
    let page = FakePage::new(vec![(URL_A, Fixture::Html(PROFILE_PAGE.to_string()))]);
    let model = CannedModel::new();

    run_with_session(
        page.clone(),
        RowStore::new(sheet.clone()),
        ProfileAnalyzer::new(model.clone()),
        &browser_settings(),
        Duration::ZERO,
    )
    .await
    .unwrap();

    assert_eq!(sheet.cell(0, "status"), "completed");
    assert!(page.is_closed());
}

#[tokio::test(start_paused = true)]
async fn throttle_separates_items_including_after_a_failure() {
    let sheet = MemorySheet::queue(&[("a", "pending"), ("b", "pending"), ("c", "pending")]);
    let page = FakePage::new(vec![
        (URL_A, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_B, Fixture::Unreachable),
        (URL_C, Fixture::Html(PROFILE_PAGE.to_string())),
    ]);
    let model = CannedModel::new();
    let throttle = Duration::from_secs(2);

    let analyzer = ProfileAnalyzer::new(model.clone());
    let extractor = ProfileExtractor::new(page.clone(), analyzer.clone(), &browser_settings());
    let service = ScoutService::new(RowStore::new(sheet.clone()), extractor, analyzer, throttle);

    let started = tokio::time::Instant::now();
    service.run().await.unwrap();

    assert_eq!(started.elapsed(), throttle * 2);
    assert_eq!(sheet.cell(0, "status"), "completed");
    assert_eq!(sheet.cell(1, "status"), "error");
    assert_eq!(sheet.cell(2, "status"), "completed");
}

#[tokio::test]
async fn row_removed_mid_run_is_skipped_without_a_write() {
    let sheet = MemorySheet::queue_with_vanishing(
        &[("a", "pending"), ("b", "pending"), ("c", "pending")],
        "b",
    );
    let page = FakePage::new(vec![
        (URL_A, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_B, Fixture::Html(PROFILE_PAGE.to_string())),
        (URL_C, Fixture::Html(PROFILE_PAGE.to_string())),
    ]);
    let model = CannedModel::new();

    service(&sheet, &page, &model).run().await.unwrap();

    assert_eq!(page.visited(), vec![URL_A, URL_C]);
    assert!(!sheet.written_rows().contains(&1));
    assert_eq!(sheet.cell(1, "status"), "pending");
    assert_eq!(sheet.cell(0, "status"), "completed");
    assert_eq!(sheet.cell(2, "status"), "completed");
}
