use persistence::{delete_season_store, SeasonStore, StoreConfig};
use rating_engine::{render, OutputFormat, PipelineError, Position, RatingConfig, SeasonPipeline, Stage};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("../../player-scraper/tests/fixtures/NBA_2024_per_game.html");

fn config_for(server: &MockServer, dir: &TempDir) -> RatingConfig {
    let mut config = RatingConfig::default();
    config.scraper.base_url = server.uri();
    config.scraper.timeout_secs = 5;
    config.store = StoreConfig::new(dir.path());
    config.pipeline.request_delay_ms = 0;
    config
}

async fn serve_season(server: &MockServer, season: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/leagues/NBA_{season}_per_game.html")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_season_is_stored_and_rated_completely() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_season(&server, 2024, FIXTURE).await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();
    let summary = pipeline.run_season(2024).await.unwrap();

    assert_eq!(summary.rows_stored, 10);
    assert_eq!(summary.rows_rated, 10);
    assert!(summary.source_url.ends_with("/leagues/NBA_2024_per_game.html"));

    let store = SeasonStore::open_existing(&pipeline.config().store, 2024).await.unwrap();
    assert_eq!(store.record_count().await.unwrap(), 10);
    assert!(store.is_rated().await.unwrap());

    let metadata = store.metadata().await.unwrap().unwrap();
    assert_eq!(metadata.row_count, 10);

    let records = store.load_rated_records().await.unwrap();
    let hart = records.iter().find(|r| r.name == "Devin Hart").unwrap();
    assert!((hart.rating_or_zero() - 52.18).abs() < 1e-9);
    store.close().await;
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_season(&server, 2024, FIXTURE).await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();

    pipeline.run_season(2024).await.unwrap();
    let store = SeasonStore::open_existing(&pipeline.config().store, 2024).await.unwrap();
    let first = store.load_rated_records().await.unwrap();
    store.close().await;

    pipeline.run_season(2024).await.unwrap();
    let store = SeasonStore::open_existing(&pipeline.config().store, 2024).await.unwrap();
    let second = store.load_rated_records().await.unwrap();
    store.close().await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_leaderboards_from_fixture() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_season(&server, 2024, FIXTURE).await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();
    pipeline.run_season(2024).await.unwrap();
    let boards = pipeline.leaderboards(2024).await.unwrap();

    let overall: Vec<(&str, &str)> = boards.overall.iter().map(|e| (e.name.as_str(), e.team.as_str())).collect();
    assert_eq!(
        overall,
        vec![
            ("Devin Hart", "DEN"),
            ("Avery Bishop", "BOS"),
            ("Nate Silva", "LAL"),
            ("Marcus Cole", "LAL"),
            ("Jalen Reyes", "TOT"),
            ("Owen Price", "CHI"),
            ("Kai Moreno", "MIA"),
        ]
    );
    // Theo Lang played 45 games
    assert!(boards.overall.iter().all(|e| e.games_played >= 50));

    let bucket = |position: Position| -> Vec<&str> {
        boards
            .by_position
            .iter()
            .find(|b| b.position == position)
            .unwrap()
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    };
    assert_eq!(bucket(Position::PointGuard), vec!["Avery Bishop", "Kai Moreno"]);
    assert_eq!(bucket(Position::ShootingGuard), vec!["Marcus Cole", "Owen Price"]);
    assert!(bucket(Position::SmallForward).is_empty());
    assert_eq!(bucket(Position::PowerForward), vec!["Jalen Reyes"]);
    assert_eq!(bucket(Position::Center), vec!["Devin Hart", "Nate Silva"]);

    let total: usize = boards.by_position.iter().map(|b| b.entries.len()).sum();
    assert_eq!(total, boards.overall.len());

    let teams: Vec<&str> = boards.by_team.iter().map(|b| b.team.as_str()).collect();
    assert_eq!(teams, vec!["BOS", "CHI", "DEN", "LAL", "MIA"]);

    let bos = &boards.by_team[0];
    assert_eq!(bos.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["Avery Bishop", "Theo Lang"]);

    let chi = &boards.by_team[1];
    assert_eq!(chi.entries[0].name, "Jalen Reyes");
    assert_eq!(chi.entries[0].games_played, 40);

    let lal = &boards.by_team[3];
    assert_eq!(lal.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["Nate Silva", "Marcus Cole"]);
}

#[tokio::test]
async fn test_failed_season_does_not_stop_later_seasons() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/leagues/NBA_2023_per_game.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    serve_season(&server, 2024, FIXTURE).await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();
    let report = pipeline.run_all(&[2023, 2024]).await;

    assert!(!report.is_success());
    assert_eq!(report.failed_seasons(), vec![2023]);
    assert!(matches!(report.failed[0], PipelineError::Network { season: 2023, .. }));
    assert_eq!(report.failed[0].stage(), Stage::Fetch);

    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.completed[0].season, 2024);
    assert!(pipeline.leaderboards(2024).await.is_ok());
}

#[tokio::test]
async fn test_unknown_header_halts_season_and_keeps_previous_table() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_season(&server, 2024, FIXTURE).await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();
    pipeline.run_season(2024).await.unwrap();

    server.reset().await;
    serve_season(&server, 2024, &FIXTURE.replace(">MP<", ">MPX<")).await;

    let err = pipeline.run_season(2024).await.unwrap_err();
    assert_eq!(err.stage(), Stage::Map);
    assert!(err.to_string().contains("MPX"));

    let store = SeasonStore::open_existing(&pipeline.config().store, 2024).await.unwrap();
    assert_eq!(store.record_count().await.unwrap(), 10);
    assert!(store.is_rated().await.unwrap());
    store.close().await;
}

#[tokio::test]
async fn test_missing_table_is_parse_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_season(&server, 2024, "<html><body><p>Page moved</p></body></html>").await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();
    let err = pipeline.run_season(2024).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Parse);
    assert!(!pipeline.config().store.store_path(2024).exists());
}

#[tokio::test]
async fn test_report_output_and_deletion() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve_season(&server, 2024, FIXTURE).await;

    let pipeline = SeasonPipeline::new(config_for(&server, &dir)).unwrap();
    pipeline.run_season(2024).await.unwrap();

    let boards = pipeline.leaderboards(2024).await.unwrap();
    let text = render(std::slice::from_ref(&boards), OutputFormat::Text).unwrap();
    assert!(text.contains("Top 7 players of 2024 (50+ games)"));
    assert!(text.contains("Top Centers of 2024"));
    assert!(text.contains("Top players of MIA in 2024"));

    let json = render(&[boards], OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["overall"][0]["name"], "Devin Hart");

    let outcome = delete_season_store(&pipeline.config().store, 2024).await.unwrap();
    assert!(outcome.was_deleted());

    let err = pipeline.leaderboards(2024).await.unwrap_err();
    assert_eq!(err.stage(), Stage::Report);
}
