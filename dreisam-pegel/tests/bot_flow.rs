use chrono::NaiveTime;
use dreisam_pegel::cli::prepare_update;
use dreisam_pegel_core::config::PegelConfig;
use dreisam_pegel_core::contract::MockFeedSource;
use std::fs;
use tempfile::tempdir;

fn feed(value: i64) -> Vec<u8> {
    format!(
        "var hvz_peg_stmn = [\n ['00389','Ebnet','Dreisam',3,'{value}','cm','01.01.2024 12:00 MEZ','2.31','m3/s'],\n];\n"
    )
    .into_bytes()
}

fn source(value: i64) -> MockFeedSource {
    let mut source = MockFeedSource::new();
    source
        .expect_download()
        .times(1)
        .returning(move |_| Ok(feed(value)));
    source
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn routine_update_at_noon_carries_a_chart() {
    let dir = tempdir().unwrap();
    let update = prepare_update(&PegelConfig::default(), &source(92), dir.path(), at(12, 5), false)
        .await
        .unwrap()
        .expect("noon is inside the schedule");

    assert!(!update.message.is_warning);
    assert!(update.message.text.starts_with("Dreisam-Pegel: 92cm (2024-01-01 12:00)"));
    assert!(update.chart.is_some());
}

#[tokio::test]
async fn outside_schedule_updates_history_but_does_not_post() {
    let dir = tempdir().unwrap();
    let update = prepare_update(&PegelConfig::default(), &source(92), dir.path(), at(6, 0), false)
        .await
        .unwrap();

    assert!(update.is_none());
    assert_eq!(
        fs::read_to_string(dir.path().join("history")).unwrap(),
        "2024-01-01 12:00;92\n"
    );
}

#[tokio::test]
async fn warnings_go_out_every_six_hours() {
    let dir = tempdir().unwrap();
    let update = prepare_update(&PegelConfig::default(), &source(130), dir.path(), at(6, 0), false)
        .await
        .unwrap()
        .expect("warning hours include 06:00");

    assert!(update.message.is_warning);
    assert!(update.message.text.contains("Sperrstufe 2"));
}

#[tokio::test]
async fn force_bypasses_the_schedule() {
    let dir = tempdir().unwrap();
    let update = prepare_update(&PegelConfig::default(), &source(92), dir.path(), at(3, 40), true)
        .await
        .unwrap();
    assert!(update.is_some());
}

#[tokio::test]
async fn pipeline_failure_aborts_before_posting() {
    let dir = tempdir().unwrap();
    let mut source = MockFeedSource::new();
    source
        .expect_download()
        .times(1)
        .returning(|_| Ok(b"var hvz_peg_stmn = [];\n".to_vec()));

    let err = prepare_update(&PegelConfig::default(), &source, dir.path(), at(12, 0), true)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
}
