mod support;

use compress::{CompressionPipeline, NoResize, PipelineSettings, collect_images, run_batch};
use support::{FakeCompressor, setup_workspace};
use tinybatch_core::FailureKind;

fn settings(limit: u64) -> PipelineSettings {
    PipelineSettings {
        max_per_credential: limit,
        max_width: None,
    }
}

#[test]
fn same_content_is_compressed_once_even_after_rename() {
    let ws = setup_workspace();
    let original = ws.write_image("a.png", 800, 1);
    let compressor = FakeCompressor::default();
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(500));

    {
        let mut ledger = ws.open_ledger(&["key-a"], 500);
        let images = collect_images(&ws.source, &[".png".to_string()]).expect("scan");
        let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());
        assert_eq!(stats.compressed, 1);
        assert_eq!(stats.skipped, 0);
    }

    let moved = ws.source.join("renamed/elsewhere.png");
    std::fs::create_dir_all(moved.parent().expect("parent")).expect("create dir");
    std::fs::rename(&original, &moved).expect("rename");

    let mut ledger = ws.open_ledger(&["key-a"], 500);
    let images = collect_images(&ws.source, &[".png".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.total, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.compressed, 0);
    assert_eq!(compressor.calls.borrow().len(), 1);
    assert_eq!(ledger.quota.usage_count("key-a"), 1);
    assert_eq!(ledger.records.len(), 1);
}

#[test]
fn duplicate_content_within_one_run_is_skipped() {
    let ws = setup_workspace();
    ws.write_image("a.png", 300, 9);
    ws.write_image("copy/a.png", 300, 9);
    let compressor = FakeCompressor::default();
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(500));
    let mut ledger = ws.open_ledger(&["key-a"], 500);

    let images = collect_images(&ws.source, &["png".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.compressed, 1);
    assert_eq!(stats.skipped, 1);
}

#[test]
fn keys_rotate_in_order_as_each_fills() {
    let ws = setup_workspace();
    for index in 0..5u8 {
        ws.write_image(&format!("img{index}.png"), 100, index * 10);
    }
    let compressor = FakeCompressor::default();
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(2));
    let mut ledger = ws.open_ledger(&["A", "B", "C"], 2);

    let images = collect_images(&ws.source, &[".png".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.compressed, 5);
    assert_eq!(compressor.credentials_used(), vec!["A", "A", "B", "B", "C"]);
    for key in ["A", "B", "C"] {
        assert!(ledger.quota.usage_count(key) <= 2);
    }
    assert_eq!(ledger.quota.active_index(), 2);
}

#[test]
fn exhaustion_fails_remaining_items_without_stopping() {
    let ws = setup_workspace();
    for index in 0..3u8 {
        ws.write_image(&format!("img{index}.png"), 100, index * 20);
    }
    let compressor = FakeCompressor::default();
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(1));
    let mut ledger = ws.open_ledger(&["A"], 1);

    let images = collect_images(&ws.source, &[".png".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.total, 3);
    assert_eq!(stats.compressed, 1);
    assert_eq!(stats.failed, 2);
    assert!(stats.exhausted);
    assert!(
        stats
            .failures
            .iter()
            .all(|item| item.kind == FailureKind::Exhausted)
    );
    assert_eq!(ledger.quota.usage_count("A"), 1);
}

#[test]
fn account_error_does_not_rotate() {
    let ws = setup_workspace();
    ws.write_image("a.png", 100, 1);
    ws.write_image("b.png", 100, 2);
    let compressor = FakeCompressor::failing(&[FailureKind::Account]);
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(500));
    let mut ledger = ws.open_ledger(&["A", "B"], 500);

    let images = collect_images(&ws.source, &[".png".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.compressed, 1);
    assert_eq!(stats.failures[0].kind, FailureKind::Account);
    assert_eq!(compressor.credentials_used(), vec!["A", "A"]);
}

#[test]
fn output_tree_mirrors_source_and_run_time_is_stamped() {
    let ws = setup_workspace();
    ws.write_image("trip/day1/photo.jpg", 200, 3);
    let compressor = FakeCompressor::default();
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(500));
    let mut ledger = ws.open_ledger(&["A"], 500);

    let images = collect_images(&ws.source, &[".jpg".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.compressed, 1);
    assert!(ws.output.join("trip/day1/photo.jpg").is_file());
    assert!(ledger.quota.state().last_run_time.is_some());
}

#[test]
fn every_item_failing_still_completes() {
    let ws = setup_workspace();
    ws.write_image("a.png", 100, 1);
    ws.write_image("b.png", 100, 2);
    let compressor =
        FakeCompressor::failing(&[FailureKind::Connection, FailureKind::Request]);
    let pipeline = CompressionPipeline::new(&compressor, &NoResize, settings(500));
    let mut ledger = ws.open_ledger(&["A"], 500);

    let images = collect_images(&ws.source, &[".png".to_string()]).expect("scan");
    let stats = run_batch(&mut ledger, &pipeline, &images, &ws.roots());

    assert_eq!(stats.total, 2);
    assert_eq!(stats.failed, 2);
    assert!(!stats.exhausted);
    assert!(ledger.records.is_empty());
}
