//! Integration tests for experiment directory loading
//!
//! Fixtures are written to temp directories in the trainer's layout:
//! `<output>/<experiment>/{config.txt, result.npz, result.test.npz}`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use cfr_results::experiment::{
    experiment_dirs, load_results, load_single_result, scan_results, LoadOutcome, SkipReason,
    COMBINED_RESULTS_FILE, CONFIG_FILE, TEST_RESULT_FILE, TRAIN_RESULT_FILE,
};
use cfr_results::Error;
use ndarray::{Array, Array1, Array3, Array4};
use ndarray_npy::NpzWriter;
use tempfile::TempDir;

/// Write a train/test archive holding a zero-filled `pred` of the given shape.
fn write_pred_archive(path: &Path, shape: (usize, usize, usize, usize)) {
    let mut npz = NpzWriter::new(File::create(path).unwrap());
    npz.add_array("pred", &Array4::<f64>::zeros(shape)).unwrap();
    npz.add_array("loss", &Array1::<f64>::zeros(3)).unwrap();
    npz.finish().unwrap();
}

fn write_experiment(
    root: &Path,
    name: &str,
    config: Option<&str>,
    pred_shape: (usize, usize, usize, usize),
) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    if let Some(config) = config {
        fs::write(dir.join(CONFIG_FILE), config).unwrap();
    }
    write_pred_archive(&dir.join(TRAIN_RESULT_FILE), pred_shape);
    dir
}

const FIVE_REPS: &str = "p_alpha: 0.1\nrepetitions: 5\nexperiments: 1\nloss: l2\nuse_bn: False\n";

// =============================================================================
// load_single_result
// =============================================================================

#[test]
fn test_complete_run_is_loaded() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(root.path(), "alpha_0.1", Some(FIVE_REPS), (20, 1, 5, 4));

    let result = load_single_result(&dir).into_result().expect("run should load");
    assert_eq!(result.name(), "alpha_0.1");
    assert_eq!(result.repetitions(), 5);
    assert_eq!(result.predictions().unwrap().shape(), &[20, 1, 5, 4]);
    assert!(result.train().contains("loss"));
    assert!(result.test().is_none());
    assert!((result.config().get_float("p_alpha").unwrap() - 0.1).abs() < f64::EPSILON);
    assert!(!result.config().get_bool("use_bn").unwrap());
}

#[test]
fn test_too_few_repetitions_is_incomplete() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(root.path(), "unfinished", Some(FIVE_REPS), (20, 1, 3, 4));

    match load_single_result(&dir) {
        LoadOutcome::SkippedIncomplete {
            required, found, ..
        } => {
            assert_eq!(required, 5);
            assert_eq!(found, Some(3));
        }
        other => panic!("expected incomplete, got {other:?}"),
    }
}

#[test]
fn test_experiments_key_raises_requirement() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(
        root.path(),
        "many_experiments",
        Some("repetitions: 1\nexperiments: 10\n"),
        (20, 1, 5, 4),
    );

    let outcome = load_single_result(&dir);
    assert_eq!(outcome.skip_reason(), Some(SkipReason::Incomplete));
}

#[test]
fn test_missing_repetition_keys_are_not_loaded() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(root.path(), "keyless", Some("p_alpha: 0.1\n"), (4, 1, 1, 2));

    match load_single_result(&dir) {
        LoadOutcome::SkippedUnreadable { reason, .. } => {
            assert!(reason.contains("repetitions"), "reason: {reason}");
        }
        other => panic!("expected unreadable, got {other:?}"),
    }
}

#[test]
fn test_missing_experiments_key_is_not_loaded() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(
        root.path(),
        "half_config",
        Some("repetitions: 1\n"),
        (4, 1, 1, 2),
    );

    let outcome = load_single_result(&dir);
    assert!(!outcome.is_loaded());
    assert_eq!(outcome.skip_reason(), Some(SkipReason::Unreadable));
}

#[test]
fn test_low_rank_pred_is_incomplete() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("flat_pred");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(CONFIG_FILE), "repetitions: 1\nexperiments: 1\n").unwrap();
    let mut npz = NpzWriter::new(File::create(dir.join(TRAIN_RESULT_FILE)).unwrap());
    npz.add_array("pred", &Array3::<f64>::zeros((20, 1, 5))).unwrap();
    npz.finish().unwrap();

    match load_single_result(&dir) {
        LoadOutcome::SkippedIncomplete { found, .. } => assert_eq!(found, None),
        other => panic!("expected incomplete, got {other:?}"),
    }
}

#[test]
fn test_missing_pred_is_incomplete() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("no_pred");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(CONFIG_FILE), "repetitions: 1\nexperiments: 1\n").unwrap();
    let mut npz = NpzWriter::new(File::create(dir.join(TRAIN_RESULT_FILE)).unwrap());
    npz.add_array("loss", &Array1::<f64>::zeros(2)).unwrap();
    npz.finish().unwrap();

    assert_eq!(
        load_single_result(&dir).skip_reason(),
        Some(SkipReason::Incomplete)
    );
}

#[test]
fn test_missing_config_is_skipped() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(root.path(), "no_config", None, (20, 1, 5, 4));

    let outcome = load_single_result(&dir);
    assert_eq!(outcome, LoadOutcome::SkippedNoConfig { dir });
}

#[test]
fn test_missing_archive_returns_skip() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("empty_run");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(CONFIG_FILE), FIVE_REPS).unwrap();

    let outcome = load_single_result(&dir);
    assert!(!outcome.is_loaded());
    assert_eq!(outcome.skip_reason(), Some(SkipReason::Unreadable));
}

#[test]
fn test_test_archive_is_attached() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(root.path(), "with_test", Some(FIVE_REPS), (20, 1, 5, 4));
    write_pred_archive(&dir.join(TEST_RESULT_FILE), (5, 1, 5, 4));

    let result = load_single_result(&dir).into_result().unwrap();
    let test = result.test().expect("test archive should load");
    assert_eq!(test.get("pred").unwrap().shape(), &[5, 1, 5, 4]);
}

#[test]
fn test_corrupt_test_archive_is_unreadable() {
    let root = TempDir::new().unwrap();
    let dir = write_experiment(root.path(), "bad_test", Some(FIVE_REPS), (20, 1, 5, 4));
    fs::write(dir.join(TEST_RESULT_FILE), b"truncated").unwrap();

    assert_eq!(
        load_single_result(&dir).skip_reason(),
        Some(SkipReason::Unreadable)
    );
}

#[test]
fn test_integer_and_f32_arrays_are_widened() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("dtypes");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(CONFIG_FILE), "repetitions: 2\nexperiments: 1\n").unwrap();
    let mut npz = NpzWriter::new(File::create(dir.join(TRAIN_RESULT_FILE)).unwrap());
    npz.add_array("pred", &Array4::<f32>::from_elem((3, 1, 2, 1), 1.5))
        .unwrap();
    npz.add_array("I_valid", &Array::from_vec(vec![0_i64, 4, 7]))
        .unwrap();
    npz.finish().unwrap();

    let result = load_single_result(&dir).into_result().unwrap();
    let pred = result.predictions().unwrap();
    assert!(pred.iter().all(|&v| (v - 1.5).abs() < f64::EPSILON));
    let valid = result.train().get("I_valid").unwrap();
    assert_eq!(valid.iter().copied().collect::<Vec<_>>(), vec![0.0, 4.0, 7.0]);
}

// =============================================================================
// load_results / scan_results
// =============================================================================

#[test]
fn test_results_sorted_by_directory_name() {
    let root = TempDir::new().unwrap();
    for name in ["run_c", "run_a", "run_b", "run_10", "run_2"] {
        write_experiment(root.path(), name, Some(FIVE_REPS), (10, 1, 5, 2));
    }

    let results = load_results(root.path()).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["run_10", "run_2", "run_a", "run_b", "run_c"]);
}

#[test]
fn test_scan_keeps_skip_reasons() {
    let root = TempDir::new().unwrap();
    write_experiment(root.path(), "a_done", Some(FIVE_REPS), (10, 1, 5, 2));
    write_experiment(root.path(), "b_unfinished", Some(FIVE_REPS), (10, 1, 2, 2));
    write_experiment(root.path(), "c_no_config", None, (10, 1, 5, 2));
    write_experiment(root.path(), "d_done", Some(FIVE_REPS), (10, 1, 6, 2));

    let set = scan_results(root.path()).unwrap();
    assert_eq!(set.candidates(), 4);
    let names: Vec<&str> = set.results().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["a_done", "d_done"]);

    let counts = set.skip_counts();
    assert_eq!(counts.get(&SkipReason::Incomplete), Some(&1));
    assert_eq!(counts.get(&SkipReason::NoConfig), Some(&1));
    assert_eq!(set.skipped()[0].dir, root.path().join("b_unfinished"));
}

#[test]
fn test_directories_without_archive_are_not_candidates() {
    let root = TempDir::new().unwrap();
    write_experiment(root.path(), "real_run", Some(FIVE_REPS), (10, 1, 5, 2));
    fs::create_dir_all(root.path().join("logs")).unwrap();
    fs::write(root.path().join("logs").join(CONFIG_FILE), FIVE_REPS).unwrap();
    fs::write(root.path().join("stray_file.txt"), "not a directory").unwrap();

    let dirs = experiment_dirs(root.path()).unwrap();
    assert_eq!(dirs, vec![root.path().join("real_run")]);

    let set = scan_results(root.path()).unwrap();
    assert_eq!(set.candidates(), 1);
    assert!(set.skipped().is_empty());
}

#[test]
fn test_combined_results_file_is_ignored() {
    let root = TempDir::new().unwrap();
    write_pred_archive(&root.path().join(COMBINED_RESULTS_FILE), (10, 1, 5, 2));
    write_experiment(root.path(), "run", Some(FIVE_REPS), (10, 1, 5, 2));

    let results = load_results(root.path()).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_empty_output_dir() {
    let root = TempDir::new().unwrap();
    let set = scan_results(root.path()).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.candidates(), 0);
}

#[test]
fn test_missing_output_dir_is_fatal() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("does_not_exist");

    let err = load_results(&missing).unwrap_err();
    assert!(matches!(err, Error::OutputNotFound(ref p) if p == &missing));
    assert!(format!("{err}").contains("Could not find output"));
}
