//! End-to-end batch processing over a directory of synthetic log files

use preslog::accumulator::BehaviorAccumulator;
use preslog::pipeline::process_directory;

const RUN1: &str = "\
Scenario - localizer
Logfile written - 06/12/2024

Subject\tTrial\tCode\tTime\tStim Type
S01\t1\tblock_faces\t100000\t
S01\t2\tcue_left\t200000\thit
S01\t3\ttarget_flash\t300000\thit
S01\t4\tend_block\t400000\tmiss
";

const RUN2: &str = "\
Scenario - localizer
Logfile written - 06/12/2024

Subject\tTrial\tCode\tTime\tStim Type
S01\t1\tblock_houses\t0\tmiss
S01\t2\tend_block\t150000\tmiss
";

// No subject column under either metadata offset
const NO_SUBJECT: &str = "\
meta
meta
Trial\tCode\tTime
1\tblock1\t0
2\tend_block\t10000
";

// Three block markers cannot be paired
const ODD_MARKERS: &str = "\
meta
meta
Subject\tCode\tTime
S02\tblock1\t0
S02\tend_block\t10000
S02\tblock2\t20000
";

fn write_logs(dir: &std::path::Path) {
    std::fs::write(dir.join("S01_run1.log"), RUN1).unwrap();
    std::fs::write(dir.join("S01_run2.log"), RUN2).unwrap();
    std::fs::write(dir.join("bad_run3.log"), NO_SUBJECT).unwrap();
    std::fs::write(dir.join("odd_run4.log"), ODD_MARKERS).unwrap();
}

#[test]
fn batch_processes_good_files_and_skips_bad_ones() {
    let dir = tempfile::tempdir().unwrap();
    write_logs(dir.path());

    let outcomes = process_directory(dir.path(), dir.path()).unwrap();
    assert_eq!(outcomes.len(), 4);

    // Sorted by file name: S01_run1, S01_run2, bad_run3, odd_run4
    assert!(outcomes[0].outcome.is_ok());
    assert!(outcomes[1].outcome.is_ok());
    assert!(outcomes[2].outcome.is_err());
    assert!(outcomes[3].outcome.is_err());

    let run1 = outcomes[0].outcome.as_ref().unwrap();
    assert_eq!(run1.subject_id, "S01");
    assert_eq!(run1.run_id, "run1");
    assert_eq!(run1.interval_rows, 2);
}

#[test]
fn batch_writes_expected_result_csvs() {
    let dir = tempfile::tempdir().unwrap();
    write_logs(dir.path());
    process_directory(dir.path(), dir.path()).unwrap();

    let csv = std::fs::read_to_string(dir.path().join("results_S01_run1.csv")).unwrap();
    assert_eq!(
        csv,
        ",Code,StartTime,EndTime,target\n\
         0,block_faces,0,30,1\n\
         1,cue_left,10,10,0\n"
    );

    let csv2 = std::fs::read_to_string(dir.path().join("results_S01_run2.csv")).unwrap();
    assert_eq!(
        csv2,
        ",Code,StartTime,EndTime,target\n\
         0,block_houses,0,15,0\n"
    );
}

#[test]
fn failed_files_write_no_outputs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("odd_run4.log"), ODD_MARKERS).unwrap();
    std::fs::write(dir.path().join("bad_run3.log"), NO_SUBJECT).unwrap();

    process_directory(dir.path(), dir.path()).unwrap();

    let written: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".csv") || n.ends_with(".json"))
        .collect();
    assert!(written.is_empty(), "unexpected outputs: {written:?}");
}

#[test]
fn accumulator_save_failure_leaves_no_csv() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();
    std::fs::write(dir.path().join("S01_run1.log"), RUN1).unwrap();

    // A directory squatting on the accumulator path makes its save fail
    std::fs::create_dir(BehaviorAccumulator::path_for(&out_dir, "S01")).unwrap();

    let outcomes = process_directory(dir.path(), &out_dir).unwrap();
    assert!(outcomes[0].outcome.is_err());

    // The staged CSV must not become visible, and no temp files may remain
    let leftovers: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".csv") || n.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "unexpected outputs: {leftovers:?}");
}

#[test]
fn accumulator_collects_tallies_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    write_logs(dir.path());
    process_directory(dir.path(), dir.path()).unwrap();

    let acc_path = BehaviorAccumulator::path_for(dir.path(), "S01");
    let acc = BehaviorAccumulator::load_or_default(&acc_path);

    // run1: hit x2, miss x1; run2: miss x2
    assert_eq!(acc.entries.len(), 3);
    assert_eq!(acc.entries[0].run, "run1");
    assert_eq!(acc.entries[0].lvl, "hit");
    assert_eq!(acc.entries[0].results, 2);
    assert_eq!(acc.entries[1].run, "run1");
    assert_eq!(acc.entries[1].lvl, "miss");
    assert_eq!(acc.entries[1].results, 1);
    assert_eq!(acc.entries[2].run, "run2");
    assert_eq!(acc.entries[2].lvl, "miss");
    assert_eq!(acc.entries[2].results, 2);
    assert!(acc.updated_at.is_some());
}

#[test]
fn separate_subjects_get_separate_accumulators() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("S01_run1.log"), RUN1).unwrap();
    let other = RUN2.replace("S01", "S03");
    std::fs::write(dir.path().join("S03_run2.log"), other).unwrap();

    process_directory(dir.path(), dir.path()).unwrap();

    assert!(BehaviorAccumulator::path_for(dir.path(), "S01").exists());
    assert!(BehaviorAccumulator::path_for(dir.path(), "S03").exists());
}
