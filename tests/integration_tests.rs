use file_sorter::cli::{SortOptions, run_cli};
use file_sorter::{IgnoreLedger, LEDGER_FILE_NAME, Outcome, SortError};
/// Integration tests for file-sorter
///
/// These tests run complete sort passes over temporary directories.
///
/// Test categories:
/// 1. Basic sorting by extension
/// 2. Name collisions and deduplication
/// 3. Ignore ledger and repeated runs
/// 4. Sorting by modification date
/// 5. Reserved files and configuration
/// 6. Dry-run mode and error scenarios
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory to sort, with helpers to build and inspect it.
struct TestFixture {
    temp_dir: TempDir,
    config_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(config_dir.path().join("config.toml"), "").expect("Failed to write config");
        TestFixture {
            temp_dir,
            config_dir,
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_file(&self, name: &str, content: &str) {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content.as_bytes())
            .expect("Failed to write file content");
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir_all(self.path().join(name)).expect("Failed to create subdirectory");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path))
            .unwrap_or_else(|_| panic!("Failed to read {}", rel_path))
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.is_dir(),
            "Directory should exist: {}",
            path.display()
        );
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Names directly inside `rel_path`, sorted.
    fn list(&self, rel_path: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path().join(rel_path))
            .expect("Failed to read directory")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Regular files left in the root, excluding the ledger file.
    fn root_files(&self) -> Vec<String> {
        self.list("")
            .into_iter()
            .filter(|name| name != LEDGER_FILE_NAME && self.path().join(name).is_file())
            .collect()
    }

    fn ledger_names(&self) -> BTreeSet<String> {
        self.read(LEDGER_FILE_NAME)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Options for a quiet run that treats `<fixture>/file-sorter` as the executable
    /// and reads an empty configuration file kept outside the sorted directory.
    fn options(&self) -> SortOptions {
        SortOptions {
            quiet: true,
            config_path: Some(self.config_dir.path().join("config.toml")),
            executable: Some(self.executable()),
            ..Default::default()
        }
    }

    fn executable(&self) -> PathBuf {
        self.path().join("file-sorter")
    }

    fn sort(&self) -> file_sorter::RunSummary {
        run_cli(self.path(), &self.options()).expect("Sort run should succeed")
    }

    fn sort_with(&self, criteria: &str) -> file_sorter::RunSummary {
        let options = SortOptions {
            criteria: Some(criteria.to_string()),
            ..self.options()
        };
        run_cli(self.path(), &options).expect("Sort run should succeed")
    }
}

// ============================================================================
// Test Suite 1: Basic Sorting
// ============================================================================

#[test]
fn test_sort_empty_directory() {
    let fixture = TestFixture::new();

    let summary = fixture.sort();

    assert!(summary.reconciled.is_empty());
    fixture.assert_file_exists(LEDGER_FILE_NAME);
    assert_eq!(fixture.read(LEDGER_FILE_NAME), "");
    assert_eq!(fixture.list(""), vec![LEDGER_FILE_NAME.to_string()]);
}

#[test]
fn test_files_move_into_extension_folders() {
    let fixture = TestFixture::new();
    fixture.create_file("photo.JPG", "jpeg bytes");
    fixture.create_file("report.pdf", "pdf bytes");
    fixture.create_file("Makefile", "all:");
    fixture.create_file("archive.tar.gz", "gzip bytes");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::Moved), 4);
    fixture.assert_file_exists("jpg/photo.JPG");
    fixture.assert_file_exists("pdf/report.pdf");
    fixture.assert_file_exists("none/Makefile");
    fixture.assert_file_exists("gz/archive.tar.gz");
    assert!(fixture.root_files().is_empty());
}

#[test]
fn test_same_content_different_names_both_move() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "X");
    fixture.create_file("b.txt", "X");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::Moved), 2);
    assert_eq!(summary.count(Outcome::Deduplicated), 0);
    assert_eq!(fixture.list("txt"), vec!["a.txt", "b.txt"]);
    fixture.assert_not_exists("a.txt");
    fixture.assert_not_exists("b.txt");
}

#[test]
fn test_subdirectory_moves_into_dirs() {
    let fixture = TestFixture::new();
    fixture.create_file("project/src/main.rs", "fn main() {}");

    fixture.sort();

    fixture.assert_dir_exists("dirs/project");
    fixture.assert_file_exists("dirs/project/src/main.rs");
    fixture.assert_not_exists("project");
}

#[test]
fn test_many_files_are_all_sorted() {
    let fixture = TestFixture::new();
    for i in 0..60 {
        let ext = ["png", "txt", "mp3", "zip"][i % 4];
        fixture.create_file(&format!("file_{}.{}", i, ext), &format!("content {}", i));
    }

    let summary = fixture.sort();

    assert_eq!(summary.reconciled.len(), 60);
    assert!(fixture.root_files().is_empty());
    for ext in ["png", "txt", "mp3", "zip"] {
        assert_eq!(fixture.list(ext).len(), 15, "{} folder", ext);
    }
}

// ============================================================================
// Test Suite 2: Collisions and Deduplication
// ============================================================================

#[test]
fn test_same_name_same_content_keeps_one_copy() {
    let fixture = TestFixture::new();
    fixture.create_file("txt/notes.txt", "identical");
    fixture.create_file("notes.txt", "identical");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::Deduplicated), 1);
    assert_eq!(fixture.list("txt"), vec!["notes.txt"]);
    assert_eq!(fixture.read("txt/notes.txt"), "identical");
    fixture.assert_not_exists("notes.txt");
}

#[test]
fn test_same_name_different_content_is_disambiguated() {
    let fixture = TestFixture::new();
    fixture.create_file("pdf/report.pdf", "old");
    fixture.create_file("report.pdf", "new");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::MovedDisambiguated), 1);
    // md5("new")
    let renamed = "pdf/report.pdf-22af645d1859cb5ca6da0c484f1f37ea.pdf";
    assert_eq!(fixture.read("pdf/report.pdf"), "old");
    assert_eq!(fixture.read(renamed), "new");
    assert_eq!(fixture.list("pdf").len(), 2);
    fixture.assert_not_exists("report.pdf");
}

#[test]
fn test_repeated_collision_is_deduplicated() {
    let fixture = TestFixture::new();
    fixture.create_file("pdf/report.pdf", "old");
    fixture.create_file("pdf/report.pdf-22af645d1859cb5ca6da0c484f1f37ea.pdf", "new");
    fixture.create_file("report.pdf", "new");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::Deduplicated), 1);
    assert_eq!(fixture.list("pdf").len(), 2);
    fixture.assert_not_exists("report.pdf");
}

#[test]
fn test_duplicate_directory_is_removed() {
    let fixture = TestFixture::new();
    fixture.create_file("dirs/album/track.mp3", "audio");
    fixture.create_file("album/track.mp3", "audio");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::Deduplicated), 1);
    fixture.assert_not_exists("album");
    fixture.assert_file_exists("dirs/album/track.mp3");
}

#[test]
fn test_different_directory_with_same_name_is_disambiguated() {
    let fixture = TestFixture::new();
    fixture.create_file("dirs/album/track.mp3", "first");
    fixture.create_file("album/track.mp3", "second");

    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::MovedDisambiguated), 1);
    let renamed = summary.reconciled[0].placement.target().to_path_buf();
    let renamed_name = renamed.file_name().unwrap().to_string_lossy().to_string();
    assert!(renamed_name.starts_with("album-"));
    assert!(renamed_name.ends_with(".dirs"));
    assert!(renamed.join("track.mp3").is_file());
    assert_eq!(fixture.read("dirs/album/track.mp3"), "first");
    fixture.assert_not_exists("album");
}

// ============================================================================
// Test Suite 3: Ignore Ledger and Repeated Runs
// ============================================================================

#[test]
fn test_ledger_records_categories() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.create_file("b.png", "b");
    fixture.create_subdir("folder");

    fixture.sort();

    let expected: BTreeSet<String> = ["dirs", "png", "txt"].iter().map(|s| s.to_string()).collect();
    assert_eq!(fixture.ledger_names(), expected);
    assert!(fixture.read(LEDGER_FILE_NAME).ends_with('\n'));
}

#[test]
fn test_second_run_is_idempotent() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.create_file("b.png", "b");
    fixture.create_subdir("folder");

    fixture.sort();
    let ledger_after_first = fixture.ledger_names();
    let tree_after_first = fixture.list("");

    let second = fixture.sort();

    assert!(second.reconciled.is_empty(), "Second run should not move anything");
    assert_eq!(fixture.ledger_names(), ledger_after_first);
    assert_eq!(fixture.list(""), tree_after_first);
    fixture.assert_not_exists("dirs/txt");
    fixture.assert_not_exists("dirs/png");
}

#[test]
fn test_new_files_are_sorted_on_later_runs() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.sort();

    fixture.create_file("b.txt", "b");
    fixture.create_file("c.csv", "c");
    let summary = fixture.sort();

    assert_eq!(summary.count(Outcome::Moved), 2);
    assert_eq!(fixture.list("txt"), vec!["a.txt", "b.txt"]);
    fixture.assert_file_exists("csv/c.csv");
    assert!(fixture.ledger_names().contains("csv"));
}

#[test]
fn test_stale_ledger_names_are_dropped() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.sort();

    fs::remove_dir_all(fixture.path().join("txt")).expect("Failed to remove folder");
    fixture.create_file("b.md", "b");
    fixture.sort();

    let names = fixture.ledger_names();
    assert!(!names.contains("txt"));
    assert!(names.contains("md"));
}

#[test]
fn test_ledger_name_is_never_reclassified() {
    let fixture = TestFixture::new();
    fixture.create_subdir("keep");
    fs::write(fixture.path().join(LEDGER_FILE_NAME), "keep\n").expect("Failed to seed ledger");
    fixture.create_file("a.txt", "a");

    fixture.sort();

    fixture.assert_dir_exists("keep");
    fixture.assert_not_exists("dirs");
    assert!(fixture.ledger_names().contains("keep"));
    assert_eq!(
        IgnoreLedger::load(fixture.path()).unwrap().len(),
        fixture.ledger_names().len()
    );
}

// ============================================================================
// Test Suite 4: Sorting by Modification Date
// ============================================================================

fn utc_day(path: &Path) -> String {
    let modified = fs::metadata(path).unwrap().modified().unwrap();
    chrono::DateTime::<chrono::Utc>::from(modified)
        .format("%Y-%m-%d")
        .to_string()
}

#[test]
fn test_files_move_into_date_folders() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    fixture.create_file("b.png", "b");
    let day = utc_day(&fixture.path().join("a.txt"));

    let summary = fixture.sort_with("mod");

    assert_eq!(summary.count(Outcome::Moved), 2);
    fixture.assert_file_exists(&format!("{}/a.txt", day));
    fixture.assert_file_exists(&format!("{}/b.png", day));
    assert!(fixture.ledger_names().contains(&day));
}

fn local_day(path: &Path) -> String {
    let modified = fs::metadata(path).unwrap().modified().unwrap();
    chrono::DateTime::<chrono::Local>::from(modified)
        .format("%Y-%m-%d")
        .to_string()
}

#[test]
fn test_local_timezone_buckets_by_local_day() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");
    // 2021-03-04T00:30:00Z falls on 2021-03-03 west of UTC.
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_614_817_800);
    File::options()
        .write(true)
        .open(fixture.path().join("a.txt"))
        .and_then(|file| file.set_modified(modified))
        .expect("Failed to set modification time");
    let local = local_day(&fixture.path().join("a.txt"));
    assert_eq!(utc_day(&fixture.path().join("a.txt")), "2021-03-04");

    fs::write(
        fixture.config_dir.path().join("config.toml"),
        "[sort]\ncriteria = \"mod\"\ntimezone = \"local\"\n",
    )
    .expect("Failed to write config");
    fixture.sort();

    fixture.assert_file_exists(&format!("{}/a.txt", local));
    assert_eq!(fixture.ledger_names(), BTreeSet::from([local]));
}

#[test]
fn test_directories_stay_dirs_when_sorting_by_date() {
    let fixture = TestFixture::new();
    fixture.create_file("photos/one.jpg", "jpg");

    fixture.sort_with("mod");

    fixture.assert_file_exists("dirs/photos/one.jpg");
}

#[test]
fn test_criteria_from_config_file() {
    let fixture = TestFixture::new();
    let config_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = config_dir.path().join("config.toml");
    fs::write(&config_path, "[sort]\ncriteria = \"mod\"\n").expect("Failed to write config");
    fixture.create_file("a.txt", "a");
    let day = utc_day(&fixture.path().join("a.txt"));

    let options = SortOptions {
        config_path: Some(config_path),
        ..fixture.options()
    };
    run_cli(fixture.path(), &options).expect("Sort run should succeed");

    fixture.assert_file_exists(&format!("{}/a.txt", day));
}

// ============================================================================
// Test Suite 5: Reserved Files and Configuration
// ============================================================================

#[test]
fn test_executable_and_ledger_are_never_moved() {
    let fixture = TestFixture::new();
    fixture.create_file("file-sorter", "binary");
    fixture.create_file("a.txt", "a");
    fixture.sort();

    fixture.create_file("b.txt", "b");
    fixture.sort();

    fixture.assert_file_exists("file-sorter");
    fixture.assert_file_exists(LEDGER_FILE_NAME);
    fixture.assert_not_exists("none");
    assert_eq!(fixture.root_files(), vec!["file-sorter"]);
}

#[test]
fn test_config_exclusions_are_left_in_place() {
    let fixture = TestFixture::new();
    fixture.create_file("sorter.toml", "[exclude]\nnames = [\"Thumbs.db\"]\npatterns = [\"*.part\"]\n");
    fixture.create_file("Thumbs.db", "cache");
    fixture.create_file("movie.mkv.part", "partial");
    fixture.create_file("movie.mkv", "video");

    let options = SortOptions {
        config_path: Some(fixture.path().join("sorter.toml")),
        ..fixture.options()
    };
    run_cli(fixture.path(), &options).expect("Sort run should succeed");

    fixture.assert_file_exists("Thumbs.db");
    fixture.assert_file_exists("movie.mkv.part");
    fixture.assert_file_exists("sorter.toml");
    fixture.assert_file_exists("mkv/movie.mkv");
    assert!(!fixture.ledger_names().contains("Thumbs.db"));
}

// ============================================================================
// Test Suite 6: Dry Run and Error Scenarios
// ============================================================================

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("pdf/report.pdf", "old");
    fixture.create_file("report.pdf", "new");
    fixture.create_file("a.txt", "a");

    let options = SortOptions {
        dry_run: true,
        ..fixture.options()
    };
    let summary = run_cli(fixture.path(), &options).expect("Dry run should succeed");

    assert!(summary.dry_run);
    assert_eq!(summary.count(Outcome::Moved), 1);
    assert_eq!(summary.count(Outcome::MovedDisambiguated), 1);
    fixture.assert_file_exists("report.pdf");
    fixture.assert_file_exists("a.txt");
    fixture.assert_not_exists("txt");
    fixture.assert_not_exists(LEDGER_FILE_NAME);
    assert_eq!(fixture.list("pdf"), vec!["report.pdf"]);
}

#[test]
fn test_invalid_criteria_aborts_without_changes() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", "a");

    let options = SortOptions {
        criteria: Some("size".to_string()),
        ..fixture.options()
    };
    let result = run_cli(fixture.path(), &options);

    assert!(matches!(result, Err(SortError::InvalidCriterion { .. })));
    assert_eq!(fixture.list(""), vec!["a.txt"]);
}

#[test]
fn test_invalid_criteria_in_config_aborts() {
    let fixture = TestFixture::new();
    let config_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = config_dir.path().join("config.toml");
    fs::write(&config_path, "[sort]\ncriteria = \"size\"\n").expect("Failed to write config");
    fixture.create_file("a.txt", "a");

    let options = SortOptions {
        config_path: Some(config_path),
        ..fixture.options()
    };
    let result = run_cli(fixture.path(), &options);

    assert!(matches!(result, Err(SortError::InvalidCriterion { .. })));
    fixture.assert_file_exists("a.txt");
}

#[test]
fn test_nonexistent_directory_fails() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("missing");

    let result = run_cli(&missing, &fixture.options());

    assert!(matches!(result, Err(SortError::DirectoryNotFound { .. })));
}

#[test]
fn test_blocked_category_folder_aborts_before_ledger_write() {
    let fixture = TestFixture::new();
    // A file named like the category folder cannot coexist with that folder.
    fixture.create_file("txt", "plain file named txt");
    fixture.create_file("a.txt", "a");
    fs::write(fixture.path().join(LEDGER_FILE_NAME), "txt\n").expect("Failed to seed ledger");

    let result = run_cli(fixture.path(), &fixture.options());

    assert!(matches!(
        result,
        Err(SortError::DirectoryCreationFailed { .. })
    ));
    fixture.assert_file_exists("a.txt");
    assert_eq!(fixture.read(LEDGER_FILE_NAME), "txt\n");
}

#[cfg(target_os = "linux")]
mod non_utf8_names {
    use super::*;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    fn latin1_name() -> &'static OsStr {
        OsStr::from_bytes(b"caf\xe9.txt")
    }

    #[test]
    fn test_non_utf8_name_is_sorted_like_any_other() {
        let fixture = TestFixture::new();
        fixture.create_file("a.txt", "a");
        fs::write(fixture.path().join(latin1_name()), "cafe").expect("Failed to write file");

        let summary = fixture.sort();

        assert_eq!(summary.count(Outcome::Moved), 2);
        assert!(fixture.path().join("txt").join(latin1_name()).is_file());
        assert!(!fixture.path().join(latin1_name()).exists());
        assert!(fixture.root_files().is_empty());
        assert_eq!(fixture.ledger_names(), BTreeSet::from(["txt".to_string()]));
    }

    #[test]
    fn test_non_utf8_name_collision_is_disambiguated() {
        let fixture = TestFixture::new();
        fixture.create_subdir("txt");
        fs::write(fixture.path().join("txt").join(latin1_name()), "old").expect("Failed to write");
        fs::write(fixture.path().join(latin1_name()), "new").expect("Failed to write");

        let summary = fixture.sort();

        assert_eq!(summary.count(Outcome::MovedDisambiguated), 1);
        let mut renamed = latin1_name().to_os_string();
        renamed.push("-22af645d1859cb5ca6da0c484f1f37ea.txt");
        let renamed = fixture.path().join("txt").join(renamed);
        assert_eq!(fs::read_to_string(renamed).expect("Failed to read"), "new");
    }

    #[test]
    fn test_non_utf8_name_in_dry_run_with_output() {
        let fixture = TestFixture::new();
        fs::write(fixture.path().join(latin1_name()), "cafe").expect("Failed to write file");

        let options = SortOptions {
            dry_run: true,
            quiet: false,
            ..fixture.options()
        };
        let summary = run_cli(fixture.path(), &options).expect("Dry run should succeed");

        assert_eq!(summary.count(Outcome::Moved), 1);
        assert!(fixture.path().join(latin1_name()).is_file());
        fixture.assert_not_exists("txt");
    }
}
