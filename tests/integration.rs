use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn rulebook_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("rulebook");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let books_dir = root.join("books");
    fs::create_dir_all(&books_dir).unwrap();
    fs::write(
        books_dir.join("combat.txt"),
        "Combat\n\nA grapple check pits Athletics against Athletics or Acrobatics.\n\nOpportunity attacks happen when a creature leaves your reach.",
    )
    .unwrap();
    fs::write(
        books_dir.join("magic.txt"),
        "Concentration ends when you cast another concentration spell.\n\nFireball deals 8d6 fire damage in a twenty foot radius.",
    )
    .unwrap();
    fs::write(books_dir.join("notes.md"), "Markdown notes are not rulebooks.").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/rulebook.sqlite"

[retrieval]
max_results = 3

[server]
bind = "127.0.0.1:7341"
"#,
        root.display()
    );

    let config_path = config_dir.join("rulebook.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_rulebook(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = rulebook_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run rulebook binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn books(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("books")
        .join(name)
        .display()
        .to_string()
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_rulebook(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, first) = run_rulebook(&config_path, &["init"]);
    assert!(first, "first init failed");
    let (_, _, second) = run_rulebook(&config_path, &["init"]);
    assert!(second, "second init failed (not idempotent)");
}

#[test]
fn test_upload_then_lookup() {
    let (_tmp, config_path) = setup_test_env();
    run_rulebook(&config_path, &["init"]);

    let combat = books(&config_path, "combat.txt");
    let (stdout, stderr, success) = run_rulebook(&config_path, &["upload", "session-a", &combat]);
    assert!(success, "upload failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("added: combat.txt"));
    assert!(stdout.contains("ok"));

    let (stdout, _, success) =
        run_rulebook(&config_path, &["lookup", "session-a", "How does a grapple work?"]);
    assert!(success);
    assert!(stdout.starts_with("Relevant Rules Found:"));
    assert!(stdout.contains("A grapple check pits Athletics against Athletics or Acrobatics."));
    assert!(!stdout.contains("Opportunity attacks"));
}

#[test]
fn test_lookup_sentinels() {
    let (_tmp, config_path) = setup_test_env();
    run_rulebook(&config_path, &["init"]);
    let combat = books(&config_path, "combat.txt");
    run_rulebook(&config_path, &["upload", "session-a", &combat]);

    let (stdout, _, success) = run_rulebook(&config_path, &["lookup", "session-a", "the of and"]);
    assert!(success);
    assert_eq!(stdout.trim(), "No relevant keywords found in query.");

    let (stdout, _, success) =
        run_rulebook(&config_path, &["lookup", "session-a", "underwater breathing"]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "No specific rules found for this action. Use general knowledge."
    );
}

#[test]
fn test_sessions_do_not_share_rules() {
    let (_tmp, config_path) = setup_test_env();
    run_rulebook(&config_path, &["init"]);
    let magic = books(&config_path, "magic.txt");
    run_rulebook(&config_path, &["upload", "session-a", &magic]);

    let (stdout, _, success) = run_rulebook(&config_path, &["lookup", "session-b", "fireball"]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "No specific rules found for this action. Use general knowledge."
    );
}

#[test]
fn test_directory_upload_and_listing() {
    let (_tmp, config_path) = setup_test_env();
    run_rulebook(&config_path, &["init"]);

    let dir = config_path.parent().unwrap().parent().unwrap().join("books");
    let (stdout, stderr, success) =
        run_rulebook(&config_path, &["upload", "session-a", dir.to_str().unwrap()]);
    assert!(success, "upload failed: stdout={}, stderr={}", stdout, stderr);
    assert!(!stdout.contains("notes.md"), "directory walk should skip .md");

    // upload the same file again: listing stays unique
    let combat = books(&config_path, "combat.txt");
    run_rulebook(&config_path, &["upload", "session-a", &combat]);

    let (stdout, _, success) = run_rulebook(&config_path, &["rulebooks", "session-a"]);
    assert!(success);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names, vec!["combat.txt", "magic.txt"]);

    let (stdout, _, success) = run_rulebook(&config_path, &["rulebooks", "session-b"]);
    assert!(success);
    assert!(stdout.contains("No rulebooks were uploaded"));
}

#[test]
fn test_unsupported_file_is_rejected_but_others_added() {
    let (_tmp, config_path) = setup_test_env();
    run_rulebook(&config_path, &["init"]);

    let notes = books(&config_path, "notes.md");
    let magic = books(&config_path, "magic.txt");
    let (stdout, _, success) =
        run_rulebook(&config_path, &["upload", "session-a", &notes, &magic]);
    assert!(!success, "upload with a rejected file should exit non-zero");
    assert!(stdout.contains("rejected: notes.md is not a supported file type"));
    assert!(stdout.contains("added: magic.txt"));

    let (stdout, _, _) = run_rulebook(&config_path, &["rulebooks", "session-a"]);
    assert_eq!(stdout.trim(), "magic.txt");
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");
    let (_, stderr, success) = run_rulebook(&missing, &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
