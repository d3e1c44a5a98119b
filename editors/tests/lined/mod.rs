//! Integration tests for the lined editor.
//!
//! These drive the lined binary through stdin and check what it prints on
//! stdout and stderr, its exit status and the files it leaves behind.

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::{tempdir, NamedTempFile};

struct TestPlan {
    args: Vec<String>,
    stdin_data: String,
    expected_out: String,
    expected_err: String,
    expected_exit_code: i32,
}

fn run_test_base(args: &[String], stdin_data: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_lined"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lined");

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(stdin_data).expect("failed to write stdin");
    }

    child.wait_with_output().expect("failed to wait for lined")
}

fn run_test(plan: TestPlan) {
    let output = run_test_base(&plan.args, plan.stdin_data.as_bytes());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr, plan.expected_err);

    assert_eq!(output.status.code(), Some(plan.expected_exit_code));
}

// Helper to create a test plan for lined in silent mode
fn lined_test(stdin: &str, expected_out: &str) {
    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: stdin.to_string(),
        expected_out: expected_out.to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

// Helper to test lined with a file, returning the file's final contents
fn lined_test_with_file(file_content: &str, stdin: &str, expected_out: &str) -> String {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), file_content).unwrap();

    run_test(TestPlan {
        args: vec!["-s".to_string(), temp.path().to_string_lossy().to_string()],
        stdin_data: stdin.to_string(),
        expected_out: expected_out.to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    fs::read_to_string(temp.path()).unwrap()
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn test_lined_quit() {
    lined_test("q\n", "");
}

#[test]
fn test_lined_force_quit() {
    lined_test("a\nunsaved\n.\nQ\n", "");
}

#[test]
fn test_lined_eof_exits_cleanly() {
    lined_test("a\nunsaved\n.\n", "");
}

#[test]
fn test_lined_quit_guard() {
    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: "a\nx\n.\nq\n,p\nQ\n".to_string(),
        expected_out: "x\n".to_string(),
        expected_err: "No write since last change\n".to_string(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_lined_prompt() {
    run_test(TestPlan {
        args: vec!["-s".to_string(), "-p".to_string(), "* ".to_string()],
        stdin_data: "a\nhi\n.\np\nQ\n".to_string(),
        expected_out: "* * hi\n* ".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_lined_errors_continue() {
    run_test(TestPlan {
        args: vec!["-s".to_string()],
        stdin_data: "z\np\ni\na\nok\n.\np\nq\n".to_string(),
        expected_out: "ok\n".to_string(),
        expected_err: "Unknown command: z\nBuffer is empty\nUnimplemented command: i\nNo write since last change\n".to_string(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_lined_invalid_utf8_input() {
    let output = run_test_base(&["-s".to_string()], b"a\nkeep\n\xff\n1d\n.\n\xfe\n,p\nQ\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "keep\n\u{fffd}\n1d\n"
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Unknown command: \u{fffd}\n"
    );
}

#[test]
fn test_lined_bad_option() {
    let output = run_test_base(&["-x".to_string()], b"");
    assert!(!output.status.success());
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_lined_append_and_print() {
    lined_test(
        "a\nhello world\nline two\n.\n1,$p\nQ\n",
        "hello world\nline two\n",
    );
}

#[test]
fn test_lined_reports() {
    run_test(TestPlan {
        args: vec![],
        stdin_data: "a\none\ntwo\n.\n1d\nQ\n".to_string(),
        expected_out: "2 lines appended\n".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_lined_print_range() {
    lined_test_with_file("a\nb\nc\n", "2\n1,2p\n.p\nq\n", "b\na\nb\nc\n");
}

#[test]
fn test_lined_number() {
    lined_test_with_file("a\nb\nc\n", ",n\nq\n", "1     a\n2     b\n3     c\n");
}

#[test]
fn test_lined_relative_addresses() {
    lined_test_with_file("1\n2\n3\n4\n5\n", "1\n+2p\n$-1p\n;p\nq\n", "1\n3\n4\n5\n");
}

#[test]
fn test_lined_substitute_and_write() {
    let out = lined_test_with_file("foo bar\nbar bar\n", ",s/bar/baz/\nw\nq\n", "");
    assert_eq!(out, "foo baz\nbaz bar\n");
}

#[test]
fn test_lined_substitute_global_ampersand() {
    lined_test_with_file("aXbXc\n", "s/X/&-&/gp\nQ\n", "aX-XbX-Xc\n");
}

#[test]
fn test_lined_join_and_change() {
    let out = lined_test_with_file("a\nb\nc\nd\n", "1,2j\n$c\nD\n.\nw\nq\n", "");
    assert_eq!(out, "ab\nc\nD\n");
}

#[test]
fn test_lined_mark_on_deleted_line() {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), "a\nb\nc\n").unwrap();

    run_test(TestPlan {
        args: vec!["-s".to_string(), temp.path().to_string_lossy().to_string()],
        stdin_data: "3kz\n2ka\n2d\n'ap\n'zp\nQ\n".to_string(),
        expected_out: "c\n".to_string(),
        expected_err: "Mark not set: a\n".to_string(),
        expected_exit_code: 0,
    });
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_lined_load_report() {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), "one\ntwo\nthree\n").unwrap();
    let name = temp.path().to_string_lossy().to_string();

    run_test(TestPlan {
        args: vec![name.clone()],
        stdin_data: "q\n".to_string(),
        expected_out: format!("3 lines read from \"{}\"\n", name),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_lined_round_trip() {
    let content = "first\n\n  indented\ttab\nlast line\n";
    let dir = tempdir().unwrap();
    let src = dir.path().join("src.txt");
    let dst = dir.path().join("dst.txt");
    fs::write(&src, content).unwrap();

    run_test(TestPlan {
        args: vec!["-s".to_string(), src.to_string_lossy().to_string()],
        stdin_data: format!("w {}\nq\n", dst.display()),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(fs::read(&src).unwrap(), fs::read(&dst).unwrap());
}

#[test]
fn test_lined_missing_file_is_new() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.txt");

    run_test(TestPlan {
        args: vec!["-s".to_string(), path.to_string_lossy().to_string()],
        stdin_data: "a\nfresh\n.\nwq\n".to_string(),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
}

#[test]
fn test_lined_unreadable_file_is_fatal() {
    let dir = tempdir().unwrap();
    let output = run_test_base(
        &["-s".to_string(), dir.path().to_string_lossy().to_string()],
        b"q\n",
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_lined_write_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");
    fs::write(&path, "old\n").unwrap();

    lined_test(&format!("a\nnew\n.\nW {}\nq\n", path.display()), "");
    assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
}

#[test]
fn test_lined_read_file() {
    let dir = tempdir().unwrap();
    let insert = dir.path().join("insert.txt");
    fs::write(&insert, "x\ny\n").unwrap();

    lined_test_with_file(
        "a\nb\n",
        &format!("1r {}\n,p\nQ\n", insert.display()),
        "a\nx\ny\nb\n",
    );
}

// ============================================================================
// Shell
// ============================================================================

#[test]
fn test_lined_shell_escape() {
    lined_test("!echo hello\nq\n", "hello\n");
}

#[test]
fn test_lined_shell_repeat() {
    lined_test("!echo again\n!!\nq\n", "again\necho again\nagain\n");
}

#[test]
fn test_lined_read_shell_output() {
    lined_test("r !printf 'one\\ntwo\\n'\n,p\nQ\n", "one\ntwo\n");
}

#[test]
fn test_lined_write_to_shell() {
    lined_test("a\nb\nc\na\n.\nw !sort\nQ\n", "a\nb\nc\n");
}
