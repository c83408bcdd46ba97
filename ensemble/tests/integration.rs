//! Integration tests for Ensemble
//!
//! These tests drive the loader and both runners end to end.

use ensemble::{
    DeclarationSet, Group, MemoryShell, RunError, Runner, RunnerKind, Shell, SuiteBuilder,
    SuiteConfig, SuiteError, SuiteLoader, WorkFactory, WorkUnit,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn declare_in_this_file(suite: &mut SuiteBuilder) {
    suite.group("declared", |g| {
        g.report("via macro", |r| {
            r.control("noop", || ());
        });
    });
}

ensemble::declare!(declare_in_this_file);

fn suite_config(dir: &Path, pattern: &str) -> SuiteConfig {
    SuiteConfig {
        tests_dir: dir.to_path_buf(),
        setup_file: None,
        pattern: pattern.to_string(),
    }
}

fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), "// declarations\n").unwrap();
}

/// Calls every test of the group once.
fn call_all(group: &Group) -> WorkUnit<'static> {
    let group = group.clone();
    Box::new(move || {
        for report in group.reports() {
            for test in report.tests() {
                test.call();
            }
        }
        Ok(())
    })
}

#[test]
fn test_declare_macro_registers_source_file() {
    let tests_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests");
    let config = suite_config(&tests_dir, "integration.rs");

    let suite = SuiteLoader::new(&config, &ensemble::Registered)
        .load(&mut SuiteBuilder::new())
        .unwrap();

    let group = suite.find_group("declared").unwrap();
    let report = group.find_report("via macro").unwrap();
    assert!(report.control().is_some());
}

fn declare_arithmetic(suite: &mut SuiteBuilder) {
    suite.group("G", |g| {
        g.report("R", |r| {
            r.control("Integer", || 1 + 1);
            r.test("Float", || 1.0 + 1.0);
        });
    });
}

#[test]
fn test_load_and_run_declared_group() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "arithmetic.rs");
    let config = suite_config(dir.path(), "*.rs");
    let source = DeclarationSet::new().with("arithmetic.rs", declare_arithmetic);

    let suite = SuiteLoader::new(&config, &source)
        .load(&mut SuiteBuilder::new())
        .unwrap();
    let group = suite.find_group("G").unwrap();
    assert_eq!(group.size(), 2);

    let tests = group.reports()[0].tests();
    assert_eq!(tests[0].name(), "Integer");
    assert!(tests[0].is_control());
    assert_eq!(tests[1].name(), "Float");
    assert!(!tests[1].is_control());

    for kind in [RunnerKind::Process, RunnerKind::Thread] {
        let shell = Arc::new(MemoryShell::new());
        let runner = kind.build(shell.clone());
        runner.run(&suite, Some("G"), &call_all).unwrap();
        assert_eq!(shell.out(), vec!["Group 'G' completed"]);
    }
}

fn declare_abc(suite: &mut SuiteBuilder) {
    for name in ["a", "b", "c"] {
        suite.group(name, |g| {
            g.report("r", |r| {
                r.test("t", || ());
            });
        });
    }
}

static LOADS: AtomicUsize = AtomicUsize::new(0);

fn declare_counted(suite: &mut SuiteBuilder) {
    LOADS.fetch_add(1, Ordering::SeqCst);
    declare_abc(suite);
}

#[test]
fn test_files_load_once_per_builder() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "counted.rs");
    let config = suite_config(dir.path(), "*.rs");
    let source = DeclarationSet::new().with("counted.rs", declare_counted);

    let mut builder = SuiteBuilder::new();
    let all = SuiteLoader::new(&config, &source)
        .load(&mut builder)
        .unwrap();
    let some = SuiteLoader::new(&config, &source)
        .with_groups(vec!["c".into(), "a".into()])
        .load(&mut builder)
        .unwrap();

    assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    assert_eq!(all.group_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    // Filtering keeps declaration order
    assert_eq!(some.group_names().collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn test_filter_properties() {
    let mut builder = SuiteBuilder::new();
    declare_abc(&mut builder);
    let suite = builder.finish().unwrap();

    let filtered = suite.filter(&["b", "a"]).unwrap();
    assert!(filtered.len() <= suite.len());
    assert!(filtered.group_names().all(|name| suite.is_valid_group(name)));

    let names: Vec<_> = filtered.group_names().map(String::from).collect();
    let again = filtered.filter(&names).unwrap();
    assert_eq!(
        again.group_names().collect::<Vec<_>>(),
        filtered.group_names().collect::<Vec<_>>()
    );

    assert_eq!(
        suite.filter(&["a", "zzz"]).unwrap_err(),
        SuiteError::GroupNotFound("zzz".into())
    );
}

#[test]
fn test_failing_group_does_not_stop_others() {
    let mut builder = SuiteBuilder::new();
    declare_abc(&mut builder);
    let suite = builder.finish().unwrap();

    let factory = |group: &Group| -> WorkUnit<'static> {
        let failing = group.name() == "b";
        Box::new(move || {
            if failing {
                anyhow::bail!("b is broken");
            }
            Ok(())
        })
    };

    for kind in [RunnerKind::Process, RunnerKind::Thread] {
        let shell = Arc::new(MemoryShell::new());
        let runner = kind.build(shell.clone());

        let err = runner.run(&suite, None, &factory).unwrap_err();
        match err {
            RunError::GroupsFailed(names) => assert_eq!(names, vec!["b"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            shell.out(),
            vec!["Group 'a' completed", "Group 'c' completed"]
        );
        assert_eq!(shell.err()[0], "Group 'b' failed: b is broken");
    }
}

#[test]
fn test_aborting_child_is_isolated() {
    let mut builder = SuiteBuilder::new();
    declare_abc(&mut builder);
    let suite = builder.finish().unwrap();

    let factory = |group: &Group| -> WorkUnit<'static> {
        let aborting = group.name() == "a";
        Box::new(move || {
            if aborting {
                std::process::abort();
            }
            Ok(())
        })
    };

    let shell = Arc::new(MemoryShell::new());
    let runner = RunnerKind::Process.build(shell.clone());
    let err = runner.run(&suite, None, &factory).unwrap_err();

    assert!(matches!(err, RunError::GroupsFailed(ref names) if names == &["a"]));
    assert_eq!(
        shell.out(),
        vec!["Group 'b' completed", "Group 'c' completed"]
    );
    assert!(shell.err()[0].starts_with("Group 'a' failed:"));
}

#[test]
fn test_thread_runner_shares_memory() {
    let mut builder = SuiteBuilder::new();
    declare_abc(&mut builder);
    let suite = builder.finish().unwrap();

    let ran = AtomicUsize::new(0);
    let factory: &WorkFactory<'_> = &|_: &Group| {
        let ran = &ran;
        Box::new(move || {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };

    let shell: Arc<dyn Shell> = Arc::new(MemoryShell::new());
    RunnerKind::Thread
        .build(shell)
        .run(&suite, None, factory)
        .unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 3);
}
