use warning_capture::{
    Action, CaptureError, EscalatedWarning, FilterRule, FilterState, REPORT_CODE, TestItem,
    TestSession, Warning, WarningCapture, WarningReport, WarningsConfig,
};

fn session(options: &[&str], config: &[&str]) -> TestSession {
    let capture = WarningCapture::default()
        .with_option_filters(options.iter().map(|s| s.to_string()).collect())
        .with_config_filters(config.iter().map(|s| s.to_string()).collect());
    TestSession::new(capture)
}

fn item() -> TestItem {
    TestItem::new("tests/test_api.rs::test_call").with_location("tests/test_api.rs", 12)
}

#[test]
fn test_unfiltered_warning_is_reported_once_with_location() {
    let mut session = session(&[], &[]);
    let user = session.category("UserWarning").unwrap();

    session
        .run(&item(), |scope| {
            scope
                .warn_explicit(
                    Warning::at(user.clone(), "something odd", "src/api.rs", 40)
                        .with_source_line("    odd();"),
                )
                .unwrap();
        })
        .unwrap();

    let entries = session.report().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code, REPORT_CODE);
    assert_eq!(
        entries[0].message,
        "src/api.rs:40: UserWarning: something odd\n  odd();\n"
    );
    assert_eq!(
        entries[0].location,
        "in tests/test_api.rs:12 the following warning was recorded:\n"
    );
}

#[test]
fn test_ignore_filter_suppresses_only_matching_deprecations() {
    let mut session = session(&[], &["ignore:.*deprecated.*:DeprecationWarning::"]);
    let deprecation = session.category("DeprecationWarning").unwrap();
    let user = session.category("UserWarning").unwrap();

    session
        .run(&item(), |scope| {
            scope
                .warn(deprecation.clone(), "call() is deprecated, use invoke()")
                .unwrap();
            scope.warn(deprecation.clone(), "unrelated notice").unwrap();
            scope.warn(user.clone(), "this is deprecated too").unwrap();
        })
        .unwrap();

    let messages: Vec<&str> = session
        .report()
        .entries()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("DeprecationWarning: unrelated notice"));
    assert!(messages[1].contains("UserWarning: this is deprecated too"));
}

#[test]
fn test_duplicate_warning_recorded_once_by_default() {
    let mut session = session(&[], &[]);
    let user = session.category("UserWarning").unwrap();
    let emit = || Warning::at(user.clone(), "dup", "src/lib.rs", 5);

    let recorded = session
        .run(&item(), |scope| {
            scope.warn_explicit(emit()).unwrap();
            scope.warn_explicit(emit()).unwrap();
            scope.log().len()
        })
        .unwrap();

    assert_eq!(recorded, 1);
    assert_eq!(session.report().len(), 1);
}

#[test]
fn test_always_filter_overrides_once_baseline() {
    let mut session = session(&[], &["always"]);
    let user = session.category("UserWarning").unwrap();

    session
        .run(&item(), |scope| {
            for _ in 0..3 {
                scope
                    .warn_explicit(Warning::at(user.clone(), "dup", "src/lib.rs", 5))
                    .unwrap();
            }
        })
        .unwrap();

    assert_eq!(session.report().len(), 3);
}

#[test]
fn test_config_filters_outrank_option_filters() {
    let mut session = session(&["error::UserWarning"], &["ignore::UserWarning"]);
    let user = session.category("UserWarning").unwrap();

    let outcome = session
        .run(&item(), |scope| scope.warn(user.clone(), "loud"))
        .unwrap();

    assert!(outcome.is_ok(), "config ignore should win over -W error");
    assert!(session.report().is_empty());
}

#[test]
fn test_option_filters_match_literally() {
    let mut session = session(&["ignore:a.b"], &[]);
    let user = session.category("UserWarning").unwrap();

    session
        .run(&item(), |scope| {
            scope.warn(user.clone(), "a.b literal").unwrap();
            scope.warn(user.clone(), "axb not literal").unwrap();
        })
        .unwrap();

    assert_eq!(session.report().len(), 1);
    assert!(session.report().entries()[0].message.contains("axb not literal"));
}

#[test]
fn test_error_action_fails_the_test_body_not_the_capture() {
    let mut session = session(&[], &["error::RuntimeWarning"]);
    let runtime = session.category("RuntimeWarning").unwrap();

    let outcome: Result<(), EscalatedWarning> = session
        .run(&item(), |scope| {
            scope.warn(runtime.clone(), "overflow")?;
            Ok(())
        })
        .unwrap();

    let err = outcome.unwrap_err();
    assert_eq!(err.to_string(), "RuntimeWarning: overflow");
    assert!(session.report().is_empty());
}

#[test]
fn test_filters_do_not_leak_between_tests() {
    let registry = warning_capture::CategoryRegistry::default();
    let mut state = FilterState::new();
    state.insert(FilterRule::parse("ignore::ResourceWarning", &registry).unwrap());
    let before = state.clone();

    let mut session = session(&[], &["error"]).with_state(state);
    let user = session.category("UserWarning").unwrap();

    let first = session
        .run(&item(), |scope| {
            assert_eq!(scope.state().filters().len(), 3);
            scope.warn(user.clone(), "a").is_err()
        })
        .unwrap();
    assert!(first);
    assert_eq!(session.state(), &before);

    let plain = WarningCapture::default();
    let mut report = WarningReport::new();
    let mut state = session.state().clone();
    let second = plain
        .around(&mut state, &item(), &mut report, |scope| {
            scope.warn(user.clone(), "a").is_err()
        })
        .unwrap();
    assert!(!second, "error filter from the previous test must be gone");
    assert_eq!(report.len(), 1);
    assert_eq!(state, before);
}

#[test]
fn test_same_warning_reported_again_in_next_test() {
    let mut session = session(&[], &[]);
    let user = session.category("UserWarning").unwrap();

    for _ in 0..2 {
        session
            .run(&item(), |scope| {
                scope
                    .warn_explicit(Warning::at(user.clone(), "again", "src/lib.rs", 1))
                    .unwrap();
            })
            .unwrap();
    }

    assert_eq!(session.report().len(), 2);
}

#[test]
fn test_bad_spec_is_setup_error_and_body_never_runs() {
    let mut session = session(&[], &["ignore::NotARealWarning::"]);
    let before = session.state().clone();
    let mut ran = false;

    let result = session.run(&item(), |_| ran = true);

    assert!(matches!(result, Err(CaptureError::Filter(_))));
    let message = result.unwrap_err().to_string();
    assert!(message.contains("ignore::NotARealWarning::"));
    assert!(!ran);
    assert_eq!(session.state(), &before);
}

#[test]
fn test_panicking_body_still_reports_and_restores() {
    let capture = WarningCapture::default();
    let user = capture.registry().lookup("UserWarning").unwrap();
    let mut state = FilterState::new();
    let mut report = WarningReport::new();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        capture.around(&mut state, &item(), &mut report, |scope| {
            scope.warn(user.clone(), "before the crash").unwrap();
            panic!("assertion failed in test body");
        })
    }));

    assert!(result.is_err());
    assert_eq!(report.len(), 1);
    assert!(report.entries()[0].message.contains("before the crash"));
    assert_eq!(state, FilterState::new());
}

#[test]
fn test_annotation_falls_back_to_fspath_then_empty() {
    let capture = WarningCapture::default();
    let user = capture.registry().lookup("UserWarning").unwrap();
    let mut state = FilterState::new();
    let mut report = WarningReport::new();

    let by_path = TestItem::new("t1").with_fspath("tests/test_io.rs");
    capture
        .around(&mut state, &by_path, &mut report, |scope| {
            scope.warn(user.clone(), "one").unwrap();
        })
        .unwrap();
    capture
        .around(&mut state, &TestItem::new("t2"), &mut report, |scope| {
            scope.warn(user.clone(), "two").unwrap();
        })
        .unwrap();

    assert_eq!(
        report.entries()[0].location,
        "in tests/test_io.rs the following warning was recorded:\n"
    );
    assert_eq!(report.entries()[1].location, "");
}

#[test]
fn test_config_categories_are_registered() {
    let config = warning_capture::config::parse_config(
        r#"
[warnings]
filterwarnings = "ignore::PluginWarning"

[[warnings.categories]]
name = "PluginWarning"
parent = "UserWarning"
"#,
    )
    .unwrap();
    let capture = WarningCapture::from_config(Vec::new(), &config).unwrap();
    let plugin = capture.registry().lookup("PluginWarning").unwrap();
    let mut session = TestSession::new(capture);

    session
        .run(&item(), |scope| scope.warn(plugin.clone(), "hidden").unwrap())
        .unwrap();
    assert!(session.report().is_empty());
}

#[test]
fn test_config_with_unknown_parent_fails() {
    let mut config = WarningsConfig::default();
    config.categories.push(warning_capture::config::CategoryDef {
        name: "Orphan".to_string(),
        parent: "Missing".to_string(),
    });
    assert!(matches!(
        WarningCapture::from_config(Vec::new(), &config),
        Err(CaptureError::Category(_))
    ));
}

#[test]
fn test_scope_simplefilter_within_body() {
    let mut session = session(&[], &[]);
    let user = session.category("UserWarning").unwrap();
    let registry = warning_capture::CategoryRegistry::default();

    session
        .run(&item(), |scope| {
            scope.simplefilter(Action::Ignore, &registry);
            scope.warn(user.clone(), "muted").unwrap();
        })
        .unwrap();

    assert!(session.report().is_empty());
    assert!(session.state().filters().is_empty());
}
