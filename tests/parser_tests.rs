use build_trace_studio::aggregator::merge_all;
use build_trace_studio::output::{trace_to_string, write_trace, PathShortener};
use build_trace_studio::parser::{classify, Provenance, TraceFile};
use build_trace_studio::utils::error::ParseError;
use pretty_assertions::assert_eq;
use std::path::Path;

const SAMPLE_TRACE: &str = r#"{
    "beginningOfTime": 1699999999000000,
    "traceEvents": [
        { "name": "Source", "ts": 120, "dur": 30, "pid": 7, "tid": 9, "args": { "detail": "/sdk/Foundation.h" } },
        { "name": "ExecuteCompiler", "ts": 0, "dur": 500, "pid": 7, "tid": 9 },
        { "name": "Total Source", "ts": 0, "dur": 30, "pid": 7, "tid": 9, "args": { "count": 1, "avg ms": 0 } },
        { "name": "Total ExecuteCompiler", "ts": 0, "dur": 500, "pid": 7, "tid": 9 },
        { "name": "process_name", "ph": "M", "ts": 0, "pid": 7, "tid": 0, "args": { "name": "clang" } }
    ]
}"#;

fn parse(path: &str, text: &str) -> Result<TraceFile, ParseError> {
    let provenance = classify(Path::new(path)).unwrap_or_else(Provenance::not_applicable);
    TraceFile::from_bytes(path, provenance, text.as_bytes())
}

#[test]
fn test_classify_build_layouts() {
    assert_eq!(
        classify(Path::new("/DD/Build/Intermediates.noindex/App.build/Debug-iphonesimulator/Core.build/Objects-normal/x86_64/file.json")),
        Some(Provenance::new("Core", "Debug-iphonesimulator", "x86_64"))
    );
    assert_eq!(
        classify(Path::new("/DD/SharedPrecompiledHeaders/a/b/file.json")),
        Some(Provenance::new("SharedPrecompiledHeaders", "-", "-"))
    );
    assert_eq!(classify(Path::new("/DD/Logs/Build/a/b/file.json")), None);
    assert_eq!(classify(Path::new("file.json")), None);
}

#[test]
fn test_parse_sample_trace() {
    let trace = parse(
        "/DD/Debug/Core.build/Objects-normal/arm64/main.json",
        SAMPLE_TRACE,
    )
    .unwrap();

    assert_eq!(trace.len(), 5);
    assert_eq!(trace.target(), "Core");
    assert_eq!(trace.platform(), "Debug");
    assert_eq!(trace.arch(), "arm64");
    assert_eq!(trace.total_time().unwrap(), 500);

    let categories: Vec<_> = trace.events().iter().filter_map(|e| e.short_total_name()).collect();
    assert_eq!(categories, vec!["Source", "ExecuteCompiler"]);
    assert_eq!(trace.events()[4].duration(), 0);
}

#[test]
fn test_non_traces_are_skippable() {
    let cases = [
        ("[]", "array"),
        (r#"{"traceEvents": []}"#, "missing start"),
        (r#"{"beginningOfTime": 1, "traceEvents": [], "extra": 1}"#, "extra key"),
        ("{ nope", "invalid json"),
    ];
    for (text, label) in cases {
        let err = parse("/x/a.json", text).unwrap_err();
        assert!(!err.is_fatal(), "{label} should only skip the file");
    }
}

#[test]
fn test_event_without_pid_is_fatal() {
    let err = parse(
        "/x/a.json",
        r#"{"beginningOfTime": 1, "traceEvents": [{"name": "Source", "ts": 1, "tid": 1}]}"#,
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, ParseError::MissingField { field: "pid", .. }));
}

#[test]
fn test_serialize_then_parse_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let source = parse(
        "/DD/Debug/Core.build/Objects-normal/arm64/main.json",
        SAMPLE_TRACE,
    )
    .unwrap();

    let out_path = dir.path().join("serial.json");
    let merged = merge_all(&out_path, [&source]).unwrap();
    assert_eq!(write_trace(&merged, &PathShortener::default()).unwrap(), 5);

    let reread = TraceFile::read(&out_path, Provenance::not_applicable()).unwrap();
    assert_eq!(reread.beginning_of_time(), source.beginning_of_time());
    assert_eq!(reread.len(), source.len());

    for (before, after) in source.events().iter().zip(reread.events()) {
        let expected_name = if before.is_execute_compiler() {
            "ExecuteCompiler - main.json".to_string()
        } else {
            before.name().to_string()
        };
        assert_eq!(after.name(), expected_name);
        assert_eq!(after.timestamp(), before.timestamp());
        assert_eq!(after.duration(), before.duration());
        assert_eq!((after.pid(), after.tid()), (7, 9));
        assert_eq!(after.detail(), before.detail());
    }
}

#[test]
fn test_unknown_event_keys_survive_serialization() {
    let source = parse("/x/a.json", SAMPLE_TRACE).unwrap();
    let text = trace_to_string(&source).unwrap();
    assert!(text.contains("\"ph\": \"M\""));
    assert!(text.contains("\"avg ms\": 0"));
}
