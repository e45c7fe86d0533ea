//! Integration tests for events

#[cfg(test)]
mod tests {
    use apkb_events::*;
    use std::path::PathBuf;

    fn pipeline(event: PipelineEvent) -> AppEvent {
        AppEvent::Pipeline(event)
    }

    #[tokio::test]
    async fn test_event_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_error_with_details("link failed", "missing resource");
        tx.emit_debug("test debug");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Error { .. })
        ));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_missing_sender_is_silent() {
        let none: Option<EventSender> = None;
        none.emit_warning("nobody listening");
        assert!(none.event_sender().is_none());
    }

    #[test]
    fn test_progress_lines() {
        let started = pipeline(PipelineEvent::TaskStarted {
            index: 3,
            total: 8,
            task: "link-resources".into(),
        });
        assert_eq!(started.to_string(), "[3/8] link-resources");

        let done = pipeline(PipelineEvent::TaskCompleted {
            index: 3,
            total: 8,
            task: "link-resources".into(),
            duration_ms: 412,
        });
        assert_eq!(done.to_string(), "[3/8] link-resources done in 412 ms");

        let failed = pipeline(PipelineEvent::TaskFailed {
            index: 4,
            total: 8,
            task: "compile-java".into(),
            error: "javac exited with status 1".into(),
        });
        assert_eq!(
            failed.to_string(),
            "[4/8] compile-java FAILED: javac exited with status 1"
        );

        let aborted = pipeline(PipelineEvent::Aborted {
            task: "compile-java".into(),
            completed: 3,
            skipped: 4,
        });
        assert_eq!(
            aborted.to_string(),
            "BUILD FAILED at compile-java (3 completed, 4 not run)"
        );
    }

    #[test]
    fn test_log_levels() {
        let output = pipeline(PipelineEvent::ToolOutput {
            task: "dex".into(),
            line: "warning".into(),
        });
        assert_eq!(output.log_level(), tracing::Level::WARN);

        let command = AppEvent::Process(ProcessEvent::CommandStarted {
            program: PathBuf::from("d8"),
            args: vec!["--release".into()],
        });
        assert!(command.is_debug());
        assert_eq!(command.to_string(), "$ d8 --release");

        let failed = AppEvent::Process(ProcessEvent::CommandFailed {
            program: PathBuf::from("d8"),
            code: None,
            duration_ms: 5,
        });
        assert_eq!(failed.log_level(), tracing::Level::ERROR);
        assert!(!failed.is_debug());
    }

    #[test]
    fn test_serialization_is_tagged() {
        let event = pipeline(PipelineEvent::Completed {
            tasks: 6,
            artifact: PathBuf::from("build/base.apk"),
            duration_ms: 1000,
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: AppEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert!(json.contains(r#""domain":"pipeline""#));
    }

    #[tokio::test]
    async fn test_sink_writes_one_line_per_event() {
        let (tx, rx) = channel();

        tx.emit(pipeline(PipelineEvent::Started {
            stages: vec!["prepare".into(), "package".into()],
        }));
        tx.emit(pipeline(PipelineEvent::TaskStarted {
            index: 1,
            total: 2,
            task: "prepare".into(),
        }));
        tx.emit_debug("hidden");
        tx.emit(pipeline(PipelineEvent::ToolOutput {
            task: "package".into(),
            line: "first\nsecond".into(),
        }));
        drop(tx);

        let written = LineSink::new(Vec::new()).drain(rx).await.unwrap();
        let text = String::from_utf8(written).unwrap();

        assert_eq!(
            text,
            "> pipeline: prepare -> package\n[1/2] prepare\n  package| first second\n"
        );
    }

    #[tokio::test]
    async fn test_verbose_json_sink() {
        let (tx, rx) = channel();
        tx.emit_debug("visible");
        tx.emit_warning("careful");
        drop(tx);

        let written = LineSink::new(Vec::new())
            .with_format(LineFormat::Json)
            .verbose(true)
            .drain(rx)
            .await
            .unwrap();
        let text = String::from_utf8(written).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["domain"], "general");
        }
    }
}
