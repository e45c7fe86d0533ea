//! Integration tests for platform

#[cfg(test)]
mod tests {
    use apkb_errors::{Error, ErrorKind, PlatformError};
    use apkb_events::{AppEvent, ProcessEvent};
    use apkb_platform::fs::{atomic_replace, recreate_dir, remove_file_if_exists};
    use apkb_platform::{ProcessRunner, SystemProcessRunner};
    use std::path::Path;

    #[cfg(unix)]
    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_zero_returns_output() {
        let runner = SystemProcessRunner::new();
        let output = runner
            .execute(Path::new("sh"), &sh("echo linked; echo note >&2"))
            .await
            .unwrap();

        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout, "linked\n");
        assert_eq!(output.stderr, "note\n");
        assert_eq!(output.combined(), "linked\nnote\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_carries_code_and_output() {
        let runner = SystemProcessRunner::new();
        let err = runner
            .execute(Path::new("sh"), &sh("echo 'res/values/x.xml: error' >&2; exit 3"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ProcessFailed);
        match &err {
            Error::Platform(PlatformError::ProcessFailed {
                program,
                code,
                output,
            }) => {
                assert_eq!(program, "sh");
                assert_eq!(*code, Some(3));
                assert_eq!(output, "res/values/x.xml: error\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.tool_output(), Some("res/values/x.xml: error\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let runner = SystemProcessRunner::new();
        let output = runner
            .execute(
                Path::new("printf"),
                &["%s|".to_string(), "a b".to_string(), "$HOME;x".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "a b|$HOME;x|");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_failure() {
        let runner = SystemProcessRunner::new();
        let err = runner
            .execute(Path::new("/nonexistent/apkb-tool"), &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Platform(PlatformError::SpawnFailed { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::ProcessFailed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_events_redact_passwords() {
        let (tx, mut rx) = apkb_events::channel();
        let runner = SystemProcessRunner::new().with_events(tx);

        // sh binds the extra operand to $0 and ignores it
        let mut args = sh("true");
        args.push("pass:secret".to_string());
        runner.execute(Path::new("sh"), &args).await.unwrap();
        drop(runner);

        let started = rx.recv().await.unwrap();
        match started {
            AppEvent::Process(ProcessEvent::CommandStarted { args, .. }) => {
                assert_eq!(args.last().map(String::as_str), Some("pass:******"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::Process(ProcessEvent::CommandCompleted { .. })
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_atomic_replace_leaves_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.apk");
        let tmp = dir.path().join("base.align.tmp.apk");
        std::fs::write(&base, b"old").unwrap();
        std::fs::write(&tmp, b"new").unwrap();

        atomic_replace(&tmp, &base).await.unwrap();

        assert_eq!(std::fs::read(&base).unwrap(), b"new");
        assert!(!tmp.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_atomic_replace_without_temporary_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.apk");
        std::fs::write(&base, b"old").unwrap();

        let err = atomic_replace(&dir.path().join("missing.tmp.apk"), &base)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert_eq!(std::fs::read(&base).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_recreate_dir_empties_contents() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(classes.join("com/example")).unwrap();
        std::fs::write(classes.join("com/example/Stale.class"), b"").unwrap();

        recreate_dir(&classes).await.unwrap();
        assert!(classes.is_dir());
        assert_eq!(std::fs::read_dir(&classes).unwrap().count(), 0);

        recreate_dir(&dir.path().join("fresh")).await.unwrap();
        assert!(dir.path().join("fresh").is_dir());

        remove_file_if_exists(&dir.path().join("absent")).await.unwrap();
    }
}
