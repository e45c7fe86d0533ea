//! Integration tests for error types

#[cfg(test)]
mod tests {
    use apkb_errors::*;

    fn process_failed() -> Error {
        PlatformError::ProcessFailed {
            program: "aapt2".into(),
            code: Some(1),
            output: "error: resource not found".into(),
        }
        .into()
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ConfigError::invalid("manifestPath", "file does not exist").into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_process_failed_display() {
        let err = PlatformError::ProcessFailed {
            program: "zipalign".into(),
            code: Some(2),
            output: String::new(),
        };
        assert_eq!(err.to_string(), "zipalign exited with status 2");

        let killed = PlatformError::ProcessFailed {
            program: "d8".into(),
            code: None,
            output: String::new(),
        };
        assert!(killed.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_task_failed_keeps_source_details() {
        let err: Error = BuildError::task_failed("link-resources", 3, process_failed()).into();

        assert_eq!(err.kind(), ErrorKind::ProcessFailed);
        assert_eq!(err.failed_task(), Some("link-resources"));
        assert_eq!(err.tool_output(), Some("error: resource not found"));
        assert_eq!(err.user_code(), Some("platform.process_failed"));
        assert!(err.to_string().contains("#3"));
    }

    #[test]
    fn test_artifact_missing_kind() {
        let err: Error =
            BuildError::artifact_missing("optimize", std::path::Path::new("build/base.apk")).into();
        assert_eq!(err.kind(), ErrorKind::ArtifactMissing);
        assert_eq!(err.failed_task(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(&io_err, "build/base.apk");
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(err.user_message().contains("build/base.apk"));

        let plain: Error = io_err.into();
        assert!(matches!(plain, Error::Io { path: None, .. }));
    }

    #[test]
    fn test_error_clone() {
        let err = process_failed();
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
