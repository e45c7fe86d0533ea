//! Integration tests for config

#[cfg(test)]
mod tests {
    use apkb_config::constants as keys;
    use apkb_config::properties::{self, from_properties, to_properties, Properties};
    use apkb_config::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// Every documented key with its literal default
    const DEFAULTS: &[(&str, &str)] = &[
        (keys::ANDROID_JAR_PATH, ""),
        (keys::BUILD_PATH, "build"),
        (keys::MANIFEST_PATH, "AndroidManifest.xml"),
        (keys::RES_DIR, "res"),
        (keys::ASSETS_DIR, "assets"),
        (keys::NATIVE_LIBS_DIR, "libs"),
        (keys::DESUGAR_JDK_LIBS_PATH, ""),
        (keys::PROGUARD_RULES_PATH, ""),
        (keys::APP_PACKAGE, "com.example.app"),
        (keys::PACKAGE_ID, "0x7f"),
        (keys::VERSION_NAME, "1.0"),
        (keys::VERSION_CODE, "1"),
        (keys::MIN_SDK, "21"),
        (keys::TARGET_SDK, "33"),
        (keys::JAVA_VERSION, "17"),
        (keys::DEBUG_MODE, "true"),
        (keys::R8_ENABLED, "false"),
        (keys::APK_ALIGN_ENABLE, "true"),
        (keys::APK_SIGN_ENABLE, "true"),
        (keys::AAPT2_OPTIMIZE_ENABLE, "true"),
        (keys::JAVA_SOURCES, "src/main/java"),
        (keys::USE_KEYSTORE, "false"),
        (keys::KEYSTORE_PATH, ""),
        (keys::KEYSTORE_ALIAS, ""),
        (keys::KEYSTORE_STORE_PASSWORD, ""),
        (keys::KEYSTORE_KEY_PASSWORD, ""),
        (keys::KEY_WITH_CERT_KEY_PATH, ""),
        (keys::KEY_WITH_CERT_CERT_PATH, ""),
    ];

    #[test]
    fn test_empty_properties_use_defaults() {
        let config = from_properties(&Properties::new());

        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.paths().build_dir, PathBuf::from("build"));
        assert_eq!(config.paths().java_sources, vec![PathBuf::from("src/main/java")]);
        assert_eq!(config.identity().package_id, "0x7f");
        assert_eq!(config.identity().target_sdk, 33);
        assert!(config.features().debuggable);
        assert!(!config.features().shrink);
        assert!(!config.signing().uses_keystore());
    }

    #[test]
    fn test_each_missing_key_takes_its_default() {
        // Start from a set where every key differs from its default, then
        // drop one key at a time and check only that key reverts.
        let custom = props(&[
            (keys::ANDROID_JAR_PATH, "sdk/android.jar"),
            (keys::BUILD_PATH, "out"),
            (keys::MANIFEST_PATH, "app/AndroidManifest.xml"),
            (keys::RES_DIR, "app/res"),
            (keys::ASSETS_DIR, "app/assets"),
            (keys::NATIVE_LIBS_DIR, "app/jniLibs"),
            (keys::DESUGAR_JDK_LIBS_PATH, "desugar.jar"),
            (keys::PROGUARD_RULES_PATH, "proguard-rules.pro"),
            (keys::APP_PACKAGE, "org.demo"),
            (keys::PACKAGE_ID, "0x80"),
            (keys::VERSION_NAME, "2.3"),
            (keys::VERSION_CODE, "23"),
            (keys::MIN_SDK, "26"),
            (keys::TARGET_SDK, "34"),
            (keys::JAVA_VERSION, "11"),
            (keys::DEBUG_MODE, "false"),
            (keys::R8_ENABLED, "true"),
            (keys::APK_ALIGN_ENABLE, "false"),
            (keys::APK_SIGN_ENABLE, "false"),
            (keys::AAPT2_OPTIMIZE_ENABLE, "false"),
            (keys::JAVA_SOURCES, "a;b"),
            (keys::USE_KEYSTORE, "false"),
            (keys::KEY_WITH_CERT_KEY_PATH, "key.pk8"),
            (keys::KEY_WITH_CERT_CERT_PATH, "cert.pem"),
        ]);
        let defaults = props(DEFAULTS);

        for key in custom.keys() {
            let mut reduced = custom.clone();
            reduced.remove(key);

            let rendered = to_properties(&from_properties(&reduced));
            assert_eq!(rendered[key], defaults[key], "default for {key}");

            for (other, value) in &custom {
                if other != key {
                    assert_eq!(&rendered[other], value, "{other} changed when {key} was dropped");
                }
            }
        }
    }

    #[test]
    fn test_defaults_table_is_complete() {
        let rendered = to_properties(&BuildConfig::default());
        assert_eq!(rendered, props(DEFAULTS));
    }

    #[test]
    fn test_source_roots_keep_order_and_drop_empties() {
        let config = from_properties(&props(&[(
            keys::JAVA_SOURCES,
            " lib/src ;; app/src;  ;gen ; lib/src;",
        )]));

        assert_eq!(
            config.paths().java_sources,
            vec![
                PathBuf::from("lib/src"),
                PathBuf::from("app/src"),
                PathBuf::from("gen"),
                PathBuf::from("lib/src"),
            ]
        );
    }

    #[test]
    fn test_reordered_source_roots_follow_input_order() {
        let forward = properties::split_source_roots("a;b;c");
        let backward = properties::split_source_roots("c;b;a");

        assert_eq!(forward, ["a", "b", "c"].map(PathBuf::from));
        assert_eq!(backward, ["c", "b", "a"].map(PathBuf::from));
    }

    #[test]
    fn test_booleans_parse_permissively() {
        let config = from_properties(&props(&[
            (keys::DEBUG_MODE, "TRUE"),
            (keys::R8_ENABLED, "True"),
            (keys::APK_ALIGN_ENABLE, "yes"),
            (keys::APK_SIGN_ENABLE, "1"),
            (keys::AAPT2_OPTIMIZE_ENABLE, ""),
        ]));

        assert!(config.features().debuggable);
        assert!(config.features().shrink);
        assert!(!config.features().align);
        assert!(!config.features().sign);
        assert!(!config.features().optimize);
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = from_properties(&props(&[
            (keys::MIN_SDK, "twenty"),
            (keys::VERSION_CODE, "-4"),
            (keys::TARGET_SDK, " 34 "),
        ]));

        assert_eq!(config.identity().min_sdk, 21);
        assert_eq!(config.identity().version_code, 1);
        assert_eq!(config.identity().target_sdk, 34);
    }

    #[test]
    fn test_keystore_variant_ignores_key_with_cert_fields() {
        let config = from_properties(&props(&[
            (keys::USE_KEYSTORE, "true"),
            (keys::KEYSTORE_PATH, "release.jks"),
            (keys::KEYSTORE_ALIAS, "upload"),
            (keys::KEYSTORE_STORE_PASSWORD, "store-secret"),
            (keys::KEYSTORE_KEY_PASSWORD, "key-secret"),
            (keys::KEY_WITH_CERT_KEY_PATH, "ignored.pk8"),
            (keys::KEY_WITH_CERT_CERT_PATH, "ignored.pem"),
        ]));

        assert_eq!(
            config.signing(),
            &SigningConfig::Keystore {
                path: PathBuf::from("release.jks"),
                alias: "upload".into(),
                store_password: "store-secret".into(),
                key_password: "key-secret".into(),
            }
        );

        let rendered = to_properties(&config);
        assert_eq!(rendered[keys::KEY_WITH_CERT_KEY_PATH], "");
        assert_eq!(rendered[keys::KEY_WITH_CERT_CERT_PATH], "");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = from_properties(&props(&[("someFutureKey", "value"), (keys::MIN_SDK, "24")]));
        assert_eq!(config.identity().min_sdk, 24);
        assert!(!to_properties(&config).contains_key("someFutureKey"));
    }

    #[test]
    fn test_overrides() {
        let mut set = props(&[(keys::DEBUG_MODE, "true")]);
        let parsed = properties::parse_override("debugMode = false").unwrap();
        properties::apply_overrides(&mut set, [parsed]);
        assert_eq!(set[keys::DEBUG_MODE], "false");

        assert!(properties::parse_override("debugMode").is_err());
        assert!(properties::parse_override("=true").is_err());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = BuildConfig::builder()
            .android_jar("/sdk/platforms/android-34/android.jar")
            .java_sources(["src", "gen"])
            .package("org.sample")
            .version("3.1", 31)
            .align(false)
            .build();

        assert_eq!(
            config.paths().android_jar,
            PathBuf::from("/sdk/platforms/android-34/android.jar")
        );
        assert_eq!(config.paths().java_sources.len(), 2);
        assert_eq!(config.identity().version_code, 31);
        assert!(!config.features().align);
        assert!(config.features().sign);
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r"
# generated by the host
androidJarPath=/opt/android/android.jar
javaSources=src/main/java;src/extra/java
minSdk : 26
! legacy comment
apkSignEnable=false
"
        )
        .unwrap();

        let config = BuildConfig::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(
            config.paths().android_jar,
            PathBuf::from("/opt/android/android.jar")
        );
        assert_eq!(config.paths().java_sources.len(), 2);
        assert_eq!(config.identity().min_sdk, 26);
        assert!(!config.features().sign);
        assert!(config.features().align);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.properties");

        let config = BuildConfig::builder()
            .package("org.roundtrip")
            .shrink(true)
            .build();
        config.save_to_file(&path).await.unwrap();

        let loaded = BuildConfig::load_from_file(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildConfig::load_from_file(&dir.path().join("nope.properties"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            apkb_errors::Error::Config(apkb_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_latin1_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.properties");
        std::fs::write(&path, b"versionName=1.0-caf\xe9\nminSdk=24\n").unwrap();

        let config = BuildConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.identity().version_name, "1.0-caf\u{e9}");
        assert_eq!(config.identity().min_sdk, 24);
    }

    #[tokio::test]
    async fn test_unreadable_path_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildConfig::load_from_file(dir.path()).await.unwrap_err();

        assert_eq!(err.kind(), apkb_errors::ErrorKind::IoFailure);
        assert!(!matches!(
            err,
            apkb_errors::Error::Config(apkb_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_java_escaped_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.properties");
        std::fs::write(
            &path,
            "versionName=1.0-caf\\u00e9\njavaSources=src/main/java;\\\n  src/gen/java\n",
        )
        .unwrap();

        let config = BuildConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.identity().version_name, "1.0-caf\u{e9}");
        assert_eq!(
            config.paths().java_sources,
            [PathBuf::from("src/main/java"), PathBuf::from("src/gen/java")]
        );
    }
}
