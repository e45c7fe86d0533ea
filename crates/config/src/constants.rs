//! Property keys and their documented defaults
//!
//! Keys match the flat `build.properties` format the host writes. Every
//! optional key has a default here; an absent key is never an error.

pub const ANDROID_JAR_PATH: &str = "androidJarPath";
pub const BUILD_PATH: &str = "buildPath";
pub const MANIFEST_PATH: &str = "manifestPath";
pub const RES_DIR: &str = "resDir";
pub const ASSETS_DIR: &str = "assetsDir";
pub const NATIVE_LIBS_DIR: &str = "nativeLibsDir";
pub const DESUGAR_JDK_LIBS_PATH: &str = "desugarJdkLibsPath";
pub const PROGUARD_RULES_PATH: &str = "proguardRulesPath";
pub const JAVA_SOURCES: &str = "javaSources";

pub const APP_PACKAGE: &str = "appPackage";
pub const PACKAGE_ID: &str = "packageId";
pub const VERSION_NAME: &str = "versionName";
pub const VERSION_CODE: &str = "versionCode";
pub const MIN_SDK: &str = "minSdk";
pub const TARGET_SDK: &str = "targetSdk";
pub const JAVA_VERSION: &str = "javaVersion";

pub const DEBUG_MODE: &str = "debugMode";
pub const R8_ENABLED: &str = "r8enabled";
pub const APK_ALIGN_ENABLE: &str = "apkAlignEnable";
pub const APK_SIGN_ENABLE: &str = "apkSignEnable";
pub const AAPT2_OPTIMIZE_ENABLE: &str = "aapt2OptimizeEnable";

pub const USE_KEYSTORE: &str = "keyConfig.useKeystore";
pub const KEYSTORE_PATH: &str = "keyConfig.keystore.path";
pub const KEYSTORE_ALIAS: &str = "keyConfig.keystore.alias";
pub const KEYSTORE_STORE_PASSWORD: &str = "keyConfig.keystore.storePassword";
pub const KEYSTORE_KEY_PASSWORD: &str = "keyConfig.keystore.keyPassword";
pub const KEY_WITH_CERT_KEY_PATH: &str = "keyConfig.keyWithCert.keyPath";
pub const KEY_WITH_CERT_CERT_PATH: &str = "keyConfig.keyWithCert.certPath";

/// Separator between entries of [`JAVA_SOURCES`]
pub const SOURCE_ROOT_DELIMITER: char = ';';

pub const DEFAULT_BUILD_PATH: &str = "build";
pub const DEFAULT_MANIFEST_PATH: &str = "AndroidManifest.xml";
pub const DEFAULT_RES_DIR: &str = "res";
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_NATIVE_LIBS_DIR: &str = "libs";
pub const DEFAULT_JAVA_SOURCES: &str = "src/main/java";

pub const DEFAULT_APP_PACKAGE: &str = "com.example.app";
pub const DEFAULT_PACKAGE_ID: &str = "0x7f";
pub const DEFAULT_VERSION_NAME: &str = "1.0";
pub const DEFAULT_VERSION_CODE: u32 = 1;
pub const DEFAULT_MIN_SDK: u32 = 21;
pub const DEFAULT_TARGET_SDK: u32 = 33;
pub const DEFAULT_JAVA_VERSION: u32 = 17;

pub const DEFAULT_DEBUG_MODE: bool = true;
pub const DEFAULT_R8_ENABLED: bool = false;
pub const DEFAULT_APK_ALIGN_ENABLE: bool = true;
pub const DEFAULT_APK_SIGN_ENABLE: bool = true;
pub const DEFAULT_AAPT2_OPTIMIZE_ENABLE: bool = true;
pub const DEFAULT_USE_KEYSTORE: bool = false;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "build.properties";
