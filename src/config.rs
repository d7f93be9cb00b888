//! Settings for creating the embedded JVM.

use std::path::PathBuf;

use crate::sys::jni;

/// Option that keeps AWT from looking for a display.
pub const HEADLESS_OPTION: &str = "-Djava.awt.headless=true";

/// How a new VM is created when none exists yet.
///
/// The defaults match what the util-jvm module has always passed: JNI 1.2,
/// headless AWT, strict option checking, and `libjvm` found through
/// `JVM_LIB_PATH` or `JAVA_HOME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmConfig {
    pub jni_version: jni::jint,
    pub headless: bool,
    pub ignore_unrecognized: bool,
    /// Appended after the classpath, headless and library path options.
    pub extra_options: Vec<String>,
    /// Explicit `libjvm` to load instead of searching for one.
    pub libjvm: Option<PathBuf>,
}

impl Default for JvmConfig {
    fn default() -> Self {
        Self {
            jni_version: jni::JNI_VERSION_1_2,
            headless: true,
            ignore_unrecognized: false,
            extra_options: Vec::new(),
            libjvm: None,
        }
    }
}

impl JvmConfig {
    pub fn jni_version(mut self, version: jni::jint) -> Self {
        self.jni_version = version;
        self
    }

    pub fn headless(mut self, value: bool) -> Self {
        self.headless = value;
        self
    }

    pub fn ignore_unrecognized(mut self, value: bool) -> Self {
        self.ignore_unrecognized = value;
        self
    }

    /// Add a JVM option like `-Xmx1g` or `-Dkey=value`.
    pub fn option(mut self, opt: impl Into<String>) -> Self {
        self.extra_options.push(opt.into());
        self
    }

    pub fn libjvm(mut self, path: impl Into<PathBuf>) -> Self {
        self.libjvm = Some(path.into());
        self
    }

    /// The full option list for a VM with the given classpath and native
    /// library path, in the order the VM receives them.
    pub fn vm_options(&self, classpath: &str, lib_path: &str) -> Vec<String> {
        let mut opts = Vec::with_capacity(3 + self.extra_options.len());
        opts.push(format!("-Djava.class.path={classpath}"));
        if self.headless {
            opts.push(HEADLESS_OPTION.to_string());
        }
        opts.push(format!("-Djava.library.path={lib_path}"));
        opts.extend(self.extra_options.iter().cloned());
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_module() {
        let config = JvmConfig::default();
        assert_eq!(config.jni_version, jni::JNI_VERSION_1_2);
        assert!(config.headless);
        assert!(!config.ignore_unrecognized);
        assert!(config.libjvm.is_none());
    }

    #[test]
    fn options_are_ordered() {
        let config = JvmConfig::default().option("-Xmx256m");
        assert_eq!(
            config.vm_options("/a.jar:/b.jar", "/lib"),
            vec![
                "-Djava.class.path=/a.jar:/b.jar".to_string(),
                "-Djava.awt.headless=true".to_string(),
                "-Djava.library.path=/lib".to_string(),
                "-Xmx256m".to_string(),
            ]
        );
    }

    #[test]
    fn headless_can_be_dropped() {
        let opts = JvmConfig::default().headless(false).vm_options("", "");
        assert_eq!(opts.len(), 2);
        assert!(!opts.iter().any(|o| o == HEADLESS_OPTION));
    }
}
