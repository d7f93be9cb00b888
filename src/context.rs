//! What the crate needs from the host XQuery engine.
//!
//! The engine resolves module, URI and library paths through its static
//! context, and keeps the JVM classpath in a process-global property store so
//! every module sees the same value. Both are modelled as traits here; the
//! `Memory*` types are plain implementations for embedders without an engine
//! of their own, and for tests.

use std::path::PathBuf;
use std::sync::RwLock;

/// Path-resolution queries against the engine's static context.
///
/// "Full" paths include everything inherited from enclosing contexts; the
/// plain variants only what was set on this one.
pub trait StaticContext {
    fn full_lib_path(&self) -> Vec<PathBuf>;
    fn lib_path(&self) -> Vec<PathBuf>;
    fn full_uri_path(&self) -> Vec<PathBuf>;
    fn uri_path(&self) -> Vec<PathBuf>;
    fn full_module_paths(&self) -> Vec<PathBuf>;
    fn module_paths(&self) -> Vec<PathBuf>;
}

/// The engine's global property store, used as the classpath cache.
pub trait GlobalProperties: Send + Sync {
    fn jvm_classpath(&self) -> String;
    fn set_jvm_classpath(&self, classpath: &str);
}

/// A static context whose paths are fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    pub full_lib_path: Vec<PathBuf>,
    pub lib_path: Vec<PathBuf>,
    pub full_uri_path: Vec<PathBuf>,
    pub uri_path: Vec<PathBuf>,
    pub full_module_paths: Vec<PathBuf>,
    pub module_paths: Vec<PathBuf>,
}

impl MemoryContext {
    /// A context where every library directory is also visible through the
    /// full library path, the usual shape of an engine started with `--lib-path`.
    pub fn with_lib_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs: Vec<PathBuf> = dirs.into_iter().map(Into::into).collect();
        Self {
            full_lib_path: dirs.clone(),
            lib_path: dirs,
            ..Self::default()
        }
    }
}

impl StaticContext for MemoryContext {
    fn full_lib_path(&self) -> Vec<PathBuf> {
        self.full_lib_path.clone()
    }

    fn lib_path(&self) -> Vec<PathBuf> {
        self.lib_path.clone()
    }

    fn full_uri_path(&self) -> Vec<PathBuf> {
        self.full_uri_path.clone()
    }

    fn uri_path(&self) -> Vec<PathBuf> {
        self.uri_path.clone()
    }

    fn full_module_paths(&self) -> Vec<PathBuf> {
        self.full_module_paths.clone()
    }

    fn module_paths(&self) -> Vec<PathBuf> {
        self.module_paths.clone()
    }
}

/// Property store held in memory.
#[derive(Debug, Default)]
pub struct MemoryProperties {
    classpath: RwLock<String>,
}

impl MemoryProperties {
    pub fn new(classpath: impl Into<String>) -> Self {
        Self {
            classpath: RwLock::new(classpath.into()),
        }
    }
}

impl GlobalProperties for MemoryProperties {
    fn jvm_classpath(&self) -> String {
        match self.classpath.read() {
            Ok(cp) => cp.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_jvm_classpath(&self, classpath: &str) {
        let mut cp = match self.classpath.write() {
            Ok(cp) => cp,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cp = classpath.to_string();
    }
}
