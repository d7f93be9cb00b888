//! # util-jvm
//!
//! The process JVM for Java-backed XQuery external modules.
//!
//! Several modules of the XQuery engine (PDF rendering, XSL-FO, ...) call
//! into Java. A process can only host one JVM, so they all go through this
//! crate to get it:
//!
//! - If a JVM is already running in the process, the calling thread attaches
//!   to it.
//! - Otherwise a JVM is created, with a classpath assembled from every
//!   module's `jars/*-classpath.txt` files and a native library path built
//!   from the engine's module and library paths.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use util_jvm::prelude::*;
//!
//! let manager = JvmManager::locate(JvmConfig::default().option("-Xmx512m"))?;
//! let ctx = MemoryContext::with_lib_dirs(["/usr/lib/zorba/modules"]);
//! let props = MemoryProperties::default();
//!
//! let jvm = manager.get_instance(&ctx, &props)?;
//! let system = jvm.env().find_class("java/lang/System");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              module: UtilJvmModule, createModule         │
//! ├─────────────────────────────────────────────────────────┤
//! │        singleton: JvmManager (attach-or-create once)     │
//! ├──────────────────────────┬──────────────────────────────┤
//! │ classpath: jars scanning │ embed: libjvm, JavaVm,       │
//! │ context: engine traits   │ JavaVmBuilder; env: JniEnv   │
//! ├──────────────────────────┴──────────────────────────────┤
//! │              sys::jni: raw invocation API                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger;
//! that is up to the host.

pub mod sys;
pub mod env;
pub mod error;
pub mod config;
pub mod context;
pub mod classpath;
pub mod embed;
pub mod singleton;
pub mod module;
pub mod prelude;

pub use crate::error::{Error, Result};
pub use crate::singleton::{JvmInstance, JvmManager};
pub use crate::sys::jni;

crate::export_module!(crate::module::UtilJvmModule);
