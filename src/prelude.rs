//! Common imports for modules that need the process JVM.

pub use crate::config::JvmConfig;
pub use crate::context::{GlobalProperties, MemoryContext, MemoryProperties, StaticContext};
pub use crate::embed::{Invocation, JavaVm, JavaVmBuilder, VmOrigin};
pub use crate::env::JniEnv;
pub use crate::error::{Error, Result};
pub use crate::module::{ExternalFunction, ExternalModule, UtilJvmModule};
pub use crate::singleton::{JvmInstance, JvmManager};
pub use crate::sys::jni;
