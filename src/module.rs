//! The util-jvm external module as the XQuery engine sees it.
//!
//! The engine loads this library, calls `createModule` and asks the returned
//! module for functions by local name. util-jvm declares its namespace but no
//! functions: its job is to own the process JVM that other Java-backed
//! modules share.

use std::sync::Arc;

use crate::config::JvmConfig;
use crate::context::{GlobalProperties, StaticContext};
use crate::error::Result;
use crate::singleton::{JvmInstance, JvmManager};

pub const UTILJVM_MODULE_NAMESPACE: &str = "http://www.zorba-xquery.com/modules/util-jvm";
pub const UTILJVM_OPTIONS_NAMESPACE: &str =
    "http://www.zorba-xquery.com/modules/util-jvm/util-jvm-options";

/// A function the engine can call from XQuery.
pub trait ExternalFunction: Send + Sync {
    fn uri(&self) -> &str;
    fn local_name(&self) -> &str;
}

/// A plugin unit loaded by the engine's module loader.
pub trait ExternalModule: Send + Sync {
    /// Namespace URI the module is imported by.
    fn uri(&self) -> &str;

    /// The function called `local_name` in this module's namespace.
    fn external_function(&self, local_name: &str) -> Option<&dyn ExternalFunction>;
}

/// What `createModule` hands across the C boundary.
pub struct ModuleHandle {
    module: Box<dyn ExternalModule>,
}

impl ModuleHandle {
    pub fn new(module: Box<dyn ExternalModule>) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &dyn ExternalModule {
        self.module.as_ref()
    }
}

/// The util-jvm module.
#[derive(Default)]
pub struct UtilJvmModule {
    manager: Option<Arc<JvmManager>>,
}

impl UtilJvmModule {
    /// A module that uses `manager` instead of the process-wide one.
    pub fn with_manager(manager: Arc<JvmManager>) -> Self {
        Self {
            manager: Some(manager),
        }
    }

    pub fn manager(&self) -> Result<&JvmManager> {
        match &self.manager {
            Some(manager) => Ok(manager.as_ref()),
            None => JvmManager::shared(JvmConfig::default()),
        }
    }

    /// The process JVM, resolved against the importing query's context.
    pub fn jvm<C, P>(&self, ctx: &C, props: &P) -> Result<JvmInstance<'_>>
    where
        C: StaticContext + ?Sized,
        P: GlobalProperties + ?Sized,
    {
        self.manager()?.get_instance(ctx, props)
    }
}

impl ExternalModule for UtilJvmModule {
    fn uri(&self) -> &str {
        UTILJVM_MODULE_NAMESPACE
    }

    fn external_function(&self, _local_name: &str) -> Option<&dyn ExternalFunction> {
        None
    }
}

/// Export `createModule` / `destroyModule` for a module type.
///
/// The type must implement [`ExternalModule`] and `Default`.
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct MyModule;
///
/// impl ExternalModule for MyModule { /* ... */ }
///
/// export_module!(MyModule);
/// ```
#[macro_export]
macro_rules! export_module {
    ($module_type:ty) => {
        #[no_mangle]
        #[allow(non_snake_case, improper_ctypes_definitions)]
        pub extern "C" fn createModule() -> *mut $crate::module::ModuleHandle {
            let module: Box<dyn $crate::module::ExternalModule> =
                Box::new(<$module_type>::default());
            Box::into_raw(Box::new($crate::module::ModuleHandle::new(module)))
        }

        /// # Safety
        /// `handle` must come from `createModule` and not be used afterwards.
        #[no_mangle]
        #[allow(non_snake_case, improper_ctypes_definitions)]
        pub unsafe extern "C" fn destroyModule(handle: *mut $crate::module::ModuleHandle) {
            if !handle.is_null() {
                drop(Box::from_raw(handle));
            }
        }
    };
}
