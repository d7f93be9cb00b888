//! The process-wide JVM accessor.
//!
//! A process can host at most one JVM. [`JvmManager`] hands out that VM,
//! starting it on first use, or joining it if another library in the process
//! got there first. Initialization runs at most once per manager, even when
//! several threads ask for the VM at the same time.

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::classpath::{compute_classpath, compute_lib_path};
use crate::config::JvmConfig;
use crate::context::{GlobalProperties, StaticContext};
use crate::embed::{Invocation, JavaVm, JavaVmBuilder};
use crate::env::JniEnv;
use crate::error::Result;

/// The shared VM together with an env for the calling thread.
#[derive(Debug)]
pub struct JvmInstance<'a> {
    vm: &'a JavaVm,
    env: JniEnv,
}

impl<'a> JvmInstance<'a> {
    pub fn vm(&self) -> &'a JavaVm {
        self.vm
    }

    /// The calling thread's env. Do not move it to another thread.
    pub fn env(&self) -> &JniEnv {
        &self.env
    }

    pub fn into_env(self) -> JniEnv {
        self.env
    }
}

/// Owner of the one JVM this process uses.
///
/// Construct one at startup and share it, or use [`JvmManager::shared`] when
/// there is no startup path to hang it on.
pub struct JvmManager {
    invocation: Invocation,
    config: JvmConfig,
    vm: OnceCell<JavaVm>,
}

impl JvmManager {
    pub fn new(invocation: Invocation, config: JvmConfig) -> Self {
        Self {
            invocation,
            config,
            vm: OnceCell::new(),
        }
    }

    /// A manager backed by the `libjvm` that `config` points at, or the one
    /// found through `JVM_LIB_PATH` / `JAVA_HOME`.
    pub fn locate(config: JvmConfig) -> Result<Self> {
        let invocation = Invocation::locate(&config)?;
        Ok(Self::new(invocation, config))
    }

    /// The process-wide manager.
    ///
    /// `config` is only used by the call that creates the manager; later
    /// calls get the existing one. If loading `libjvm` fails, the next call
    /// tries again.
    pub fn shared(config: JvmConfig) -> Result<&'static JvmManager> {
        static SHARED: OnceCell<JvmManager> = OnceCell::new();
        SHARED.get_or_try_init(|| Self::locate(config))
    }

    pub fn config(&self) -> &JvmConfig {
        &self.config
    }

    /// The VM, if a previous call already acquired it.
    pub fn get(&self) -> Option<&JavaVm> {
        self.vm.get()
    }

    /// The process JVM, with an env for the calling thread.
    ///
    /// On first use this attaches to a VM that is already running, or creates
    /// one whose classpath and library path come from `ctx`. The computed
    /// classpath is cached back into `props`. If creating the VM fails, the
    /// cached value is put back the way it was, so a retry starts from the
    /// same global classpath.
    pub fn get_instance<C, P>(&self, ctx: &C, props: &P) -> Result<JvmInstance<'_>>
    where
        C: StaticContext + ?Sized,
        P: GlobalProperties + ?Sized,
    {
        let vm = self.vm.get_or_try_init(|| {
            let global = props.jvm_classpath();
            self.acquire(|| Ok((compute_classpath(ctx, props)?, compute_lib_path(ctx))))
                .map_err(|e| {
                    props.set_jvm_classpath(&global);
                    e
                })
        })?;
        Self::instance(vm)
    }

    /// Like [`get_instance`](Self::get_instance), with the classpath and
    /// native library path already computed.
    pub fn get_instance_with(&self, classpath: &str, lib_path: &str) -> Result<JvmInstance<'_>> {
        let vm = self.vm.get_or_try_init(|| {
            self.acquire(|| Ok((classpath.to_string(), lib_path.to_string())))
        })?;
        Self::instance(vm)
    }

    fn acquire<F>(&self, paths: F) -> Result<JavaVm>
    where
        F: FnOnce() -> Result<(String, String)>,
    {
        if let Some(existing) = self.invocation.existing_vm() {
            // Another library in this process already started a VM.
            match unsafe { self.invocation.attach_existing(existing) } {
                Ok(vm) => return Ok(vm),
                Err(e) => warn!("could not attach to the running Java VM, creating one: {e}"),
            }
        }

        let (classpath, lib_path) = paths()?;
        info!("creating Java VM, classpath: '{classpath}'");
        JavaVmBuilder::from_config(&self.config, &classpath, &lib_path)?
            .create_with(&self.invocation)
    }

    fn instance(vm: &JavaVm) -> Result<JvmInstance<'_>> {
        let env = vm.attach_current_thread()?;
        Ok(JvmInstance { vm, env })
    }
}

impl std::fmt::Debug for JvmManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JvmManager")
            .field("invocation", &self.invocation)
            .field("config", &self.config)
            .field("vm", &self.vm.get())
            .finish()
    }
}
