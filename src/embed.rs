//! Creating, finding and attaching to a JVM inside this process.
//!
//! [`Invocation`] holds the two `libjvm` entry points the crate needs.
//! [`JavaVmBuilder`] turns option strings into a VM, and [`JavaVm`] is the
//! resulting handle, whether this crate created the VM or found one that
//! another library had already started.

use std::ffi::{CString, NulError, OsString};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

use log::{debug, info};

use crate::config::JvmConfig;
use crate::env::JniEnv;
use crate::error::{Error, Result};
use crate::sys::jni;

fn libjvm_filename() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "jvm.dll"
    }
    #[cfg(target_os = "macos")]
    {
        "libjvm.dylib"
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        "libjvm.so"
    }
}

fn candidates_from_java_home(java_home: &Path) -> Vec<PathBuf> {
    let filename = libjvm_filename();
    let arch = std::env::consts::ARCH;

    let mut rels = vec![
        format!("lib/server/{filename}"),
        format!("jre/lib/server/{filename}"),
        format!("lib/{arch}/server/{filename}"),
        format!("jre/lib/{arch}/server/{filename}"),
    ];

    if cfg!(target_os = "windows") {
        rels.push(format!("bin/server/{filename}"));
        rels.push(format!("jre/bin/server/{filename}"));
        rels.push(format!("bin/client/{filename}"));
        rels.push(format!("jre/bin/client/{filename}"));
    }

    rels.into_iter().map(|r| java_home.join(r)).collect()
}

/// Try to locate `libjvm` using `JVM_LIB_PATH` or `JAVA_HOME`.
pub fn find_libjvm() -> Result<PathBuf> {
    find_libjvm_in(std::env::var_os("JVM_LIB_PATH"), std::env::var_os("JAVA_HOME"))
}

fn find_libjvm_in(jvm_lib_path: Option<OsString>, java_home: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = jvm_lib_path {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        return Err(Error::Locate(format!(
            "JVM_LIB_PATH is set but does not exist: {}",
            path.display()
        )));
    }

    if let Some(java_home) = java_home {
        let java_home = PathBuf::from(java_home);
        if let Some(candidate) = candidates_from_java_home(&java_home)
            .into_iter()
            .find(|p| p.exists())
        {
            return Ok(candidate);
        }
        return Err(Error::Locate(format!(
            "Could not find {} under JAVA_HOME={}. Set JVM_LIB_PATH explicitly.",
            libjvm_filename(),
            java_home.display()
        )));
    }

    Err(Error::Locate(
        "JAVA_HOME is not set. Set JAVA_HOME or JVM_LIB_PATH to locate libjvm.".to_string(),
    ))
}

/// The JNI invocation entry points of a loaded `libjvm`.
#[derive(Clone)]
pub struct Invocation {
    create: jni::JNI_CreateJavaVM,
    get_created: jni::JNI_GetCreatedJavaVMs,
    lib: Option<Arc<libloading::Library>>,
}

impl Invocation {
    /// Use entry points that are already linked into the process.
    ///
    /// # Safety
    /// Both function pointers must follow the JNI invocation API contract
    /// and stay valid for as long as any `JavaVm` created through them.
    pub unsafe fn from_raw(
        create: jni::JNI_CreateJavaVM,
        get_created: jni::JNI_GetCreatedJavaVMs,
    ) -> Self {
        Self {
            create,
            get_created,
            lib: None,
        }
    }

    /// Load `libjvm` from the given path and resolve its entry points.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading libjvm from {}", path.display());
        let lib = unsafe {
            libloading::Library::new(path).map_err(|e| Error::Load(e.to_string()))?
        };

        let (create, get_created) = unsafe {
            let create: libloading::Symbol<jni::JNI_CreateJavaVM> = lib
                .get(b"JNI_CreateJavaVM\0")
                .map_err(|e| Error::Load(e.to_string()))?;
            let get_created: libloading::Symbol<jni::JNI_GetCreatedJavaVMs> = lib
                .get(b"JNI_GetCreatedJavaVMs\0")
                .map_err(|e| Error::Load(e.to_string()))?;
            (*create, *get_created)
        };

        Ok(Self {
            create,
            get_created,
            lib: Some(Arc::new(lib)),
        })
    }

    /// Load `libjvm` from `config.libjvm`, or locate it with [`find_libjvm`].
    pub fn locate(config: &JvmConfig) -> Result<Self> {
        match &config.libjvm {
            Some(path) => Self::load(path),
            None => Self::load(find_libjvm()?),
        }
    }

    /// The VM already running in this process, if the runtime reports
    /// exactly one.
    pub fn existing_vm(&self) -> Option<*mut jni::JavaVM> {
        let mut vm: *mut jni::JavaVM = ptr::null_mut();
        let mut count: jni::jsize = 0;
        let res = unsafe { (self.get_created)(&mut vm, 1, &mut count) };
        if res != jni::JNI_OK {
            debug!("JNI_GetCreatedJavaVMs failed: {}", jni::describe_code(res));
            return None;
        }
        if count == 1 && !vm.is_null() {
            Some(vm)
        } else {
            None
        }
    }

    /// Attach the current thread to a VM that someone else created.
    ///
    /// # Safety
    /// `vm` must be a live `JavaVM*` obtained from this runtime.
    pub unsafe fn attach_existing(&self, vm: *mut jni::JavaVM) -> Result<JavaVm> {
        let mut env_ptr: *mut std::os::raw::c_void = ptr::null_mut();
        let res = crate::jvm_call!(vm, AttachCurrentThread, &mut env_ptr, ptr::null_mut());
        if res != jni::JNI_OK || env_ptr.is_null() {
            return Err(Error::Attach(res));
        }
        info!("attached to the Java VM already running in this process");
        Ok(JavaVm {
            vm,
            creator_env: env_ptr as *mut jni::JNIEnv,
            origin: VmOrigin::Attached,
            destroyed: false,
            _lib: self.lib.clone(),
        })
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("dynamic", &self.lib.is_some())
            .finish()
    }
}

/// Builder for creating an embedded JVM.
///
/// Option strings are owned here and only lent to the VM for the duration
/// of `JNI_CreateJavaVM`.
#[derive(Debug)]
pub struct JavaVmBuilder {
    version: jni::jint,
    options: Vec<CString>,
    ignore_unrecognized: bool,
}

impl JavaVmBuilder {
    /// Create a new builder for the given JNI version (e.g. `jni::JNI_VERSION_1_2`).
    pub fn new(version: jni::jint) -> Self {
        Self {
            version,
            options: Vec::new(),
            ignore_unrecognized: false,
        }
    }

    /// A builder carrying every option the module passes for this classpath
    /// and native library path.
    pub fn from_config(config: &JvmConfig, classpath: &str, lib_path: &str) -> Result<Self> {
        Ok(Self::new(config.jni_version)
            .options(config.vm_options(classpath, lib_path))?
            .ignore_unrecognized(config.ignore_unrecognized))
    }

    /// Add a JVM option like `-Xmx1g` or `-Dkey=value`.
    pub fn option(mut self, opt: &str) -> std::result::Result<Self, NulError> {
        self.options.push(CString::new(opt)?);
        Ok(self)
    }

    /// Add multiple JVM options.
    pub fn options<I, S>(mut self, opts: I) -> std::result::Result<Self, NulError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for opt in opts {
            self.options.push(CString::new(opt.as_ref())?);
        }
        Ok(self)
    }

    /// Set whether unrecognized options should be ignored.
    pub fn ignore_unrecognized(mut self, value: bool) -> Self {
        self.ignore_unrecognized = value;
        self
    }

    /// The option strings, in the order the VM will see them.
    pub fn option_strings(&self) -> impl Iterator<Item = &str> + '_ {
        self.options.iter().filter_map(|s| s.to_str().ok())
    }

    fn build_args(&mut self) -> (jni::JavaVMInitArgs, Vec<jni::JavaVMOption>) {
        let mut opt_structs: Vec<jni::JavaVMOption> = self
            .options
            .iter_mut()
            .map(|s| jni::JavaVMOption {
                optionString: s.as_ptr() as *mut std::os::raw::c_char,
                extraInfo: ptr::null_mut(),
            })
            .collect();

        let args = jni::JavaVMInitArgs {
            version: self.version,
            nOptions: opt_structs.len() as jni::jint,
            options: if opt_structs.is_empty() {
                ptr::null_mut()
            } else {
                opt_structs.as_mut_ptr()
            },
            ignoreUnrecognized: if self.ignore_unrecognized {
                jni::JNI_TRUE
            } else {
                jni::JNI_FALSE
            },
        };

        (args, opt_structs)
    }

    /// Create a JVM through the given invocation entry points.
    pub fn create_with(self, invocation: &Invocation) -> Result<JavaVm> {
        let mut this = self;
        let (mut args, _opt_structs) = this.build_args();

        let mut vm: *mut jni::JavaVM = ptr::null_mut();
        let mut env: *mut jni::JNIEnv = ptr::null_mut();

        let res = unsafe { (invocation.create)(&mut vm, &mut env, &mut args) };
        if res != jni::JNI_OK {
            return Err(Error::VmOpen(res));
        }
        if vm.is_null() || env.is_null() {
            return Err(Error::VmOpen(jni::JNI_ERR));
        }
        info!("created Java VM with {} options", args.nOptions);

        Ok(JavaVm {
            vm,
            creator_env: env,
            origin: VmOrigin::Created,
            destroyed: false,
            _lib: invocation.lib.clone(),
        })
    }

    /// Create a JVM by dynamically loading `libjvm` from the given path.
    pub fn create_from_library<P: AsRef<Path>>(self, path: P) -> Result<JavaVm> {
        let invocation = Invocation::load(path)?;
        self.create_with(&invocation)
    }

    /// Create a JVM by locating `libjvm` from `JVM_LIB_PATH` or `JAVA_HOME`.
    pub fn create(self) -> Result<JavaVm> {
        let path = find_libjvm()?;
        self.create_from_library(path)
    }
}

/// Whether this crate started the VM or joined one that was already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmOrigin {
    Created,
    Attached,
}

/// Embedded JVM handle.
///
/// The `creator_env` is only valid on the thread that created or first
/// attached to the JVM. A created VM is destroyed when the handle drops; an
/// attached one is left running for its owner.
pub struct JavaVm {
    vm: *mut jni::JavaVM,
    creator_env: *mut jni::JNIEnv,
    origin: VmOrigin,
    destroyed: bool,
    _lib: Option<Arc<libloading::Library>>,
}

// A `JavaVM*` may be used from any thread; per-thread envs are handed out
// through `attach_current_thread`.
unsafe impl Send for JavaVm {}
unsafe impl Sync for JavaVm {}

impl JavaVm {
    /// Return the raw `JavaVM*` pointer.
    pub fn java_vm_ptr(&self) -> *mut jni::JavaVM {
        self.vm
    }

    /// Return the raw `JNIEnv*` for the thread that created the JVM.
    pub fn creator_env_ptr(&self) -> *mut jni::JNIEnv {
        self.creator_env
    }

    pub fn origin(&self) -> VmOrigin {
        self.origin
    }

    /// Wrap the creator thread's `JNIEnv*` in a `JniEnv`.
    ///
    /// # Safety
    /// This is only valid on the thread that created the JVM.
    pub unsafe fn creator_env(&self) -> JniEnv {
        JniEnv::from_raw(self.creator_env)
    }

    /// Attach the current thread to the JVM and return a `JniEnv`.
    ///
    /// Attaching a thread that is already attached returns its existing env.
    pub fn attach_current_thread(&self) -> Result<JniEnv> {
        let mut env_ptr: *mut std::os::raw::c_void = ptr::null_mut();
        let res = unsafe {
            crate::jvm_call!(self.vm, AttachCurrentThread, &mut env_ptr, ptr::null_mut())
        };
        if res != jni::JNI_OK || env_ptr.is_null() {
            return Err(Error::Attach(res));
        }
        Ok(unsafe { JniEnv::from_raw(env_ptr as *mut jni::JNIEnv) })
    }

    /// The current thread's env, or `None` if the thread is not attached.
    pub fn get_env(&self, version: jni::jint) -> Result<Option<JniEnv>> {
        let mut env_ptr: *mut std::os::raw::c_void = ptr::null_mut();
        let res = unsafe { crate::jvm_call!(self.vm, GetEnv, &mut env_ptr, version) };
        match res {
            jni::JNI_OK if !env_ptr.is_null() => {
                Ok(Some(unsafe { JniEnv::from_raw(env_ptr as *mut jni::JNIEnv) }))
            }
            jni::JNI_EDETACHED => Ok(None),
            code => Err(Error::Attach(code)),
        }
    }

    /// Detach the current thread from the JVM.
    pub fn detach_current_thread(&self) -> Result<()> {
        let res = unsafe { crate::jvm_call!(self.vm, DetachCurrentThread) };
        if res != jni::JNI_OK {
            return Err(Error::Attach(res));
        }
        Ok(())
    }

    /// Destroy the JVM (explicit shutdown).
    ///
    /// Refused for a VM this crate only attached to.
    pub fn destroy(mut self) -> Result<()> {
        if self.origin == VmOrigin::Attached {
            return Err(Error::Destroy(jni::JNI_ERR));
        }
        let res = unsafe { crate::jvm_call!(self.vm, DestroyJavaVM) };
        if res != jni::JNI_OK {
            return Err(Error::Destroy(res));
        }
        self.destroyed = true;
        Ok(())
    }
}

impl std::fmt::Debug for JavaVm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaVm")
            .field("vm", &self.vm)
            .field("origin", &self.origin)
            .finish()
    }
}

impl Drop for JavaVm {
    fn drop(&mut self) {
        if self.destroyed || self.origin == VmOrigin::Attached {
            return;
        }
        if !self.vm.is_null() {
            unsafe {
                let _ = crate::jvm_call!(self.vm, DestroyJavaVM);
            }
        }
    }
}
