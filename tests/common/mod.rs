//! A fake JNI runtime for driving `JvmManager` without a real JVM.
//!
//! `fake_runtime!(name)` expands to a module with its own counters, so tests
//! running in parallel never share state.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write `<lib_dir>/jars/<name>` with the given lines.
pub fn write_fragment(lib_dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let jars = lib_dir.join("jars");
    fs::create_dir_all(&jars).unwrap();
    let path = jars.join(name);
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

/// Create `<lib_dir>/jars/<name>` as a link to a file that does not exist.
#[cfg(unix)]
pub fn dangling_fragment(lib_dir: &Path, name: &str) -> PathBuf {
    let jars = lib_dir.join("jars");
    fs::create_dir_all(&jars).unwrap();
    let path = jars.join(name);
    std::os::unix::fs::symlink(lib_dir.join("missing.txt"), &path).unwrap();
    path
}

macro_rules! fake_runtime {
    ($name:ident) => {
        mod $name {
            #![allow(dead_code, non_snake_case)]

            use std::ffi::{c_void, CStr};
            use std::os::raw::c_char;
            use std::ptr::{self, NonNull};
            use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
            use std::sync::{Mutex, OnceLock};

            use util_jvm::embed::Invocation;
            use util_jvm::jni;

            pub static CREATES: AtomicUsize = AtomicUsize::new(0);
            pub static ATTACHES: AtomicUsize = AtomicUsize::new(0);
            pub static DESTROYS: AtomicUsize = AtomicUsize::new(0);
            pub static RUNNING: AtomicBool = AtomicBool::new(false);
            pub static CREATE_RESULT: AtomicI32 = AtomicI32::new(jni::JNI_OK);
            pub static ATTACH_FAILURES: AtomicUsize = AtomicUsize::new(0);
            pub static PENDING_EXCEPTION: AtomicBool = AtomicBool::new(false);
            pub static LAST_VERSION: AtomicI32 = AtomicI32::new(0);
            pub static LAST_IGNORE_UNRECOGNIZED: AtomicBool = AtomicBool::new(true);
            pub static OPTIONS: Mutex<Vec<String>> = Mutex::new(Vec::new());

            fn dummy() -> *mut c_void {
                NonNull::<c_void>::dangling().as_ptr()
            }

            pub fn vm() -> *mut jni::JavaVM {
                static VM: OnceLock<usize> = OnceLock::new();
                *VM.get_or_init(|| {
                    let vtable: &'static jni::JNIInvokeInterface_ =
                        Box::leak(Box::new(jni::JNIInvokeInterface_ {
                            reserved0: ptr::null_mut(),
                            reserved1: ptr::null_mut(),
                            reserved2: ptr::null_mut(),
                            DestroyJavaVM: destroy,
                            AttachCurrentThread: attach,
                            DetachCurrentThread: detach,
                            GetEnv: get_env,
                            AttachCurrentThreadAsDaemon: attach,
                        }));
                    let vm: &'static mut jni::JavaVM = Box::leak(Box::new(vtable as *const _));
                    vm as *mut jni::JavaVM as usize
                }) as *mut jni::JavaVM
            }

            pub fn env() -> *mut jni::JNIEnv {
                static ENV: OnceLock<usize> = OnceLock::new();
                *ENV.get_or_init(|| {
                    let vtable: &'static jni::JNINativeInterface_ =
                        Box::leak(Box::new(jni::JNINativeInterface_ {
                            reserved0: ptr::null_mut(),
                            reserved1: ptr::null_mut(),
                            reserved2: ptr::null_mut(),
                            reserved3: ptr::null_mut(),
                            GetVersion: get_version,
                            DefineClass: define_class,
                            FindClass: find_class,
                            FromReflectedMethod: from_reflected,
                            FromReflectedField: from_reflected,
                            ToReflectedMethod: to_reflected,
                            GetSuperclass: get_superclass,
                            IsAssignableFrom: is_assignable_from,
                            ToReflectedField: to_reflected,
                            Throw: throw,
                            ThrowNew: throw_new,
                            ExceptionOccurred: exception_occurred,
                            ExceptionDescribe: exception_describe,
                            ExceptionClear: exception_clear,
                        }));
                    let env: &'static mut jni::JNIEnv = Box::leak(Box::new(vtable as *const _));
                    env as *mut jni::JNIEnv as usize
                }) as *mut jni::JNIEnv
            }

            pub fn invocation() -> Invocation {
                unsafe { Invocation::from_raw(create_java_vm, get_created_java_vms) }
            }

            /// Pretend another library in the process already started a VM.
            pub fn start_elsewhere() {
                RUNNING.store(true, Ordering::SeqCst);
            }

            pub fn options() -> Vec<String> {
                OPTIONS.lock().unwrap().clone()
            }

            // --- invocation API ---

            unsafe extern "system" fn create_java_vm(
                pvm: *mut *mut jni::JavaVM,
                penv: *mut *mut jni::JNIEnv,
                args: *mut jni::JavaVMInitArgs,
            ) -> jni::jint {
                CREATES.fetch_add(1, Ordering::SeqCst);
                let code = CREATE_RESULT.load(Ordering::SeqCst);
                if code != jni::JNI_OK {
                    return code;
                }
                if RUNNING.load(Ordering::SeqCst) {
                    return jni::JNI_EEXIST;
                }

                let args = &*args;
                LAST_VERSION.store(args.version, Ordering::SeqCst);
                LAST_IGNORE_UNRECOGNIZED.store(args.ignoreUnrecognized != 0, Ordering::SeqCst);
                let mut recorded = OPTIONS.lock().unwrap();
                recorded.clear();
                for i in 0..args.nOptions as usize {
                    let opt = &*args.options.add(i);
                    recorded.push(CStr::from_ptr(opt.optionString).to_string_lossy().into_owned());
                }

                *pvm = vm();
                *penv = env();
                RUNNING.store(true, Ordering::SeqCst);
                jni::JNI_OK
            }

            unsafe extern "system" fn get_created_java_vms(
                buf: *mut *mut jni::JavaVM,
                len: jni::jsize,
                count: *mut jni::jsize,
            ) -> jni::jint {
                if RUNNING.load(Ordering::SeqCst) {
                    if len > 0 {
                        *buf = vm();
                    }
                    *count = 1;
                } else {
                    *count = 0;
                }
                jni::JNI_OK
            }

            // --- JavaVM vtable ---

            unsafe extern "system" fn destroy(_vm: *mut jni::JavaVM) -> jni::jint {
                DESTROYS.fetch_add(1, Ordering::SeqCst);
                RUNNING.store(false, Ordering::SeqCst);
                jni::JNI_OK
            }

            unsafe extern "system" fn attach(
                _vm: *mut jni::JavaVM,
                penv: *mut *mut c_void,
                _args: *mut c_void,
            ) -> jni::jint {
                let failed = ATTACH_FAILURES
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok();
                if failed {
                    return jni::JNI_ERR;
                }
                ATTACHES.fetch_add(1, Ordering::SeqCst);
                *penv = env() as *mut c_void;
                jni::JNI_OK
            }

            unsafe extern "system" fn detach(_vm: *mut jni::JavaVM) -> jni::jint {
                jni::JNI_OK
            }

            unsafe extern "system" fn get_env(
                _vm: *mut jni::JavaVM,
                penv: *mut *mut c_void,
                _version: jni::jint,
            ) -> jni::jint {
                if ATTACHES.load(Ordering::SeqCst) == 0 && CREATES.load(Ordering::SeqCst) == 0 {
                    return jni::JNI_EDETACHED;
                }
                *penv = env() as *mut c_void;
                jni::JNI_OK
            }

            // --- JNIEnv vtable ---

            unsafe extern "system" fn get_version(_env: *mut jni::JNIEnv) -> jni::jint {
                jni::JNI_VERSION_1_8
            }

            unsafe extern "system" fn define_class(
                _env: *mut jni::JNIEnv,
                _name: *const c_char,
                _loader: jni::jobject,
                _buf: *const jni::jbyte,
                _len: jni::jsize,
            ) -> jni::jclass {
                ptr::null_mut()
            }

            unsafe extern "system" fn find_class(
                _env: *mut jni::JNIEnv,
                name: *const c_char,
            ) -> jni::jclass {
                if CStr::from_ptr(name).to_bytes() == b"java/lang/Object" {
                    dummy()
                } else {
                    ptr::null_mut()
                }
            }

            unsafe extern "system" fn from_reflected(
                _env: *mut jni::JNIEnv,
                _obj: jni::jobject,
            ) -> *mut c_void {
                ptr::null_mut()
            }

            unsafe extern "system" fn to_reflected(
                _env: *mut jni::JNIEnv,
                _cls: jni::jclass,
                _id: *mut c_void,
                _is_static: jni::jboolean,
            ) -> jni::jobject {
                ptr::null_mut()
            }

            unsafe extern "system" fn get_superclass(
                _env: *mut jni::JNIEnv,
                _cls: jni::jclass,
            ) -> jni::jclass {
                ptr::null_mut()
            }

            unsafe extern "system" fn is_assignable_from(
                _env: *mut jni::JNIEnv,
                _sub: jni::jclass,
                _sup: jni::jclass,
            ) -> jni::jboolean {
                jni::JNI_FALSE
            }

            unsafe extern "system" fn throw(
                _env: *mut jni::JNIEnv,
                _obj: jni::jthrowable,
            ) -> jni::jint {
                PENDING_EXCEPTION.store(true, Ordering::SeqCst);
                jni::JNI_OK
            }

            unsafe extern "system" fn throw_new(
                _env: *mut jni::JNIEnv,
                _cls: jni::jclass,
                _msg: *const c_char,
            ) -> jni::jint {
                PENDING_EXCEPTION.store(true, Ordering::SeqCst);
                jni::JNI_OK
            }

            unsafe extern "system" fn exception_occurred(
                _env: *mut jni::JNIEnv,
            ) -> jni::jthrowable {
                if PENDING_EXCEPTION.load(Ordering::SeqCst) {
                    dummy()
                } else {
                    ptr::null_mut()
                }
            }

            unsafe extern "system" fn exception_describe(_env: *mut jni::JNIEnv) {}

            unsafe extern "system" fn exception_clear(_env: *mut jni::JNIEnv) {
                PENDING_EXCEPTION.store(false, Ordering::SeqCst);
            }
        }
    };
}
