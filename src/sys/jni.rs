// util-jvm/src/sys/jni.rs
//
// Raw JNI invocation-API bindings: the types and tables needed to create a
// JVM, attach threads to it and destroy it.
//
// Only the leading slots of the JNIEnv function table are declared. A Rust
// struct that is a prefix of the C table has an identical layout for those
// slots, so reading them through a `*const JNINativeInterface_` is sound as
// long as nothing past `ExceptionClear` is touched.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

use std::ffi::c_void;
use std::os::raw::c_char;

// =============================================================================
// Primitive Types
// =============================================================================

pub type jint = i32;
pub type jlong = i64;
pub type jbyte = i8;
pub type jboolean = u8;
pub type jsize = jint;

// =============================================================================
// Reference Types (opaque pointers)
// =============================================================================

pub type jobject = *mut c_void;
pub type jclass = jobject;
pub type jthrowable = jobject;
pub type jmethodID = *mut c_void;
pub type jfieldID = *mut c_void;

// =============================================================================
// Constants
// =============================================================================

pub const JNI_OK: jint = 0;
pub const JNI_ERR: jint = -1;
pub const JNI_EDETACHED: jint = -2;
pub const JNI_EVERSION: jint = -3;
pub const JNI_ENOMEM: jint = -4;
pub const JNI_EEXIST: jint = -5;
pub const JNI_EINVAL: jint = -6;

pub const JNI_TRUE: jboolean = 1;
pub const JNI_FALSE: jboolean = 0;

// JNI Version constants
pub const JNI_VERSION_1_1: jint = 0x00010001;
pub const JNI_VERSION_1_2: jint = 0x00010002;
pub const JNI_VERSION_1_4: jint = 0x00010004;
pub const JNI_VERSION_1_6: jint = 0x00010006;
pub const JNI_VERSION_1_8: jint = 0x00010008;
pub const JNI_VERSION_9: jint = 0x00090000;
pub const JNI_VERSION_10: jint = 0x000a0000;
pub const JNI_VERSION_21: jint = 0x00150000;

/// Human-readable name for a JNI return code.
pub fn describe_code(code: jint) -> &'static str {
    match code {
        JNI_OK => "success",
        JNI_ERR => "unknown error",
        JNI_EDETACHED => "thread detached from the VM",
        JNI_EVERSION => "JNI version error",
        JNI_ENOMEM => "not enough memory",
        JNI_EEXIST => "VM already created",
        JNI_EINVAL => "invalid arguments",
        _ => "unrecognized JNI error",
    }
}

// =============================================================================
// JNINativeInterface_ - leading slots of the JNI function table
// =============================================================================

#[repr(C)]
pub struct JNINativeInterface_ {
    // Reserved slots (0-3)
    pub reserved0: *mut c_void,
    pub reserved1: *mut c_void,
    pub reserved2: *mut c_void,
    pub reserved3: *mut c_void,

    // 4: GetVersion
    pub GetVersion: unsafe extern "system" fn(env: *mut JNIEnv) -> jint,

    // 5-6: Class operations
    pub DefineClass: unsafe extern "system" fn(
        env: *mut JNIEnv,
        name: *const c_char,
        loader: jobject,
        buf: *const jbyte,
        len: jsize,
    ) -> jclass,
    pub FindClass: unsafe extern "system" fn(env: *mut JNIEnv, name: *const c_char) -> jclass,

    // 7-12: Reflection and hierarchy
    pub FromReflectedMethod:
        unsafe extern "system" fn(env: *mut JNIEnv, method: jobject) -> jmethodID,
    pub FromReflectedField:
        unsafe extern "system" fn(env: *mut JNIEnv, field: jobject) -> jfieldID,
    pub ToReflectedMethod: unsafe extern "system" fn(
        env: *mut JNIEnv,
        cls: jclass,
        methodID: jmethodID,
        isStatic: jboolean,
    ) -> jobject,
    pub GetSuperclass: unsafe extern "system" fn(env: *mut JNIEnv, sub: jclass) -> jclass,
    pub IsAssignableFrom:
        unsafe extern "system" fn(env: *mut JNIEnv, sub: jclass, sup: jclass) -> jboolean,
    pub ToReflectedField: unsafe extern "system" fn(
        env: *mut JNIEnv,
        cls: jclass,
        fieldID: jfieldID,
        isStatic: jboolean,
    ) -> jobject,

    // 13-17: Exception handling
    pub Throw: unsafe extern "system" fn(env: *mut JNIEnv, obj: jthrowable) -> jint,
    pub ThrowNew:
        unsafe extern "system" fn(env: *mut JNIEnv, clazz: jclass, msg: *const c_char) -> jint,
    pub ExceptionOccurred: unsafe extern "system" fn(env: *mut JNIEnv) -> jthrowable,
    pub ExceptionDescribe: unsafe extern "system" fn(env: *mut JNIEnv),
    pub ExceptionClear: unsafe extern "system" fn(env: *mut JNIEnv),
}

/// JNIEnv is directly the vtable pointer (C ABI definition)
pub type JNIEnv = *const JNINativeInterface_;

// =============================================================================
// JNIInvokeInterface_ - The JavaVM function table
// =============================================================================

#[repr(C)]
pub struct JNIInvokeInterface_ {
    pub reserved0: *mut c_void,
    pub reserved1: *mut c_void,
    pub reserved2: *mut c_void,

    pub DestroyJavaVM: unsafe extern "system" fn(vm: *mut JavaVM) -> jint,
    pub AttachCurrentThread: unsafe extern "system" fn(
        vm: *mut JavaVM,
        penv: *mut *mut c_void,
        args: *mut c_void,
    ) -> jint,
    pub DetachCurrentThread: unsafe extern "system" fn(vm: *mut JavaVM) -> jint,
    pub GetEnv:
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, version: jint) -> jint,
    pub AttachCurrentThreadAsDaemon: unsafe extern "system" fn(
        vm: *mut JavaVM,
        penv: *mut *mut c_void,
        args: *mut c_void,
    ) -> jint,
}

/// JavaVM is directly the vtable pointer (C ABI definition)
pub type JavaVM = *const JNIInvokeInterface_;

// =============================================================================
// JavaVMInitArgs and JavaVMOption for JNI_CreateJavaVM
// =============================================================================

#[repr(C)]
pub struct JavaVMOption {
    pub optionString: *mut c_char,
    pub extraInfo: *mut c_void,
}

#[repr(C)]
pub struct JavaVMInitArgs {
    pub version: jint,
    pub nOptions: jint,
    pub options: *mut JavaVMOption,
    pub ignoreUnrecognized: jboolean,
}

// =============================================================================
// Invocation entry points exported by libjvm
// =============================================================================

pub type JNI_CreateJavaVM = unsafe extern "system" fn(
    pvm: *mut *mut JavaVM,
    penv: *mut *mut JNIEnv,
    args: *mut JavaVMInitArgs,
) -> jint;

pub type JNI_GetCreatedJavaVMs = unsafe extern "system" fn(
    vmBuf: *mut *mut JavaVM,
    bufLen: jsize,
    nVMs: *mut jsize,
) -> jint;

// =============================================================================
// Helper macros
// =============================================================================

/// Helper to call JNI functions through the vtable.
/// Usage: jni_call!(env, FindClass, b"java/lang/String\0".as_ptr() as *const c_char)
#[macro_export]
macro_rules! jni_call {
    ($env:expr, $func:ident $(, $args:expr)*) => {{
        let env_ptr = $env;
        ((**env_ptr).$func)(env_ptr $(, $args)*)
    }};
}

/// Helper to call JavaVM functions through the vtable.
/// vm_ptr: *mut JavaVM = *mut *const JNIInvokeInterface_
#[macro_export]
macro_rules! jvm_call {
    ($vm:expr, $func:ident $(, $args:expr)*) => {{
        let vm_ptr = $vm;
        ((**vm_ptr).$func)(vm_ptr $(, $args)*)
    }};
}
