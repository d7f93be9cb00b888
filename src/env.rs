//! Thin wrapper around a per-thread JNI environment.
//!
//! A [`JniEnv`] is what callers get back from [`crate::JvmManager`] or
//! [`crate::embed::JavaVm::attach_current_thread`]. It only covers what a
//! module needs to sanity-check the VM it was handed; anything richer goes
//! through [`JniEnv::raw`].

use std::ffi::CString;
use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::sys::jni;

/// Wrapper around a JNI environment pointer.
///
/// # Thread Safety
///
/// A `JniEnv` is tied to the thread it was obtained on and is neither `Send`
/// nor `Sync`. Other threads must attach on their own.
pub struct JniEnv {
    env: *mut jni::JNIEnv,
    _not_send: PhantomData<*mut ()>,
}

impl JniEnv {
    /// Creates a JniEnv wrapper from a raw pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure the pointer is valid and comes from the current thread.
    pub unsafe fn from_raw(env: *mut jni::JNIEnv) -> Self {
        JniEnv {
            env,
            _not_send: PhantomData,
        }
    }

    /// Returns the raw JNI environment pointer.
    pub fn raw(&self) -> *mut jni::JNIEnv {
        self.env
    }

    /// Returns the JNI version supported by the VM.
    pub fn version(&self) -> jni::jint {
        unsafe { crate::jni_call!(self.env, GetVersion) }
    }

    /// Finds a class by its fully qualified name (`java/lang/String`).
    pub fn find_class(&self, name: &str) -> Option<jni::jclass> {
        let c_name = CString::new(name).ok()?;
        let cls = unsafe { crate::jni_call!(self.env, FindClass, c_name.as_ptr()) };
        if cls.is_null() {
            None
        } else {
            Some(cls)
        }
    }

    /// Gets the pending exception (if any).
    pub fn exception_occurred(&self) -> Option<jni::jthrowable> {
        let exc = unsafe { crate::jni_call!(self.env, ExceptionOccurred) };
        if exc.is_null() {
            None
        } else {
            Some(exc)
        }
    }

    /// Prints the pending exception and stack trace to stderr.
    pub fn exception_describe(&self) {
        unsafe { crate::jni_call!(self.env, ExceptionDescribe) }
    }

    /// Clears any pending exception.
    pub fn exception_clear(&self) {
        unsafe { crate::jni_call!(self.env, ExceptionClear) }
    }

    /// Fails with [`Error::JavaException`] if a Java exception is pending.
    ///
    /// The exception is described and cleared first so the env stays usable.
    pub fn check_exception(&self) -> Result<()> {
        if self.exception_occurred().is_some() {
            self.exception_describe();
            self.exception_clear();
            return Err(Error::JavaException);
        }
        Ok(())
    }
}

impl std::fmt::Debug for JniEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JniEnv").field("env", &self.env).finish()
    }
}
