//! Error type shared by every layer of the crate.

use std::ffi::NulError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::sys::jni::{self, jint};

/// Errors returned while locating, creating or attaching to the JVM.
#[derive(Error, Debug)]
pub enum Error {
    /// `JNI_CreateJavaVM` returned a non-OK code.
    #[error("failed to open the Java VM: {}", code(.0))]
    VmOpen(jint),

    /// A `*-classpath.txt` file could not be opened or read.
    #[error("classpath file {} not found or not readable: {source}", .path.display())]
    ClasspathFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to attach to the Java VM: {}", code(.0))]
    Attach(jint),

    #[error("failed to destroy the Java VM: {}", code(.0))]
    Destroy(jint),

    #[error("failed to load libjvm: {0}")]
    Load(String),

    #[error("{0}")]
    Locate(String),

    #[error("invalid JVM option (NUL byte): {0}")]
    InvalidOption(#[from] NulError),

    #[error("a Java exception is pending")]
    JavaException,
}

pub type Result<T> = std::result::Result<T, Error>;

fn code(code: &jint) -> String {
    format!("{} ({code})", jni::describe_code(*code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_open_names_the_jni_code() {
        let msg = Error::VmOpen(jni::JNI_ENOMEM).to_string();
        assert!(msg.contains("not enough memory"));
        assert!(msg.contains("-4"));
    }

    #[test]
    fn classpath_file_keeps_the_io_source() {
        let err = Error::ClasspathFile {
            path: PathBuf::from("/opt/jars/pdf-classpath.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("pdf-classpath.txt"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "gone");
    }
}
