//! Classpath and native library path discovery.
//!
//! Modules that ship Java code install a `jars` directory next to their
//! native library. Inside it, every `<name>-classpath.txt` file lists jar
//! locations, one per line, relative to that `jars` directory. The classpath
//! handed to the VM is the engine's global classpath followed by every entry
//! of every such file, in library-path order.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, error};

use crate::context::{GlobalProperties, StaticContext};
use crate::error::{Error, Result};

/// Suffix that marks a classpath fragment file.
pub const CLASSPATH_SUFFIX: &str = "-classpath.txt";

/// Subdirectory of a library directory that holds jars and fragment files.
pub const JARS_DIR: &str = "jars";

/// Separator between entries of a path list such as `java.class.path`.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Compute the classpath for a new VM and store it back into `props`.
///
/// Fails if any fragment file cannot be read; `props` is left untouched then.
pub fn compute_classpath<C, P>(ctx: &C, props: &P) -> Result<String>
where
    C: StaticContext + ?Sized,
    P: GlobalProperties + ?Sized,
{
    let mut cp = props.jvm_classpath();

    for lib_dir in ctx.full_lib_path() {
        let jars_dir = lib_dir.join(JARS_DIR);
        if !jars_dir.is_dir() {
            continue;
        }
        for entry in jars_dir_entries(&jars_dir)? {
            append(&mut cp, &entry.to_string_lossy());
        }
    }

    props.set_jvm_classpath(&cp);
    debug!("computed JVM classpath: '{cp}'");
    Ok(cp)
}

/// Compute `java.library.path` from every path list the static context knows.
pub fn compute_lib_path<C: StaticContext + ?Sized>(ctx: &C) -> String {
    let lists = [
        ("full lib path", ctx.full_lib_path()),
        ("lib path", ctx.lib_path()),
        ("full URI path", ctx.full_uri_path()),
        ("URI path", ctx.uri_path()),
        ("full module path", ctx.full_module_paths()),
        ("module path", ctx.module_paths()),
    ];

    let mut lp = String::new();
    for (kind, paths) in lists {
        for path in paths {
            debug!("{kind}: '{}'", path.display());
            append(&mut lp, &path.to_string_lossy());
        }
    }

    debug!("computed JVM library path: '{lp}'");
    lp
}

/// Every classpath entry listed by the fragment files of one `jars` directory.
///
/// Fragment files are visited in file-name order.
pub fn jars_dir_entries(jars_dir: &Path) -> Result<Vec<PathBuf>> {
    let listing = fs::read_dir(jars_dir).map_err(|source| Error::ClasspathFile {
        path: jars_dir.to_path_buf(),
        source,
    })?;

    let mut fragments = Vec::new();
    for item in listing {
        let item = item.map_err(|source| Error::ClasspathFile {
            path: jars_dir.to_path_buf(),
            source,
        })?;
        let path = item.path();
        let is_fragment = item
            .file_name()
            .to_str()
            .map_or(false, |name| name.ends_with(CLASSPATH_SUFFIX));
        if is_fragment && !path.is_dir() {
            fragments.push(path);
        }
    }
    fragments.sort();

    let mut entries = Vec::new();
    for fragment in fragments {
        entries.extend(read_fragment_file(&fragment, jars_dir)?);
    }
    Ok(entries)
}

/// Read one fragment file, normalizing each non-empty line against `base`.
///
/// Lines are taken as raw bytes, so a jar path need not be valid UTF-8.
pub fn read_fragment_file(path: &Path, base: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read(path).map_err(|source| {
        error!("file {{{}}} not found or not readable.", path.display());
        Error::ClasspathFile {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(content
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = line_to_os(line);
            debug!("classpath line in {}: '{}'", path.display(), line.to_string_lossy());
            normalize_entry(&line, base)
        })
        .collect())
}

/// Resolve a fragment line to a path, the way the engine resolves paths.
///
/// A `file://` prefix is dropped, relative paths are taken from `base`, and
/// `.` / `..` components are folded without touching the filesystem.
pub fn normalize_entry<S: AsRef<OsStr> + ?Sized>(entry: &S, base: &Path) -> PathBuf {
    let entry = Path::new(strip_file_scheme(entry.as_ref()));
    let joined = if entry.is_absolute() {
        entry.to_path_buf()
    } else {
        base.join(entry)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(unix)]
fn line_to_os(line: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(line).to_os_string()
}

#[cfg(not(unix))]
fn line_to_os(line: &[u8]) -> OsString {
    String::from_utf8_lossy(line).into_owned().into()
}

#[cfg(unix)]
fn strip_file_scheme(entry: &OsStr) -> &OsStr {
    use std::os::unix::ffi::OsStrExt;
    let bytes = entry.as_bytes();
    OsStr::from_bytes(bytes.strip_prefix(b"file://").unwrap_or(bytes))
}

#[cfg(not(unix))]
fn strip_file_scheme(entry: &OsStr) -> &OsStr {
    match entry.to_str().and_then(|s| s.strip_prefix("file://")) {
        Some(rest) => OsStr::new(rest),
        None => entry,
    }
}

fn append(list: &mut String, entry: &str) {
    if entry.is_empty() {
        return;
    }
    if !list.is_empty() {
        list.push(PATH_LIST_SEPARATOR);
    }
    list.push_str(entry);
}
