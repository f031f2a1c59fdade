//! Filesystem search for module source files.

use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::base::RevisionDate;
use crate::error::Result;
use crate::project::SchemaFormat;

/// Splits a schema file name of the form `<name>[@<revision>].<ext>` into its
/// parts. File names outside this convention yield `None`.
pub(crate) fn split_filename(filename: &str) -> Option<(&str, Option<&str>, SchemaFormat)> {
    let (stem, ext) = filename.rsplit_once('.')?;
    let format = SchemaFormat::from_extension(ext)?;
    match stem.split_once('@') {
        Some((name, revision)) => Some((name, Some(revision), format)),
        None => Some((stem, None, format)),
    }
}

/// Locates the best source file for module `name` under the given directories.
///
/// File names follow the `<name>[@<revision>].<ext>` convention. With a
/// requested revision only an exact `name@revision` file qualifies. Without
/// one the newest dated file wins and a plain `name.<ext>` file is the last
/// resort; ties prefer `.yang` over `.yin`, then the earlier directory. With
/// `implicit_cwd` the current directory is searched ahead of `dirs`.
pub fn search_localfile(
    dirs: &[PathBuf],
    implicit_cwd: bool,
    name: &str,
    revision: Option<&str>,
) -> Result<Option<(PathBuf, SchemaFormat)>> {
    let mut candidates: Vec<PathBuf> = Vec::with_capacity(dirs.len() + 1);
    if implicit_cwd {
        candidates.push(std::env::current_dir()?);
    }
    candidates.extend(dirs.iter().cloned());

    let mut best: Option<(PathBuf, SchemaFormat, Option<RevisionDate>)> = None;
    for dir in &candidates {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let filename = entry.file_name();
            let Some(filename) = filename.to_str() else {
                continue;
            };
            let Some((fname, frev, format)) = split_filename(filename) else {
                continue;
            };
            if fname != name {
                continue;
            }
            let frev = match frev {
                // a malformed date in the file name disqualifies the file
                Some(r) => match RevisionDate::new(r) {
                    Ok(r) => Some(r),
                    Err(_) => continue,
                },
                None => None,
            };
            if let Some(wanted) = revision {
                if frev.as_ref().map(RevisionDate::as_str) != Some(wanted) {
                    continue;
                }
            }
            let better = match &best {
                None => true,
                Some((_, best_format, best_rev)) => {
                    match frev.as_ref().cmp(&best_rev.as_ref()) {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => {
                            format == SchemaFormat::Yang && *best_format == SchemaFormat::Yin
                        }
                    }
                }
            };
            if better {
                best = Some((path, format, frev));
            }
        }
    }

    if let Some((path, format, _)) = &best {
        debug!(path = %path.display(), format = %format, "located schema source file");
    }
    Ok(best.map(|(path, format, _)| (path, format)))
}
