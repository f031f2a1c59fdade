//! The loading context: module registry plus loading configuration.
//!
//! A [`Context`] replaces process-wide state: every entry point that needs the
//! registry, the search directories, or the external-source callback takes one
//! explicitly, and independent contexts never interfere.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use bitflags::bitflags;
use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::project::SourceCallback;
use crate::schema::{LatestRevision, Module};

bitflags! {
    /// Loading-preference flags of a [`Context`].
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ContextFlags: u8 {
        /// Ask the external-source callback before the search directories.
        const PREFER_CALLBACK = 1 << 0;
        /// Never consult the search directories.
        const NO_SEARCHDIRS = 1 << 1;
        /// Do not treat the current working directory as an implicit search
        /// directory.
        const NO_CWD = 1 << 2;
    }
}

/// Observable loading state of a module.
///
/// A failed load leaves nothing registered, so there is no failed state to
/// observe here; the error returned by the loader is its record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    /// Registered with its parsing marker still set (the gray state of the
    /// cycle detector).
    Loading,
    Loaded,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct ModuleKey {
    name: SmolStr,
    revision: Option<SmolStr>,
}

impl ModuleKey {
    fn of(module: &Module) -> Self {
        Self {
            name: module.name.clone(),
            revision: module.revision().map(|r| SmolStr::new(r.as_str())),
        }
    }
}

/// Registry of all loaded modules plus loading configuration.
pub struct Context {
    modules: IndexMap<ModuleKey, Rc<Module>>,
    searchdirs: Vec<PathBuf>,
    callback: Option<Box<dyn SourceCallback>>,
    flags: ContextFlags,
}

impl Context {
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
            searchdirs: Vec::new(),
            callback: None,
            flags: ContextFlags::empty(),
        }
    }

    #[inline]
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ContextFlags) {
        self.flags = flags;
    }

    /// Appends a search directory. The directory must exist; duplicates are
    /// ignored.
    pub fn add_searchdir(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::NotFound(format!(
                "search directory \"{}\" is not a directory",
                dir.display()
            )));
        }
        let dir = fs::canonicalize(&dir)?;
        if !self.searchdirs.contains(&dir) {
            self.searchdirs.push(dir);
        }
        Ok(())
    }

    #[inline]
    pub fn searchdirs(&self) -> &[PathBuf] {
        &self.searchdirs
    }

    /// Installs the external-source callback, replacing any previous one.
    pub fn set_source_callback(&mut self, callback: impl SourceCallback + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn source_callback(&self) -> Option<&dyn SourceCallback> {
        self.callback.as_deref()
    }

    /// Registers a module under its (name, revision) key.
    ///
    /// A module with the same name and revision replaces the previous entry.
    /// When the new module carries the newest revision of its name, it takes
    /// over the latest-revision claim from its siblings.
    pub fn register(&mut self, module: Rc<Module>) {
        let is_latest = self
            .modules
            .values()
            .filter(|m| m.name == module.name)
            .all(|m| m.revision() <= module.revision());
        if is_latest {
            for sibling in self.modules.values().filter(|m| m.name == module.name) {
                sibling.set_latest_revision(LatestRevision::Unknown);
            }
            if module.latest_revision() == LatestRevision::Unknown {
                module.set_latest_revision(LatestRevision::Tentative);
            }
        }
        self.modules.insert(ModuleKey::of(&module), module);
    }

    /// Removes `module` (matched by identity). Reports whether it was present.
    pub fn remove(&mut self, module: &Rc<Module>) -> bool {
        let key = self
            .modules
            .iter()
            .find(|(_, m)| Rc::ptr_eq(m, module))
            .map(|(k, _)| k.clone());
        match key {
            Some(key) => self.modules.shift_remove(&key).is_some(),
            None => false,
        }
    }

    /// Exact lookup. `None` revision means "the module registered without any
    /// revision", not "any revision" (see [`Context::get_module_latest`]).
    pub fn get_module(&self, name: &str, revision: Option<&str>) -> Option<Rc<Module>> {
        let key = ModuleKey {
            name: SmolStr::new(name),
            revision: revision.map(SmolStr::new),
        };
        self.modules.get(&key).cloned()
    }

    /// The newest known revision of `name`.
    pub fn get_module_latest(&self, name: &str) -> Option<Rc<Module>> {
        self.modules
            .values()
            .filter(|m| m.name == name)
            .max_by(|a, b| a.revision().cmp(&b.revision()))
            .cloned()
    }

    /// The implemented revision of `name`, if any.
    pub fn get_module_implemented(&self, name: &str) -> Option<Rc<Module>> {
        self.modules
            .values()
            .find(|m| m.name == name && m.is_implemented())
            .cloned()
    }

    /// All registered modules, in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &Rc<Module>> {
        self.modules.values()
    }

    /// Loading state of `(name, revision)`; with no revision, of the newest
    /// known revision.
    pub fn load_state(&self, name: &str, revision: Option<&str>) -> LoadState {
        let module = match revision {
            Some(_) => self.get_module(name, revision),
            None => self.get_module_latest(name),
        };
        match module {
            None => LoadState::NotLoaded,
            Some(m) if m.is_parsing() => LoadState::Loading,
            Some(_) => LoadState::Loaded,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("modules", &self.modules.len())
            .field("searchdirs", &self.searchdirs)
            .field("callback", &self.callback.is_some())
            .field("flags", &self.flags)
            .finish()
    }
}
