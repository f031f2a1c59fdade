//! Modules, submodules, and their import/include linkage.
//!
//! Registered modules are shared as `Rc<Module>`; the registry owns the
//! entries and import links are filled once during loading. The mutable
//! lifecycle markers (`implemented`, `parsing`, latest-revision status) are
//! `Cell`s; neither they nor `Rc` are `Sync`, so a loading context is bound
//! to one logical thread by the type system.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::base::RevisionDate;
use crate::schema::{NodeId, SchemaTree, Typedef};

/// How much the registry trusts a module's newest revision.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LatestRevision {
    /// No claim about other revisions.
    #[default]
    Unknown,
    /// Newest among the revisions seen so far; a provider may hold newer ones.
    Tentative,
    /// Requested without a revision and delivered as the latest; trusted.
    Confirmed,
}

/// An `import` statement: a foreign module bound to a local prefix.
pub struct Import {
    pub name: SmolStr,
    pub prefix: SmolStr,
    pub revision: Option<RevisionDate>,
    module: OnceCell<Rc<Module>>,
}

impl Import {
    pub fn new(
        name: impl Into<SmolStr>,
        prefix: impl Into<SmolStr>,
        revision: Option<RevisionDate>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            revision,
            module: OnceCell::new(),
        }
    }

    /// The imported module, once the loader has linked it.
    pub fn module(&self) -> Option<&Rc<Module>> {
        self.module.get()
    }

    /// Links the resolved module. Later calls are ignored; an import is
    /// resolved at most once per load.
    pub fn link(&self, module: Rc<Module>) {
        let _ = self.module.set(module);
    }
}

impl fmt::Debug for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Import({} as {}", self.name, self.prefix)?;
        if let Some(rev) = &self.revision {
            write!(f, "@{rev}")?;
        }
        write!(f, ", {})", if self.module.get().is_some() { "linked" } else { "unlinked" })
    }
}

/// An `include` statement: a submodule merged into its owning module.
pub struct Include {
    pub name: SmolStr,
    pub revision: Option<RevisionDate>,
    submodule: OnceCell<Rc<Submodule>>,
}

impl Include {
    pub fn new(name: impl Into<SmolStr>, revision: Option<RevisionDate>) -> Self {
        Self {
            name: name.into(),
            revision,
            submodule: OnceCell::new(),
        }
    }

    /// The included submodule, once the loader has linked it.
    pub fn submodule(&self) -> Option<&Rc<Submodule>> {
        self.submodule.get()
    }

    /// Links the loaded submodule. Later calls are ignored.
    pub fn link(&self, submodule: Rc<Submodule>) {
        let _ = self.submodule.set(submodule);
    }
}

impl fmt::Debug for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Include({}", self.name)?;
        if let Some(rev) = &self.revision {
            write!(f, "@{rev}")?;
        }
        write!(f, ", {})", if self.submodule.get().is_some() { "linked" } else { "unlinked" })
    }
}

/// A top-level named, versioned schema-definition unit.
pub struct Module {
    pub name: SmolStr,
    /// The module's own prefix, usable inside it to qualify its own names.
    pub prefix: SmolStr,
    /// Revision history, newest first once sorted.
    pub revisions: Vec<RevisionDate>,
    pub imports: Vec<Import>,
    pub includes: Vec<Include>,
    /// Top-level typedefs.
    pub typedefs: Vec<Typedef>,
    /// All schema nodes owned by this module.
    pub tree: SchemaTree,
    /// Handles of top-level data nodes, in declaration order.
    pub data: Vec<NodeId>,
    /// Handles of top-level groupings.
    pub groupings: Vec<NodeId>,
    /// Real path of the file this module was parsed from, when file-backed.
    pub filepath: Option<PathBuf>,
    implemented: Cell<bool>,
    parsing: Cell<bool>,
    latest: Cell<LatestRevision>,
}

impl Module {
    pub fn new(name: impl Into<SmolStr>, prefix: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            revisions: Vec::new(),
            imports: Vec::new(),
            includes: Vec::new(),
            typedefs: Vec::new(),
            tree: SchemaTree::new(),
            data: Vec::new(),
            groupings: Vec::new(),
            filepath: None,
            implemented: Cell::new(false),
            parsing: Cell::new(false),
            latest: Cell::new(LatestRevision::Unknown),
        }
    }

    /// The module's current (newest) revision, if it has any.
    pub fn revision(&self) -> Option<&RevisionDate> {
        self.revisions.first()
    }

    /// Whether this module's definitions are active for data validation, as
    /// opposed to being loaded only for reference resolution.
    #[inline]
    pub fn is_implemented(&self) -> bool {
        self.implemented.get()
    }

    pub fn set_implemented(&self) {
        self.implemented.set(true);
    }

    /// Reverts an implement request that failed to compile.
    pub(crate) fn clear_implemented(&self) {
        self.implemented.set(false);
    }

    /// Whether this module's load is still in progress (the gray marker of
    /// the cycle detector).
    #[inline]
    pub fn is_parsing(&self) -> bool {
        self.parsing.get()
    }

    pub(crate) fn set_parsing(&self, parsing: bool) {
        self.parsing.set(parsing);
    }

    pub fn latest_revision(&self) -> LatestRevision {
        self.latest.get()
    }

    pub fn set_latest_revision(&self, latest: LatestRevision) {
        self.latest.set(latest);
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({}", self.name)?;
        if let Some(rev) = self.revision() {
            write!(f, "@{rev}")?;
        }
        if self.is_implemented() {
            write!(f, ", implemented")?;
        }
        if self.is_parsing() {
            write!(f, ", parsing")?;
        }
        write!(f, ")")
    }
}

/// A schema fragment belonging to exactly one owning module.
///
/// Submodules have no independent registry identity; they are owned by the
/// includes that loaded them.
pub struct Submodule {
    pub name: SmolStr,
    /// Name of the owning module.
    pub belongs_to: SmolStr,
    /// Prefix bound to the owning module for use inside this submodule.
    pub prefix: SmolStr,
    pub revisions: Vec<RevisionDate>,
    pub imports: Vec<Import>,
    pub includes: Vec<Include>,
    pub typedefs: Vec<Typedef>,
    pub tree: SchemaTree,
    pub data: Vec<NodeId>,
    pub groupings: Vec<NodeId>,
    pub filepath: Option<PathBuf>,
    parsing: Cell<bool>,
    latest: Cell<LatestRevision>,
}

impl Submodule {
    pub fn new(
        name: impl Into<SmolStr>,
        belongs_to: impl Into<SmolStr>,
        prefix: impl Into<SmolStr>,
    ) -> Self {
        Self {
            name: name.into(),
            belongs_to: belongs_to.into(),
            prefix: prefix.into(),
            revisions: Vec::new(),
            imports: Vec::new(),
            includes: Vec::new(),
            typedefs: Vec::new(),
            tree: SchemaTree::new(),
            data: Vec::new(),
            groupings: Vec::new(),
            filepath: None,
            parsing: Cell::new(false),
            latest: Cell::new(LatestRevision::Unknown),
        }
    }

    pub fn revision(&self) -> Option<&RevisionDate> {
        self.revisions.first()
    }

    #[inline]
    pub fn is_parsing(&self) -> bool {
        self.parsing.get()
    }

    pub(crate) fn set_parsing(&self, parsing: bool) {
        self.parsing.set(parsing);
    }

    pub fn latest_revision(&self) -> LatestRevision {
        self.latest.get()
    }

    pub fn set_latest_revision(&self, latest: LatestRevision) {
        self.latest.set(latest);
    }
}

impl fmt::Debug for Submodule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Submodule({}", self.name)?;
        if let Some(rev) = self.revision() {
            write!(f, "@{rev}")?;
        }
        write!(f, ", belongs-to {})", self.belongs_to)
    }
}
