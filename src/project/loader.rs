//! Demand loading of modules and submodules into a [`Context`].
//!
//! The loader owns everything around the actual text parsing: provider
//! selection (search directories vs the external-source callback), identity
//! verification of what a provider returned, registration, recursive loading
//! of includes and imports, cycle detection, and the failure path that leaves
//! no half-loaded module behind.
//!
//! Load states of one request:
//!
//! - not loaded: no registry entry
//! - loading: registered with the parsing marker set, so that a dependency
//!   cycle reaching back here is detected instead of recursing forever
//! - loaded: registered, marker cleared
//! - failed: the entry is unregistered again and an error is returned
//!
//! Registration happens before includes and imports are resolved. A module in
//! the registry is therefore not necessarily fully linked yet; the parsing
//! marker says which state it is in.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::base::{RevisionDate, sort_revisions};
use crate::error::{Error, Result};
use crate::project::searchdir::{search_localfile, split_filename};
use crate::project::{Context, ContextFlags, ModuleSource, SchemaFormat};
use crate::schema::{Include, LatestRevision, Module, Submodule};

/// Parses module source text into the schema model.
///
/// Parsing is pluggable per format; the loader only orchestrates fetching,
/// verification, registration, and linking.
pub trait ModuleParser {
    fn parse_module(&self, data: &str, format: SchemaFormat) -> Result<Module>;
    fn parse_submodule(&self, data: &str, format: SchemaFormat) -> Result<Submodule>;
}

/// Compiles a module once it is loaded and marked implemented.
pub trait SchemaCompiler {
    fn compile(&self, ctx: &Context, module: &Rc<Module>) -> Result<()>;
}

/// Book-keeping for one top-level load.
///
/// Submodules have no registry identity, so reuse of a submodule included
/// twice, and detection of circular includes, work off this per-load record.
struct MainLoad {
    module: SmolStr,
    submodules: Vec<Rc<Submodule>>,
}

/// Drives module loading against a [`Context`].
pub struct ModuleLoader<'a> {
    ctx: &'a mut Context,
    parser: &'a dyn ModuleParser,
    compiler: Option<&'a dyn SchemaCompiler>,
}

impl<'a> ModuleLoader<'a> {
    pub fn new(ctx: &'a mut Context, parser: &'a dyn ModuleParser) -> Self {
        Self {
            ctx,
            parser,
            compiler: None,
        }
    }

    /// Attaches a compiler, invoked whenever a load requests `implement`.
    pub fn with_compiler(mut self, compiler: &'a dyn SchemaCompiler) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn context(&self) -> &Context {
        self.ctx
    }

    /// Loads `name`, reusing the registered module when one matches.
    ///
    /// Without a revision the newest known revision is reused; a fresh fetch
    /// then counts as the latest available. With `implement` the module is
    /// activated for data validation and compiled when a compiler is
    /// attached; only one revision of a name may ever be implemented.
    pub fn load_module(
        &mut self,
        name: &str,
        revision: Option<&str>,
        implement: bool,
    ) -> Result<Rc<Module>> {
        self.load_module_inner(name, revision, implement).map_err(|e| {
            let verb = if implement { "loading" } else { "importing" };
            e.context(&format!("{verb} module \"{name}\""))
        })
    }

    fn load_module_inner(
        &mut self,
        name: &str,
        revision: Option<&str>,
        implement: bool,
    ) -> Result<Rc<Module>> {
        if let Some(rev) = revision {
            RevisionDate::new(rev)?;
        }

        let found = match revision {
            Some(rev) => self.ctx.get_module(name, Some(rev)),
            None => self.ctx.get_module_latest(name),
        };

        if implement {
            if let Some(implemented) = self.ctx.get_module_implemented(name) {
                let same = found.as_ref().is_some_and(|m| Rc::ptr_eq(m, &implemented));
                if !same {
                    return Err(Error::Denied(format!(
                        "module \"{name}\" is already implemented in revision {}",
                        revision_display(implemented.revision())
                    )));
                }
            }
        }

        let (module, newly_loaded) = match found {
            Some(module) => {
                if module.is_parsing() {
                    return Err(Error::Circular(format!(
                        "circular dependency on module \"{name}\""
                    )));
                }
                trace!(module = name, "reusing registered module");
                (module, false)
            }
            None => (self.load_new(name, revision)?, true),
        };

        if implement {
            let newly_implemented = !module.is_implemented();
            module.set_implemented();
            if let Some(compiler) = self.compiler {
                if let Err(e) = compiler.compile(self.ctx, &module) {
                    if newly_loaded {
                        self.ctx.remove(&module);
                    } else if newly_implemented {
                        module.clear_implemented();
                    }
                    return Err(e.context(&format!("compiling module \"{}\"", module.name)));
                }
            }
        }
        Ok(module)
    }

    /// Fetches, parses, verifies, registers, and links a module not yet in
    /// the registry. On any failure past registration the module is
    /// unregistered again.
    fn load_new(&mut self, name: &str, revision: Option<&str>) -> Result<Rc<Module>> {
        debug!(
            module = name,
            revision = revision.unwrap_or("latest"),
            "loading module from providers"
        );
        let (source, path) = self.fetch(name, revision, None)?;
        let mut parsed = self.parser.parse_module(&source.data, source.format)?;
        sort_revisions(&mut parsed.revisions);
        check_module_identity(
            &parsed,
            &SourceIdentity {
                name,
                revision,
                path: path.as_deref(),
            },
        )?;
        parsed.filepath = path;

        let module = Rc::new(parsed);
        module.set_parsing(true);
        self.ctx.register(Rc::clone(&module));

        let linked = self.link_module(&module);
        module.set_parsing(false);
        if let Err(e) = linked {
            self.ctx.remove(&module);
            return Err(e);
        }

        // requested without a revision and delivered fresh: the providers
        // have nothing newer
        if revision.is_none() && module.latest_revision() == LatestRevision::Tentative {
            module.set_latest_revision(LatestRevision::Confirmed);
        }
        Ok(module)
    }

    fn link_module(&mut self, module: &Rc<Module>) -> Result<()> {
        let mut main = MainLoad {
            module: module.name.clone(),
            submodules: Vec::new(),
        };
        for include in &module.includes {
            let submodule = self.load_submodule(&mut main, &module.name, include)?;
            include.link(submodule);
        }
        for import in &module.imports {
            let revision = import.revision.as_ref().map(RevisionDate::as_str);
            let dep = self.load_module(&import.name, revision, false)?;
            import.link(dep);
        }
        Ok(())
    }

    fn load_submodule(
        &mut self,
        main: &mut MainLoad,
        owner: &str,
        include: &Include,
    ) -> Result<Rc<Submodule>> {
        self.load_submodule_inner(main, owner, include)
            .map_err(|e| e.context(&format!("including submodule \"{}\"", include.name)))
    }

    fn load_submodule_inner(
        &mut self,
        main: &mut MainLoad,
        owner: &str,
        include: &Include,
    ) -> Result<Rc<Submodule>> {
        let name = include.name.as_str();
        let revision = include.revision.as_ref().map(RevisionDate::as_str);

        if name == main.module {
            return Err(Error::Circular(format!(
                "circular dependency on module \"{name}\""
            )));
        }
        if let Some(seen) = main.submodules.iter().find(|s| s.name == name) {
            if seen.is_parsing() {
                return Err(Error::Circular(format!(
                    "circular dependency on submodule \"{name}\""
                )));
            }
            if revision.is_none() || seen.revision().map(RevisionDate::as_str) == revision {
                trace!(submodule = name, "reusing submodule of this load");
                return Ok(Rc::clone(seen));
            }
        }

        debug!(submodule = name, module = owner, "loading submodule from providers");
        let (source, path) = self.fetch(owner, None, Some((name, revision)))?;
        let mut parsed = self.parser.parse_submodule(&source.data, source.format)?;
        sort_revisions(&mut parsed.revisions);
        check_submodule_identity(
            &parsed,
            owner,
            &SourceIdentity {
                name,
                revision,
                path: path.as_deref(),
            },
        )?;
        parsed.filepath = path;

        let submodule = Rc::new(parsed);
        submodule.set_parsing(true);
        main.submodules.push(Rc::clone(&submodule));

        let linked = self.link_submodule(main, owner, &submodule);
        submodule.set_parsing(false);
        if let Err(e) = linked {
            main.submodules.retain(|s| !Rc::ptr_eq(s, &submodule));
            return Err(e);
        }

        submodule.set_latest_revision(if revision.is_none() {
            LatestRevision::Confirmed
        } else {
            LatestRevision::Tentative
        });
        Ok(submodule)
    }

    fn link_submodule(
        &mut self,
        main: &mut MainLoad,
        owner: &str,
        submodule: &Rc<Submodule>,
    ) -> Result<()> {
        for include in &submodule.includes {
            let nested = self.load_submodule(main, owner, include)?;
            include.link(nested);
        }
        for import in &submodule.imports {
            let revision = import.revision.as_ref().map(RevisionDate::as_str);
            let dep = self.load_module(&import.name, revision, false)?;
            import.link(dep);
        }
        Ok(())
    }

    /// Obtains source text from the first provider that has it.
    ///
    /// The search directories are consulted first and the callback is the
    /// fallback; `PREFER_CALLBACK` flips that order. Exactly one fallback
    /// step is taken, never a round-robin.
    fn fetch(
        &self,
        module: &str,
        revision: Option<&str>,
        submodule: Option<(&str, Option<&str>)>,
    ) -> Result<(ModuleSource, Option<PathBuf>)> {
        let flags = self.ctx.flags();
        let (unit_name, unit_revision) = submodule.unwrap_or((module, revision));

        let from_callback = |ctx: &Context| -> Option<(ModuleSource, Option<PathBuf>)> {
            let cb = ctx.source_callback()?;
            let (sub_name, sub_rev) = match submodule {
                Some((n, r)) => (Some(n), r),
                None => (None, None),
            };
            cb.retrieve(module, revision, sub_name, sub_rev)
                .map(|source| (source, None))
        };
        let from_searchdirs = |ctx: &Context| -> Result<Option<(ModuleSource, Option<PathBuf>)>> {
            if flags.contains(ContextFlags::NO_SEARCHDIRS) {
                return Ok(None);
            }
            let implicit_cwd = !flags.contains(ContextFlags::NO_CWD);
            let found =
                search_localfile(ctx.searchdirs(), implicit_cwd, unit_name, unit_revision)?;
            let Some((path, format)) = found else {
                return Ok(None);
            };
            let data = fs::read_to_string(&path)?;
            let path = fs::canonicalize(&path).unwrap_or(path);
            Ok(Some((ModuleSource::new(format, data), Some(path))))
        };

        let fetched = if flags.contains(ContextFlags::PREFER_CALLBACK) {
            match from_callback(self.ctx) {
                Some(hit) => Some(hit),
                None => from_searchdirs(self.ctx)?,
            }
        } else {
            match from_searchdirs(self.ctx)? {
                Some(hit) => Some(hit),
                None => from_callback(self.ctx),
            }
        };
        fetched.ok_or_else(|| match submodule {
            Some((name, _)) => Error::NotFound(format!(
                "no available source for submodule \"{name}\" of module \"{module}\""
            )),
            None => Error::NotFound(format!("no available source for module \"{module}\"")),
        })
    }
}

struct SourceIdentity<'a> {
    /// Requested name.
    name: &'a str,
    /// Requested revision, when the request was revision-exact.
    revision: Option<&'a str>,
    /// File the source came from, when file-backed.
    path: Option<&'a Path>,
}

fn revision_display(revision: Option<&RevisionDate>) -> String {
    revision.map_or_else(|| "none".to_string(), |r| format!("\"{r}\""))
}

/// Verifies that a parsed module is the one that was asked for. The file
/// name convention is checked too, but only ever warns.
fn check_module_identity(parsed: &Module, wanted: &SourceIdentity<'_>) -> Result<()> {
    if parsed.name != wanted.name {
        return Err(Error::InvalidSyntax(format!(
            "unexpected module \"{}\" parsed instead of \"{}\"",
            parsed.name, wanted.name
        )));
    }
    if let Some(wanted_rev) = wanted.revision {
        if parsed.revision().map(RevisionDate::as_str) != Some(wanted_rev) {
            return Err(Error::InvalidSyntax(format!(
                "module \"{}\" parsed with the wrong revision ({} instead of \"{}\")",
                parsed.name,
                revision_display(parsed.revision()),
                wanted_rev
            )));
        }
    }
    if let Some(path) = wanted.path {
        check_filename(&parsed.name, parsed.revision(), path);
    }
    Ok(())
}

fn check_submodule_identity(
    parsed: &Submodule,
    owner: &str,
    wanted: &SourceIdentity<'_>,
) -> Result<()> {
    if parsed.name != wanted.name {
        return Err(Error::InvalidSyntax(format!(
            "unexpected submodule \"{}\" parsed instead of \"{}\"",
            parsed.name, wanted.name
        )));
    }
    if parsed.belongs_to != owner {
        return Err(Error::InvalidSyntax(format!(
            "included submodule \"{}\" belongs-to a different module \"{}\"",
            parsed.name, parsed.belongs_to
        )));
    }
    if let Some(wanted_rev) = wanted.revision {
        if parsed.revision().map(RevisionDate::as_str) != Some(wanted_rev) {
            return Err(Error::InvalidSyntax(format!(
                "submodule \"{}\" parsed with the wrong revision ({} instead of \"{}\")",
                parsed.name,
                revision_display(parsed.revision()),
                wanted_rev
            )));
        }
    }
    if let Some(path) = wanted.path {
        check_filename(&parsed.name, parsed.revision(), path);
    }
    Ok(())
}

fn check_filename(parsed_name: &str, parsed_revision: Option<&RevisionDate>, path: &Path) {
    let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
        return;
    };
    let Some((fname, frev, _)) = split_filename(filename) else {
        return;
    };
    if fname != parsed_name {
        warn!(
            file = filename,
            module = parsed_name,
            "file name does not match module name"
        );
    }
    if let Some(frev) = frev {
        if parsed_revision.map(RevisionDate::as_str) != Some(frev) {
            warn!(
                file = filename,
                revision = %revision_display(parsed_revision),
                "file name does not match module revision"
            );
        }
    }
}
