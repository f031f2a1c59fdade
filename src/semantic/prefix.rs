//! Prefix resolution and prefix uniqueness.

use std::rc::Rc;

use crate::base::RevisionDate;
use crate::error::{Error, Result};
use crate::project::Context;
use crate::schema::{Import, Module, Submodule};

/// Resolves `prefix` as seen from inside `module`.
///
/// The module's own prefix denotes the module itself, fetched through the
/// registry so the shared instance is returned. Any other prefix must match
/// one of the module's imports; an import that is not linked yet does not
/// resolve.
pub fn module_for_prefix(ctx: &Context, module: &Module, prefix: &str) -> Option<Rc<Module>> {
    if module.prefix == prefix {
        let revision = module.revision().map(RevisionDate::as_str);
        return ctx.get_module(&module.name, revision);
    }
    import_for_prefix(&module.imports, prefix)
}

/// Resolves `prefix` as seen from inside `submodule`; its own prefix denotes
/// the owning module.
pub fn submodule_for_prefix(
    ctx: &Context,
    submodule: &Submodule,
    prefix: &str,
) -> Option<Rc<Module>> {
    if submodule.prefix == prefix {
        return ctx.get_module_latest(&submodule.belongs_to);
    }
    import_for_prefix(&submodule.imports, prefix)
}

fn import_for_prefix(imports: &[Import], prefix: &str) -> Option<Rc<Module>> {
    imports
        .iter()
        .find(|imp| imp.prefix == prefix)
        .and_then(|imp| imp.module().cloned())
}

/// Checks that `candidate` is free to serve as a new import prefix next to
/// the module's own prefix and its existing imports.
pub fn check_prefix(
    self_prefix: Option<&str>,
    imports: &[Import],
    candidate: &str,
) -> Result<()> {
    if self_prefix == Some(candidate) {
        return Err(Error::AlreadyExists(format!(
            "prefix \"{candidate}\" already used as module prefix"
        )));
    }
    if let Some(taken) = imports.iter().find(|imp| imp.prefix == candidate) {
        return Err(Error::AlreadyExists(format!(
            "prefix \"{candidate}\" already used to import \"{}\" module",
            taken.name
        )));
    }
    Ok(())
}
