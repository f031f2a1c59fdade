//! Typedef and grouping name analysis: collision checks across a whole
//! module and scope-aware type lookup.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::Cursor;
use crate::error::{Error, Result};
use crate::project::Context;
use crate::schema::{BuiltinType, Module, NodeId, SchemaTree, Typedef};

use super::prefix::module_for_prefix;

/// Result of a type-name lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeMatch {
    Builtin(BuiltinType),
    /// A typedef, with the name of the module or submodule defining it.
    Typedef { module: SmolStr, def: Typedef },
}

/// Looks up the type `name` as written at `node` inside `module`.
///
/// An unprefixed name is first tried as a built-in type, then walked from
/// the node's own scope through its ancestors, then the module top level and
/// the top level of every included submodule. A prefixed name restricts the
/// search to the module the prefix denotes; built-ins never match there.
/// Nodes that originate in submodules are expected to be materialized in the
/// owning module's tree.
pub fn find_typedef(
    ctx: &Context,
    name: &str,
    module: &Module,
    node: Option<NodeId>,
) -> Result<TypeMatch> {
    let mut cursor = Cursor::new(name);
    let qualified = cursor
        .node_id()
        .map_err(|e| e.context(&format!("invalid type name \"{name}\"")))?;
    if !cursor.at_end() {
        return Err(Error::InvalidSyntax(format!("invalid type name \"{name}\"")));
    }
    let tname = qualified.name;

    let target: Option<Rc<Module>> = match qualified.prefix {
        Some(prefix) => {
            let target = module_for_prefix(ctx, module, prefix).ok_or_else(|| {
                Error::NotFound(format!(
                    "prefix \"{prefix}\" is not defined in module \"{}\"",
                    module.name
                ))
            })?;
            Some(target)
        }
        None => {
            if let Some(builtin) = BuiltinType::from_name(tname) {
                return Ok(TypeMatch::Builtin(builtin));
            }
            None
        }
    };

    let local = target.as_ref().is_none_or(|t| t.name == module.name);
    if local {
        if let Some(start) = node {
            let tree = &module.tree;
            for scope in std::iter::once(start).chain(tree.ancestors(start)) {
                if let Some(def) = tree[scope].typedefs.iter().find(|t| t.name == tname) {
                    return Ok(TypeMatch::Typedef {
                        module: module.name.clone(),
                        def: def.clone(),
                    });
                }
            }
        }
    }

    let searched: &Module = target.as_deref().unwrap_or(module);
    if let Some(def) = searched.typedefs.iter().find(|t| t.name == tname) {
        return Ok(TypeMatch::Typedef {
            module: searched.name.clone(),
            def: def.clone(),
        });
    }
    for include in &searched.includes {
        if let Some(sub) = include.submodule() {
            if let Some(def) = sub.typedefs.iter().find(|t| t.name == tname) {
                return Ok(TypeMatch::Typedef {
                    module: sub.name.clone(),
                    def: def.clone(),
                });
            }
        }
    }

    Err(Error::NotFound(format!(
        "type \"{name}\" not found in module \"{}\"",
        searched.name
    )))
}

/// Verifies that no typedef name collides anywhere in `module`.
///
/// Top-level names, including those of every linked submodule, must be
/// unique module-wide and distinct from built-in type names. A scoped
/// typedef must additionally not repeat a sibling, anything along its
/// ancestor chain, or any top-level name; unrelated scopes may share names.
/// The name sets live only for the duration of the check.
pub fn check_typedefs(module: &Module) -> Result<()> {
    let mut top: FxHashSet<SmolStr> = FxHashSet::default();
    let mut scoped: FxHashSet<SmolStr> = FxHashSet::default();

    for tpdf in &module.typedefs {
        check_top_typedef(tpdf, &mut top)?;
    }
    for include in &module.includes {
        if let Some(sub) = include.submodule() {
            for tpdf in &sub.typedefs {
                check_top_typedef(tpdf, &mut top)?;
            }
        }
    }

    let roots = scope_roots(&module.groupings, &module.data);
    check_scoped_typedefs(&module.tree, &roots, &top, &mut scoped)?;
    for include in &module.includes {
        if let Some(sub) = include.submodule() {
            let roots = scope_roots(&sub.groupings, &sub.data);
            check_scoped_typedefs(&sub.tree, &roots, &top, &mut scoped)?;
        }
    }

    trace!(
        module = %module.name,
        top = top.len(),
        scoped = scoped.len(),
        "typedef names are collision-free"
    );
    Ok(())
}

/// Verifies that no grouping name collides anywhere in `module`; same rules
/// as [`check_typedefs`] minus the built-in screen.
pub fn check_groupings(module: &Module) -> Result<()> {
    let mut top: FxHashSet<SmolStr> = FxHashSet::default();
    let mut scoped: FxHashSet<SmolStr> = FxHashSet::default();

    for &grouping in &module.groupings {
        check_top_grouping(&module.tree[grouping].name, &mut top)?;
    }
    for include in &module.includes {
        if let Some(sub) = include.submodule() {
            for &grouping in &sub.groupings {
                check_top_grouping(&sub.tree[grouping].name, &mut top)?;
            }
        }
    }

    let roots = scope_roots(&module.groupings, &module.data);
    check_scoped_groupings(&module.tree, &roots, &top, &mut scoped)?;
    for include in &module.includes {
        if let Some(sub) = include.submodule() {
            let roots = scope_roots(&sub.groupings, &sub.data);
            check_scoped_groupings(&sub.tree, &roots, &top, &mut scoped)?;
        }
    }

    trace!(
        module = %module.name,
        top = top.len(),
        scoped = scoped.len(),
        "grouping names are collision-free"
    );
    Ok(())
}

/// Scope discovery starts at module-level groupings, then data roots.
fn scope_roots(groupings: &[NodeId], data: &[NodeId]) -> Vec<NodeId> {
    groupings.iter().chain(data).copied().collect()
}

fn check_top_typedef(tpdf: &Typedef, top: &mut FxHashSet<SmolStr>) -> Result<()> {
    if BuiltinType::from_name(&tpdf.name).is_some() {
        return Err(typedef_collision(&tpdf.name, "a built-in type"));
    }
    if !top.insert(tpdf.name.clone()) {
        return Err(typedef_collision(&tpdf.name, "another top-level type"));
    }
    Ok(())
}

fn check_scoped_typedefs(
    tree: &SchemaTree,
    roots: &[NodeId],
    top: &FxHashSet<SmolStr>,
    scoped: &mut FxHashSet<SmolStr>,
) -> Result<()> {
    for node in tree.preorder(roots) {
        for (idx, tpdf) in tree[node].typedefs.iter().enumerate() {
            if BuiltinType::from_name(&tpdf.name).is_some() {
                return Err(typedef_collision(&tpdf.name, "a built-in type"));
            }
            if tree[node].typedefs[..idx].iter().any(|t| t.name == tpdf.name) {
                return Err(typedef_collision(&tpdf.name, "another scoped type"));
            }
            for ancestor in tree.ancestors(node) {
                if tree[ancestor].typedefs.iter().any(|t| t.name == tpdf.name) {
                    return Err(typedef_collision(&tpdf.name, "another scoped type"));
                }
            }
            scoped.insert(tpdf.name.clone());
            if top.contains(&tpdf.name) {
                return Err(typedef_collision(&tpdf.name, "another top-level type"));
            }
        }
    }
    Ok(())
}

fn check_top_grouping(name: &SmolStr, top: &mut FxHashSet<SmolStr>) -> Result<()> {
    if !top.insert(name.clone()) {
        return Err(grouping_collision(name, "another top-level grouping"));
    }
    Ok(())
}

fn check_scoped_groupings(
    tree: &SchemaTree,
    roots: &[NodeId],
    top: &FxHashSet<SmolStr>,
    scoped: &mut FxHashSet<SmolStr>,
) -> Result<()> {
    for node in tree.preorder(roots) {
        for (idx, &grouping) in tree[node].groupings.iter().enumerate() {
            let name = &tree[grouping].name;
            if tree[node].groupings[..idx]
                .iter()
                .any(|&g| tree[g].name == *name)
            {
                return Err(grouping_collision(name, "another scoped grouping"));
            }
            for ancestor in tree.ancestors(node) {
                if tree[ancestor].groupings.iter().any(|&g| tree[g].name == *name) {
                    return Err(grouping_collision(name, "another scoped grouping"));
                }
            }
            scoped.insert(name.clone());
            if top.contains(name) {
                return Err(grouping_collision(name, "another top-level grouping"));
            }
        }
    }
    Ok(())
}

fn typedef_collision(name: &str, with: &str) -> Error {
    Error::AlreadyExists(format!(
        "invalid name \"{name}\" of typedef - name collision with {with}"
    ))
}

fn grouping_collision(name: &str, with: &str) -> Error {
    Error::AlreadyExists(format!(
        "invalid name \"{name}\" of grouping - name collision with {with}"
    ))
}

#[cfg(test)]
mod tests {
    use crate::schema::{Import, Include, NodeKind, Submodule};

    use super::*;

    fn linked_submodule(module: &mut Module, sub: Submodule) {
        let include = Include::new(sub.name.clone(), None);
        include.link(Rc::new(sub));
        module.includes.push(include);
    }

    #[test]
    fn test_top_level_collision_across_submodule() {
        let mut module = Module::new("a", "a");
        module.typedefs.push(Typedef::new("percent", "uint8"));

        let mut sub = Submodule::new("a-sub", "a", "a");
        sub.typedefs.push(Typedef::new("percent", "uint16"));
        linked_submodule(&mut module, sub);

        let err = check_typedefs(&module).unwrap_err();
        assert!(err.to_string().contains("another top-level type"), "{err}");
    }

    #[test]
    fn test_top_level_must_not_shadow_builtin() {
        let mut module = Module::new("a", "a");
        module.typedefs.push(Typedef::new("string", "my-type"));
        let err = check_typedefs(&module).unwrap_err();
        assert!(err.to_string().contains("built-in type"));
    }

    #[test]
    fn test_scoped_must_not_shadow_builtin() {
        let mut module = Module::new("a", "a");
        let root = module.tree.add_child(None, NodeKind::Container, "a", "c");
        module.data.push(root);
        module.tree.node_mut(root).typedefs.push(Typedef::new("int8", "x"));

        let err = check_typedefs(&module).unwrap_err();
        assert!(err.to_string().contains("built-in type"));
    }

    #[test]
    fn test_scoped_collides_with_ancestor_and_sibling() {
        let mut module = Module::new("a", "a");
        let outer = module.tree.add_child(None, NodeKind::Container, "a", "outer");
        let inner = module.tree.add_child(Some(outer), NodeKind::Container, "a", "inner");
        module.data.push(outer);
        module.tree.node_mut(outer).typedefs.push(Typedef::new("t", "x"));
        module.tree.node_mut(inner).typedefs.push(Typedef::new("t", "y"));
        assert!(check_typedefs(&module).is_err());

        let mut module = Module::new("a", "a");
        let root = module.tree.add_child(None, NodeKind::Container, "a", "c");
        module.data.push(root);
        module.tree.node_mut(root).typedefs.push(Typedef::new("t", "x"));
        module.tree.node_mut(root).typedefs.push(Typedef::new("t", "y"));
        assert!(check_typedefs(&module).is_err());
    }

    #[test]
    fn test_scoped_collides_with_top_level() {
        let mut module = Module::new("a", "a");
        module.typedefs.push(Typedef::new("t", "x"));
        let root = module.tree.add_child(None, NodeKind::Container, "a", "c");
        module.data.push(root);
        module.tree.node_mut(root).typedefs.push(Typedef::new("t", "y"));

        let err = check_typedefs(&module).unwrap_err();
        assert!(err.to_string().contains("another top-level type"));
    }

    #[test]
    fn test_unrelated_scopes_may_share_names() {
        let mut module = Module::new("a", "a");
        let left = module.tree.add_child(None, NodeKind::Container, "a", "left");
        let right = module.tree.add_child(None, NodeKind::Container, "a", "right");
        module.data.push(left);
        module.data.push(right);
        module.tree.node_mut(left).typedefs.push(Typedef::new("t", "x"));
        module.tree.node_mut(right).typedefs.push(Typedef::new("t", "y"));

        assert!(check_typedefs(&module).is_ok());
    }

    #[test]
    fn test_grouping_collisions() {
        let mut module = Module::new("a", "a");
        let top = module.tree.add_grouping(None, "a", "endpoint");
        module.groupings.push(top);
        let root = module.tree.add_child(None, NodeKind::Container, "a", "c");
        module.data.push(root);
        module.tree.add_grouping(Some(root), "a", "endpoint");

        let err = check_groupings(&module).unwrap_err();
        assert!(err.to_string().contains("another top-level grouping"), "{err}");
    }

    #[test]
    fn test_grouping_scopes_disjoint_ok() {
        let mut module = Module::new("a", "a");
        let left = module.tree.add_child(None, NodeKind::Container, "a", "left");
        let right = module.tree.add_child(None, NodeKind::Container, "a", "right");
        module.data.push(left);
        module.data.push(right);
        module.tree.add_grouping(Some(left), "a", "g");
        module.tree.add_grouping(Some(right), "a", "g");

        assert!(check_groupings(&module).is_ok());
    }

    #[test]
    fn test_find_builtin() {
        let ctx = Context::new();
        let module = Module::new("a", "a");
        assert_eq!(
            find_typedef(&ctx, "uint32", &module, None).unwrap(),
            TypeMatch::Builtin(BuiltinType::Uint32)
        );
    }

    #[test]
    fn test_find_nearest_scope_wins() {
        let ctx = Context::new();
        let mut module = Module::new("a", "a");
        let outer = module.tree.add_child(None, NodeKind::Container, "a", "outer");
        let inner = module.tree.add_child(Some(outer), NodeKind::Container, "a", "inner");
        module.data.push(outer);
        module.tree.node_mut(outer).typedefs.push(Typedef::new("t", "int16"));
        module.tree.node_mut(inner).typedefs.push(Typedef::new("t", "int8"));

        let hit = find_typedef(&ctx, "t", &module, Some(inner)).unwrap();
        match hit {
            TypeMatch::Typedef { module, def } => {
                assert_eq!(module, "a");
                assert_eq!(def.base_type, "int8");
            }
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_find_falls_back_to_top_level_and_submodules() {
        let ctx = Context::new();
        let mut module = Module::new("a", "a");
        module.typedefs.push(Typedef::new("from-top", "string"));
        let mut sub = Submodule::new("a-sub", "a", "a");
        sub.typedefs.push(Typedef::new("from-sub", "string"));
        linked_submodule(&mut module, sub);

        match find_typedef(&ctx, "from-top", &module, None).unwrap() {
            TypeMatch::Typedef { module, .. } => assert_eq!(module, "a"),
            other => panic!("unexpected match: {other:?}"),
        }
        match find_typedef(&ctx, "from-sub", &module, None).unwrap() {
            TypeMatch::Typedef { module, .. } => assert_eq!(module, "a-sub"),
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_find_prefixed_searches_imported_module() {
        let mut ctx = Context::new();
        let mut dep = Module::new("b", "b");
        dep.typedefs.push(Typedef::new("addr", "string"));
        let dep = Rc::new(dep);
        ctx.register(Rc::clone(&dep));

        let mut module = Module::new("a", "a");
        module.imports.push(Import::new("b", "bp", None));
        module.imports[0].link(Rc::clone(&dep));

        match find_typedef(&ctx, "bp:addr", &module, None).unwrap() {
            TypeMatch::Typedef { module, def } => {
                assert_eq!(module, "b");
                assert_eq!(def.name, "addr");
            }
            other => panic!("unexpected match: {other:?}"),
        }

        // built-ins never match under a prefix
        let err = find_typedef(&ctx, "bp:string", &module, None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{err}");

        let err = find_typedef(&ctx, "zz:addr", &module, None).unwrap_err();
        assert!(err.to_string().contains("prefix \"zz\""));
    }

    #[test]
    fn test_find_rejects_malformed_and_missing() {
        let ctx = Context::new();
        let module = Module::new("a", "a");
        assert!(matches!(
            find_typedef(&ctx, "1bad", &module, None),
            Err(Error::InvalidSyntax(_))
        ));
        assert!(matches!(
            find_typedef(&ctx, "a:b:c", &module, None),
            Err(Error::InvalidSyntax(_))
        ));
        assert!(matches!(
            find_typedef(&ctx, "no-such", &module, None),
            Err(Error::NotFound(_))
        ));
    }
}
