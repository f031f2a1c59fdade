//! Resolution of schema node-id expressions against loaded modules.

use std::rc::Rc;

use bitflags::bitflags;
use tracing::trace;

use crate::base::Cursor;
use crate::error::{Error, Result};
use crate::project::Context;
use crate::schema::{ChildLookup, Module, NodeId, NodeKind, NodeKindSet};

use super::prefix::module_for_prefix;

bitflags! {
    /// What a resolved schema node-id passed through on the way to its
    /// target.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ResolveFlags: u8 {
        /// The path crossed a notification node.
        const NOTIFICATION = 1 << 0;
        /// The path entered the input side of an RPC/action.
        const RPC_INPUT = 1 << 1;
        /// The path entered the output side of an RPC/action.
        const RPC_OUTPUT = 1 << 2;
    }
}

/// A schema node bound to the module whose tree owns it.
#[derive(Clone, Debug)]
pub struct SchemaNodeRef {
    pub module: Rc<Module>,
    pub node: NodeId,
}

impl SchemaNodeRef {
    pub fn new(module: Rc<Module>, node: NodeId) -> Self {
        Self { module, node }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.module.tree[self.node].kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.module.tree[self.node].name
    }
}

/// Resolves a schema node-id expression.
///
/// With `start` the expression is in descendant form and resolution begins
/// among that node's children; without it the expression must be absolute
/// (`/prefix:name/...`) and begins at the top level of the first segment's
/// module. Prefixes are interpreted from `context_module` and unprefixed
/// segments default to it. Below an RPC/action, the special segments
/// `input` and `output` select a side of its body instead of naming a
/// child.
///
/// `accepted` restricts the kind of the final node, with the empty set
/// accepting anything; a final-kind mismatch is [`Error::Denied`]. With
/// `implement`, every module a segment's prefix resolves to is marked
/// implemented along the way.
pub fn resolve_schema_nodeid(
    ctx: &Context,
    nodeid: &str,
    start: Option<&SchemaNodeRef>,
    context_module: &Rc<Module>,
    accepted: NodeKindSet,
    implement: bool,
) -> Result<(SchemaNodeRef, ResolveFlags)> {
    let mut cursor = Cursor::new(nodeid);
    if start.is_none() {
        if !cursor.eat('/') {
            return Err(Error::InvalidSyntax(format!(
                "invalid absolute schema node-id \"{nodeid}\", missing starting \"/\""
            )));
        }
    } else if nodeid.starts_with('/') {
        return Err(Error::InvalidSyntax(format!(
            "invalid descendant schema node-id \"{nodeid}\", absolute form used"
        )));
    }

    let mut current: Option<(Rc<Module>, NodeId)> =
        start.map(|s| (Rc::clone(&s.module), s.node));
    let mut flags = ResolveFlags::empty();
    let mut final_kinds = NodeKindSet::empty();
    let mut final_name: &str = "";
    let mut output_side = false;

    loop {
        let segment = cursor
            .node_id()
            .map_err(|e| e.context(&format!("invalid schema node-id \"{nodeid}\"")))?;

        let target = match segment.prefix {
            Some(prefix) => module_for_prefix(ctx, context_module, prefix).ok_or_else(|| {
                Error::NotFound(format!(
                    "prefix \"{prefix}\" is not defined in module \"{}\"",
                    context_module.name
                ))
            })?,
            None => Rc::clone(context_module),
        };
        if implement && !target.is_implemented() {
            target.set_implemented();
        }

        let at_action = current
            .as_ref()
            .is_some_and(|(module, node)| module.tree[*node].kind == NodeKind::Action);
        if at_action && (segment.name == "input" || segment.name == "output") {
            // selects a side of the action body; the current node stays
            if segment.name == "input" {
                flags |= ResolveFlags::RPC_INPUT;
                output_side = false;
                final_name = "RPC input";
            } else {
                flags |= ResolveFlags::RPC_OUTPUT;
                output_side = true;
                final_name = "RPC output";
            }
            final_kinds = NodeKindSet::INOUT;
        } else {
            let mut opts = ChildLookup::WITH_CHOICE | ChildLookup::WITH_CASE;
            if output_side {
                opts |= ChildLookup::OUTPUT;
            }
            output_side = false;

            let (tree_module, found) = match current.take() {
                None => {
                    let found =
                        target
                            .tree
                            .find_child(&target.data, &target.name, segment.name, opts);
                    (Rc::clone(&target), found)
                }
                Some((module, node)) => {
                    let found = {
                        let scope = module.tree.lookup_base(node, opts);
                        module.tree.find_child(scope, &target.name, segment.name, opts)
                    };
                    (module, found)
                }
            };
            let Some(found) = found else {
                let consumed = &nodeid[..usize::from(cursor.pos())];
                return Err(Error::NotFound(format!(
                    "invalid schema node-id \"{consumed}\", target node not found"
                )));
            };
            let kind = tree_module.tree[found].kind;
            if kind == NodeKind::Notification {
                flags |= ResolveFlags::NOTIFICATION;
            }
            final_kinds = kind.as_set();
            final_name = kind.as_str();
            current = Some((tree_module, found));
        }

        if cursor.at_end() {
            break;
        }
        if !cursor.eat('/') {
            return Err(Error::InvalidSyntax(format!(
                "invalid schema node-id \"{nodeid}\", missing \"/\" separator at offset {}",
                u32::from(cursor.pos())
            )));
        }
    }

    let Some((module, node)) = current else {
        return Err(Error::InvalidSyntax(format!(
            "invalid schema node-id \"{nodeid}\", unexpected end of expression"
        )));
    };

    if !accepted.is_empty() && !accepted.intersects(final_kinds) {
        return Err(Error::Denied(format!(
            "invalid schema node-id \"{nodeid}\", {final_name} node is not accepted"
        )));
    }

    trace!(
        nodeid,
        module = %module.name,
        node = node.index(),
        ?flags,
        "resolved schema node-id"
    );
    Ok((SchemaNodeRef { module, node }, flags))
}

#[cfg(test)]
mod tests {
    use crate::schema::Import;

    use super::*;

    struct Fixture {
        ctx: Context,
        sys: Rc<Module>,
        ifaces: Rc<Module>,
        system: NodeId,
        hostname: NodeId,
        restart: NodeId,
        delay: NodeId,
        status: NodeId,
        severity: NodeId,
        tcp_port: NodeId,
        version: NodeId,
        eth: NodeId,
    }

    /// module sys { prefix sy;
    ///   container system {
    ///     leaf hostname;
    ///     action restart { input { leaf delay; } output { leaf status; } }
    ///     notification alarm { leaf severity; }
    ///     choice transport { case tcp { leaf tcp-port; } }
    ///   }
    ///   leaf version;
    ///   import ifaces { prefix if; }   // container eth
    /// }
    fn fixture() -> Fixture {
        let mut ctx = Context::new();

        let mut ifaces = Module::new("ifaces", "ifs");
        let eth = ifaces
            .tree
            .add_child(None, NodeKind::Container, "ifaces", "eth");
        ifaces.data.push(eth);
        let ifaces = Rc::new(ifaces);
        ctx.register(Rc::clone(&ifaces));

        let mut sys = Module::new("sys", "sy");
        let t = &mut sys.tree;
        let system = t.add_child(None, NodeKind::Container, "sys", "system");
        let hostname = t.add_child(Some(system), NodeKind::Leaf, "sys", "hostname");
        let restart = t.add_child(Some(system), NodeKind::Action, "sys", "restart");
        let input = t.add_child(Some(restart), NodeKind::Input, "sys", "input");
        let delay = t.add_child(Some(input), NodeKind::Leaf, "sys", "delay");
        let output = t.add_child(Some(restart), NodeKind::Output, "sys", "output");
        let status = t.add_child(Some(output), NodeKind::Leaf, "sys", "status");
        let alarm = t.add_child(Some(system), NodeKind::Notification, "sys", "alarm");
        let severity = t.add_child(Some(alarm), NodeKind::Leaf, "sys", "severity");
        let transport = t.add_child(Some(system), NodeKind::Choice, "sys", "transport");
        let tcp = t.add_child(Some(transport), NodeKind::Case, "sys", "tcp");
        let tcp_port = t.add_child(Some(tcp), NodeKind::Leaf, "sys", "tcp-port");
        let version = t.add_child(None, NodeKind::Leaf, "sys", "version");
        sys.data.push(system);
        sys.data.push(version);
        sys.imports.push(Import::new("ifaces", "if", None));
        sys.imports[0].link(Rc::clone(&ifaces));
        let sys = Rc::new(sys);
        ctx.register(Rc::clone(&sys));

        Fixture {
            ctx,
            sys,
            ifaces,
            system,
            hostname,
            restart,
            delay,
            status,
            severity,
            tcp_port,
            version,
            eth,
        }
    }

    fn resolve(
        f: &Fixture,
        nodeid: &str,
        start: Option<&SchemaNodeRef>,
        accepted: NodeKindSet,
    ) -> Result<(SchemaNodeRef, ResolveFlags)> {
        resolve_schema_nodeid(&f.ctx, nodeid, start, &f.sys, accepted, false)
    }

    #[test]
    fn test_absolute_path_resolves() {
        let f = fixture();
        let (hit, flags) =
            resolve(&f, "/sy:system/sy:hostname", None, NodeKindSet::empty()).unwrap();
        assert_eq!(hit.node, f.hostname);
        assert!(Rc::ptr_eq(&hit.module, &f.sys));
        assert_eq!(flags, ResolveFlags::empty());

        // unprefixed segments default to the context module
        let (hit, _) = resolve(&f, "/system/hostname", None, NodeKindSet::empty()).unwrap();
        assert_eq!(hit.node, f.hostname);
    }

    #[test]
    fn test_descendant_path_resolves() {
        let f = fixture();
        let start = SchemaNodeRef::new(Rc::clone(&f.sys), f.system);
        let (hit, _) = resolve(&f, "hostname", Some(&start), NodeKindSet::empty()).unwrap();
        assert_eq!(hit.node, f.hostname);
        assert_eq!(hit.name(), "hostname");
    }

    #[test]
    fn test_choice_and_case_are_transparent_but_addressable() {
        let f = fixture();
        let (hit, _) = resolve(
            &f,
            "/sy:system/sy:transport/sy:tcp/sy:tcp-port",
            None,
            NodeKindSet::empty(),
        )
        .unwrap();
        assert_eq!(hit.node, f.tcp_port);

        // the wrappers may also be skipped entirely
        let (hit, _) =
            resolve(&f, "/sy:system/sy:tcp-port", None, NodeKindSet::empty()).unwrap();
        assert_eq!(hit.node, f.tcp_port);
    }

    #[test]
    fn test_action_input_and_output_sides() {
        let f = fixture();
        let (hit, flags) = resolve(
            &f,
            "/sy:system/sy:restart/input/sy:delay",
            None,
            NodeKindSet::empty(),
        )
        .unwrap();
        assert_eq!(hit.node, f.delay);
        assert_eq!(flags, ResolveFlags::RPC_INPUT);

        let (hit, flags) = resolve(
            &f,
            "/sy:system/sy:restart/output/sy:status",
            None,
            NodeKindSet::empty(),
        )
        .unwrap();
        assert_eq!(hit.node, f.status);
        assert_eq!(flags, ResolveFlags::RPC_OUTPUT);

        // a path ending on the side selector stays at the action node
        let (hit, flags) = resolve(
            &f,
            "/sy:system/sy:restart/output",
            None,
            NodeKindSet::INOUT,
        )
        .unwrap();
        assert_eq!(hit.node, f.restart);
        assert_eq!(flags, ResolveFlags::RPC_OUTPUT);

        // the input side does not hold output-side nodes
        let err = resolve(
            &f,
            "/sy:system/sy:restart/input/sy:status",
            None,
            NodeKindSet::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{err}");
    }

    #[test]
    fn test_notification_sets_flag() {
        let f = fixture();
        let (hit, flags) = resolve(
            &f,
            "/sy:system/sy:alarm/sy:severity",
            None,
            NodeKindSet::empty(),
        )
        .unwrap();
        assert_eq!(hit.node, f.severity);
        assert_eq!(flags, ResolveFlags::NOTIFICATION);
    }

    #[test]
    fn test_prefix_crosses_into_imported_module() {
        let f = fixture();
        let (hit, _) = resolve(&f, "/if:eth", None, NodeKindSet::empty()).unwrap();
        assert_eq!(hit.node, f.eth);
        assert!(Rc::ptr_eq(&hit.module, &f.ifaces));
    }

    #[test]
    fn test_unknown_prefix_and_unknown_node() {
        let f = fixture();
        let err = resolve(&f, "/zz:system", None, NodeKindSet::empty()).unwrap_err();
        assert!(err.to_string().contains("prefix \"zz\""));

        let err = resolve(&f, "/sy:system/sy:nope", None, NodeKindSet::empty()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("\"/sy:system/sy:nope\""));
        assert!(err.to_string().contains("target node not found"));
    }

    #[test]
    fn test_form_mismatches_are_rejected() {
        let f = fixture();
        let err = resolve(&f, "system", None, NodeKindSet::empty()).unwrap_err();
        assert!(err.to_string().contains("missing starting \"/\""));

        let start = SchemaNodeRef::new(Rc::clone(&f.sys), f.system);
        let err = resolve(&f, "/hostname", Some(&start), NodeKindSet::empty()).unwrap_err();
        assert!(err.to_string().contains("absolute form used"));
    }

    #[test]
    fn test_malformed_expressions() {
        let f = fixture();
        for bad in ["/", "", "/sy:system/", "/sy:system x", "/sy:system//sy:hostname"] {
            let err = resolve(&f, bad, None, NodeKindSet::empty()).unwrap_err();
            assert!(matches!(err, Error::InvalidSyntax(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn test_accepted_kind_gate() {
        let f = fixture();
        let (hit, _) = resolve(&f, "/sy:version", None, NodeKindSet::LEAF).unwrap();
        assert_eq!(hit.node, f.version);

        let err = resolve(&f, "/sy:version", None, NodeKindSet::CONTAINER).unwrap_err();
        assert!(matches!(err, Error::Denied(_)), "{err}");
        assert!(err.to_string().contains("leaf node is not accepted"));

        let err = resolve(
            &f,
            "/sy:system/sy:restart/input",
            None,
            NodeKindSet::LEAF,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Denied(_)));
    }

    #[test]
    fn test_implement_marks_touched_modules() {
        let f = fixture();
        assert!(!f.sys.is_implemented());
        assert!(!f.ifaces.is_implemented());

        resolve_schema_nodeid(
            &f.ctx,
            "/sy:system/sy:hostname",
            None,
            &f.sys,
            NodeKindSet::empty(),
            true,
        )
        .unwrap();
        assert!(f.sys.is_implemented());
        assert!(!f.ifaces.is_implemented());

        resolve_schema_nodeid(&f.ctx, "/if:eth", None, &f.sys, NodeKindSet::empty(), true)
            .unwrap();
        assert!(f.ifaces.is_implemented());
    }
}
