//! Statement keyword and argument-name classification.
//!
//! [`match_keyword`] classifies one statement name per parsed statement, so it
//! dispatches on the first character and then performs a single whole-string
//! comparison per candidate — time proportional to the name's own length, not
//! to the number of known keywords. Matching is case-sensitive and exact; a
//! prefixed statement is an extension by language rule and never matches a
//! built-in keyword.

use std::fmt;

/// A recognized statement keyword, or [`Keyword::Custom`] for a prefixed
/// extension statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Action,
    Anydata,
    Anyxml,
    Argument,
    Augment,
    Base,
    BelongsTo,
    Bit,
    Case,
    Choice,
    Config,
    Contact,
    Container,
    Default,
    Description,
    Deviate,
    Deviation,
    Enum,
    ErrorAppTag,
    ErrorMessage,
    Extension,
    Feature,
    FractionDigits,
    Grouping,
    Identity,
    IfFeature,
    Import,
    Include,
    Input,
    Key,
    Leaf,
    LeafList,
    Length,
    List,
    Mandatory,
    MaxElements,
    MinElements,
    Modifier,
    Module,
    Must,
    Namespace,
    Notification,
    OrderedBy,
    Organization,
    Output,
    Path,
    Pattern,
    Position,
    Prefix,
    Presence,
    Range,
    Reference,
    Refine,
    RequireInstance,
    Revision,
    RevisionDate,
    Rpc,
    Status,
    Submodule,
    Type,
    Typedef,
    Unique,
    Units,
    Uses,
    Value,
    When,
    YangVersion,
    YinElement,
    /// A prefixed statement naming an extension instance.
    Custom,
}

impl Keyword {
    /// Every built-in statement keyword, in canonical (alphabetical) order.
    pub const ALL: [Keyword; 68] = [
        Keyword::Action,
        Keyword::Anydata,
        Keyword::Anyxml,
        Keyword::Argument,
        Keyword::Augment,
        Keyword::Base,
        Keyword::BelongsTo,
        Keyword::Bit,
        Keyword::Case,
        Keyword::Choice,
        Keyword::Config,
        Keyword::Contact,
        Keyword::Container,
        Keyword::Default,
        Keyword::Description,
        Keyword::Deviate,
        Keyword::Deviation,
        Keyword::Enum,
        Keyword::ErrorAppTag,
        Keyword::ErrorMessage,
        Keyword::Extension,
        Keyword::Feature,
        Keyword::FractionDigits,
        Keyword::Grouping,
        Keyword::Identity,
        Keyword::IfFeature,
        Keyword::Import,
        Keyword::Include,
        Keyword::Input,
        Keyword::Key,
        Keyword::Leaf,
        Keyword::LeafList,
        Keyword::Length,
        Keyword::List,
        Keyword::Mandatory,
        Keyword::MaxElements,
        Keyword::MinElements,
        Keyword::Modifier,
        Keyword::Module,
        Keyword::Must,
        Keyword::Namespace,
        Keyword::Notification,
        Keyword::OrderedBy,
        Keyword::Organization,
        Keyword::Output,
        Keyword::Path,
        Keyword::Pattern,
        Keyword::Position,
        Keyword::Prefix,
        Keyword::Presence,
        Keyword::Range,
        Keyword::Reference,
        Keyword::Refine,
        Keyword::RequireInstance,
        Keyword::Revision,
        Keyword::RevisionDate,
        Keyword::Rpc,
        Keyword::Status,
        Keyword::Submodule,
        Keyword::Type,
        Keyword::Typedef,
        Keyword::Unique,
        Keyword::Units,
        Keyword::Uses,
        Keyword::Value,
        Keyword::When,
        Keyword::YangVersion,
        Keyword::YinElement,
    ];

    /// Canonical spelling of the keyword.
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::Action => "action",
            Keyword::Anydata => "anydata",
            Keyword::Anyxml => "anyxml",
            Keyword::Argument => "argument",
            Keyword::Augment => "augment",
            Keyword::Base => "base",
            Keyword::BelongsTo => "belongs-to",
            Keyword::Bit => "bit",
            Keyword::Case => "case",
            Keyword::Choice => "choice",
            Keyword::Config => "config",
            Keyword::Contact => "contact",
            Keyword::Container => "container",
            Keyword::Default => "default",
            Keyword::Description => "description",
            Keyword::Deviate => "deviate",
            Keyword::Deviation => "deviation",
            Keyword::Enum => "enum",
            Keyword::ErrorAppTag => "error-app-tag",
            Keyword::ErrorMessage => "error-message",
            Keyword::Extension => "extension",
            Keyword::Feature => "feature",
            Keyword::FractionDigits => "fraction-digits",
            Keyword::Grouping => "grouping",
            Keyword::Identity => "identity",
            Keyword::IfFeature => "if-feature",
            Keyword::Import => "import",
            Keyword::Include => "include",
            Keyword::Input => "input",
            Keyword::Key => "key",
            Keyword::Leaf => "leaf",
            Keyword::LeafList => "leaf-list",
            Keyword::Length => "length",
            Keyword::List => "list",
            Keyword::Mandatory => "mandatory",
            Keyword::MaxElements => "max-elements",
            Keyword::MinElements => "min-elements",
            Keyword::Modifier => "modifier",
            Keyword::Module => "module",
            Keyword::Must => "must",
            Keyword::Namespace => "namespace",
            Keyword::Notification => "notification",
            Keyword::OrderedBy => "ordered-by",
            Keyword::Organization => "organization",
            Keyword::Output => "output",
            Keyword::Path => "path",
            Keyword::Pattern => "pattern",
            Keyword::Position => "position",
            Keyword::Prefix => "prefix",
            Keyword::Presence => "presence",
            Keyword::Range => "range",
            Keyword::Reference => "reference",
            Keyword::Refine => "refine",
            Keyword::RequireInstance => "require-instance",
            Keyword::Revision => "revision",
            Keyword::RevisionDate => "revision-date",
            Keyword::Rpc => "rpc",
            Keyword::Status => "status",
            Keyword::Submodule => "submodule",
            Keyword::Type => "type",
            Keyword::Typedef => "typedef",
            Keyword::Unique => "unique",
            Keyword::Units => "units",
            Keyword::Uses => "uses",
            Keyword::Value => "value",
            Keyword::When => "when",
            Keyword::YangVersion => "yang-version",
            Keyword::YinElement => "yin-element",
            Keyword::Custom => "custom",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a statement name.
///
/// `prefixed` reports whether the statement carried a namespace prefix; if so
/// the result is always [`Keyword::Custom`]. Otherwise the name is matched
/// exactly against the built-in keyword set, `None` meaning unrecognized.
pub fn match_keyword(name: &str, prefixed: bool) -> Option<Keyword> {
    if prefixed {
        return Some(Keyword::Custom);
    }
    let first = *name.as_bytes().first()?;
    let rest = &name[1..];
    let kw = match first {
        b'a' => match rest {
            "ction" => Keyword::Action,
            "nydata" => Keyword::Anydata,
            "nyxml" => Keyword::Anyxml,
            "rgument" => Keyword::Argument,
            "ugment" => Keyword::Augment,
            _ => return None,
        },
        b'b' => match rest {
            "ase" => Keyword::Base,
            "elongs-to" => Keyword::BelongsTo,
            "it" => Keyword::Bit,
            _ => return None,
        },
        b'c' => match rest {
            "ase" => Keyword::Case,
            "hoice" => Keyword::Choice,
            "onfig" => Keyword::Config,
            "ontact" => Keyword::Contact,
            "ontainer" => Keyword::Container,
            _ => return None,
        },
        b'd' => match rest {
            "efault" => Keyword::Default,
            "escription" => Keyword::Description,
            "eviate" => Keyword::Deviate,
            "eviation" => Keyword::Deviation,
            _ => return None,
        },
        b'e' => match rest {
            "num" => Keyword::Enum,
            "rror-app-tag" => Keyword::ErrorAppTag,
            "rror-message" => Keyword::ErrorMessage,
            "xtension" => Keyword::Extension,
            _ => return None,
        },
        b'f' => match rest {
            "eature" => Keyword::Feature,
            "raction-digits" => Keyword::FractionDigits,
            _ => return None,
        },
        b'g' => match rest {
            "rouping" => Keyword::Grouping,
            _ => return None,
        },
        b'i' => match rest {
            "dentity" => Keyword::Identity,
            "f-feature" => Keyword::IfFeature,
            "mport" => Keyword::Import,
            "nclude" => Keyword::Include,
            "nput" => Keyword::Input,
            _ => return None,
        },
        b'k' => match rest {
            "ey" => Keyword::Key,
            _ => return None,
        },
        b'l' => match rest {
            "eaf" => Keyword::Leaf,
            "eaf-list" => Keyword::LeafList,
            "ength" => Keyword::Length,
            "ist" => Keyword::List,
            _ => return None,
        },
        b'm' => match rest {
            "andatory" => Keyword::Mandatory,
            "ax-elements" => Keyword::MaxElements,
            "in-elements" => Keyword::MinElements,
            "odifier" => Keyword::Modifier,
            "odule" => Keyword::Module,
            "ust" => Keyword::Must,
            _ => return None,
        },
        b'n' => match rest {
            "amespace" => Keyword::Namespace,
            "otification" => Keyword::Notification,
            _ => return None,
        },
        b'o' => match rest {
            "rdered-by" => Keyword::OrderedBy,
            "rganization" => Keyword::Organization,
            "utput" => Keyword::Output,
            _ => return None,
        },
        b'p' => match rest {
            "ath" => Keyword::Path,
            "attern" => Keyword::Pattern,
            "osition" => Keyword::Position,
            "refix" => Keyword::Prefix,
            "resence" => Keyword::Presence,
            _ => return None,
        },
        b'r' => match rest {
            "ange" => Keyword::Range,
            "eference" => Keyword::Reference,
            "efine" => Keyword::Refine,
            "equire-instance" => Keyword::RequireInstance,
            "evision" => Keyword::Revision,
            "evision-date" => Keyword::RevisionDate,
            "pc" => Keyword::Rpc,
            _ => return None,
        },
        b's' => match rest {
            "tatus" => Keyword::Status,
            "ubmodule" => Keyword::Submodule,
            _ => return None,
        },
        b't' => match rest {
            "ype" => Keyword::Type,
            "ypedef" => Keyword::Typedef,
            _ => return None,
        },
        b'u' => match rest {
            "nique" => Keyword::Unique,
            "nits" => Keyword::Units,
            "ses" => Keyword::Uses,
            _ => return None,
        },
        b'v' => match rest {
            "alue" => Keyword::Value,
            _ => return None,
        },
        b'w' => match rest {
            "hen" => Keyword::When,
            _ => return None,
        },
        b'y' => match rest {
            "ang-version" => Keyword::YangVersion,
            "in-element" => Keyword::YinElement,
            _ => return None,
        },
        _ => return None,
    };
    Some(kw)
}

/// An attribute name recognized by the XML serialization front end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum YinArgument {
    Name,
    TargetNode,
    Module,
    Value,
    Text,
    Condition,
    Uri,
    Date,
    Tag,
    Xmlns,
}

impl YinArgument {
    pub const fn as_str(self) -> &'static str {
        match self {
            YinArgument::Name => "name",
            YinArgument::TargetNode => "target-node",
            YinArgument::Module => "module",
            YinArgument::Value => "value",
            YinArgument::Text => "text",
            YinArgument::Condition => "condition",
            YinArgument::Uri => "uri",
            YinArgument::Date => "date",
            YinArgument::Tag => "tag",
            YinArgument::Xmlns => "xmlns",
        }
    }
}

impl fmt::Display for YinArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an XML attribute name, `None` meaning unrecognized.
pub fn match_argument(name: &str) -> Option<YinArgument> {
    let first = *name.as_bytes().first()?;
    let rest = &name[1..];
    let arg = match first {
        b'c' => match rest {
            "ondition" => YinArgument::Condition,
            _ => return None,
        },
        b'd' => match rest {
            "ate" => YinArgument::Date,
            _ => return None,
        },
        b'm' => match rest {
            "odule" => YinArgument::Module,
            _ => return None,
        },
        b'n' => match rest {
            "ame" => YinArgument::Name,
            _ => return None,
        },
        b't' => match rest {
            "ag" => YinArgument::Tag,
            "arget-node" => YinArgument::TargetNode,
            "ext" => YinArgument::Text,
            _ => return None,
        },
        b'u' => match rest {
            "ri" => YinArgument::Uri,
            _ => return None,
        },
        b'v' => match rest {
            "alue" => YinArgument::Value,
            _ => return None,
        },
        b'x' => match rest {
            "mlns" => YinArgument::Xmlns,
            _ => return None,
        },
        _ => return None,
    };
    Some(arg)
}
