//! Module source payloads and the external-source provider seam.

use std::fmt;

/// Serialization format of module source text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SchemaFormat {
    Yang,
    Yin,
}

impl SchemaFormat {
    /// The file extension conventionally carrying this format.
    pub const fn extension(self) -> &'static str {
        match self {
            SchemaFormat::Yang => "yang",
            SchemaFormat::Yin => "yin",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "yang" => Some(SchemaFormat::Yang),
            "yin" => Some(SchemaFormat::Yin),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Source text of one module or submodule, tagged with its format.
#[derive(Clone, Debug)]
pub struct ModuleSource {
    pub format: SchemaFormat,
    pub data: String,
}

impl ModuleSource {
    pub fn new(format: SchemaFormat, data: impl Into<String>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }
}

/// Supplies module source text from an external store.
///
/// When a submodule is wanted, `submodule` and `submodule_revision` identify
/// it and `module` names the including module. Returning `None` means the
/// provider has no such unit; the loader then falls back to its other
/// provider.
///
/// Any `Fn` with the matching shape is a provider:
///
/// ```
/// # use yangkit::project::{Context, ModuleSource, SchemaFormat};
/// let mut ctx = Context::new();
/// ctx.set_source_callback(|module: &str, _: Option<&str>, _: Option<&str>, _: Option<&str>| {
///     (module == "greeting").then(|| ModuleSource::new(SchemaFormat::Yang, "module greeting ..."))
/// });
/// ```
pub trait SourceCallback {
    fn retrieve(
        &self,
        module: &str,
        revision: Option<&str>,
        submodule: Option<&str>,
        submodule_revision: Option<&str>,
    ) -> Option<ModuleSource>;
}

impl<F> SourceCallback for F
where
    F: Fn(&str, Option<&str>, Option<&str>, Option<&str>) -> Option<ModuleSource>,
{
    fn retrieve(
        &self,
        module: &str,
        revision: Option<&str>,
        submodule: Option<&str>,
        submodule_revision: Option<&str>,
    ) -> Option<ModuleSource> {
        self(module, revision, submodule, submodule_revision)
    }
}
