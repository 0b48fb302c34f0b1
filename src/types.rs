use std::fmt;
use std::str::FromStr;

/// Source flavour used when generating handler boilerplate.
///
/// - `Typed`: TypeScript, typed import plus a typed default export.
/// - `EsModule`: JavaScript with `export default`.
/// - `CommonJs`: JavaScript with `module.exports =`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringVariant {
    Typed,
    EsModule,
    CommonJs,
}

impl AuthoringVariant {
    /// File extension of handler files written in this variant.
    pub fn extension(self) -> &'static str {
        match self {
            AuthoringVariant::Typed => "ts",
            AuthoringVariant::EsModule | AuthoringVariant::CommonJs => "js",
        }
    }

    /// Human readable label used in CLI output.
    pub fn label(self) -> &'static str {
        match self {
            AuthoringVariant::Typed => "Using Typescript",
            AuthoringVariant::EsModule => "Using ESModules",
            AuthoringVariant::CommonJs => "Using CommonJS",
        }
    }
}

impl From<ModuleFormat> for AuthoringVariant {
    fn from(format: ModuleFormat) -> Self {
        match format {
            ModuleFormat::Module => AuthoringVariant::EsModule,
            ModuleFormat::CommonJs => AuthoringVariant::CommonJs,
        }
    }
}

impl fmt::Display for AuthoringVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The `type` field of a host `package.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    Module,
    CommonJs,
}

impl Default for ModuleFormat {
    fn default() -> Self {
        ModuleFormat::CommonJs
    }
}

impl FromStr for ModuleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "module" => Ok(ModuleFormat::Module),
            "commonjs" => Ok(ModuleFormat::CommonJs),
            other => Err(format!(
                "invalid module type: {other} (expected \"module\" or \"commonjs\")"
            )),
        }
    }
}
