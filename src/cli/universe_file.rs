//! JSON universe files: declarations plus the queries to run against them.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Animal", "kind": "class" },
//!     { "name": "Dog", "kind": "class", "extends": "Animal" },
//!     { "name": "ICollection", "kind": "interface", "params": ["T"] },
//!     { "name": "List", "kind": "class", "params": ["T"], "implements": ["ICollection<T>"] }
//!   ],
//!   "queries": [
//!     { "source": "List<Dog>", "target": "ICollection<Animal>", "expect": true,
//!       "substitution": "ICollection<Dog>" }
//!   ],
//!   "options": { "maxDepth": 100 }
//! }
//! ```
//!
//! Declarations are registered in two passes (names first, then supertypes
//! and constraints), so types may refer to each other in any order.

use anyhow::{Context, Result};
use liskov_solver::{DefKind, DefinitionInfo, TypeUniverse};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::cli::type_expr::resolve_type_str;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UniverseFile {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
    #[serde(default)]
    pub options: FileOptions,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DefKind,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
}

/// A generic parameter: either just its name or a name with constraints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParamDecl {
    Name(String),
    Constrained {
        name: String,
        #[serde(default)]
        constraints: Vec<String>,
    },
}

impl ParamDecl {
    pub fn name(&self) -> &str {
        match self {
            ParamDecl::Name(name) | ParamDecl::Constrained { name, .. } => name,
        }
    }

    pub fn constraints(&self) -> &[String] {
        match self {
            ParamDecl::Name(_) => &[],
            ParamDecl::Constrained { constraints, .. } => constraints,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuerySpec {
    pub source: String,
    pub target: String,
    /// Expected verdict; unchecked when absent.
    #[serde(default)]
    pub expect: Option<bool>,
    /// Expected resolved type, as a type expression.
    #[serde(default)]
    pub substitution: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileOptions {
    #[serde(default)]
    pub max_depth: Option<u32>,
}

pub fn parse_universe_file(source: &str) -> Result<UniverseFile> {
    serde_json::from_str(source).context("failed to parse universe file")
}

pub fn load_universe_file(path: &Path) -> Result<UniverseFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read universe file {}", path.display()))?;
    parse_universe_file(&source).with_context(|| format!("in {}", path.display()))
}

impl UniverseFile {
    /// Declare every type and attach supertypes and constraints.
    pub fn build(&self) -> Result<TypeUniverse> {
        let universe = TypeUniverse::new();

        let mut declared = Vec::with_capacity(self.types.len());
        for decl in &self.types {
            let params: Vec<&str> = decl.params.iter().map(ParamDecl::name).collect();
            let ty = universe
                .declare(DefinitionInfo::new(decl.kind, decl.name.as_str(), &params))
                .with_context(|| format!("cannot declare '{}'", decl.name))?;
            declared.push(ty);
        }

        for (decl, &ty) in self.types.iter().zip(&declared) {
            if let Some(extends) = &decl.extends {
                let base = resolve_type_str(&universe, extends, Some(ty))
                    .with_context(|| format!("in 'extends' of '{}'", decl.name))?;
                universe
                    .set_base(ty, base)
                    .with_context(|| format!("in 'extends' of '{}'", decl.name))?;
            }
            for implemented in &decl.implements {
                let iface = resolve_type_str(&universe, implemented, Some(ty))
                    .with_context(|| format!("in 'implements' of '{}'", decl.name))?;
                universe
                    .add_interface(ty, iface)
                    .with_context(|| format!("in 'implements' of '{}'", decl.name))?;
            }
            for (index, param) in decl.params.iter().enumerate() {
                if param.constraints().is_empty() {
                    continue;
                }
                let param_ty = universe.parameter(ty, index)?;
                for constraint in param.constraints() {
                    let bound = resolve_type_str(&universe, constraint, Some(ty)).with_context(|| {
                        format!("in constraints of '{}' on '{}'", param.name(), decl.name)
                    })?;
                    universe.add_constraint(param_ty, bound).with_context(|| {
                        format!("in constraints of '{}' on '{}'", param.name(), decl.name)
                    })?;
                }
            }
        }

        debug!(
            declarations = self.types.len(),
            types = universe.type_count(),
            "universe file loaded"
        );
        Ok(universe)
    }
}
