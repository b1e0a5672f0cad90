//! Human-readable rendering of universe types.

use crate::TypeUniverse;
use crate::types::{TypeData, TypeId};

/// Nested arguments deeper than this render as `…`.
const MAX_FORMAT_DEPTH: u32 = 32;

/// Renders types the way they are written in declarations:
/// `List<Dog>`, `Dictionary<String, List<Int32>>`, the open definitions
/// `Range<>` and `Map<,>`, and parameters by name.
///
/// Only an outermost open definition uses empty slots. Nested inside another
/// type it names its parameters, so the declared interface
/// `IComparable<Range<T>>` of `Range<T>` does not read as `IComparable<Range<>>`.
pub struct TypeFormatter<'a> {
    universe: &'a TypeUniverse,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(universe: &'a TypeUniverse) -> Self {
        Self { universe }
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write(ty, 0, &mut out);
        out
    }

    fn write(&self, ty: TypeId, depth: u32, out: &mut String) {
        if depth > MAX_FORMAT_DEPTH {
            out.push('…');
            return;
        }
        let defs = self.universe.definitions();
        match self.universe.data(ty) {
            Some(TypeData::Named(def)) => match defs.get_name(def) {
                Some(name) => out.push_str(&name),
                None => out.push_str(&ty.to_string()),
            },
            Some(TypeData::Parameter(param)) => {
                let name = defs.get(param.owner).and_then(|info| {
                    info.type_params
                        .get(param.index as usize)
                        .map(|p| p.name.clone())
                });
                match name {
                    Some(name) => out.push_str(&name),
                    None => out.push_str(&ty.to_string()),
                }
            }
            Some(TypeData::Application(app)) => {
                match defs.get_name(app.definition) {
                    Some(name) => out.push_str(&name),
                    None => out.push_str(&ty.to_string()),
                }
                out.push('<');
                if depth == 0 && self.universe.definition_type(app.definition) == Some(ty) {
                    for _ in 1..app.args.len() {
                        out.push(',');
                    }
                } else {
                    for (i, arg) in app.args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write(*arg, depth + 1, out);
                    }
                }
                out.push('>');
            }
            None => out.push_str(&ty.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
