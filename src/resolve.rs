use crate::error::Error;
use crate::model::{Reference, ResourceKind};
use crate::registry::Registry;

/// Turns references into the expressions that will carry another module's
/// output once Terraform evaluates the plan. The resolver never knows the
/// value of that output; it only produces a syntactically correct deferred
/// address.
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Resolve `reference` to the expression addressing `output` on the
    /// eventual target resource.
    ///
    /// An unset reference is a caller bug, not resolvable. An external
    /// literal is returned unchanged without any registry lookup. A named
    /// reference must exist under `expected`, otherwise the name would turn
    /// into garbage in the artifact, so it fails here instead.
    pub fn resolve(
        &self,
        reference: &Reference,
        expected: ResourceKind,
        output: &str,
    ) -> Result<String, Error> {
        match reference {
            Reference::Unset => Err(Error::UnsetReference { kind: expected }),
            Reference::External(value) => Ok(value.clone()),
            Reference::Named(name) => {
                if !self.registry.exists(expected, name) {
                    return Err(Error::DanglingReference {
                        kind: expected,
                        name: name.clone(),
                    });
                }
                Ok(format!("${{module.{}.{}}}", sanitize_name(name), output))
            }
        }
    }
}

/// Resource names become Terraform identifiers: lowercased, hyphens and
/// spaces folded to underscores.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
