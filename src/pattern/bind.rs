//! Bind links: a query pattern together with what to build from each match.
//!
//! The stored form is
//!
//! ```text
//! BindLink
//!     <declarations>
//!     ImplicationLink
//!         <body>
//!         <implicand>
//! ```
//!
//! where the declarations are a `VariableNode`, a
//! `TypedVariableLink(VariableNode, TypeNode | TypeChoice(TypeNode...))` or a
//! `VariableList` of those, and the body is an `AndLink` of clauses or a
//! single clause. A clause wrapped in `NotLink` must have no grounding.

use std::collections::HashMap;

use crate::atom::{Atom, AtomStore, AtomType, Handle};
use crate::error::ImplyError;
use crate::query::ImplyResult;

use super::{Template, Variable};

/// Per-variable type restrictions: a grounding's type must inherit one of them.
pub type TypeMap = HashMap<Variable, Vec<AtomType>>;

/// A parsed query.
#[derive(Debug, Clone)]
pub struct BindPattern {
    /// Declared variables, in declaration order.
    pub variables: Vec<Variable>,
    pub typemap: TypeMap,
    /// Clauses that must all be grounded.
    pub clauses: Vec<Template>,
    /// Clauses that must have no grounding.
    pub absent: Vec<Template>,
    /// Shape instantiated for each grounding.
    pub implicand: Template,
}

impl BindPattern {
    /// A pattern over the given clauses, without type restrictions or absent clauses.
    pub fn new(variables: Vec<Variable>, clauses: Vec<Template>, implicand: Template) -> Self {
        Self {
            variables,
            typemap: TypeMap::new(),
            clauses,
            absent: Vec::new(),
            implicand,
        }
    }

    pub fn with_absent(mut self, clause: Template) -> Self {
        self.absent.push(clause);
        self
    }

    pub fn with_type(mut self, variable: &Variable, types: Vec<AtomType>) -> Self {
        self.typemap.insert(variable.clone(), types);
        self
    }

    /// Parse a stored `BindLink`.
    pub fn from_bind_link(store: &dyn AtomStore, handle: Handle) -> ImplyResult<Self> {
        let malformed = |reason: &str| ImplyError::MalformedBindLink {
            handle: handle.get(),
            reason: reason.to_string(),
        };

        let Atom::Link {
            atom_type: AtomType::BindLink,
            outgoing,
        } = store.get_atom(handle)?
        else {
            return Err(malformed("not a BindLink"));
        };
        let [decls, rewrite] = outgoing[..] else {
            return Err(malformed("expected declarations and an ImplicationLink"));
        };

        let mut parser = DeclParser {
            store,
            handle,
            vars: HashMap::new(),
            variables: Vec::new(),
            typemap: TypeMap::new(),
        };
        parser.declarations(decls)?;

        let Atom::Link {
            atom_type: AtomType::ImplicationLink,
            outgoing: rewrite,
        } = store.get_atom(rewrite)?
        else {
            return Err(malformed("second element must be an ImplicationLink"));
        };
        let [body, implicand] = rewrite[..] else {
            return Err(malformed("ImplicationLink must hold a body and an implicand"));
        };

        let clause_handles = match store.get_atom(body)? {
            Atom::Link {
                atom_type: AtomType::AndLink,
                outgoing,
            } => outgoing,
            _ => vec![body],
        };

        let mut clauses = Vec::new();
        let mut absent = Vec::new();
        for clause in clause_handles {
            match store.get_atom(clause)? {
                Atom::Link {
                    atom_type: AtomType::NotLink,
                    outgoing,
                } => {
                    let [negated] = outgoing[..] else {
                        return Err(malformed("NotLink must wrap exactly one clause"));
                    };
                    absent.push(parser.template(negated)?);
                }
                _ => clauses.push(parser.template(clause)?),
            }
        }
        if clauses.is_empty() && absent.is_empty() {
            return Err(malformed("body has no clauses"));
        }

        let implicand = parser.template(implicand)?;
        tracing::debug!(
            %handle,
            variables = parser.variables.len(),
            clauses = clauses.len(),
            absent = absent.len(),
            "parsed bind link"
        );
        Ok(Self {
            variables: parser.variables,
            typemap: parser.typemap,
            clauses,
            absent,
            implicand,
        })
    }
}

struct DeclParser<'a> {
    store: &'a dyn AtomStore,
    handle: Handle,
    /// `VariableNode` handle → its variable.
    vars: HashMap<Handle, Variable>,
    variables: Vec<Variable>,
    typemap: TypeMap,
}

impl DeclParser<'_> {
    fn malformed(&self, reason: String) -> ImplyError {
        ImplyError::MalformedBindLink {
            handle: self.handle.get(),
            reason,
        }
    }

    fn declarations(&mut self, decls: Handle) -> ImplyResult<()> {
        match self.store.get_atom(decls)? {
            Atom::Link {
                atom_type: AtomType::VariableList,
                outgoing,
            } => {
                for decl in outgoing {
                    self.declaration(decl)?;
                }
                Ok(())
            }
            _ => self.declaration(decls),
        }
    }

    fn declaration(&mut self, decl: Handle) -> ImplyResult<()> {
        match self.store.get_atom(decl)? {
            Atom::Node {
                atom_type: AtomType::VariableNode,
                name,
            } => {
                self.declare(decl, &name);
                Ok(())
            }
            Atom::Link {
                atom_type: AtomType::TypedVariableLink,
                outgoing,
            } => {
                let [var, spec] = outgoing[..] else {
                    return Err(self.malformed("TypedVariableLink needs a variable and a type".into()));
                };
                let Atom::Node {
                    atom_type: AtomType::VariableNode,
                    name,
                } = self.store.get_atom(var)?
                else {
                    return Err(self.malformed(format!("{var} is not a VariableNode")));
                };
                let types = self.type_spec(spec)?;
                let variable = self.declare(var, &name);
                self.typemap.insert(variable, types);
                Ok(())
            }
            other => Err(self.malformed(format!(
                "unexpected {} in variable declarations",
                other.atom_type()
            ))),
        }
    }

    fn declare(&mut self, node: Handle, name: &str) -> Variable {
        if let Some(existing) = self.vars.get(&node) {
            return existing.clone();
        }
        let variable = Variable::named(name);
        self.vars.insert(node, variable.clone());
        self.variables.push(variable.clone());
        variable
    }

    fn type_spec(&self, spec: Handle) -> ImplyResult<Vec<AtomType>> {
        match self.store.get_type(spec)? {
            AtomType::TypeNode => {
                let name = self.store.get_name(spec)?.unwrap_or_default();
                let atom_type = AtomType::from_name(&name).ok_or(ImplyError::UnknownType { name })?;
                Ok(vec![atom_type])
            }
            AtomType::TypeChoice => {
                let mut types = Vec::new();
                for choice in self.store.get_outgoing(spec)? {
                    types.append(&mut self.type_spec(choice)?);
                }
                Ok(types)
            }
            other => Err(self.malformed(format!(
                "expected a TypeNode or TypeChoice, found {other}"
            ))),
        }
    }

    /// Template of a stored clause: declared variables become `Var`, subtrees
    /// without declared variables stay concrete atoms.
    fn template(&self, handle: Handle) -> ImplyResult<Template> {
        if let Some(variable) = self.vars.get(&handle) {
            return Ok(Template::Var(variable.clone()));
        }
        let Atom::Link {
            atom_type,
            outgoing,
        } = self.store.get_atom(handle)?
        else {
            return Ok(Template::Atom(handle));
        };
        let children = outgoing
            .into_iter()
            .map(|h| self.template(h))
            .collect::<ImplyResult<Vec<_>>>()?;
        if children.iter().all(|t| matches!(t, Template::Atom(_))) {
            Ok(Template::Atom(handle))
        } else {
            Ok(Template::link(atom_type, children))
        }
    }
}
