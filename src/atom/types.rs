//! The atom type hierarchy.
//!
//! Every atom carries an [`AtomType`]. Types form a single-inheritance tree
//! rooted at `Atom`; subsumption queries (`inherits`) walk the parent chain,
//! the same transitive generalization lookup the predicate hierarchy does for
//! relations.

use serde::{Deserialize, Serialize};

/// Type tag of a node or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AtomType {
    Atom,

    // Nodes
    Node,
    ConceptNode,
    PredicateNode,
    VariableNode,
    TypeNode,
    NumberNode,

    // Links
    Link,
    OrderedLink,
    UnorderedLink,
    ListLink,
    InheritanceLink,
    SubsetLink,
    IntensionalInheritanceLink,
    ImplicationLink,
    EvaluationLink,
    MemberLink,
    ExecutionLink,
    ContextLink,
    NotLink,
    BindLink,
    VariableList,
    TypedVariableLink,
    SetLink,
    AndLink,
    OrLink,
    SimilarityLink,
    TypeChoice,
}

impl AtomType {
    /// Every atom type, in declaration order.
    pub const ALL: [AtomType; 28] = [
        AtomType::Atom,
        AtomType::Node,
        AtomType::ConceptNode,
        AtomType::PredicateNode,
        AtomType::VariableNode,
        AtomType::TypeNode,
        AtomType::NumberNode,
        AtomType::Link,
        AtomType::OrderedLink,
        AtomType::UnorderedLink,
        AtomType::ListLink,
        AtomType::InheritanceLink,
        AtomType::SubsetLink,
        AtomType::IntensionalInheritanceLink,
        AtomType::ImplicationLink,
        AtomType::EvaluationLink,
        AtomType::MemberLink,
        AtomType::ExecutionLink,
        AtomType::ContextLink,
        AtomType::NotLink,
        AtomType::BindLink,
        AtomType::VariableList,
        AtomType::TypedVariableLink,
        AtomType::SetLink,
        AtomType::AndLink,
        AtomType::OrLink,
        AtomType::SimilarityLink,
        AtomType::TypeChoice,
    ];

    /// Direct supertype, `None` for the root.
    pub fn parent(self) -> Option<AtomType> {
        use AtomType::*;
        match self {
            Atom => None,
            Node | Link => Some(Atom),
            ConceptNode | PredicateNode | VariableNode | TypeNode | NumberNode => Some(Node),
            OrderedLink | UnorderedLink => Some(Link),
            ListLink | InheritanceLink | ImplicationLink | EvaluationLink | MemberLink
            | ExecutionLink | ContextLink | NotLink | BindLink | VariableList
            | TypedVariableLink => Some(OrderedLink),
            SubsetLink | IntensionalInheritanceLink => Some(InheritanceLink),
            SetLink | AndLink | OrLink | SimilarityLink | TypeChoice => Some(UnorderedLink),
        }
    }

    /// Whether `self` is `other` or a (transitive) subtype of it.
    pub fn inherits(self, other: AtomType) -> bool {
        let mut current = Some(self);
        while let Some(t) = current {
            if t == other {
                return true;
            }
            current = t.parent();
        }
        false
    }

    pub fn is_node(self) -> bool {
        self.inherits(AtomType::Node)
    }

    pub fn is_link(self) -> bool {
        self.inherits(AtomType::Link)
    }

    /// Unordered links are deduplicated on their sorted outgoing set.
    pub fn is_unordered(self) -> bool {
        self.inherits(AtomType::UnorderedLink)
    }

    pub fn name(self) -> &'static str {
        use AtomType::*;
        match self {
            Atom => "Atom",
            Node => "Node",
            ConceptNode => "ConceptNode",
            PredicateNode => "PredicateNode",
            VariableNode => "VariableNode",
            TypeNode => "TypeNode",
            NumberNode => "NumberNode",
            Link => "Link",
            OrderedLink => "OrderedLink",
            UnorderedLink => "UnorderedLink",
            ListLink => "ListLink",
            InheritanceLink => "InheritanceLink",
            SubsetLink => "SubsetLink",
            IntensionalInheritanceLink => "IntensionalInheritanceLink",
            ImplicationLink => "ImplicationLink",
            EvaluationLink => "EvaluationLink",
            MemberLink => "MemberLink",
            ExecutionLink => "ExecutionLink",
            ContextLink => "ContextLink",
            NotLink => "NotLink",
            BindLink => "BindLink",
            VariableList => "VariableList",
            TypedVariableLink => "TypedVariableLink",
            SetLink => "SetLink",
            AndLink => "AndLink",
            OrLink => "OrLink",
            SimilarityLink => "SimilarityLink",
            TypeChoice => "TypeChoice",
        }
    }

    /// Look a type up by its CamelCase name (as written in a `TypeNode`).
    pub fn from_name(name: &str) -> Option<AtomType> {
        AtomType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
