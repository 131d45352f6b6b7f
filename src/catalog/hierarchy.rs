//! Ascendant/descendant resolution over the parent-linked subject forest.
//!
//! The forest is loaded into an arena keyed by id, and a parent→children
//! index is built once per batch of queries, so descendant lookups walk the
//! index instead of re-scanning every node's ancestor chain.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use super::domain::{Book, DomainId, SubjectDomain};

/// Data-integrity faults in the subject forest. These abort the operation
/// that hit them; they are never user-facing policy outcomes.
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("domain {0:?} is not part of the forest")]
    UnknownDomain(DomainId),
    #[error("domain {0:?} is registered twice")]
    DuplicateDomain(DomainId),
    #[error("domain {child:?} references missing parent {parent:?}")]
    UnknownParent { child: DomainId, parent: DomainId },
    #[error("domain {0:?} participates in a parent cycle")]
    CycleDetected(DomainId),
}

/// Violations of the domain-tagging rules for a single book.
#[derive(Debug, Error)]
pub enum TaggingViolation {
    #[error("book is tagged with {found} domains, at most {allowed} allowed")]
    TooManyDomains { allowed: usize, found: usize },
    #[error("domains {first:?} and {second:?} are directly related")]
    RelatedDomains { first: DomainId, second: DomainId },
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Immutable snapshot of the subject forest with a derived children index.
#[derive(Debug, Clone)]
pub struct DomainHierarchy {
    nodes: HashMap<DomainId, SubjectDomain>,
    children: HashMap<DomainId, Vec<DomainId>>,
}

impl DomainHierarchy {
    /// Builds the arena and children index, rejecting duplicate ids, dangling
    /// parent links, and parent cycles up front so queries cannot loop.
    pub fn from_nodes(
        nodes: impl IntoIterator<Item = SubjectDomain>,
    ) -> Result<Self, HierarchyError> {
        let mut arena = HashMap::new();
        for node in nodes {
            if let Some(previous) = arena.insert(node.id, node) {
                return Err(HierarchyError::DuplicateDomain(previous.id));
            }
        }

        let mut children: HashMap<DomainId, Vec<DomainId>> = HashMap::new();
        for node in arena.values() {
            if let Some(parent) = node.parent {
                if !arena.contains_key(&parent) {
                    return Err(HierarchyError::UnknownParent {
                        child: node.id,
                        parent,
                    });
                }
                children.entry(parent).or_default().push(node.id);
            }
        }

        let hierarchy = Self {
            nodes: arena,
            children,
        };
        for id in hierarchy.nodes.keys() {
            hierarchy.ancestor_chain(*id)?;
        }
        Ok(hierarchy)
    }

    pub fn get(&self, id: DomainId) -> Option<&SubjectDomain> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node itself followed by every ancestor up to its root. The walk is
    /// capped at the forest size; exceeding the cap means a parent cycle.
    fn ancestor_chain(&self, id: DomainId) -> Result<Vec<DomainId>, HierarchyError> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if chain.len() > self.nodes.len() {
                return Err(HierarchyError::CycleDetected(id));
            }
            let node = self
                .nodes
                .get(&current)
                .ok_or(HierarchyError::UnknownDomain(current))?;
            chain.push(current);
            cursor = node.parent;
        }
        Ok(chain)
    }

    /// Every node whose ancestor chain reaches `target`, `target` included.
    pub fn descendants(&self, target: DomainId) -> Result<Vec<&SubjectDomain>, HierarchyError> {
        if !self.nodes.contains_key(&target) {
            return Err(HierarchyError::UnknownDomain(target));
        }

        let mut family = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([target]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let node = self
                .nodes
                .get(&current)
                .ok_or(HierarchyError::UnknownDomain(current))?;
            family.push(node);
            if let Some(child_ids) = self.children.get(&current) {
                queue.extend(child_ids.iter().copied());
            }
        }
        Ok(family)
    }

    /// Whether one domain is an ancestor of the other, in either direction.
    pub fn are_directly_related(
        &self,
        first: DomainId,
        second: DomainId,
    ) -> Result<bool, HierarchyError> {
        Ok(self.ancestor_chain(first)?.contains(&second)
            || self.ancestor_chain(second)?.contains(&first))
    }

    /// Checks a book's domain tags: at most `max_domains` tags, and no two
    /// tags in a direct ancestor-descendant relationship.
    pub fn validate_book_domains(
        &self,
        book: &Book,
        max_domains: usize,
    ) -> Result<(), TaggingViolation> {
        if book.domains.len() > max_domains {
            return Err(TaggingViolation::TooManyDomains {
                allowed: max_domains,
                found: book.domains.len(),
            });
        }

        for (index, &first) in book.domains.iter().enumerate() {
            for &second in &book.domains[index + 1..] {
                if self.are_directly_related(first, second)? {
                    return Err(TaggingViolation::RelatedDomains { first, second });
                }
            }
        }
        Ok(())
    }

    /// All books tagged with `target` or one of its descendants.
    pub fn books_in_family<'a>(
        &self,
        target: DomainId,
        books: &'a [Book],
    ) -> Result<Vec<&'a Book>, HierarchyError> {
        let family: HashSet<DomainId> = self
            .descendants(target)?
            .into_iter()
            .map(|node| node.id)
            .collect();

        Ok(books
            .iter()
            .filter(|book| book.domains.iter().any(|domain| family.contains(domain)))
            .collect())
    }
}
