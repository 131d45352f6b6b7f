//! Catalog types and the subject-domain hierarchy.

pub mod domain;
pub mod hierarchy;

pub use domain::{Book, BookFormat, BookId, DomainId, Edition, EditionId, SubjectDomain};
pub use hierarchy::{DomainHierarchy, HierarchyError, TaggingViolation};
