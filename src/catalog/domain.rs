use serde::{Deserialize, Serialize};

/// Identifier wrapper for subject domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DomainId(pub u32);

/// Identifier wrapper for books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(pub u32);

/// Identifier wrapper for editions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EditionId(pub u32);

/// One node of the subject forest. The parent link is fixed once the node is
/// created; re-parenting is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDomain {
    pub id: DomainId,
    pub name: String,
    pub parent: Option<DomainId>,
}

impl SubjectDomain {
    pub fn root(id: DomainId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent: None,
        }
    }

    pub fn child_of(id: DomainId, name: &str, parent: DomainId) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent: Some(parent),
        }
    }
}

/// Physical format of an edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookFormat {
    Hardcover,
    Paperback,
}

/// A catalogued title. Domain tags participate in the lending diversity and
/// frequency rules; a title never carries both a domain and one of that
/// domain's ancestors or descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<String>,
    pub domains: Vec<DomainId>,
}

/// A printing of a book together with its shelf stock. `copies_for_borrowing`
/// moves with every checkout and return; `initial_stock` is fixed at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub id: EditionId,
    pub book_id: BookId,
    pub publishing_house: String,
    pub year: u16,
    pub pages: u16,
    pub edition_number: u8,
    pub format: BookFormat,
    pub copies_for_borrowing: u32,
    pub copies_for_reading: u32,
    initial_stock: u32,
}

impl Edition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EditionId,
        book_id: BookId,
        publishing_house: &str,
        year: u16,
        pages: u16,
        edition_number: u8,
        format: BookFormat,
        copies_for_borrowing: u32,
        copies_for_reading: u32,
    ) -> Self {
        Self {
            id,
            book_id,
            publishing_house: publishing_house.to_string(),
            year,
            pages,
            edition_number,
            format,
            copies_for_borrowing,
            copies_for_reading,
            initial_stock: copies_for_borrowing + copies_for_reading,
        }
    }

    /// Total copies acquired at intake, across borrowing and reading-room use.
    pub fn initial_stock(&self) -> u32 {
        self.initial_stock
    }
}
