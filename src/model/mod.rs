//! Document model types.
//!
//! This module defines the intermediate representation that bridges
//! format-specific parsers and renderers. A [`DocumentModel`] carries two
//! synchronized layers: the semantic layer (blocks, structure, semantics,
//! assets) and the styled `markup_layer` string.

mod block;
mod builder;
mod diagnostic;
mod document;
mod resource;
mod structure;
mod table;

pub use block::{Block, BlockKind};
pub use builder::DocumentBuilder;
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use document::{DocumentModel, MetaValue, Metadata, VersionEntry};
pub use resource::{is_remote_locator, ResourceKind, ResourceRecord};
pub use structure::{SectionInfo, Semantics, StructureItem, StructureType};
pub use table::{is_separator_row, is_table_row, split_cells, Alignment, Table, TableRow};
