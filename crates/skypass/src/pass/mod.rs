//! Boarding pass construction and export.

pub mod assembler;
pub mod document;
pub mod exporter;
pub mod locale;
pub mod packager;

pub use assembler::PassAssembler;
pub use document::{Barcode, BoardingPassFields, PassDocument, PassField, PassLocation};
pub use exporter::PassExporter;
pub use packager::{PackageRequest, PassPackager, PkPassPackager};
