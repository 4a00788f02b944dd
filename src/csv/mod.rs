//! Delimited record files (CSV and TSV)
//!
//! Each line is one record. Values in localizable columns are extracted as
//! resources keyed by their whitespace-normalized text, and localized files
//! are written with those values replaced by their translations.
//!
//! ```ignore
//! let file_type = CsvFileType::new(&project)?;
//! let mut file = file_type.new_file("data/products.csv")?;
//! file.extract();
//! file.localize(&translations, project.locales(), &mut new_resources)?;
//! ```

pub mod file;
pub mod table;
pub mod tokenizer;

pub use file::{CsvFile, CsvFileType};
pub use table::{Column, Record, Table};
pub use tokenizer::{FieldSplitter, quote_field};
