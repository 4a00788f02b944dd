use std::fs;
use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, warn};

use super::table::{Column, Record, Table};
use super::tokenizer::{FieldSplitter, quote_field};
use crate::error::{LoctoolError, Result};
use crate::localizer::LookupRequest;
use crate::path_template::{MappingResolver, PathResolver, has_variant};
use crate::project::Project;
use crate::resource::{DATATYPE_CSV, ResourceString};
use crate::settings::{ColumnSpec, DEFAULT_CSV_TEMPLATE};
use crate::translation_set::{TranslationSet, TranslationStore};
use crate::utils::{normalize_whitespace, write_file};

const DEFAULT_ROW_PATTERN: &str = r"[\n\r\f]+";
const DEFAULT_ROW_SEPARATOR: &str = "\n";

/// A delimited file (CSV, TSV) whose localizable columns are extracted for
/// translation.
///
/// Rows are split on the row separator pattern before fields are tokenized, so
/// quoted values cannot span lines.
pub struct CsvFile<'p> {
    project: &'p Project,
    resolver: &'p dyn PathResolver,
    path_name: String,
    splitter: FieldSplitter,
    row_pattern: Regex,
    row_separator: String,
    header: bool,
    configured_columns: Option<Vec<ColumnSpec>>,
    table: Table,
    set: TranslationSet,
}

impl<'p> CsvFile<'p> {
    pub fn new(project: &'p Project, resolver: &'p dyn PathResolver, path_name: impl Into<String>) -> Result<Self> {
        let settings = &project.settings().csv;
        let pattern = match (&settings.row_separator_regex, &settings.row_separator) {
            (Some(pattern), _) => pattern.clone(),
            (None, Some(separator)) => regex::escape(separator),
            (None, None) => DEFAULT_ROW_PATTERN.to_string(),
        };
        let row_pattern = Regex::new(&pattern).map_err(|source| LoctoolError::RowSeparator {
            pattern: pattern.clone(),
            source,
        })?;

        Ok(CsvFile {
            project,
            resolver,
            path_name: path_name.into(),
            splitter: FieldSplitter::new(settings.column_separator),
            row_pattern,
            row_separator: settings
                .row_separator
                .clone()
                .unwrap_or_else(|| DEFAULT_ROW_SEPARATOR.to_string()),
            header: settings.header,
            configured_columns: settings.columns.clone(),
            table: Table::default().with_key(settings.key.clone()),
            set: TranslationSet::new(),
        })
    }

    pub fn with_column_separator(mut self, separator: char) -> Self {
        self.splitter = FieldSplitter::new(separator);
        self
    }

    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Resources extracted from this file
    pub fn get_translation_set(&self) -> &TranslationSet {
        &self.set
    }

    fn columns_for(&self, first_line: Option<&str>) -> Vec<Column> {
        match (&self.configured_columns, first_line) {
            (Some(specs), _) => specs
                .iter()
                .map(|spec| Column::new(&spec.name, spec.localizable))
                .collect(),
            (None, Some(line)) if self.header => self
                .splitter
                .split(line)
                .into_iter()
                .map(|name| Column::new(name, true))
                .collect(),
            // no names anywhere: number the columns of the first row
            (None, Some(line)) => (0..self.splitter.split(line).len())
                .map(|position| Column::new(position.to_string(), true))
                .collect(),
            (None, None) => Vec::new(),
        }
    }

    /// Parse the text of a delimited file. Every non-empty value in a localizable
    /// column becomes a resource keyed by its whitespace-normalized text.
    pub fn parse(&mut self, data: &str) {
        let mut lines = self
            .row_pattern
            .split(data)
            .filter(|line| !line.trim().is_empty())
            .peekable();

        let columns = self.columns_for(lines.peek().copied());
        if self.header {
            lines.next();
        }

        let mut table = Table::new(columns).with_key(self.table.key_column().map(str::to_string));
        for line in lines {
            let record = Record::from_values(table.columns(), self.splitter.split(line));
            table.push(record);
        }
        self.table = table;

        let mut index = 0;
        for record in self.table.records() {
            for column in self.table.columns().iter().filter(|column| column.localizable) {
                let value = record.get(&column.name).unwrap_or_default();
                let key = normalize_whitespace(value);
                if key.is_empty() {
                    continue;
                }
                let resource = ResourceString::new(
                    self.project.id(),
                    key,
                    value,
                    self.project.source_locale(),
                    DATATYPE_CSV,
                )
                .with_path(&self.path_name)
                .with_index(index)
                .with_state("new");
                self.set.add(resource);
                index += 1;
            }
        }
        debug!(
            "Parsed {} records ({} strings) from {}",
            self.table.records().len(),
            self.set.size(),
            self.path_name
        );
    }

    /// Read and parse the file from the project root. A missing file is not an
    /// error; it simply yields no records.
    pub fn extract(&mut self) {
        let path = self.project.source_path(&self.path_name);
        match fs::read_to_string(&path) {
            Ok(data) => self.parse(&data),
            Err(err) => warn!("Could not read file {}: {}", path.display(), err),
        }
    }

    fn serialize_with(&self, mut value_for: impl FnMut(&Column, &str) -> String) -> String {
        let separator = self.splitter.separator();
        let glue = separator.to_string();
        let join = |values: Vec<String>| values.join(glue.as_str());

        let rows: Vec<String> = self
            .table
            .records()
            .iter()
            .map(|record| {
                let values = self
                    .table
                    .columns()
                    .iter()
                    .map(|column| {
                        let value = value_for(column, record.get(&column.name).unwrap_or_default());
                        quote_field(&value, separator)
                    })
                    .collect();
                join(values)
            })
            .collect();
        let body = rows.join(&self.row_separator);

        if !self.header {
            return body;
        }
        let names = self
            .table
            .columns()
            .iter()
            .map(|column| quote_field(&column.name, separator))
            .collect();
        format!("{}{}{}", join(names), self.row_separator, body)
    }

    /// The table as it is, without translation
    pub fn write(&self) -> String {
        self.serialize_with(|_, value| value.to_string())
    }

    /// The table with every localizable value replaced by its translation into `locale`
    pub fn localize_text(
        &self,
        translations: &dyn TranslationStore,
        locale: &str,
        new_resources: &mut dyn TranslationStore,
    ) -> String {
        let localizer = self.project.localizer();
        self.serialize_with(|column, value| {
            let key = normalize_whitespace(value);
            if !column.localizable || key.is_empty() {
                return value.to_string();
            }
            localizer
                .lookup(
                    &LookupRequest {
                        key: &key,
                        source: value,
                        locale,
                        datatype: DATATYPE_CSV,
                        path_name: Some(&self.path_name),
                        comment: None,
                    },
                    translations,
                    &mut *new_resources,
                )
                .text
        })
    }

    /// Merge the records of `other` into this file's table
    pub fn merge(&mut self, other: &CsvFile<'_>) {
        self.table.merge(&other.table);
    }

    /// Project-relative path of the localized file for `locale`
    pub fn get_localized_path(&self, locale: &str) -> String {
        self.resolver.localized_path(&self.path_name, locale)
    }

    /// Write a localized file for every target locale. The source locale and
    /// locales with a variant subtag are skipped.
    pub fn localize(
        &self,
        translations: &dyn TranslationStore,
        locales: &[String],
        new_resources: &mut dyn TranslationStore,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for locale in locales {
            if locale == self.project.source_locale() || has_variant(locale) {
                debug!("Skipping locale {} for {}", locale, self.path_name);
                continue;
            }
            let text = self.localize_text(translations, locale, new_resources);
            let path = self.project.target_path(&self.get_localized_path(locale));
            write_file(&path, &text)?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Recognizes delimited files and creates [`CsvFile`]s for them
pub struct CsvFileType<'p> {
    project: &'p Project,
    resolver: MappingResolver,
}

impl<'p> CsvFileType<'p> {
    pub fn new(project: &'p Project) -> Result<Self> {
        let resolver = MappingResolver::new(&project.settings().csv.mappings, DEFAULT_CSV_TEMPLATE)?;
        Ok(CsvFileType { project, resolver })
    }

    pub fn datatype(&self) -> &'static str {
        DATATYPE_CSV
    }

    /// A `.csv` or `.tsv` file that matches one of the configured mappings
    pub fn handles(&self, path_name: &str) -> bool {
        (path_name.ends_with(".csv") || path_name.ends_with(".tsv"))
            && (self.resolver.is_empty() || self.resolver.mapping_for(path_name).is_some())
    }

    /// Create a file; `.tsv` files are tab separated unless another separator
    /// than the default comma is configured
    pub fn new_file(&self, path_name: impl Into<String>) -> Result<CsvFile<'_>> {
        let path_name = path_name.into();
        let tab_separated = path_name.ends_with(".tsv") && self.project.settings().csv.column_separator == ',';
        let file = CsvFile::new(self.project, &self.resolver, path_name)?;
        Ok(if tab_separated {
            file.with_column_separator('\t')
        } else {
            file
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProjectSettings;
    use pretty_assertions::assert_eq;

    fn project_with(configure: impl FnOnce(&mut ProjectSettings)) -> Project {
        let mut settings = ProjectSettings {
            id: "webapp".to_string(),
            locales: vec!["de-DE".to_string()],
            ..ProjectSettings::default()
        };
        configure(&mut settings);
        Project::new(settings).unwrap()
    }

    fn resolver() -> MappingResolver {
        MappingResolver::new(&[], DEFAULT_CSV_TEMPLATE).unwrap()
    }

    #[test]
    fn test_parse_with_header() {
        let project = project_with(|_| {});
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "data/fruit.csv").unwrap();
        file.parse("id,name,description\n\n1,Apple,\"A red, round   fruit\"\r\n2,Pear\n");

        let names: Vec<&str> = file.table().columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "description"]);
        assert_eq!(file.table().records().len(), 2);
        assert_eq!(file.table().records()[1].get("description"), Some(""));

        let set = file.get_translation_set();
        let all: Vec<(&str, &str, usize)> = set
            .get_all()
            .iter()
            .map(|r| (r.key.as_str(), r.source.as_str(), r.index))
            .collect();
        assert_eq!(
            all,
            vec![
                ("1", "1", 0),
                ("Apple", "Apple", 1),
                ("A red, round fruit", "A red, round   fruit", 2),
                ("2", "2", 3),
                ("Pear", "Pear", 4),
            ]
        );
        assert_eq!(set.get_all()[1].datatype, "x-csv");
        assert_eq!(set.get_all()[1].path_name.as_deref(), Some("data/fruit.csv"));
    }

    #[test]
    fn test_configured_columns() {
        let project = project_with(|settings| {
            settings.csv.columns = Some(vec![
                ColumnSpec { name: "id".to_string(), localizable: false },
                ColumnSpec { name: "text".to_string(), localizable: true },
            ]);
        });
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "a.csv").unwrap();
        file.parse("id,text\n1,Hello\n2,World\n");

        let keys: Vec<&str> = file.get_translation_set().get_all().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Hello", "World"]);
    }

    #[test]
    fn test_no_header() {
        let project = project_with(|settings| settings.csv.header = false);
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "a.csv").unwrap();
        file.parse("Hello,World\nFoo\n");

        let names: Vec<&str> = file.table().columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["0", "1"]);
        assert_eq!(file.table().records().len(), 2);
        assert_eq!(file.write(), "Hello,World\nFoo,");
    }

    #[test]
    fn test_write_round_trip() {
        let project = project_with(|_| {});
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "a.csv").unwrap();
        file.parse("id,name,description\n1,\"a,b\",c\n");
        assert_eq!(file.write(), "id,name,description\n1,\"a,b\",c");
    }

    #[test]
    fn test_tab_separated() {
        let project = project_with(|_| {});
        let file_type = CsvFileType::new(&project).unwrap();
        let mut file = file_type.new_file("res/strings.tsv").unwrap();
        file.parse("id\tname\tcomment\n32342\tquoted name with, comma\t\n");
        assert_eq!(file.table().records()[0].get("name"), Some("quoted name with, comma"));
        assert_eq!(file.write(), "id\tname\tcomment\n32342\tquoted name with, comma\t");
    }

    #[test]
    fn test_custom_row_separator() {
        let project = project_with(|settings| settings.csv.row_separator = Some(";;".to_string()));
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "a.csv").unwrap();
        file.parse("id,name;;1,One;;2,Two");
        assert_eq!(file.table().records().len(), 2);
        assert_eq!(file.write(), "id,name;;1,One;;2,Two");
    }

    #[test]
    fn test_invalid_row_separator_regex() {
        let project = project_with(|settings| settings.csv.row_separator_regex = Some("[".to_string()));
        let resolver = resolver();
        let err = CsvFile::new(&project, &resolver, "a.csv").err().unwrap();
        assert!(matches!(err, LoctoolError::RowSeparator { .. }));
    }

    #[test]
    fn test_localize_text() {
        let project = project_with(|settings| {
            settings.csv.columns = Some(vec![
                ColumnSpec { name: "id".to_string(), localizable: false },
                ColumnSpec { name: "name".to_string(), localizable: true },
                ColumnSpec { name: "description".to_string(), localizable: true },
            ]);
        });
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "a.csv").unwrap();
        file.parse("id,name,description\n1,Apple,\"A red   fruit\"\n2,Pear,Green\n");

        let mut translations = TranslationSet::new();
        translations.add(
            ResourceString::new("webapp", "Apple", "Apple", "en-US", DATATYPE_CSV).with_target("Apfel", "de-DE"),
        );
        translations.add(
            ResourceString::new("webapp", "A red fruit", "A red fruit", "en-US", DATATYPE_CSV)
                .with_target("Eine rote, runde Frucht", "de-DE"),
        );

        let mut new_resources = TranslationSet::new();
        let text = file.localize_text(&translations, "de-DE", &mut new_resources);
        assert_eq!(
            text,
            "id,name,description\n1,Apfel,\"Eine rote, runde Frucht\"\n2,Pear,Green"
        );
        let missing: Vec<&str> = new_resources.get_all().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(missing, vec!["Pear", "Green"]);
    }

    #[test]
    fn test_merge_files() {
        let project = project_with(|_| {});
        let resolver = resolver();
        let mut base = CsvFile::new(&project, &resolver, "a.csv").unwrap();
        base.parse("id,name\n1,Apple\n2,Pear\n");
        let mut other = CsvFile::new(&project, &resolver, "b.csv").unwrap();
        other.parse("id,name,color\n2,,green\n3,Plum,purple\n");

        base.merge(&other);
        assert_eq!(base.write(), "id,name,color\n1,Apple,\n2,Pear,green\n3,Plum,purple");
    }

    #[test]
    fn test_extract_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_with(|settings| settings.root = dir.path().to_path_buf());
        let resolver = resolver();
        let mut file = CsvFile::new(&project, &resolver, "missing.csv").unwrap();
        file.extract();
        assert!(file.table().records().is_empty());
        assert!(file.get_translation_set().is_empty());
    }

    #[test]
    fn test_localize_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_with(|settings| {
            settings.root = dir.path().to_path_buf();
            settings.target = dir.path().to_path_buf();
            settings.locales = vec!["de-DE".to_string(), "fr-FR".to_string()];
        });
        std::fs::write(dir.path().join("strings.csv"), "id,text\n1,Hello\n").unwrap();

        let file_type = CsvFileType::new(&project).unwrap();
        assert!(file_type.handles("strings.csv"));
        let mut file = file_type.new_file("strings.csv").unwrap();
        file.extract();
        let mut new_resources = TranslationSet::new();
        let written = file
            .localize(&TranslationSet::new(), project.locales(), &mut new_resources)
            .unwrap();

        assert_eq!(
            written,
            vec![dir.path().join("strings_de-DE.csv"), dir.path().join("strings_fr-FR.csv")]
        );
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "id,text\n1,Hello");
        assert_eq!(new_resources.size(), 4);
    }
}
