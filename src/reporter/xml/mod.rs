use std::fs::{self, File};
use std::path::PathBuf;

use sxd_document::dom::{Document, Element};
use sxd_document::writer::format_document;
use sxd_document::{parser, Package};

use crate::mixin::{MixinResults, SourceLocation, Test};
use crate::reporter::{unit_test_filename, ExportError, Exporter, ImportError, Importer};
use crate::suite::{Suite, SuiteData, TestRecord};

pub const SUITE_FILE: &str = "suite.xml";

fn bool_attr(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

fn attr_string(element: Element<'_>, name: &str) -> String {
    element.attribute_value(name).unwrap_or("").to_owned()
}

fn child_element<'d>(parent: Element<'d>, name: &str) -> Option<Element<'d>> {
    parent
        .children()
        .into_iter()
        .filter_map(|child| child.element())
        .find(|element| element.name().local_part() == name)
}

fn child_elements<'d>(parent: Element<'d>, name: &str) -> Vec<Element<'d>> {
    parent
        .children()
        .into_iter()
        .filter_map(|child| child.element())
        .filter(|element| element.name().local_part() == name)
        .collect()
}

fn suite_attributes(element: Element<'_>, data: &SuiteData) {
    element.set_attribute_value("dateCreated", &data.date_created);
    element.set_attribute_value("dateLastRun", &data.date_last_run);
    element.set_attribute_value("name", &data.name);
    element.set_attribute_value("passing", bool_attr(data.passing));
    element.set_attribute_value("runIndex", &data.run_index.to_string());
    element.set_attribute_value("version", &data.version);
}

fn test_state_element<'d>(doc: &Document<'d>, record: &TestRecord) -> Element<'d> {
    let element = doc.create_element("testState");
    element.set_attribute_value("dateCreated", &record.date_created);
    element.set_attribute_value("dateLastRun", &record.date_last_run);
    element.set_attribute_value("name", &record.name);
    element.set_attribute_value("passing", bool_attr(record.passing));
    element
}

fn result_element<'d>(
    doc: &Document<'d>,
    status: &str,
    location: &SourceLocation,
    error: &str,
) -> Element<'d> {
    let element = doc.create_element("result");
    element.set_attribute_value("status", status);
    element.set_attribute_value("error", error);

    let loc = doc.create_element("location");
    loc.set_attribute_value("column", &location.column.to_string());
    loc.set_attribute_value("line", &location.line.to_string());
    loc.set_attribute_value("file", &location.file);
    element.append_child(loc);

    element
}

fn mixin_element<'d>(doc: &Document<'d>, name: &str, results: &MixinResults) -> Element<'d> {
    let element = doc.create_element(name);

    let stats = results.stats();
    let stats_element = doc.create_element("stats");
    stats_element.set_attribute_value("total", &stats.total.to_string());
    stats_element.set_attribute_value("success", &stats.success.to_string());
    stats_element.set_attribute_value("failure", &stats.failure.to_string());
    stats_element.set_attribute_value("exception", &stats.exception.to_string());
    element.append_child(stats_element);

    let list = doc.create_element("results");
    match results {
        MixinResults::Compare(compare) => {
            for outcome in compare.results() {
                list.append_child(result_element(
                    doc,
                    outcome.status.as_str(),
                    &outcome.location,
                    &outcome.error,
                ));
            }
        }
        MixinResults::Exception(exception) => {
            for outcome in exception.results() {
                list.append_child(result_element(
                    doc,
                    outcome.status_str(),
                    &outcome.location,
                    &outcome.error,
                ));
            }
        }
    }
    element.append_child(list);

    element
}

/// Serializes suite checkpoints and per-test results as XML documents. The
/// whole tree is assembled in memory and written in one pass, so the target
/// file is never touched before the document is complete.
pub struct XmlExporter {
    directory: PathBuf,
}

impl XmlExporter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        XmlExporter {
            directory: directory.into(),
        }
    }
}

impl Exporter for XmlExporter {
    const FORMAT: &'static str = "xml";

    fn write_suite(&self, suite: &Suite) -> Result<(), ExportError> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(ExportError::Directory)?;
        }

        let package = Package::new();
        let doc = package.as_document();

        let root = doc.create_element("suite");
        suite_attributes(root, suite.data());
        doc.root().append_child(root);

        let unit = doc.create_element("unitTests");
        for record in suite.unit_tests() {
            unit.append_child(test_state_element(&doc, record));
        }
        root.append_child(unit);

        let performance = doc.create_element("performanceTests");
        for record in suite.performance_tests() {
            performance.append_child(test_state_element(&doc, record));
        }
        root.append_child(performance);

        let path = self.directory.join(SUITE_FILE);
        debug!("Writing {} suite state to {}", Self::FORMAT, path.display());
        let mut file = File::create(&path).map_err(ExportError::File)?;
        format_document(&doc, &mut file).map_err(ExportError::Write)?;
        Ok(())
    }

    fn write_unit_test_file(
        &self,
        suite: &Suite,
        test: &Test,
        name: &str,
    ) -> Result<(), ExportError> {
        let test_directory = self.directory.join(name);
        if !test_directory.exists() {
            fs::create_dir_all(&test_directory).map_err(ExportError::Directory)?;
        }

        let package = Package::new();
        let doc = package.as_document();

        let root = doc.create_element("test");
        root.set_attribute_value("name", test.name());
        doc.root().append_child(root);

        for (mixin_name, results) in test.mixins() {
            root.append_child(mixin_element(&doc, mixin_name, results));
        }

        let path = test_directory.join(unit_test_filename(suite.data().run_index, "xml"));
        trace!("Writing unit test results to {}", path.display());
        let mut file = File::create(&path).map_err(ExportError::File)?;
        format_document(&doc, &mut file).map_err(ExportError::Write)?;
        Ok(())
    }

    fn supports_multithreading(&self) -> bool {
        true
    }
}

/// Restores suite metadata and unit-test summaries from a directory written
/// by [`XmlExporter`]. Attribute reads never fail; absent values fall back
/// to empty/zero/false.
pub struct XmlImporter {
    directory: PathBuf,
}

impl XmlImporter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        XmlImporter {
            directory: directory.into(),
        }
    }
}

impl Importer for XmlImporter {
    const FORMAT: &'static str = "xml";

    fn read_suite(&self, suite: &mut Suite) -> Result<bool, ImportError> {
        let path = self.directory.join(SUITE_FILE);
        if !path.exists() {
            debug!("No prior suite state at {}", path.display());
            return Ok(false);
        }

        let text = fs::read_to_string(&path).map_err(ImportError::File)?;
        let package =
            parser::parse(&text).map_err(|err| ImportError::Parse(err.to_string()))?;
        let doc = package.as_document();

        let root = doc
            .root()
            .children()
            .into_iter()
            .filter_map(|child| child.element())
            .find(|element| element.name().local_part() == "suite");

        if let Some(root) = root {
            let data = suite.data_mut();
            data.date_created = attr_string(root, "dateCreated");
            data.date_last_run = attr_string(root, "dateLastRun");
            data.name = attr_string(root, "name");
            data.passing = parse_bool(root.attribute_value("passing"));
            data.run_index = root
                .attribute_value("runIndex")
                .and_then(|value| value.parse().ok())
                .unwrap_or(0);
            data.version = attr_string(root, "version");

            if let Some(container) = child_element(root, "unitTests") {
                for state in child_elements(container, "testState") {
                    suite.unit_tests_mut().push(TestRecord {
                        date_created: attr_string(state, "dateCreated"),
                        date_last_run: attr_string(state, "dateLastRun"),
                        name: attr_string(state, "name"),
                        passing: parse_bool(state.attribute_value("passing")),
                    });
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {

    use std::fs;
    use std::sync::Arc;
    use std::thread;

    use sxd_document::parser;

    use super::*;
    use crate::mixin::{CompareResults, ExceptionResults, MixinResults, SourceLocation, Test};
    use crate::suite::{Suite, SuiteData, TestRecord};

    fn sample_suite() -> Suite {
        let mut suite = Suite::default();
        *suite.data_mut() = SuiteData {
            date_created: "2024-01-02 03:04:05".to_owned(),
            date_last_run: "2024-01-03 03:04:05".to_owned(),
            name: "integration".to_owned(),
            passing: true,
            run_index: 7,
            version: "0.1.0".to_owned(),
        };
        suite.unit_tests_mut().push(TestRecord {
            date_created: "2024-01-02 03:04:05".to_owned(),
            date_last_run: "2024-01-03 03:04:05".to_owned(),
            name: "parse_headers".to_owned(),
            passing: true,
        });
        suite.unit_tests_mut().push(TestRecord {
            date_created: "2024-01-02 03:05:05".to_owned(),
            date_last_run: String::new(),
            name: "reject_bad_input".to_owned(),
            passing: false,
        });
        suite.performance_tests_mut().push(TestRecord {
            date_created: "2024-01-02 03:06:05".to_owned(),
            date_last_run: String::new(),
            name: "throughput".to_owned(),
            passing: true,
        });
        suite
    }

    #[test]
    fn test_round_trip_restores_metadata_and_unit_tests() {
        let dir = tempfile::tempdir().unwrap();
        let suite = sample_suite();

        XmlExporter::new(dir.path()).write_suite(&suite).unwrap();

        let mut restored = Suite::default();
        let found = XmlImporter::new(dir.path()).read_suite(&mut restored).unwrap();

        assert!(found);
        assert_eq!(restored.data(), suite.data());
        assert_eq!(restored.unit_tests(), suite.unit_tests());
        // Performance-test summaries are written but not restored.
        assert!(restored.performance_tests().is_empty());
    }

    #[test]
    fn test_read_suite_returns_false_without_suite_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut suite = Suite::default();

        let found = XmlImporter::new(dir.path()).read_suite(&mut suite).unwrap();

        assert!(!found);
        assert_eq!(suite.data(), Suite::default().data());
        assert!(suite.unit_tests().is_empty());
    }

    #[test]
    fn test_writing_twice_produces_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let suite = sample_suite();
        let exporter = XmlExporter::new(dir.path());

        exporter.write_suite(&suite).unwrap();
        let first = fs::read(dir.path().join(SUITE_FILE)).unwrap();
        exporter.write_suite(&suite).unwrap();
        let second = fs::read(dir.path().join(SUITE_FILE)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("results");
        let exporter = XmlExporter::new(&root);
        let suite = sample_suite();

        exporter.write_suite(&suite).unwrap();
        exporter
            .write_unit_test_file(&suite, &Test::new("parse_headers"), "parse_headers")
            .unwrap();

        assert!(root.join(SUITE_FILE).exists());
        assert!(root
            .join("parse_headers")
            .join("unit_00000007.xml")
            .exists());
    }

    #[test]
    fn test_missing_attributes_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SUITE_FILE),
            r#"<suite name="partial"><unitTests><testState name="only"/></unitTests></suite>"#,
        )
        .unwrap();

        let mut suite = Suite::default();
        let found = XmlImporter::new(dir.path()).read_suite(&mut suite).unwrap();

        assert!(found);
        assert_eq!(suite.data().name, "partial");
        assert_eq!(suite.data().run_index, 0);
        assert!(!suite.data().passing);
        assert!(suite.data().version.is_empty());
        assert_eq!(suite.unit_tests().len(), 1);
        assert_eq!(suite.unit_tests()[0].name, "only");
        assert!(!suite.unit_tests()[0].passing);
    }

    #[test]
    fn test_unparseable_suite_file_is_an_import_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SUITE_FILE), "<suite").unwrap();

        let mut suite = Suite::default();
        let result = XmlImporter::new(dir.path()).read_suite(&mut suite);

        assert!(result.is_err());
    }

    #[test]
    fn test_compare_outcome_serializes_status_location_and_error() {
        let dir = tempfile::tempdir().unwrap();
        let suite = sample_suite();

        let mut compare = CompareResults::new();
        compare.record_exception(SourceLocation::new("checks.rs", 42, 9), "divide by zero");
        let mut test = Test::new("parse_headers");
        test.attach("compare", MixinResults::Compare(compare));

        XmlExporter::new(dir.path())
            .write_unit_test_file(&suite, &test, "parse_headers")
            .unwrap();

        let text = fs::read_to_string(
            dir.path()
                .join("parse_headers")
                .join("unit_00000007.xml"),
        )
        .unwrap();
        let package = parser::parse(&text).unwrap();
        let doc = package.as_document();

        let root = doc.root().children()[0].element().unwrap();
        let mixin = child_element(root, "compare").unwrap();

        let stats = child_element(mixin, "stats").unwrap();
        assert_eq!(stats.attribute_value("total"), Some("1"));
        assert_eq!(stats.attribute_value("exception"), Some("1"));

        let results = child_element(mixin, "results").unwrap();
        let result = child_elements(results, "result")[0];
        assert_eq!(result.attribute_value("status"), Some("exception"));
        assert_eq!(result.attribute_value("error"), Some("divide by zero"));

        let location = child_element(result, "location").unwrap();
        assert_eq!(location.attribute_value("file"), Some("checks.rs"));
        assert_eq!(location.attribute_value("line"), Some("42"));
        assert_eq!(location.attribute_value("column"), Some("9"));
    }

    #[test]
    fn test_binary_mixin_never_emits_exception_status() {
        let dir = tempfile::tempdir().unwrap();
        let suite = sample_suite();

        let mut exception = ExceptionResults::new();
        exception.record_success(SourceLocation::new("checks.rs", 7, 1));
        exception.record_failure(SourceLocation::new("checks.rs", 8, 1), "nothing thrown");
        let mut test = Test::new("reject_bad_input");
        test.attach("throws", MixinResults::Exception(exception));

        XmlExporter::new(dir.path())
            .write_unit_test_file(&suite, &test, "reject_bad_input")
            .unwrap();

        let text = fs::read_to_string(
            dir.path()
                .join("reject_bad_input")
                .join("unit_00000007.xml"),
        )
        .unwrap();
        let package = parser::parse(&text).unwrap();
        let doc = package.as_document();

        let root = doc.root().children()[0].element().unwrap();
        let mixin = child_element(root, "throws").unwrap();

        let stats = child_element(mixin, "stats").unwrap();
        assert_eq!(stats.attribute_value("exception"), Some("0"));

        let results = child_element(mixin, "results").unwrap();
        let statuses: Vec<&str> = child_elements(results, "result")
            .into_iter()
            .map(|result| result.attribute_value("status").unwrap())
            .collect();
        assert_eq!(statuses, vec!["success", "failure"]);
    }

    #[test]
    fn test_concurrent_exports_for_distinct_tests() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Arc::new(XmlExporter::new(dir.path()));
        assert!(exporter.supports_multithreading());

        let handles: Vec<_> = ["first_test", "second_test"]
            .iter()
            .map(|name| {
                let exporter = Arc::clone(&exporter);
                let name = name.to_string();
                thread::spawn(move || {
                    let suite = sample_suite();
                    let mut compare = CompareResults::new();
                    compare.record_success(SourceLocation::new("checks.rs", 1, 1));
                    let mut test = Test::new(&name);
                    test.attach("compare", MixinResults::Compare(compare));
                    exporter.write_unit_test_file(&suite, &test, &name).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for name in &["first_test", "second_test"] {
            let text =
                fs::read_to_string(dir.path().join(name).join("unit_00000007.xml")).unwrap();
            assert!(parser::parse(&text).is_ok());
        }
    }
}
