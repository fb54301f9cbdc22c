use std::fs::{self, File};
use std::path::PathBuf;

use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mixin::{MixinResults, SourceLocation, Stats, Test};
use crate::reporter::{unit_test_filename, ExportError, Exporter, ImportError, Importer};
use crate::suite::{Suite, SuiteData, TestRecord};

pub const SUITE_FILE: &str = "suite.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SuiteFile {
    #[serde(flatten)]
    data: SuiteData,
    unit_tests: Vec<TestRecord>,
    performance_tests: Vec<TestRecord>,
}

#[derive(Serialize)]
struct ResultEntry<'a> {
    status: &'static str,
    error: &'a str,
    location: &'a SourceLocation,
}

#[derive(Serialize)]
struct MixinEntry<'a> {
    stats: Stats,
    results: Vec<ResultEntry<'a>>,
}

fn mixin_entry(results: &MixinResults) -> MixinEntry<'_> {
    let entries = match results {
        MixinResults::Compare(compare) => compare
            .results()
            .iter()
            .map(|outcome| ResultEntry {
                status: outcome.status.as_str(),
                error: &outcome.error,
                location: &outcome.location,
            })
            .collect(),
        MixinResults::Exception(exception) => exception
            .results()
            .iter()
            .map(|outcome| ResultEntry {
                status: outcome.status_str(),
                error: &outcome.error,
                location: &outcome.location,
            })
            .collect(),
    };
    MixinEntry {
        stats: results.stats(),
        results: entries,
    }
}

/// JSON sibling of the XML adapter: same directory layout and the same
/// suite/test mapping, with `.json` files instead of `.xml`.
pub struct JsonExporter {
    directory: PathBuf,
}

impl JsonExporter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        JsonExporter {
            directory: directory.into(),
        }
    }
}

impl Exporter for JsonExporter {
    const FORMAT: &'static str = "json";

    fn write_suite(&self, suite: &Suite) -> Result<(), ExportError> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(ExportError::Directory)?;
        }

        let document = SuiteFile {
            data: suite.data().clone(),
            unit_tests: suite.unit_tests().to_vec(),
            performance_tests: suite.performance_tests().to_vec(),
        };

        let path = self.directory.join(SUITE_FILE);
        debug!("Writing {} suite state to {}", Self::FORMAT, path.display());
        let file = File::create(&path).map_err(ExportError::File)?;
        serde_json::to_writer_pretty(file, &document)
            .map_err(|err| ExportError::Write(err.into()))?;
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

        let mut document = Map::new();
        for (mixin_name, results) in test.mixins() {
            let value: Value = serde_json::to_value(mixin_entry(results))
                .map_err(|err| ExportError::Write(err.into()))?;
            document.insert(mixin_name.to_owned(), value);
        }

        let path = test_directory.join(unit_test_filename(suite.data().run_index, "json"));
        trace!("Writing unit test results to {}", path.display());
        let file = File::create(&path).map_err(ExportError::File)?;
        serde_json::to_writer_pretty(file, &document)
            .map_err(|err| ExportError::Write(err.into()))?;
        Ok(())
    }

    fn supports_multithreading(&self) -> bool {
        true
    }
}

/// Restores suite metadata and unit-test summaries from `suite.json`. Like
/// the XML importer, performance-test and mixin details stay on disk only.
pub struct JsonImporter {
    directory: PathBuf,
}

impl JsonImporter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        JsonImporter {
            directory: directory.into(),
        }
    }
}

impl Importer for JsonImporter {
    const FORMAT: &'static str = "json";

    fn read_suite(&self, suite: &mut Suite) -> Result<bool, ImportError> {
        let path = self.directory.join(SUITE_FILE);
        if !path.exists() {
            debug!("No prior suite state at {}", path.display());
            return Ok(false);
        }

        let text = fs::read_to_string(&path).map_err(ImportError::File)?;
        let document: SuiteFile =
            serde_json::from_str(&text).map_err(|err| ImportError::Parse(err.to_string()))?;

        *suite.data_mut() = document.data;
        suite.unit_tests_mut().extend(document.unit_tests);
        Ok(true)
    }
}
