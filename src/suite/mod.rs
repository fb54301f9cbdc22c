use chrono::Local;
use serde_derive::{Deserialize, Serialize};

pub(crate) fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Suite-level metadata persisted with every checkpoint.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase", default)]
pub struct SuiteData {
    #[builder(default)]
    pub date_created: String,
    #[builder(default)]
    pub date_last_run: String,
    #[builder(default)]
    pub name: String,
    #[builder(default)]
    pub passing: bool,
    #[builder(default)]
    pub run_index: u64,
    #[builder(default)]
    pub version: String,
}

impl SuiteData {
    pub fn builder() -> SuiteDataBuilder {
        SuiteDataBuilder::default()
    }
}

/// Summary state of a single registered test.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase", default)]
pub struct TestRecord {
    #[builder(default)]
    pub date_created: String,
    #[builder(default)]
    pub date_last_run: String,
    #[builder(default)]
    pub name: String,
    #[builder(default)]
    pub passing: bool,
}

impl TestRecord {
    pub fn new(name: &str) -> Self {
        TestRecord {
            date_created: timestamp(),
            date_last_run: String::new(),
            name: name.to_owned(),
            passing: true,
        }
    }

    pub fn builder() -> TestRecordBuilder {
        TestRecordBuilder::default()
    }
}

/// Top-level aggregate of a test run: metadata plus the ordered unit-test
/// and performance-test collections. Records live as long as the suite.
#[derive(Debug, Default, Clone)]
pub struct Suite {
    data: SuiteData,
    unit_tests: Vec<TestRecord>,
    performance_tests: Vec<TestRecord>,
}

impl Suite {
    pub fn new(name: &str) -> Self {
        Suite {
            data: SuiteData {
                date_created: timestamp(),
                date_last_run: String::new(),
                name: name.to_owned(),
                passing: true,
                run_index: 0,
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
            unit_tests: Vec::new(),
            performance_tests: Vec::new(),
        }
    }

    pub fn data(&self) -> &SuiteData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SuiteData {
        &mut self.data
    }

    pub fn unit_tests(&self) -> &[TestRecord] {
        &self.unit_tests
    }

    pub fn unit_tests_mut(&mut self) -> &mut Vec<TestRecord> {
        &mut self.unit_tests
    }

    pub fn performance_tests(&self) -> &[TestRecord] {
        &self.performance_tests
    }

    pub fn performance_tests_mut(&mut self) -> &mut Vec<TestRecord> {
        &mut self.performance_tests
    }

    /// Bumps the run index and stamps the last-run time. Called by the
    /// driver once per execution, before any export.
    pub fn begin_run(&mut self) {
        self.data.run_index += 1;
        self.data.date_last_run = timestamp();
    }

    /// Returns the unit-test record registered under `name`, creating it
    /// the first time the name is seen.
    pub fn register_unit_test(&mut self, name: &str) -> &mut TestRecord {
        if let Some(index) = self.unit_tests.iter().position(|t| t.name == name) {
            return &mut self.unit_tests[index];
        }
        self.unit_tests.push(TestRecord::new(name));
        self.unit_tests.last_mut().unwrap()
    }

    /// Same as [`Suite::register_unit_test`] for the performance collection.
    pub fn register_performance_test(&mut self, name: &str) -> &mut TestRecord {
        if let Some(index) = self.performance_tests.iter().position(|t| t.name == name) {
            return &mut self.performance_tests[index];
        }
        self.performance_tests.push(TestRecord::new(name));
        self.performance_tests.last_mut().unwrap()
    }
}
