use serde_derive::Serialize;

/// Source position an outcome was recorded from.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: &str, line: u32, column: u32) -> Self {
        SourceLocation {
            file: file.to_owned(),
            line,
            column,
        }
    }
}

/// Tri-state outcome of a single comparison check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareStatus {
    Success,
    Failure,
    Exception,
}

impl CompareStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareStatus::Success => "success",
            CompareStatus::Failure => "failure",
            CompareStatus::Exception => "exception",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareOutcome {
    pub status: CompareStatus,
    pub location: SourceLocation,
    pub error: String,
}

/// Ordered comparison outcomes plus their aggregate counters. The recording
/// methods keep the counters and the outcome list in step; a success never
/// carries an error message.
#[derive(Debug, Default, Clone)]
pub struct CompareResults {
    successes: u64,
    failures: u64,
    exceptions: u64,
    results: Vec<CompareOutcome>,
}

impl CompareResults {
    pub fn new() -> Self {
        CompareResults::default()
    }

    pub fn record_success(&mut self, location: SourceLocation) {
        self.successes += 1;
        self.results.push(CompareOutcome {
            status: CompareStatus::Success,
            location,
            error: String::new(),
        });
    }

    pub fn record_failure(&mut self, location: SourceLocation, error: &str) {
        self.failures += 1;
        self.results.push(CompareOutcome {
            status: CompareStatus::Failure,
            location,
            error: error.to_owned(),
        });
    }

    pub fn record_exception(&mut self, location: SourceLocation, error: &str) {
        self.exceptions += 1;
        self.results.push(CompareOutcome {
            status: CompareStatus::Exception,
            location,
            error: error.to_owned(),
        });
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn exceptions(&self) -> u64 {
        self.exceptions
    }

    pub fn total(&self) -> u64 {
        self.successes + self.failures + self.exceptions
    }

    pub fn results(&self) -> &[CompareOutcome] {
        &self.results
    }
}

/// Binary outcome of one expect-exception check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionOutcome {
    pub passed: bool,
    pub location: SourceLocation,
    pub error: String,
}

impl ExceptionOutcome {
    pub fn status_str(&self) -> &'static str {
        if self.passed {
            "success"
        } else {
            "failure"
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExceptionResults {
    successes: u64,
    failures: u64,
    results: Vec<ExceptionOutcome>,
}

impl ExceptionResults {
    pub fn new() -> Self {
        ExceptionResults::default()
    }

    pub fn record_success(&mut self, location: SourceLocation) {
        self.successes += 1;
        self.results.push(ExceptionOutcome {
            passed: true,
            location,
            error: String::new(),
        });
    }

    pub fn record_failure(&mut self, location: SourceLocation, error: &str) {
        self.failures += 1;
        self.results.push(ExceptionOutcome {
            passed: false,
            location,
            error: error.to_owned(),
        });
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    pub fn results(&self) -> &[ExceptionOutcome] {
        &self.results
    }
}

/// Aggregate counters in the shape the result files carry them. Binary
/// outcome sets always report zero exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub exception: u64,
}

/// One named result set attached to a test. The serializers switch on the
/// variant instead of on a runtime type lookup.
#[derive(Debug, Clone)]
pub enum MixinResults {
    Compare(CompareResults),
    Exception(ExceptionResults),
}

impl MixinResults {
    pub fn stats(&self) -> Stats {
        match self {
            MixinResults::Compare(compare) => Stats {
                total: compare.total(),
                success: compare.successes(),
                failure: compare.failures(),
                exception: compare.exceptions(),
            },
            MixinResults::Exception(exception) => Stats {
                total: exception.total(),
                success: exception.successes(),
                failure: exception.failures(),
                exception: 0,
            },
        }
    }
}

/// One executed test together with its ordered, uniquely named result sets.
#[derive(Debug, Default, Clone)]
pub struct Test {
    name: String,
    mixins: Vec<(String, MixinResults)>,
}

impl Test {
    pub fn new(name: &str) -> Self {
        Test {
            name: name.to_owned(),
            mixins: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches a result set under `name`. A second set under the same name
    /// replaces the first without changing its position.
    pub fn attach(&mut self, name: &str, results: MixinResults) {
        if let Some(slot) = self.mixins.iter_mut().find(|(n, _)| n == name) {
            slot.1 = results;
            return;
        }
        self.mixins.push((name.to_owned(), results));
    }

    pub fn mixin(&self, name: &str) -> Option<&MixinResults> {
        self.mixins
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, results)| results)
    }

    pub fn mixins(&self) -> impl Iterator<Item = (&str, &MixinResults)> {
        self.mixins
            .iter()
            .map(|(name, results)| (name.as_str(), results))
    }
}
