pub mod error;
pub mod json;
pub mod xml;

pub use self::error::{ExportError, ImportError};

use crate::mixin::Test;
use crate::suite::Suite;

/// Writes suite checkpoints and per-test result files under a root
/// directory. Implementations are constructed with the directory and never
/// validate it up front; missing directories are created on first write.
pub trait Exporter {
    /// Format identifier used by the driver to tell adapters apart.
    const FORMAT: &'static str;

    /// Writes the suite document (metadata plus summary test lists),
    /// overwriting any previous checkpoint.
    fn write_suite(&self, suite: &Suite) -> Result<(), ExportError>;

    /// Writes the detailed result file for one completed test into the
    /// subdirectory `name` under the root.
    fn write_unit_test_file(&self, suite: &Suite, test: &Test, name: &str)
        -> Result<(), ExportError>;

    /// Whether the driver may call the export methods for distinct test
    /// names from parallel threads without external locking. Concurrent
    /// writes to the same path remain a caller error.
    fn supports_multithreading(&self) -> bool;
}

/// Restores suite metadata and unit-test summary state written by the
/// matching [`Exporter`].
pub trait Importer {
    const FORMAT: &'static str;

    /// Returns `Ok(false)` when no suite file exists yet, leaving `suite`
    /// untouched. An existing but unreadable file is an [`ImportError`].
    fn read_suite(&self, suite: &mut Suite) -> Result<bool, ImportError>;
}

pub(crate) fn unit_test_filename(run_index: u64, extension: &str) -> String {
    format!("unit_{:08}.{}", run_index, extension)
}
