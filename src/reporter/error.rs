use std::error;
use std::fmt;
use std::io;

/// An error that occurred while writing suite or test result files.
#[derive(Debug)]
pub enum ExportError {
    Directory(io::Error),
    File(io::Error),
    Write(io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExportError::Directory(ref err) => {
                write!(f, "Failed to create results directory: {}", err)
            }
            ExportError::File(ref err) => write!(f, "Failed to open file for writing: {}", err),
            ExportError::Write(ref err) => write!(f, "Failed to write document: {}", err),
        }
    }
}

impl error::Error for ExportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ExportError::Directory(ref err) => Some(err),
            ExportError::File(ref err) => Some(err),
            ExportError::Write(ref err) => Some(err),
        }
    }
}

/// An error that occurred while reading a previously written suite file.
#[derive(Debug)]
pub enum ImportError {
    File(io::Error),
    Parse(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ImportError::File(ref err) => write!(f, "Failed to read suite file: {}", err),
            ImportError::Parse(ref err) => write!(f, "Failed to parse suite file: {}", err),
        }
    }
}

impl error::Error for ImportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ImportError::File(ref err) => Some(err),
            ImportError::Parse(_) => None,
        }
    }
}
