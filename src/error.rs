use std::path::PathBuf;
use thiserror::Error;

/// Failure while decoding a single compiled class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("bad magic number 0x{found:08X}, not a compiled class")]
    BadMagic { found: u32 },

    #[error("unexpected end of class data at offset {offset} (need {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant pool index {index} is not valid modified UTF-8")]
    InvalidUtf8 { index: u16 },

    #[error("constant pool index {index} out of range (pool count {count})")]
    IndexOutOfRange { index: u16, count: u16 },

    #[error("constant pool index {index} is {found}, expected {expected}")]
    TagMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
}

/// The four failure kinds a scan can record. None of them aborts a run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot resolve classpath element {path}: {reason}")]
    ClasspathResolution { path: PathBuf, reason: String },

    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read class {path}: {source}")]
    ClassRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse class {path}: {source}")]
    ClassParse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("cannot write descriptor {path}: {source}")]
    DescriptorWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClasspathResolution { .. } => "classpath_resolution",
            Self::OutputDirectory { .. } => "output_directory",
            Self::ClassRead { .. } | Self::ClassParse { .. } => "class_parse",
            Self::DescriptorWrite { .. } => "descriptor_write",
        }
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::ClasspathResolution { path, .. }
            | Self::OutputDirectory { path, .. }
            | Self::ClassRead { path, .. }
            | Self::ClassParse { path, .. }
            | Self::DescriptorWrite { path, .. } => path,
        }
    }
}
