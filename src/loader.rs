//! Reading decision systems from text files.
//!
//! One object per line: whitespace-separated descriptors followed by a
//! single label token. Blank lines are skipped. Every line must carry the
//! same number of descriptors as the first one.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use dsr_helpers::LabeledObject;
use ndarray::Array1;
use thiserror::Error;
use tracing::{debug, info};

use crate::evaluation::class_counts;

/// A decision system as read from disk.
pub type System = Vec<LabeledObject<String, f64>>;

/// Errors raised while reading a decision system. Line numbers start at 1.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: expected descriptors followed by a label, found {fields} field(s)")]
    TooFewFields { line: usize, fields: usize },
    #[error("line {line}, field {field}: '{token}' is not a finite number")]
    InvalidDescriptor {
        line: usize,
        field: usize,
        token: String,
    },
    #[error("line {line}: expected {expected} descriptors, found {found}")]
    InconsistentLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("the system contains no objects")]
    Empty,
}

impl LoadError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

fn parse_line(line_number: usize, line: &str) -> Result<Option<LabeledObject<String, f64>>, LoadError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some((label, descriptor_tokens)) = fields.split_last() else {
        return Ok(None);
    };
    if descriptor_tokens.is_empty() {
        return Err(LoadError::TooFewFields {
            line: line_number,
            fields: fields.len(),
        });
    }

    let descriptors = descriptor_tokens
        .iter()
        .enumerate()
        .map(|(index, token)| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(LoadError::InvalidDescriptor {
                line: line_number,
                field: index + 1,
                token: token.to_string(),
            }),
        })
        .collect::<Result<Array1<f64>, _>>()?;

    Ok(Some(LabeledObject::new(descriptors, label.to_string())))
}

/// Parses a decision system from any buffered reader.
///
/// # Errors
///
/// Fails on the first malformed line, on read errors, and when the input
/// holds no objects.
pub fn parse_system<R: BufRead>(reader: R) -> Result<System, LoadError> {
    let mut system = System::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| LoadError::io(format!("failed to read line {line_number}"), e))?;
        let Some(object) = parse_line(line_number, &line)? else {
            continue;
        };
        if let Some(first) = system.first() {
            if object.dimension() != first.dimension() {
                return Err(LoadError::InconsistentLength {
                    line: line_number,
                    expected: first.dimension(),
                    found: object.dimension(),
                });
            }
        }
        system.push(object);
    }

    if system.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(system)
}

/// Reads a decision system from a file.
pub fn load_system(path: impl AsRef<Path>) -> Result<System, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| LoadError::io(format!("cannot open {}", path.display()), e))?;
    let system = parse_system(BufReader::new(file))?;

    let classes = class_counts(&system);
    info!(
        path = %path.display(),
        objects = system.len(),
        descriptors = system[0].dimension(),
        classes = classes.len(),
        "loaded decision system"
    );
    debug!(?classes, "class populations");
    Ok(system)
}
