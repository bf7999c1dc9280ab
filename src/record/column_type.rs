use std::fmt;
use std::str::FromStr;

use crate::common::DbError;

/// Column types supported by the engine. All types are fixed-width:
/// strings are declared with a character count and always occupy
/// `2 * n` bytes on disk (one 2-byte code unit per character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 32-bit signed integer: 4 bytes, big-endian
    Int,
    /// 32-bit floating point: 4 bytes, IEEE 754 big-endian
    Float,
    /// Fixed-width character string of n code units: 2 * n bytes
    Str(usize),
}

impl ColumnType {
    /// Width of this column on disk in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            ColumnType::Int => 4,
            ColumnType::Float => 4,
            ColumnType::Str(n) => 2 * n,
        }
    }
}

impl FromStr for ColumnType {
    type Err = DbError;

    /// Parses the textual forms `int`, `float`, and `stringN` (N > 0).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ColumnType::Int),
            "float" => Ok(ColumnType::Float),
            _ => {
                if let Some(rest) = s.strip_prefix("string") {
                    if let Ok(n) = rest.parse::<usize>() {
                        if n > 0 {
                            return Ok(ColumnType::Str(n));
                        }
                    }
                }
                Err(DbError::UnknownColumnType(s.to_string()))
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Str(n) => write!(f, "string{}", n),
        }
    }
}
