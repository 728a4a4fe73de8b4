use std::fmt;

use anyhow::Error;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum MetaPixelError {
    GridShape {
        width: u32,
        height: u32,
    },
    MissingAlpha {
        color: String,
    },
    DuplicateType {
        id: u8,
        name: &'static str,
    },
    UnknownTypeId {
        id: u8,
        row: Option<u32>,
    },
    UnknownTypeName {
        name: String,
    },
    DuplicateRow {
        id: u8,
        row: u32,
        first_row: u32,
    },
    ValueParse {
        input: String,
    },
    MissingType {
        id: u8,
        name: &'static str,
    },
}

impl MetaPixelError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::GridShape { .. } => "GRID_SHAPE",
            Self::MissingAlpha { .. } => "GRID_NOT_RGBA",
            Self::DuplicateType { .. } => "DUPLICATE_TYPE",
            Self::UnknownTypeId { .. } => "UNKNOWN_TYPE_ID",
            Self::UnknownTypeName { .. } => "UNKNOWN_TYPE_NAME",
            Self::DuplicateRow { .. } => "DUPLICATE_ROW",
            Self::ValueParse { .. } => "VALUE_PARSE",
            Self::MissingType { .. } => "TYPE_NOT_PRESENT",
        }
    }

    /// Row-level anomalies are healed by the loader instead of aborting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownTypeId { row: Some(_), .. }
                | Self::DuplicateRow { .. }
                | Self::ValueParse { .. }
        )
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            Self::GridShape { width, height } => Some(json!({
                "provided": [width, height],
                "expected": [crate::persistence::GRID_WIDTH, crate::persistence::GRID_HEIGHT],
            })),
            Self::DuplicateType { id, name } | Self::MissingType { id, name } => {
                Some(json!({ "id": id, "name": name }))
            }
            Self::UnknownTypeId { id, row } => Some(json!({ "id": id, "row": row })),
            Self::DuplicateRow { id, row, first_row } => Some(json!({
                "id": id,
                "row": row,
                "first_row": first_row,
            })),
            Self::MissingAlpha { .. } | Self::UnknownTypeName { .. } | Self::ValueParse { .. } => {
                None
            }
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            ok: false,
            error: ErrorEnvelopeBody {
                code: self.code().to_owned(),
                message: self.to_string(),
                details: self.details(),
            },
        }
    }
}

impl fmt::Display for MetaPixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridShape { width, height } => write!(
                f,
                "hat images need to be {}x{} pixels in size, got {}x{}",
                crate::persistence::GRID_WIDTH,
                crate::persistence::GRID_HEIGHT,
                width,
                height
            ),
            Self::MissingAlpha { color } => {
                write!(f, "hat image color mode must be RGBA, got {color}")
            }
            Self::DuplicateType { id, name } => {
                write!(f, "metapixel {name} ({id}) is already present")
            }
            Self::UnknownTypeId { id, row: Some(row) } => {
                write!(f, "row {row} holds unknown metapixel id {id}")
            }
            Self::UnknownTypeId { id, row: None } => write!(f, "unknown metapixel id {id}"),
            Self::UnknownTypeName { name } => {
                write!(f, "unknown metapixel type '{name}': run `metapixel types`")
            }
            Self::DuplicateRow { id, row, first_row } => write!(
                f,
                "row {row} repeats metapixel id {id} already loaded from row {first_row}"
            ),
            Self::ValueParse { input } => write!(f, "'{input}' is not a number"),
            Self::MissingType { id, name } => {
                write!(f, "metapixel {name} ({id}) is not present in this hat")
            }
        }
    }
}

impl std::error::Error for MetaPixelError {}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorEnvelopeBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelopeBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    /// Envelope for failures that carry no [`MetaPixelError`] (I/O, YAML, PNG).
    pub fn generic(error: &Error) -> Self {
        Self {
            ok: false,
            error: ErrorEnvelopeBody {
                code: "ERROR".to_owned(),
                message: format!("{error:#}"),
                details: None,
            },
        }
    }
}

pub fn find_metapixel_error(error: &Error) -> Option<&MetaPixelError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<MetaPixelError>())
}
