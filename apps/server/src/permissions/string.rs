//! Permission-string value type and its pipe-delimited wire encoding.
//!
//! A permission string grants `rightName`, optionally scoped to a facility
//! and, within that facility, to a program:
//!
//! ```text
//! CCE_INVENTORY_VIEW
//! CCE_INVENTORY_VIEW|<facilityId>
//! CCE_INVENTORY_VIEW|<facilityId>|<programId>
//! ```

use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionStringError {
    #[error("permission string is empty")]
    Empty,

    #[error("permission string '{0}' has a blank right name")]
    BlankRight(String),

    #[error("permission string '{0}' has more than three segments")]
    TooManySegments(String),

    #[error("permission string '{raw}' has an invalid {segment} id: {reason}")]
    InvalidId {
        raw: String,
        segment: &'static str,
        reason: String,
    },

    #[error("right '{0}' is scoped to a program without a facility and cannot be encoded")]
    ProgramWithoutFacility(String),
}

/// "User may exercise `right_name`", optionally scoped to a facility and/or program.
///
/// A missing id means the grant is unscoped (wildcard) on that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionString {
    right_name: String,
    facility_id: Option<Uuid>,
    program_id: Option<Uuid>,
}

impl PermissionString {
    pub fn new(
        right_name: impl Into<String>,
        facility_id: Option<Uuid>,
        program_id: Option<Uuid>,
    ) -> Self {
        Self {
            right_name: right_name.into(),
            facility_id,
            program_id,
        }
    }

    /// Unscoped grant of `right_name`.
    pub fn right(right_name: impl Into<String>) -> Self {
        Self::new(right_name, None, None)
    }

    pub fn right_name(&self) -> &str {
        &self.right_name
    }

    pub fn facility_id(&self) -> Option<Uuid> {
        self.facility_id
    }

    pub fn program_id(&self) -> Option<Uuid> {
        self.program_id
    }

    /// Case-insensitive right comparison.
    pub fn grants(&self, right_name: &str) -> bool {
        self.right_name.eq_ignore_ascii_case(right_name)
    }

    /// Encode into the wire form.
    ///
    /// The program segment is positional, so a program-scoped grant without a
    /// facility has no wire representation.
    pub fn encode(&self) -> Result<String, PermissionStringError> {
        let mut out = self.right_name.clone();
        match (self.facility_id, self.program_id) {
            (None, None) => {}
            (Some(facility), None) => {
                out.push(SEPARATOR);
                out.push_str(&facility.to_string());
            }
            (Some(facility), Some(program)) => {
                out.push(SEPARATOR);
                out.push_str(&facility.to_string());
                out.push(SEPARATOR);
                out.push_str(&program.to_string());
            }
            (None, Some(_)) => {
                return Err(PermissionStringError::ProgramWithoutFacility(
                    self.right_name.clone(),
                ))
            }
        }
        Ok(out)
    }

    /// Decode a single wire string.
    pub fn decode(raw: &str) -> Result<Self, PermissionStringError> {
        if raw.is_empty() {
            return Err(PermissionStringError::Empty);
        }

        let mut segments = raw.split(SEPARATOR);
        let right_name = segments.next().unwrap_or_default().trim();
        if right_name.is_empty() {
            return Err(PermissionStringError::BlankRight(raw.to_string()));
        }

        let facility_id = segments
            .next()
            .map(|s| parse_id(raw, "facility", s))
            .transpose()?;
        let program_id = segments
            .next()
            .map(|s| parse_id(raw, "program", s))
            .transpose()?;

        if segments.next().is_some() {
            return Err(PermissionStringError::TooManySegments(raw.to_string()));
        }

        Ok(Self::new(right_name, facility_id, program_id))
    }
}

impl FromStr for PermissionString {
    type Err = PermissionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

fn parse_id(raw: &str, segment: &'static str, value: &str) -> Result<Uuid, PermissionStringError> {
    Uuid::parse_str(value.trim()).map_err(|e| PermissionStringError::InvalidId {
        raw: raw.to_string(),
        segment,
        reason: e.to_string(),
    })
}
