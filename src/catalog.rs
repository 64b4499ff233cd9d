//! Field catalog for ride entry and the fixed maintenance activities
//!
//! The catalog is static: the order of `RIDE_FIELDS` is the order fields are
//! offered as buttons and listed in summaries.

use std::fmt;

use crate::error::TurnError;

// ---------------------------------------------------------------------------
/// Ride Fields
// ---------------------------------------------------------------------------

/// Discriminants index into `RIDE_FIELDS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RideField {
  Distance,
  AvgSpeed,
  MaxSpeed,
  AvgPulse,
  MaxPulse,
  Duration,
  Notes,
}

impl RideField {
  pub fn spec(self) -> &'static FieldSpec {
    &RIDE_FIELDS[self as usize]
  }

  pub fn key(self) -> &'static str {
    self.spec().key
  }

  pub fn label(self) -> &'static str {
    self.spec().label
  }
}

impl fmt::Display for RideField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.key())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Real number, e.g. kilometers or km/h
  Decimal,
  /// Whole number, e.g. bpm
  Integer,
  /// Free text stored verbatim
  Text,
}

/// A parsed field value, tagged with the kind that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Decimal(f64),
  Integer(i64),
  Text(String),
}

impl fmt::Display for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Decimal(v) => f.write_str(&format_decimal(*v)),
      Self::Integer(v) => write!(f, "{}", v),
      Self::Text(v) => write!(f, "{}", v),
    }
  }
}

/// Whole numbers keep one fractional digit ("48.0"), others print as-is
pub fn format_decimal(value: f64) -> String {
  if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
    format!("{:.1}", value)
  } else {
    value.to_string()
  }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
  pub field: RideField,
  /// Stable key, matches the column name in `rides`
  pub key: &'static str,
  /// Button label, also used in error messages
  pub label: &'static str,
  pub kind: FieldKind,
  /// Shown when the field is picked for entry
  pub prompt: &'static str,
  /// Summary line; `{}` is replaced by the value
  pub display: &'static str,
}

impl FieldSpec {
  /// Parse raw user text according to this field's kind.
  pub fn parse(&self, raw: &str) -> Result<FieldValue, TurnError> {
    let text = raw.trim();
    let invalid = || TurnError::InvalidInput { field: self.field };

    match self.kind {
      FieldKind::Decimal => text
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(FieldValue::Decimal)
        .ok_or_else(invalid),
      FieldKind::Integer => text
        .parse::<i64>()
        .map(FieldValue::Integer)
        .map_err(|_| invalid()),
      FieldKind::Text => Ok(FieldValue::Text(text.to_string())),
    }
  }

  pub fn format(&self, value: &FieldValue) -> String {
    self.display.replacen("{}", &value.to_string(), 1)
  }
}

pub const RIDE_FIELDS: [FieldSpec; 7] = [
  FieldSpec {
    field: RideField::Distance,
    key: "distance",
    label: "📏 Distance",
    kind: FieldKind::Decimal,
    prompt: "Please enter the distance in kilometers (e.g., 25.5):",
    display: "📏 Distance: {} km",
  },
  FieldSpec {
    field: RideField::AvgSpeed,
    key: "avg_speed",
    label: "⚡ Avg Speed",
    kind: FieldKind::Decimal,
    prompt: "Please enter average speed in km/h (e.g., 22.3):",
    display: "⚡ Avg Speed: {} km/h",
  },
  FieldSpec {
    field: RideField::MaxSpeed,
    key: "max_speed",
    label: "🚀 Max Speed",
    kind: FieldKind::Decimal,
    prompt: "Please enter maximum speed in km/h (e.g., 45.2):",
    display: "🚀 Max Speed: {} km/h",
  },
  FieldSpec {
    field: RideField::AvgPulse,
    key: "avg_pulse",
    label: "💓 Avg Pulse",
    kind: FieldKind::Integer,
    prompt: "Please enter average pulse in bpm (e.g., 145):",
    display: "💓 Avg Pulse: {} bpm",
  },
  FieldSpec {
    field: RideField::MaxPulse,
    key: "max_pulse",
    label: "💥 Max Pulse",
    kind: FieldKind::Integer,
    prompt: "Please enter maximum pulse in bpm (e.g., 180):",
    display: "💥 Max Pulse: {} bpm",
  },
  FieldSpec {
    field: RideField::Duration,
    key: "duration",
    label: "⏱️ Duration",
    kind: FieldKind::Text,
    prompt: "Please enter duration (e.g., 1:30 or 90 minutes):",
    display: "⏱️ Duration: {}",
  },
  FieldSpec {
    field: RideField::Notes,
    key: "notes",
    label: "📝 Notes",
    kind: FieldKind::Text,
    prompt: "Please enter any notes about the ride:",
    display: "📝 Notes: {}",
  },
];

// ---------------------------------------------------------------------------
/// Maintenance Activities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceActivity {
  ChainLubrication,
  TirePressure,
  BrakeAdjustment,
  GeneralCleaning,
  Other,
}

impl MaintenanceActivity {
  pub const ALL: [MaintenanceActivity; 5] = [
    Self::ChainLubrication,
    Self::TirePressure,
    Self::BrakeAdjustment,
    Self::GeneralCleaning,
    Self::Other,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::ChainLubrication => "🔗 Chain Lubrication",
      Self::TirePressure => "🛞 Tire Pressure",
      Self::BrakeAdjustment => "🛑 Brake Adjustment",
      Self::GeneralCleaning => "🧽 General Cleaning",
      Self::Other => "🔧 Other",
    }
  }

  /// Value stored in `maintenance.activity_type`
  pub fn activity_type(self) -> &'static str {
    match self {
      Self::ChainLubrication => "Chain Lubrication",
      Self::TirePressure => "Tire Pressure Check",
      Self::BrakeAdjustment => "Brake Adjustment",
      Self::GeneralCleaning => "General Cleaning",
      Self::Other => "Other Maintenance",
    }
  }
}
