//! Presentation: prompt text and button layouts for each state, and mapping
//! pressed button text back to a `MenuAction`.
//!
//! Nothing here knows about Telegram; `Keyboard` is converted to a reply
//! markup in the transport layer.

use crate::catalog::{format_decimal, MaintenanceActivity, RideField, RIDE_FIELDS};
use crate::error::TurnError;
use crate::models::{MaintenanceSummary, RideSummary};
use crate::wizard::{ConversationState, Event, Input, MenuAction, PartialRide, Session};

/// ---------------------------------------------------------------------------
/// Labels
/// ---------------------------------------------------------------------------

pub const ADD_RIDE: &str = "🚴 Add New Ride";
pub const ADD_MAINTENANCE: &str = "🔧 Add Maintenance";
pub const VIEW_RIDES: &str = "📊 View Recent Rides";
pub const VIEW_MAINTENANCE: &str = "🛠️ View Maintenance";
pub const DONE: &str = "✅ Done";
pub const CANCEL: &str = "❌ Cancel";

const MAIN_MENU: [&str; 4] = [ADD_RIDE, ADD_MAINTENANCE, VIEW_RIDES, VIEW_MAINTENANCE];

/// Fixed label → action table; catalog fields and activities are appended
/// by `action_for_label`.
const CONTROL_LABELS: [(&str, MenuAction); 6] = [
  (ADD_RIDE, MenuAction::AddRide),
  (ADD_MAINTENANCE, MenuAction::AddMaintenance),
  (VIEW_RIDES, MenuAction::ViewRides),
  (VIEW_MAINTENANCE, MenuAction::ViewMaintenance),
  (DONE, MenuAction::Done),
  (CANCEL, MenuAction::Cancel),
];

const SEPARATOR: &str = "─────────────";

fn action_for_label(label: &str) -> Option<MenuAction> {
  let controls = CONTROL_LABELS.iter().map(|(l, a)| (*l, *a));
  let fields = RIDE_FIELDS
    .iter()
    .map(|spec| (spec.label, MenuAction::PickField(spec.field)));
  let activities = MaintenanceActivity::ALL
    .iter()
    .map(|a| (a.label(), MenuAction::PickActivity(*a)));

  controls
    .chain(fields)
    .chain(activities)
    .find(|(l, _)| *l == label)
    .map(|(_, action)| action)
}

/// ---------------------------------------------------------------------------
/// Replies
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
  /// Button rows
  Menu(Vec<Vec<String>>),
  /// Hide the keyboard so the user types a value
  Remove,
}

impl Keyboard {
  pub fn buttons(&self) -> Vec<&str> {
    match self {
      Self::Menu(rows) => rows.iter().flatten().map(String::as_str).collect(),
      Self::Remove => Vec::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
  pub text: String,
  pub keyboard: Keyboard,
}

/// Query results to show alongside an event
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
  Rides(Vec<RideSummary>),
  Maintenance(Vec<MaintenanceSummary>),
}

/// ---------------------------------------------------------------------------
/// Options and Interpretation
/// ---------------------------------------------------------------------------

/// Labels the user can pick in the session's current state
pub fn options(session: &Session) -> Vec<&'static str> {
  match session.state {
    ConversationState::ChoosingAction => MAIN_MENU.to_vec(),
    ConversationState::AddingRideWizard => {
      let mut labels: Vec<&'static str> = session
        .partial_ride
        .missing_fields()
        .map(RideField::label)
        .collect();
      if !session.partial_ride.is_empty() {
        labels.push(DONE);
      }
      labels.push(CANCEL);
      labels
    }
    ConversationState::RideInput { .. } => Vec::new(),
    ConversationState::AddingMaintenance => MaintenanceActivity::ALL
      .iter()
      .map(|a| a.label())
      .chain(std::iter::once(CANCEL))
      .collect(),
  }
}

/// Map raw text to an action if it matches one of `options`, otherwise pass
/// it through as a value.
pub fn interpret(raw: &str, options: &[&str]) -> Input {
  let text = raw.trim();
  options
    .iter()
    .find(|label| **label == text)
    .and_then(|label| action_for_label(label))
    .map(Input::Action)
    .unwrap_or_else(|| Input::Text(raw.to_string()))
}

/// Button grid for the session's state: pickable items two per row, then
/// Done/Cancel together on the last row.
pub fn keyboard(session: &Session) -> Keyboard {
  if let ConversationState::RideInput { .. } = session.state {
    return Keyboard::Remove;
  }

  let labels = options(session);
  let (controls, items): (Vec<&str>, Vec<&str>) = match session.state {
    ConversationState::AddingRideWizard => labels
      .into_iter()
      .partition(|l| *l == DONE || *l == CANCEL),
    _ => (Vec::new(), labels),
  };

  let mut rows: Vec<Vec<String>> = items
    .chunks(2)
    .map(|chunk| chunk.iter().map(|l| l.to_string()).collect())
    .collect();
  if !controls.is_empty() {
    rows.push(controls.into_iter().map(String::from).collect());
  }

  Keyboard::Menu(rows)
}

/// ---------------------------------------------------------------------------
/// Rendering
/// ---------------------------------------------------------------------------

/// Render the reply for a completed transition. `session` is the session
/// after the transition.
pub fn render(event: &Event, session: &Session, listing: Option<&Listing>) -> Reply {
  let text = match event {
    Event::Started => {
      "Welcome to your Bike Activity Tracker! 🚴‍♂️\n\nWhat would you like to do?".to_string()
    }
    Event::Cancelled => "Operation cancelled. What would you like to do?".to_string(),
    Event::RideStarted => {
      "Let's add a new ride! 🚴‍♂️\n\nWhat would you like to add first?".to_string()
    }
    Event::MaintenanceStarted => "What maintenance did you perform?".to_string(),
    Event::RidesListed | Event::MaintenanceListed => match listing {
      Some(Listing::Rides(rides)) => format_recent_rides(rides),
      Some(Listing::Maintenance(entries)) => format_recent_maintenance(entries),
      None => String::new(),
    },
    Event::FieldSelected(field) => format!(
      "{}\n\n{}",
      format_ride_data(&session.partial_ride),
      field.spec().prompt
    ),
    Event::FieldAdded(_) => format!(
      "✅ Added!\n\n{}\n\nWhat would you like to add next?",
      format_ride_data(&session.partial_ride)
    ),
    Event::RideSaved(saved) => format!(
      "✅ Ride saved successfully!\n\n{}\nWhat would you like to do next?",
      format_ride_data(saved)
    ),
    Event::RideCancelled => "Ride cancelled. What would you like to do?".to_string(),
    Event::MaintenanceSaved(entry) => format!(
      "✅ Maintenance logged successfully!\n\n📅 Date: {}\n🔧 Activity: {}\n\nWhat would you like to do next?",
      entry.date, entry.activity_type
    ),
    Event::MaintenanceCancelled => "Maintenance cancelled. What would you like to do?".to_string(),
  };

  Reply {
    text,
    keyboard: keyboard(session),
  }
}

/// Render a rejected turn. `session` is the unchanged current session.
pub fn render_error(error: &TurnError, session: &Session) -> Reply {
  let text = match error {
    TurnError::InvalidInput { field } => format!(
      "Invalid input for {}. Please enter a valid number.",
      field.label()
    ),
    TurnError::MissingRequiredField(field) => format!(
      "⚠️ {} is required! Please add {} before finishing.",
      field_name(*field),
      field_name(*field).to_lowercase()
    ),
    TurnError::UnrecognizedAction(_) => match session.state {
      ConversationState::AddingRideWizard => {
        "Please select a field to add or choose Done/Cancel.".to_string()
      }
      _ => "Please choose one of the options below.".to_string(),
    },
    TurnError::StoreWriteFailure(_) => {
      "⚠️ Sorry, I couldn't save that. Nothing was lost, please try again.".to_string()
    }
    TurnError::StoreReadFailure(_) => {
      "⚠️ Sorry, I couldn't load your records right now. Please try again.".to_string()
    }
  };

  Reply {
    text,
    keyboard: keyboard(session),
  }
}

/// Label without its emoji prefix, e.g. "Distance"
fn field_name(field: RideField) -> &'static str {
  let label = field.label();
  label.split_once(' ').map(|(_, name)| name).unwrap_or(label)
}

/// ---------------------------------------------------------------------------
/// Formatting
/// ---------------------------------------------------------------------------

pub fn format_ride_data(ride: &PartialRide) -> String {
  if ride.is_empty() {
    return "No data entered yet.".to_string();
  }

  let mut message = String::from("Current ride data:\n");
  for (field, value) in ride.entries() {
    message.push_str(&field.spec().format(value));
    message.push('\n');
  }
  message
}

pub fn format_recent_rides(rides: &[RideSummary]) -> String {
  if rides.is_empty() {
    return "No rides recorded yet. Add your first ride! 🚴‍♂️".to_string();
  }

  let mut message = String::from("🚴 Recent Rides:\n\n");
  for ride in rides {
    message.push_str(&format!("📅 {}\n", ride.date));
    message.push_str(&format!("📏 Distance: {} km\n", format_decimal(ride.distance)));
    if let Some(avg_speed) = ride.avg_speed {
      message.push_str(&format!("⚡ Avg Speed: {} km/h\n", format_decimal(avg_speed)));
    }
    if let Some(duration) = ride.duration.as_deref().filter(|d| !d.is_empty()) {
      message.push_str(&format!("⏱️ Duration: {}\n", duration));
    }
    message.push_str(SEPARATOR);
    message.push('\n');
  }
  message
}

pub fn format_recent_maintenance(entries: &[MaintenanceSummary]) -> String {
  if entries.is_empty() {
    return "No maintenance records yet. Time to service your bike! 🔧".to_string();
  }

  let mut message = String::from("🔧 Recent Maintenance:\n\n");
  for entry in entries {
    message.push_str(&format!("📅 {}\n", entry.date));
    message.push_str(&format!("🔧 {}\n", entry.activity_type));
    if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
      message.push_str(&format!("📝 {}\n", notes));
    }
    message.push_str(SEPARATOR);
    message.push('\n');
  }
  message
}
