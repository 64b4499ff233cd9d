//! Conversation state machine for ride and maintenance entry
//!
//! `step` is pure: it takes the current session and one interpreted input
//! and returns the next session, the store effect to perform and the event
//! to present. The caller performs the effect and only then adopts the new
//! session, so a failed write leaves the session untouched.
//!
//! States:
//! - ChoosingAction: main menu (initial, and where every path returns)
//! - AddingRideWizard: picking the next ride field, Done or Cancel
//! - RideInput: waiting for the value of one field
//! - AddingMaintenance: picking a maintenance activity

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::catalog::{FieldValue, MaintenanceActivity, RideField, RIDE_FIELDS};
use crate::error::TurnError;
use crate::models::{NewMaintenance, NewRide};

// ---------------------------------------------------------------------------
/// Conversation State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
  #[default]
  ChoosingAction,
  AddingRideWizard,
  /// Waiting for a value for `field`
  RideInput { field: RideField },
  AddingMaintenance,
}

// ---------------------------------------------------------------------------
/// Partial Ride
// ---------------------------------------------------------------------------

/// Values collected so far for the ride being entered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRide {
  values: BTreeMap<RideField, FieldValue>,
}

impl PartialRide {
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn contains(&self, field: RideField) -> bool {
    self.values.contains_key(&field)
  }

  pub fn get(&self, field: RideField) -> Option<&FieldValue> {
    self.values.get(&field)
  }

  pub fn set(&mut self, field: RideField, value: FieldValue) {
    self.values.insert(field, value);
  }

  /// Filled fields in catalog order
  pub fn entries(&self) -> impl Iterator<Item = (RideField, &FieldValue)> + '_ {
    RIDE_FIELDS
      .iter()
      .filter_map(move |spec| self.get(spec.field).map(|v| (spec.field, v)))
  }

  /// Catalog fields that have no value yet, in catalog order
  pub fn missing_fields(&self) -> impl Iterator<Item = RideField> + '_ {
    RIDE_FIELDS
      .iter()
      .map(|spec| spec.field)
      .filter(move |field| !self.contains(*field))
  }

  fn decimal(&self, field: RideField) -> Option<f64> {
    match self.get(field) {
      Some(FieldValue::Decimal(v)) => Some(*v),
      _ => None,
    }
  }

  fn integer(&self, field: RideField) -> Option<i64> {
    match self.get(field) {
      Some(FieldValue::Integer(v)) => Some(*v),
      _ => None,
    }
  }

  fn text(&self, field: RideField) -> Option<String> {
    match self.get(field) {
      Some(FieldValue::Text(v)) => Some(v.clone()),
      _ => None,
    }
  }

  /// Build the record to persist; distance is the only required field.
  pub fn to_new_ride(&self, date: NaiveDate) -> Result<NewRide, TurnError> {
    let distance = self
      .decimal(RideField::Distance)
      .ok_or(TurnError::MissingRequiredField(RideField::Distance))?;

    Ok(NewRide {
      date,
      distance,
      avg_speed: self.decimal(RideField::AvgSpeed),
      max_speed: self.decimal(RideField::MaxSpeed),
      avg_pulse: self.integer(RideField::AvgPulse),
      max_pulse: self.integer(RideField::MaxPulse),
      duration: self.text(RideField::Duration),
      notes: self.text(RideField::Notes),
    })
  }
}

// ---------------------------------------------------------------------------
/// Session
// ---------------------------------------------------------------------------

/// Transient per-chat state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
  pub state: ConversationState,
  pub partial_ride: PartialRide,
}

impl Session {
  pub fn active_field(&self) -> Option<RideField> {
    match self.state {
      ConversationState::RideInput { field } => Some(field),
      _ => None,
    }
  }

  fn in_wizard(partial_ride: PartialRide) -> Self {
    Self {
      state: ConversationState::AddingRideWizard,
      partial_ride,
    }
  }

  fn with_state(state: ConversationState) -> Self {
    Self {
      state,
      partial_ride: PartialRide::default(),
    }
  }
}

// ---------------------------------------------------------------------------
/// Inputs, Effects, Events
// ---------------------------------------------------------------------------

/// A recognized button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
  AddRide,
  AddMaintenance,
  ViewRides,
  ViewMaintenance,
  PickField(RideField),
  Done,
  Cancel,
  PickActivity(MaintenanceActivity),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
  Action(MenuAction),
  /// Anything that isn't a currently offered button
  Text(String),
}

/// Store work the caller must perform before adopting the next session
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
  SaveRide(NewRide),
  SaveMaintenance(NewMaintenance),
  ListRides,
  ListMaintenance,
}

/// What happened, for presentation
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  Started,
  Cancelled,
  RideStarted,
  MaintenanceStarted,
  RidesListed,
  MaintenanceListed,
  FieldSelected(RideField),
  FieldAdded(RideField),
  /// Carries the values that were saved, for the confirmation summary
  RideSaved(PartialRide),
  RideCancelled,
  MaintenanceSaved(NewMaintenance),
  MaintenanceCancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
  pub session: Session,
  pub effect: Option<Effect>,
  pub event: Event,
}

impl Transition {
  fn to(session: Session, event: Event) -> Self {
    Self {
      session,
      effect: None,
      event,
    }
  }

  fn with_effect(mut self, effect: Effect) -> Self {
    self.effect = Some(effect);
    self
  }
}

// ---------------------------------------------------------------------------
/// Transitions
// ---------------------------------------------------------------------------

/// Entry action: fresh session at the main menu
pub fn start() -> Transition {
  Transition::to(Session::default(), Event::Started)
}

/// External cancel: valid from any state
pub fn cancel() -> Transition {
  Transition::to(Session::default(), Event::Cancelled)
}

/// Advance the conversation by one input.
///
/// `today` dates any record committed by this step. On `Err` the session is
/// unchanged and the caller re-renders the current state.
pub fn step(session: &Session, input: Input, today: NaiveDate) -> Result<Transition, TurnError> {
  match session.state {
    ConversationState::ChoosingAction => choose_action(input),
    ConversationState::AddingRideWizard => ride_wizard(session, input, today),
    ConversationState::RideInput { field } => ride_input(session, field, input),
    ConversationState::AddingMaintenance => maintenance(input, today),
  }
}

fn choose_action(input: Input) -> Result<Transition, TurnError> {
  let action = match input {
    Input::Action(action) => action,
    Input::Text(text) => return Err(TurnError::UnrecognizedAction(text)),
  };

  let transition = match action {
    MenuAction::AddRide => Transition::to(
      Session::with_state(ConversationState::AddingRideWizard),
      Event::RideStarted,
    ),
    MenuAction::AddMaintenance => Transition::to(
      Session::with_state(ConversationState::AddingMaintenance),
      Event::MaintenanceStarted,
    ),
    MenuAction::ViewRides => {
      Transition::to(Session::default(), Event::RidesListed).with_effect(Effect::ListRides)
    }
    MenuAction::ViewMaintenance => Transition::to(Session::default(), Event::MaintenanceListed)
      .with_effect(Effect::ListMaintenance),
    other => return Err(unrecognized(other)),
  };

  Ok(transition)
}

fn ride_wizard(session: &Session, input: Input, today: NaiveDate) -> Result<Transition, TurnError> {
  let action = match input {
    Input::Action(action) => action,
    Input::Text(text) => return Err(TurnError::UnrecognizedAction(text)),
  };

  match action {
    MenuAction::PickField(field) if !session.partial_ride.contains(field) => Ok(Transition::to(
      Session {
        state: ConversationState::RideInput { field },
        partial_ride: session.partial_ride.clone(),
      },
      Event::FieldSelected(field),
    )),
    MenuAction::Done => {
      let ride = session.partial_ride.to_new_ride(today)?;
      Ok(
        Transition::to(
          Session::default(),
          Event::RideSaved(session.partial_ride.clone()),
        )
        .with_effect(Effect::SaveRide(ride)),
      )
    }
    MenuAction::Cancel => Ok(Transition::to(Session::default(), Event::RideCancelled)),
    other => Err(unrecognized(other)),
  }
}

fn ride_input(session: &Session, field: RideField, input: Input) -> Result<Transition, TurnError> {
  // No buttons are offered while typing a value, so any action here is a stray
  let raw = match input {
    Input::Text(raw) => raw,
    Input::Action(action) => return Err(unrecognized(action)),
  };

  let value = field.spec().parse(&raw)?;
  let mut partial_ride = session.partial_ride.clone();
  partial_ride.set(field, value);

  Ok(Transition::to(
    Session::in_wizard(partial_ride),
    Event::FieldAdded(field),
  ))
}

fn maintenance(input: Input, today: NaiveDate) -> Result<Transition, TurnError> {
  let activity_type = match input {
    Input::Action(MenuAction::Cancel) => {
      return Ok(Transition::to(
        Session::default(),
        Event::MaintenanceCancelled,
      ))
    }
    Input::Action(MenuAction::PickActivity(activity)) => activity.activity_type().to_string(),
    Input::Action(other) => return Err(unrecognized(other)),
    // Free text is accepted as a custom activity
    Input::Text(raw) => raw.trim().to_string(),
  };

  let entry = NewMaintenance {
    date: today,
    activity_type,
    notes: String::new(),
  };

  Ok(
    Transition::to(Session::default(), Event::MaintenanceSaved(entry.clone()))
      .with_effect(Effect::SaveMaintenance(entry)),
  )
}

fn unrecognized(action: MenuAction) -> TurnError {
  TurnError::UnrecognizedAction(format!("{:?}", action))
}
