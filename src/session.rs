//! Session controller: owns every chat's conversation state and runs each
//! turn through interpretation, the wizard, the store and rendering.

use chrono::{Local, NaiveDate};
use std::collections::HashMap;

use crate::db::DbPool;
use crate::error::TurnError;
use crate::presentation::{self, Listing, Reply};
use crate::store;
use crate::wizard::{self, Effect, Session, Transition};

/// Chat identifier as delivered by the transport
pub type SessionId = i64;

pub struct SessionController {
  db: DbPool,
  recent_limit: i64,
  sessions: HashMap<SessionId, Session>,
}

impl SessionController {
  pub fn new(db: DbPool, recent_limit: i64) -> Self {
    Self {
      db,
      recent_limit,
      sessions: HashMap::new(),
    }
  }

  pub fn session(&self, id: SessionId) -> Option<&Session> {
    self.sessions.get(&id)
  }

  /// `/start`: fresh session at the main menu
  pub fn start(&mut self, id: SessionId) -> Reply {
    tracing::debug!(session = id, "Session started");
    self.reset(id, wizard::start())
  }

  /// `/cancel`: drop whatever was in progress
  pub fn cancel(&mut self, id: SessionId) -> Reply {
    tracing::debug!(session = id, "Session cancelled");
    self.reset(id, wizard::cancel())
  }

  fn reset(&mut self, id: SessionId, transition: Transition) -> Reply {
    let reply = presentation::render(&transition.event, &transition.session, None);
    self.sessions.insert(id, transition.session);
    reply
  }

  /// Process one inbound text. Never fails: rejected turns and store errors
  /// become replies, and the session only changes once the turn succeeds.
  pub async fn handle_turn(&mut self, id: SessionId, raw_text: &str) -> Reply {
    let current = self.sessions.entry(id).or_default().clone();
    let input = presentation::interpret(raw_text, &presentation::options(&current));
    tracing::debug!(session = id, state = ?current.state, input = ?input, "Handling turn");

    let transition = match wizard::step(&current, input, today()) {
      Ok(transition) => transition,
      Err(err) => {
        tracing::debug!(session = id, error = %err, "Turn rejected");
        return presentation::render_error(&err, &current);
      }
    };

    let listing = match self.apply(id, transition.effect.as_ref()).await {
      Ok(listing) => listing,
      Err(err) => {
        tracing::error!(session = id, error = %err, "Store operation failed");
        return presentation::render_error(&err, &current);
      }
    };

    let reply = presentation::render(&transition.event, &transition.session, listing.as_ref());
    self.sessions.insert(id, transition.session);
    reply
  }

  async fn apply(&self, id: SessionId, effect: Option<&Effect>) -> Result<Option<Listing>, TurnError> {
    let Some(effect) = effect else {
      return Ok(None);
    };

    match effect {
      Effect::SaveRide(ride) => {
        let ride_id = store::insert_ride(&self.db, ride)
          .await
          .map_err(TurnError::StoreWriteFailure)?;
        tracing::info!(session = id, ride_id, distance = ride.distance, "Ride saved");
        Ok(None)
      }
      Effect::SaveMaintenance(entry) => {
        let maintenance_id = store::insert_maintenance(&self.db, entry)
          .await
          .map_err(TurnError::StoreWriteFailure)?;
        tracing::info!(
          session = id,
          maintenance_id,
          activity = %entry.activity_type,
          "Maintenance logged"
        );
        Ok(None)
      }
      Effect::ListRides => store::recent_rides(&self.db, self.recent_limit)
        .await
        .map(|rides| Some(Listing::Rides(rides)))
        .map_err(TurnError::StoreReadFailure),
      Effect::ListMaintenance => store::recent_maintenance(&self.db, self.recent_limit)
        .await
        .map(|entries| Some(Listing::Maintenance(entries)))
        .map_err(TurnError::StoreReadFailure),
    }
  }
}

fn today() -> NaiveDate {
  Local::now().date_naive()
}
