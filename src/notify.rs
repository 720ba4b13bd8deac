//! The notification bus: fire-and-forget broadcast of survey events to
//! every currently connected real-time listener.

use log::{debug, trace};
use rocket::tokio::sync::broadcast::{self, Receiver, Sender};
use serde::Serialize;

use crate::model::api::SurveyView;

/// An event broadcast to real-time listeners.
///
/// Serialised as `{"event": "<name>", "data": <survey>}`, with `"data": null`
/// for an answer to a survey that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Notification {
    /// A survey was created.
    #[serde(rename = "newSurvey")]
    NewSurvey(SurveyView),
    /// An answer was recorded; carries the answered survey, not the answer.
    #[serde(rename = "newAnswer")]
    NewAnswer(Option<SurveyView>),
}

impl Notification {
    /// The event name listeners see.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewSurvey(_) => "newSurvey",
            Self::NewAnswer(_) => "newAnswer",
        }
    }

    /// The survey carried by this event, if any.
    pub fn survey(&self) -> Option<&SurveyView> {
        match self {
            Self::NewSurvey(survey) => Some(survey),
            Self::NewAnswer(survey) => survey.as_ref(),
        }
    }
}

/// Broadcasts [`Notification`]s to every subscriber present at publish time.
///
/// There is no replay: subscribers only see events published after they
/// subscribed. A subscriber that falls more than the bus capacity behind
/// misses the oldest events.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: Sender<Notification>,
}

impl NotificationBus {
    /// Open a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Send an event to all current subscribers, returning how many were reached.
    ///
    /// Never blocks and never fails: having no subscribers is not an error.
    pub fn publish(&self, notification: Notification) -> usize {
        let name = notification.name();
        match self.sender.send(notification) {
            Ok(listeners) => {
                debug!("Broadcast {name} to {listeners} listener(s)");
                listeners
            }
            Err(_) => {
                trace!("Broadcast {name} with no listeners");
                0
            }
        }
    }

    /// Start receiving events published from now on.
    pub fn subscribe(&self) -> Receiver<Notification> {
        self.sender.subscribe()
    }
}
