//! Event classifier: maps inbound platform events to counter updates.
//!
//! All knowledge about which events count, and for whom, lives here; the recorder only sees
//! the uniform [`ClassifiedEvent`] shape.

use chatstat_core::{ClassifiedEvent, CounterUpdate, Metric, RawEvent, Subject};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Stateless mapping from raw platform events to classified counter updates.
///
/// Returns `None` for events outside the scope of interest: bot authors, chats other than the
/// monitored one, and reaction removals whose message author could not be resolved (removing
/// only half of a reaction pair would skew the counters more than dropping the event).
#[derive(Debug, Clone)]
pub struct EventClassifier {
    monitored_chat: Option<i64>,
}

impl EventClassifier {
    /// `monitored_chat = None` counts events from every chat the bot can see.
    pub fn new(monitored_chat: Option<i64>) -> Self {
        Self { monitored_chat }
    }

    fn monitors(&self, chat_id: i64) -> bool {
        self.monitored_chat.map_or(true, |id| id == chat_id)
    }

    pub fn classify(&self, event: &RawEvent) -> Option<ClassifiedEvent> {
        match event {
            RawEvent::MessageCreated {
                chat_id,
                author_id,
                author_is_bot,
                timestamp,
                ..
            } => {
                if *author_is_bot || !self.monitors(*chat_id) {
                    return None;
                }
                Some(ClassifiedEvent {
                    updates: vec![
                        CounterUpdate {
                            subject: Subject::user(*author_id),
                            metric: Metric::MessagesSent,
                        },
                        CounterUpdate {
                            subject: Subject::server(*chat_id),
                            metric: Metric::MessagesSent,
                        },
                    ],
                    delta: 1,
                    timestamp: *timestamp,
                })
            }
            RawEvent::ReactionAdded {
                chat_id,
                reactor_id,
                reactor_is_bot,
                message_author_id,
                timestamp,
            } => {
                if *reactor_is_bot || !self.monitors(*chat_id) {
                    return None;
                }
                Some(self.reaction_event(*chat_id, *reactor_id, *message_author_id, 1, *timestamp))
            }
            RawEvent::ReactionRemoved {
                chat_id,
                reactor_id,
                reactor_is_bot,
                message_author_id,
                timestamp,
            } => {
                if *reactor_is_bot || !self.monitors(*chat_id) {
                    return None;
                }
                let Some(author_id) = message_author_id else {
                    // Accepted accuracy loss: without the author we cannot undo the
                    // received side, so the whole removal is dropped.
                    debug!(chat_id, reactor_id, "Dropping reaction removal with unresolved author");
                    return None;
                };
                Some(self.reaction_event(*chat_id, *reactor_id, Some(*author_id), -1, *timestamp))
            }
        }
    }

    fn reaction_event(
        &self,
        chat_id: i64,
        reactor_id: i64,
        message_author_id: Option<i64>,
        delta: i64,
        timestamp: DateTime<Utc>,
    ) -> ClassifiedEvent {
        let mut updates = vec![
            CounterUpdate {
                subject: Subject::user(reactor_id),
                metric: Metric::ReactionsGiven,
            },
            CounterUpdate {
                subject: Subject::server(chat_id),
                metric: Metric::ReactionsGiven,
            },
        ];
        if let Some(author_id) = message_author_id {
            updates.push(CounterUpdate {
                subject: Subject::user(author_id),
                metric: Metric::ReactionsReceived,
            });
        }
        ClassifiedEvent {
            updates,
            delta,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstat_core::Scope;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap()
    }

    fn message(chat_id: i64, author_id: i64, author_is_bot: bool) -> RawEvent {
        RawEvent::MessageCreated {
            chat_id,
            author_id,
            author_is_bot,
            author_name: Some("alice".to_string()),
            message_id: 1,
            timestamp: ts(),
        }
    }

    #[test]
    fn test_message_fans_out_to_user_and_server() {
        let classifier = EventClassifier::new(Some(-100));

        let event = classifier.classify(&message(-100, 7, false)).expect("classified");

        assert_eq!(event.delta, 1);
        assert_eq!(event.updates.len(), 2);
        assert!(event.updates.iter().any(|u| {
            u.subject == Subject::user(7) && u.metric == Metric::MessagesSent
        }));
        assert!(event.updates.iter().any(|u| {
            u.subject.scope == Scope::Server && u.metric == Metric::MessagesSent
        }));
    }

    #[test]
    fn test_bot_author_is_dropped() {
        let classifier = EventClassifier::new(Some(-100));
        assert!(classifier.classify(&message(-100, 7, true)).is_none());
    }

    #[test]
    fn test_foreign_chat_is_dropped() {
        let classifier = EventClassifier::new(Some(-100));
        assert!(classifier.classify(&message(-200, 7, false)).is_none());
    }

    #[test]
    fn test_unscoped_classifier_counts_any_chat() {
        let classifier = EventClassifier::new(None);
        assert!(classifier.classify(&message(-200, 7, false)).is_some());
    }

    #[test]
    fn test_reaction_add_with_author_touches_three_counters() {
        let classifier = EventClassifier::new(Some(-100));

        let event = classifier
            .classify(&RawEvent::ReactionAdded {
                chat_id: -100,
                reactor_id: 7,
                reactor_is_bot: false,
                message_author_id: Some(9),
                timestamp: ts(),
            })
            .expect("classified");

        assert_eq!(event.delta, 1);
        assert_eq!(event.updates.len(), 3);
        assert!(event.updates.iter().any(|u| {
            u.subject == Subject::user(9) && u.metric == Metric::ReactionsReceived
        }));
    }

    #[test]
    fn test_reaction_add_without_author_skips_received() {
        let classifier = EventClassifier::new(Some(-100));

        let event = classifier
            .classify(&RawEvent::ReactionAdded {
                chat_id: -100,
                reactor_id: 7,
                reactor_is_bot: false,
                message_author_id: None,
                timestamp: ts(),
            })
            .expect("classified");

        assert_eq!(event.updates.len(), 2);
        assert!(!event
            .updates
            .iter()
            .any(|u| u.metric == Metric::ReactionsReceived));
    }

    #[test]
    fn test_reaction_removal_without_author_is_dropped_whole() {
        let classifier = EventClassifier::new(Some(-100));

        let event = classifier.classify(&RawEvent::ReactionRemoved {
            chat_id: -100,
            reactor_id: 7,
            reactor_is_bot: false,
            message_author_id: None,
            timestamp: ts(),
        });

        assert!(event.is_none());
    }

    #[test]
    fn test_reaction_removal_with_author_decrements() {
        let classifier = EventClassifier::new(Some(-100));

        let event = classifier
            .classify(&RawEvent::ReactionRemoved {
                chat_id: -100,
                reactor_id: 7,
                reactor_is_bot: false,
                message_author_id: Some(9),
                timestamp: ts(),
            })
            .expect("classified");

        assert_eq!(event.delta, -1);
        assert_eq!(event.updates.len(), 3);
    }
}
