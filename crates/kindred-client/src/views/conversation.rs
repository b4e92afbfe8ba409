//! Conversation with one counterpart: header, message list and composer.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use kindred_shared::validate::initials;
use kindred_shared::{Message, Principal};

use crate::app::App;
use crate::cache::{PollHandle, Subscription};
use crate::error::Result;
use crate::queries::discovery::IsBlocked;
use crate::queries::keys;
use crate::queries::messaging::{Messages, SendMessage};
use crate::queries::profile::UserProfile;
use crate::router::Route;
use crate::views::{primary_photo, read_error};

pub const EMPTY_CONVERSATION: &str = "No messages yet. Start the conversation!";
pub const BLOCKED_NOTICE: &str = "You have blocked this user. Unblock them to send messages.";
const SEND_FAILED: &str = "Failed to send message. Please try again.";

/// Whether `message` was sent by `me`. Compares the textual principals.
pub fn is_own_message(message: &Message, me: Option<&Principal>) -> bool {
    me.is_some_and(|me| message.from.as_str() == me.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Rendered on the right.
    pub is_own: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub display_name: String,
    pub initials: String,
    pub photo: String,
    pub is_blocked: bool,
}

impl Header {
    pub fn status(&self) -> &'static str {
        if self.is_blocked {
            "Blocked"
        } else {
            "Active"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    Open { draft: String, sending: bool },
    /// Replaces the composer entirely.
    Blocked { notice: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    Loading,
    NotFound,
    /// A read failed with nothing cached; polling keeps retrying messages.
    Error(String),
    Ready {
        header: Header,
        messages: Vec<MessageRow>,
        /// Shown instead of the list when there are no messages.
        empty_notice: Option<&'static str>,
        composer: ComposerState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Default)]
struct Composer {
    draft: String,
    sending: bool,
}

pub struct ConversationView {
    app: App,
    counterpart: Principal,
    composer: Mutex<Composer>,
    poll: Mutex<Option<PollHandle>>,
    updates: Mutex<Subscription>,
    /// Count and newest timestamp of the list last reported to the renderer.
    seen: Mutex<(usize, Option<DateTime<Utc>>)>,
}

impl ConversationView {
    pub fn new(app: App, counterpart: Principal) -> Self {
        let updates = app.queries.subscribe(keys::messages(&counterpart));
        Self {
            app,
            counterpart,
            composer: Mutex::new(Composer::default()),
            poll: Mutex::new(None),
            updates: Mutex::new(updates),
            seen: Mutex::new((0, None)),
        }
    }

    fn messages_query(&self) -> Messages {
        Messages {
            counterpart: self.counterpart.clone(),
        }
    }

    /// Load the conversation and start polling. The block state is
    /// re-checked on every entry.
    ///
    /// Each read runs even if an earlier one failed, and polling starts
    /// regardless; failures are recorded on their keys and the first one
    /// is returned.
    pub async fn enter(&self) -> Result<()> {
        let queries = &self.app.queries;
        let profile = queries
            .ensure(&UserProfile {
                user: self.counterpart.clone(),
            })
            .await
            .map(|_| ());
        let blocked = queries
            .fetch(&IsBlocked {
                target: self.counterpart.clone(),
            })
            .await
            .map(|_| ());
        let messages = queries.fetch(&self.messages_query()).await.map(|_| ());

        let poll = queries.poll(self.messages_query(), self.app.config.message_poll_interval);
        *self.poll.lock() = Some(poll);
        debug!(counterpart = %self.counterpart, "Conversation opened");
        profile.and(blocked).and(messages)
    }

    /// Stop polling. Also happens on drop.
    pub fn leave(&self) {
        if self.poll.lock().take().is_some() {
            debug!(counterpart = %self.counterpart, "Conversation closed");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll.lock().as_ref().is_some_and(PollHandle::is_active)
    }

    fn is_blocked(&self) -> bool {
        self.app
            .queries
            .data(&IsBlocked {
                target: self.counterpart.clone(),
            })
            .is_some_and(|blocked| *blocked)
    }

    pub fn state(&self) -> ConversationState {
        let queries = &self.app.queries;
        let profile = queries.state(&UserProfile {
            user: self.counterpart.clone(),
        });
        let blocked = queries.state(&IsBlocked {
            target: self.counterpart.clone(),
        });
        let messages = queries.state(&self.messages_query());
        if profile.is_loading() || blocked.is_loading() || messages.is_loading() {
            return ConversationState::Loading;
        }
        let failed = read_error(&profile)
            .or_else(|| read_error(&blocked))
            .or_else(|| read_error(&messages));
        if let Some(e) = failed {
            return ConversationState::Error(e);
        }
        let Some(profile) = profile.data.as_deref().and_then(Option::as_ref) else {
            return ConversationState::NotFound;
        };

        let is_blocked = self.is_blocked();
        let header = Header {
            display_name: profile.display_name.clone(),
            initials: initials(&profile.display_name),
            photo: primary_photo(profile),
            is_blocked,
        };

        let me = self.app.session.principal();
        let rows: Vec<MessageRow> = messages
            .data
            .as_deref()
            .map(|list| {
                list.iter()
                    .map(|m| MessageRow {
                        content: m.content.clone(),
                        timestamp: m.timestamp,
                        is_own: is_own_message(m, me.as_ref()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let composer = if is_blocked {
            ComposerState::Blocked {
                notice: BLOCKED_NOTICE,
            }
        } else {
            let composer = self.composer.lock();
            ComposerState::Open {
                draft: composer.draft.clone(),
                sending: composer.sending,
            }
        };

        ConversationState::Ready {
            empty_notice: rows.is_empty().then_some(EMPTY_CONVERSATION),
            header,
            messages: rows,
            composer,
        }
    }

    /// Whether messages arrived since the last call; the renderer scrolls
    /// to the newest message when they did. Refetches that return the same
    /// list do not count.
    pub fn take_scroll_to_bottom(&self) -> bool {
        if !self.updates.lock().take_changed() {
            return false;
        }
        let current = self
            .app
            .queries
            .data(&self.messages_query())
            .map_or((0, None), |list| (list.len(), list.last().map(|m| m.timestamp)));
        let mut seen = self.seen.lock();
        if *seen == current {
            return false;
        }
        *seen = current;
        true
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.composer.lock().draft = text.into();
    }

    /// Enter sends; shift+enter inserts a newline.
    pub async fn key_down(&self, key: Key, shift: bool) -> Result<bool> {
        match (key, shift) {
            (Key::Enter, false) => self.send().await,
            (Key::Enter, true) => {
                self.composer.lock().draft.push('\n');
                Ok(false)
            }
            (Key::Other, _) => Ok(false),
        }
    }

    /// Send the trimmed draft. Returns whether a message was sent.
    /// Blank drafts are ignored, as is a second send while one is pending.
    pub async fn send(&self) -> Result<bool> {
        if self.is_blocked() {
            return Ok(false);
        }
        let content = {
            let mut composer = self.composer.lock();
            let content = composer.draft.trim().to_string();
            if content.is_empty() || composer.sending {
                return Ok(false);
            }
            composer.sending = true;
            content
        };

        let outcome = self
            .app
            .queries
            .mutate(&SendMessage {
                to: self.counterpart.clone(),
                content,
            })
            .await;

        {
            let mut composer = self.composer.lock();
            composer.sending = false;
            if outcome.is_ok() {
                composer.draft.clear();
            }
        }
        match outcome {
            Ok(()) => {
                if let Err(e) = self.app.queries.ensure(&self.messages_query()).await {
                    debug!(error = %e, "Refresh after send failed");
                }
                Ok(true)
            }
            Err(e) => {
                self.app.notifier.error(SEND_FAILED, e.to_string());
                Err(e)
            }
        }
    }

    pub fn back(&self) {
        self.app.navigator.navigate(Route::Matches);
    }

    /// From the blocked notice: go to the profile to unblock.
    pub fn open_profile(&self) {
        self.app
            .navigator
            .navigate(Route::MatchDetail(self.counterpart.clone()));
    }
}

impl Drop for ConversationView {
    fn drop(&mut self) {
        self.leave();
    }
}
