//! Registry mapping user identifiers to their conversion sessions.
//!
//! Sessions are created lazily on the first event of a user and live until the
//! process exits. Every session sits behind its own `Mutex`, so events from the
//! same user are applied one at a time while different users proceed in
//! parallel. The registry map itself is only locked long enough to look up or
//! insert an entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use converter_common::event::UserId;
use converter_common::{Envelope, Reply, Result};
use log::{debug, info, warn};

use crate::model::price_cache::PriceCache;
use crate::model::session::ConversionSession;

/// Handle to one user's session.
pub type SessionHandle = Arc<Mutex<ConversionSession>>;

/// All live sessions plus the cache they share.
pub struct SessionRegistry {
    cache: Arc<PriceCache>,
    sessions: Mutex<HashMap<UserId, SessionHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions read prices from `cache`.
    pub fn new(cache: Arc<PriceCache>) -> Self {
        Self {
            cache,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Return the session of `user_id`, creating a fresh one if needed.
    pub fn resolve(&self, user_id: &str) -> Result<SessionHandle> {
        let mut sessions = self.sessions.lock()?;
        let handle = sessions.entry(user_id.to_string()).or_insert_with(|| {
            info!("New session for user {}", user_id);
            Arc::new(Mutex::new(ConversionSession::new(user_id)))
        });
        Ok(Arc::clone(handle))
    }

    /// Force the session of `user_id` back to the asset prompt.
    pub fn reset(&self, user_id: &str) -> Result<()> {
        let handle = self.resolve(user_id)?;
        let mut session = handle.lock()?;
        session.restart();
        debug!("Session {} reset", session.session_id());
        Ok(())
    }

    /// Apply one event and turn the outcome into a reply.
    ///
    /// Errors become [`Reply::Error`]; the session stays usable either way.
    pub fn dispatch(&self, envelope: Envelope) -> Reply {
        let Envelope { user_id, event } = envelope;
        let outcome = self.resolve(&user_id).and_then(|handle| {
            let mut session = handle.lock().unwrap_or_else(|poisoned| {
                warn!("Session {} was poisoned, restarting it", user_id);
                handle.clear_poison();
                let mut session = poisoned.into_inner();
                session.restart();
                session
            });
            session.handle(event, &self.cache)
        });

        match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Request from user {} failed: {}", user_id, e);
                Reply::from(&e)
            }
        }
    }

    /// Number of sessions created so far.
    pub fn len(&self) -> Result<usize> {
        Ok(self.sessions.lock()?.len())
    }

    /// Whether no user has talked to the registry yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
