//! Shared message board.
//!
//! Posting requires a signed-in user; the feed joins author names from
//! the profiles table in memory. Reactions and post deletion are not
//! built yet and say so instead of silently doing nothing.

use crate::session::Session;
use crate::store::{Filter, Order, RecordStore};
use crate::types::{Message, Profile};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// A board message enriched with its author's display name
#[derive(Clone, Debug)]
pub struct BoardPost {
    pub message: Message,
    pub author: Option<String>,
}

/// Post a message to the board
pub fn post_message<S: RecordStore>(
    store: &S,
    session: &Session,
    body: &str,
) -> Result<Message> {
    let user_id = session.require_user()?;

    let body = body.trim();
    if body.is_empty() {
        return Err(Error::Validation("message body is empty".into()));
    }

    let mut inserted = store.insert(vec![Message {
        id: None,
        user_id,
        body: body.to_string(),
        created_at: Utc::now(),
    }])?;
    let message = inserted
        .pop()
        .ok_or_else(|| Error::Store("message insert returned no row".into()))?;

    tracing::info!("Posted board message {:?}", message.id);
    Ok(message)
}

/// Load the board feed, newest first, with author names attached
pub fn board_feed<S: RecordStore>(store: &S, limit: usize) -> Result<Vec<BoardPost>> {
    let mut messages: Vec<Message> =
        store.select(&Filter::all(), Some(&Order::desc("created_at")), None)?;
    // Store ordering compares serialized timestamps; re-sort on the
    // parsed values so sub-second posts land in the right order too.
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    messages.truncate(limit);

    let profiles: Vec<Profile> = store.select(&Filter::all(), None, None)?;
    let names: HashMap<Uuid, String> = profiles
        .into_iter()
        .filter_map(|p| p.id.map(|id| (id, p.display_name)))
        .collect();

    Ok(messages
        .into_iter()
        .map(|message| BoardPost {
            author: names.get(&message.user_id).cloned(),
            message,
        })
        .collect())
}

/// Liking a message is not built yet
pub fn like_message<S: RecordStore>(
    _store: &S,
    _session: &Session,
    _message_id: Uuid,
) -> Result<()> {
    Err(Error::Unsupported("message likes"))
}

/// Disliking a message is not built yet
pub fn dislike_message<S: RecordStore>(
    _store: &S,
    _session: &Session,
    _message_id: Uuid,
) -> Result<()> {
    Err(Error::Unsupported("message dislikes"))
}

/// Deleting a message is not built yet
pub fn delete_message<S: RecordStore>(
    _store: &S,
    _session: &Session,
    _message_id: Uuid,
) -> Result<()> {
    Err(Error::Unsupported("message deletion"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonstore::JsonStore;
    use crate::session::lookup_or_create_profile;

    fn store_with_user() -> (tempfile::TempDir, JsonStore, Session) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(temp_dir.path()).unwrap();
        let profile = lookup_or_create_profile(&store, "alex").unwrap();
        let session = Session::signed_in(profile.id.unwrap());
        (temp_dir, store, session)
    }

    #[test]
    fn test_post_requires_signed_in_user() {
        let (_dir, store, _session) = store_with_user();
        let anonymous = Session::anonymous();

        let result = post_message(&store, &anonymous, "hello");
        assert!(matches!(result, Err(Error::AuthRequired)));
    }

    #[test]
    fn test_post_rejects_empty_body() {
        let (_dir, store, session) = store_with_user();

        let result = post_message(&store, &session, "   ");
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_feed_joins_author_names() {
        let (_dir, store, session) = store_with_user();

        post_message(&store, &session, "first").unwrap();
        post_message(&store, &session, "second").unwrap();

        let feed = board_feed(&store, 10).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].message.body, "second");
        assert_eq!(feed[1].message.body, "first");
        assert_eq!(feed[0].author.as_deref(), Some("alex"));
    }

    #[test]
    fn test_feed_honors_limit() {
        let (_dir, store, session) = store_with_user();

        for i in 0..5 {
            post_message(&store, &session, &format!("post {}", i)).unwrap();
        }

        let feed = board_feed(&store, 3).unwrap();
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn test_unknown_author_is_none() {
        let (_dir, store, _session) = store_with_user();

        // A message whose author has no profile row
        let ghost = Session::signed_in(Uuid::new_v4());
        post_message(&store, &ghost, "who am i").unwrap();

        let feed = board_feed(&store, 10).unwrap();
        assert_eq!(feed[0].author, None);
    }

    #[test]
    fn test_reactions_are_unsupported() {
        let (_dir, store, session) = store_with_user();
        let id = Uuid::new_v4();

        assert!(matches!(
            like_message(&store, &session, id),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            dislike_message(&store, &session, id),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            delete_message(&store, &session, id),
            Err(Error::Unsupported(_))
        ));
    }
}
