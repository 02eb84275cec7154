//! Request orchestration over the store traits.
//!
//! [`Service`] holds no state of its own beyond a handle to the store; every
//! method is one sequential pass of store calls. Reads that return several
//! posts never issue a per-post query: reactions and authors are each fetched
//! with a single batch call for the whole window.

mod feed;
mod graph;
mod posts;

use std::{
  collections::{BTreeSet, HashMap, HashSet},
  sync::Arc,
};

use crate::{
  Error, Result,
  store::FeedStore,
  user::NewUser,
  view::{LikeReaction, Reactions, UserSummary},
};

/// Feed assembly and the commands around it, generic over the backend.
pub struct Service<S> {
  store: Arc<S>,
}

impl<S> Clone for Service<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> Service<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &Arc<S> { &self.store }
}

impl<S> Service<S>
where
  S: FeedStore,
  Error: From<S::Error>,
{
  // ── Users ─────────────────────────────────────────────────────────────────

  /// Create an account. The credential must already be hashed.
  #[tracing::instrument(skip_all, fields(username = %input.username))]
  pub async fn register(&self, input: NewUser) -> Result<UserSummary> {
    let user = self.store.create_user(input).await?;
    tracing::info!(user_id = user.id, "registered user");
    Ok(UserSummary::from(&user))
  }

  #[tracing::instrument(skip(self))]
  pub async fn user(&self, user_id: i64) -> Result<UserSummary> {
    self
      .store
      .find_user(user_id)
      .await?
      .map(|user| UserSummary::from(&user))
      .ok_or(Error::UserNotFound(user_id))
  }

  // ── Shared batch helpers ──────────────────────────────────────────────────

  /// Resolve every id in `ids` to a user summary with one store call.
  async fn resolve_users(
    &self,
    ids: impl IntoIterator<Item = i64>,
  ) -> Result<Authors> {
    let ids: Vec<i64> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
      return Ok(Authors::default());
    }
    let users = self.store.find_users_by_ids(&ids).await?;
    tracing::debug!(requested = ids.len(), found = users.len(), "resolved users");
    Ok(Authors(
      users.iter().map(|user| (user.id, UserSummary::from(user))).collect(),
    ))
  }

  /// Like counts, comment counts and (for a known viewer) like membership for
  /// `post_ids`: one store call per reaction kind.
  async fn load_reactions(
    &self,
    post_ids: &[i64],
    viewer_id: Option<i64>,
  ) -> Result<ReactionBatch> {
    if post_ids.is_empty() {
      return Ok(ReactionBatch::default());
    }
    let mut batch = self.load_likes(post_ids, viewer_id).await?;
    batch.comments = self.store.count_comments(post_ids).await?;
    Ok(batch)
  }

  /// Like counts and viewer membership only; comment counts are left empty.
  async fn load_likes(
    &self,
    post_ids: &[i64],
    viewer_id: Option<i64>,
  ) -> Result<ReactionBatch> {
    let likes = self.store.count_likes(post_ids).await?;
    let liked = match viewer_id {
      Some(viewer) => self.store.liked_post_ids(viewer, post_ids).await?,
      None => HashSet::new(),
    };
    Ok(ReactionBatch { likes, liked, ..Default::default() })
  }
}

/// Users resolved by a batch lookup, keyed by id.
#[derive(Debug, Default)]
struct Authors(HashMap<i64, UserSummary>);

impl Authors {
  /// A referenced user that the batch lookup did not return means the store
  /// has lost referential integrity; that is never silently skipped.
  fn get(&self, user_id: i64) -> Result<UserSummary> {
    self.0.get(&user_id).cloned().ok_or_else(|| {
      Error::DataIntegrity(format!("referenced user {user_id} does not exist"))
    })
  }
}

/// The result of [`Service::load_reactions`]. Missing keys mean zero/false.
#[derive(Debug, Default)]
struct ReactionBatch {
  likes:    HashMap<i64, u64>,
  comments: HashMap<i64, u64>,
  liked:    HashSet<i64>,
}

impl ReactionBatch {
  fn for_post(&self, post_id: i64) -> Reactions {
    let mut reactions = Reactions {
      like: LikeReaction {
        count:            self.likes.get(&post_id).copied().unwrap_or(0),
        viewer_has_liked: self.liked.contains(&post_id),
      },
      ..Default::default()
    };
    reactions.comment.count = self.comments.get(&post_id).copied().unwrap_or(0);
    reactions
  }
}
