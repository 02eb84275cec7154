//! Storage capability traits.
//!
//! Each accessor is its own trait so callers can depend on exactly the
//! capability they use and tests can substitute fakes. All of them share the
//! [`Store`] supertrait, which fixes a single error type per backend.
//!
//! Every batch-shaped method (`&[i64]` of ids in, map or set out) must cost
//! one round trip to the backing store regardless of how many ids it is
//! given.
//!
//! Soft-deleted users vanish from every read: their posts, comments, likes
//! and follow edges are skipped as if absent. A row referencing a user that
//! does not exist at all is still returned, so the service can report the
//! broken reference instead of hiding it.

use std::{
  collections::{BTreeSet, HashMap, HashSet},
  future::Future,
};

use crate::{
  page::PageRequest,
  post::{Comment, NewComment, NewPost, Post},
  user::{Follow, NewUser, User},
};

/// The set of authors whose posts may appear in a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
  /// Every non-deleted post, for anonymous viewers.
  Public,
  /// Only posts written by these authors.
  Authors(BTreeSet<i64>),
}

/// Common supertrait fixing the backend's error type.
///
/// All methods on the accessor traits return `Send` futures so the traits can
/// be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Store {
  /// Persist a new user. Fails with `AlreadyExists` if the username or email
  /// is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a non-deleted user. Returns `None` if missing or soft-deleted.
  fn find_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Batch lookup used to resolve authors. Returns the non-deleted users whose
  /// id is in `ids`, in no particular order.
  fn find_users_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;
}

// ─── Follow graph ────────────────────────────────────────────────────────────

pub trait GraphStore: Store {
  fn is_following(
    &self,
    follower_id: i64,
    followee_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert a follow edge.
  ///
  /// Fails with `SelfFollow` if both ids are equal, `UserNotFound` if the
  /// followee does not exist or is deleted, and `AlreadyFollowing` if the
  /// edge exists. The duplicate check must be backed by a uniqueness
  /// constraint, not only by a prior read.
  fn create_follow(
    &self,
    follower_id: i64,
    followee_id: i64,
  ) -> impl Future<Output = Result<Follow, Self::Error>> + Send + '_;

  /// Hard-delete a follow edge. Fails with `FollowNotFound` if absent.
  fn delete_follow(
    &self,
    follower_id: i64,
    followee_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Up to `page.fetch_limit()` edges pointing at `user_id`, newest edge
  /// first, restricted to edge ids below the cursor.
  fn list_followers(
    &self,
    user_id: i64,
    page: PageRequest,
  ) -> impl Future<Output = Result<Vec<Follow>, Self::Error>> + Send + '_;

  /// Up to `page.fetch_limit()` edges leaving `user_id`, newest edge first,
  /// restricted to edge ids below the cursor.
  fn list_following(
    &self,
    user_id: i64,
    page: PageRequest,
  ) -> impl Future<Output = Result<Vec<Follow>, Self::Error>> + Send + '_;

  /// Every user `user_id` follows. Unpaginated; only used to scope a feed.
  fn list_followee_ids(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<BTreeSet<i64>, Self::Error>> + Send + '_;
}

// ─── Posts ───────────────────────────────────────────────────────────────────

pub trait PostStore: Store {
  /// Persist a new post. Fails with `UserNotFound` if the author does not
  /// exist or is deleted.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a non-deleted post.
  fn find_post(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Up to `page.fetch_limit()` non-deleted posts within `scope`, ordered by
  /// id descending and restricted to ids below the cursor.
  fn find_feed_window<'a>(
    &'a self,
    scope: &'a FeedScope,
    page: PageRequest,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Non-deleted posts for `ids`, in input order. Missing and deleted ids are
  /// omitted. Fails with `InvalidArgument` for more than
  /// [`MAX_POSTS_BY_ID`](crate::post::MAX_POSTS_BY_ID) ids.
  fn find_posts_by_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  /// Soft-delete a post. Fails with `PostNotFound` if missing or already
  /// deleted.
  fn delete_post(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Reactions ───────────────────────────────────────────────────────────────

pub trait ReactionStore: Store {
  /// Like count per post. Posts without likes are absent from the map.
  fn count_likes<'a>(
    &'a self,
    post_ids: &'a [i64],
  ) -> impl Future<Output = Result<HashMap<i64, u64>, Self::Error>> + Send + 'a;

  /// Non-deleted comment count per post. Posts without comments are absent.
  fn count_comments<'a>(
    &'a self,
    post_ids: &'a [i64],
  ) -> impl Future<Output = Result<HashMap<i64, u64>, Self::Error>> + Send + 'a;

  /// The subset of `post_ids` that `viewer_id` has liked.
  fn liked_post_ids<'a>(
    &'a self,
    viewer_id: i64,
    post_ids: &'a [i64],
  ) -> impl Future<Output = Result<HashSet<i64>, Self::Error>> + Send + 'a;

  /// All non-deleted comments on a post, newest first.
  fn list_comments(
    &self,
    post_id: i64,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Record a like. Returns `false` without error if it already existed.
  /// Fails with `PostNotFound` or `UserNotFound` if either side is missing.
  fn create_like(
    &self,
    post_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove a like. Returns `false` without error if there was none.
  /// Fails with `PostNotFound` if the post is missing or deleted.
  fn delete_like(
    &self,
    post_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Persist a comment. Fails with `PostNotFound` or `UserNotFound` if
  /// either side is missing.
  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Soft-delete a comment. Fails with `CommentNotFound` if it is missing,
  /// already deleted, or not attached to `post_id`.
  fn delete_comment(
    &self,
    post_id: i64,
    comment_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Everything the [`Service`](crate::Service) needs from a backend.
pub trait FeedStore: UserStore + GraphStore + PostStore + ReactionStore {}

impl<T> FeedStore for T where T: UserStore + GraphStore + PostStore + ReactionStore {}
