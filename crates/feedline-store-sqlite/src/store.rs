//! [`SqliteStore`]: the SQLite implementation of the Feedline store traits.

use std::{
  collections::{BTreeSet, HashMap, HashSet},
  path::Path,
};

use feedline_core::{
  Error as CoreError,
  page::PageRequest,
  post::{Comment, MAX_POSTS_BY_ID, NewComment, NewPost, Post},
  store::{FeedScope, GraphStore, PostStore, ReactionStore, Store, UserStore},
  time,
  user::{Follow, NewUser, User},
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{
    COMMENT_COLUMNS, FOLLOW_COLUMNS, POST_COLUMNS, RawComment, RawFollow,
    RawPost, RawUser, USER_COLUMNS, encode_dt, encode_role, json_id_array,
    placeholders,
  },
  schema::SCHEMA,
};

/// What a connection closure decided: a value, or a domain-level refusal
/// that must not roll into a database error.
type Outcome<T> = std::result::Result<T, CoreError>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Feedline store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. Each write
/// runs its existence checks and its insert/update in one transaction.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a keyset window query over follow edges filtered on `column`.
  /// Edges whose `counterpart` user is soft-deleted are skipped.
  async fn follow_window(
    &self,
    column: &'static str,
    counterpart: &'static str,
    user_id: i64,
    page: PageRequest,
  ) -> Result<Vec<Follow>> {
    let cursor = page.cursor();
    let limit = i64::from(page.fetch_limit());

    let raws: Vec<RawFollow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {FOLLOW_COLUMNS} FROM follows
           WHERE {column} = ?1 AND (?2 IS NULL OR id < ?2) AND {}
           ORDER BY id DESC
           LIMIT ?3",
          user_not_deleted(counterpart)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, cursor, limit], RawFollow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollow::into_follow).collect()
  }

  /// `SELECT post_id, COUNT(*)` grouped per post over `table`, counting only
  /// rows that pass `filter`.
  async fn count_per_post(
    &self,
    table: &'static str,
    filter: String,
    post_ids: &[i64],
  ) -> Result<HashMap<i64, u64>> {
    if post_ids.is_empty() {
      return Ok(HashMap::new());
    }
    let ids = post_ids.to_vec();

    let counts = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT post_id, COUNT(*) FROM {table}
           WHERE post_id IN ({}) AND {filter}
           GROUP BY post_id",
          placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as u64))
          })?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(counts)
  }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
        && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn user_is_live(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM users WHERE id = ?1 AND deleted_at IS NULL",
        rusqlite::params![id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// SQL predicate that holds unless the user referenced by `column` exists and
/// is soft-deleted. A reference to a missing user still passes, so the
/// service can report it as a data integrity failure.
fn user_not_deleted(column: &str) -> String {
  format!(
    "NOT EXISTS (SELECT 1 FROM users u WHERE u.id = {column} AND u.deleted_at IS NOT NULL)"
  )
}

/// A post is live when neither it nor its author is soft-deleted.
fn live_post_filter() -> String {
  format!("posts.deleted_at IS NULL AND {}", user_not_deleted("posts.author_id"))
}

fn post_is_live(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        &format!("SELECT 1 FROM posts WHERE id = ?1 AND {}", live_post_filter()),
        rusqlite::params![id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

impl Store for SqliteStore {
  type Error = crate::Error;
}

// ─── Users ───────────────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = time::now();
    let at_str = encode_dt(now);
    let role_str = encode_role(input.role);

    let outcome: Outcome<User> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken: Option<String> = tx
          .query_row(
            "SELECT CASE WHEN username = ?1 THEN 'username' ELSE 'email' END
             FROM users WHERE username = ?1 OR email = ?2 LIMIT 1",
            rusqlite::params![input.username, input.email],
            |r| r.get(0),
          )
          .optional()?;
        if let Some(field) = taken {
          return Ok(Err(CoreError::AlreadyExists(field)));
        }

        let inserted = tx.execute(
          "INSERT INTO users (
             username, email, credential_hash, image_url, role,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![
            input.username,
            input.email,
            input.credential_hash,
            input.image_url,
            role_str,
            at_str,
          ],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(CoreError::AlreadyExists("username or email".into())));
          }
          Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(User {
          id,
          username: input.username,
          email: input.email,
          credential_hash: input.credential_hash,
          image_url: input.image_url,
          role: input.role,
          created_at: now,
          updated_at: now,
          deleted_at: None,
        }))
      })
      .await?;

    Ok(outcome?)
  }

  async fn find_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND deleted_at IS NULL"
              ),
              rusqlite::params![id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids = ids.to_vec();

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {USER_COLUMNS} FROM users WHERE id IN ({}) AND deleted_at IS NULL",
          placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }
}

// ─── Follow graph ────────────────────────────────────────────────────────────

impl GraphStore for SqliteStore {
  async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2
           )",
          rusqlite::params![follower_id, followee_id],
          |r| r.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(exists)
  }

  async fn create_follow(&self, follower_id: i64, followee_id: i64) -> Result<Follow> {
    if follower_id == followee_id {
      return Err(CoreError::SelfFollow.into());
    }
    let now = time::now();
    let at_str = encode_dt(now);

    let outcome: Outcome<Follow> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        for id in [follower_id, followee_id] {
          if !user_is_live(&tx, id)? {
            return Ok(Err(CoreError::UserNotFound(id)));
          }
        }

        // The UNIQUE constraint, not a prior read, decides duplicates.
        let inserted = tx.execute(
          "INSERT INTO follows (follower_id, followee_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![follower_id, followee_id, at_str],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(CoreError::AlreadyFollowing {
              follower: follower_id,
              followee: followee_id,
            }));
          }
          Err(e) => return Err(e.into()),
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(Follow { id, follower_id, followee_id, created_at: now }))
      })
      .await?;

    Ok(outcome?)
  }

  async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
          rusqlite::params![follower_id, followee_id],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(
        CoreError::FollowNotFound { follower: follower_id, followee: followee_id }
          .into(),
      );
    }
    Ok(())
  }

  async fn list_followers(&self, user_id: i64, page: PageRequest) -> Result<Vec<Follow>> {
    self.follow_window("followee_id", "follows.follower_id", user_id, page).await
  }

  async fn list_following(&self, user_id: i64, page: PageRequest) -> Result<Vec<Follow>> {
    self.follow_window("follower_id", "follows.followee_id", user_id, page).await
  }

  async fn list_followee_ids(&self, user_id: i64) -> Result<BTreeSet<i64>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT followee_id FROM follows WHERE follower_id = ?1")?;
        let ids = stmt
          .query_map(rusqlite::params![user_id], |r| r.get::<_, i64>(0))?
          .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }
}

// ─── Posts ───────────────────────────────────────────────────────────────────

impl PostStore for SqliteStore {
  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let now = time::now();
    let at_str = encode_dt(now);

    let outcome: Outcome<Post> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !user_is_live(&tx, input.author_id)? {
          return Ok(Err(CoreError::UserNotFound(input.author_id)));
        }
        tx.execute(
          "INSERT INTO posts (author_id, title, body, image_url, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![
            input.author_id,
            input.title,
            input.body,
            input.image_url,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(Post {
          id,
          author_id: input.author_id,
          title: input.title,
          body: input.body,
          image_url: input.image_url,
          created_at: now,
          updated_at: now,
          deleted_at: None,
        }))
      })
      .await?;

    Ok(outcome?)
  }

  async fn find_post(&self, id: i64) -> Result<Option<Post>> {
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE id = ?1 AND {}",
                live_post_filter()
              ),
              rusqlite::params![id],
              RawPost::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn find_feed_window(&self, scope: &FeedScope, page: PageRequest) -> Result<Vec<Post>> {
    // Build WHERE clause dynamically; parameters are bound positionally.
    let mut sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE {}", live_post_filter());
    let mut params: Vec<Value> = Vec::new();

    if let FeedScope::Authors(authors) = scope {
      if authors.is_empty() {
        return Ok(Vec::new());
      }
      // Single JSON array parameter; the author set may exceed SQLite's
      // host parameter limit.
      sql.push_str(" AND author_id IN (SELECT value FROM json_each(?))");
      params.push(Value::Text(json_id_array(authors.iter().copied())));
    }
    if let Some(cursor) = page.cursor() {
      sql.push_str(" AND id < ?");
      params.push(Value::Integer(cursor));
    }
    sql.push_str(" ORDER BY id DESC LIMIT ?");
    params.push(Value::Integer(i64::from(page.fetch_limit())));

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn find_posts_by_ids(&self, ids: &[i64]) -> Result<Vec<Post>> {
    if ids.len() > MAX_POSTS_BY_ID {
      return Err(
        CoreError::InvalidArgument(format!(
          "at most {MAX_POSTS_BY_ID} post ids may be requested, got {}",
          ids.len()
        ))
        .into(),
      );
    }
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let requested = ids.to_vec();
    let bound = requested.clone();

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {POST_COLUMNS} FROM posts WHERE id IN ({}) AND {}",
          placeholders(bound.len()),
          live_post_filter()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(bound.iter()), RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut by_id = raws
      .into_iter()
      .map(|raw| raw.into_post().map(|post| (post.id, post)))
      .collect::<Result<HashMap<_, _>>>()?;

    Ok(requested.iter().filter_map(|id| by_id.remove(id)).collect())
  }

  async fn delete_post(&self, id: i64) -> Result<()> {
    let at_str = encode_dt(time::now());
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE posts SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
          rusqlite::params![at_str, id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(CoreError::PostNotFound(id).into());
    }
    Ok(())
  }
}

// ─── Reactions ───────────────────────────────────────────────────────────────

impl ReactionStore for SqliteStore {
  async fn count_likes(&self, post_ids: &[i64]) -> Result<HashMap<i64, u64>> {
    self
      .count_per_post("likes", user_not_deleted("likes.user_id"), post_ids)
      .await
  }

  async fn count_comments(&self, post_ids: &[i64]) -> Result<HashMap<i64, u64>> {
    self
      .count_per_post(
        "comments",
        format!("deleted_at IS NULL AND {}", user_not_deleted("comments.author_id")),
        post_ids,
      )
      .await
  }

  async fn liked_post_ids(&self, viewer_id: i64, post_ids: &[i64]) -> Result<HashSet<i64>> {
    if post_ids.is_empty() {
      return Ok(HashSet::new());
    }
    let mut params = Vec::with_capacity(post_ids.len() + 1);
    params.push(viewer_id);
    params.extend_from_slice(post_ids);

    let liked = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT post_id FROM likes WHERE user_id = ? AND post_id IN ({})",
          placeholders(params.len() - 1)
        );
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |r| r.get::<_, i64>(0))?
          .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(liked)
  }

  async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE post_id = ?1 AND deleted_at IS NULL AND {}
           ORDER BY id DESC",
          user_not_deleted("comments.author_id")
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post_id], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn create_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
    let at_str = encode_dt(time::now());

    let outcome: Outcome<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !post_is_live(&tx, post_id)? {
          return Ok(Err(CoreError::PostNotFound(post_id)));
        }
        if !user_is_live(&tx, user_id)? {
          return Ok(Err(CoreError::UserNotFound(user_id)));
        }
        let inserted = tx.execute(
          "INSERT INTO likes (post_id, user_id, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (post_id, user_id) DO NOTHING",
          rusqlite::params![post_id, user_id, at_str],
        )?;
        tx.commit()?;
        Ok(Ok(inserted == 1))
      })
      .await?;

    Ok(outcome?)
  }

  async fn delete_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
    let outcome: Outcome<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !post_is_live(&tx, post_id)? {
          return Ok(Err(CoreError::PostNotFound(post_id)));
        }
        let removed = tx.execute(
          "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
          rusqlite::params![post_id, user_id],
        )?;
        tx.commit()?;
        Ok(Ok(removed > 0))
      })
      .await?;

    Ok(outcome?)
  }

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    let now = time::now();
    let at_str = encode_dt(now);

    let outcome: Outcome<Comment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !post_is_live(&tx, input.post_id)? {
          return Ok(Err(CoreError::PostNotFound(input.post_id)));
        }
        if !user_is_live(&tx, input.author_id)? {
          return Ok(Err(CoreError::UserNotFound(input.author_id)));
        }
        tx.execute(
          "INSERT INTO comments (post_id, author_id, body, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![input.post_id, input.author_id, input.body, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(Comment {
          id,
          post_id: input.post_id,
          author_id: input.author_id,
          body: input.body,
          created_at: now,
          updated_at: now,
          deleted_at: None,
        }))
      })
      .await?;

    Ok(outcome?)
  }

  async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<()> {
    let at_str = encode_dt(time::now());
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE comments SET deleted_at = ?1
           WHERE id = ?2 AND post_id = ?3 AND deleted_at IS NULL",
          rusqlite::params![at_str, comment_id, post_id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(CoreError::CommentNotFound(comment_id).into());
    }
    Ok(())
  }
}
