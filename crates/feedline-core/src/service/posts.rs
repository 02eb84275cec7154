//! Single-post detail, multi-post fetch, and the post/comment/like commands.

use std::collections::HashSet;

use crate::{
  Error, Result,
  post::{MAX_POSTS_BY_ID, NewComment, NewPost},
  store::FeedStore,
  view::{CommentView, PostView, Reactions},
};

use super::Service;

impl<S> Service<S>
where
  S: FeedStore,
  Error: From<S::Error>,
{
  // ── Posts ─────────────────────────────────────────────────────────────────

  #[tracing::instrument(skip_all, fields(author_id = input.author_id))]
  pub async fn create_post(&self, input: NewPost) -> Result<PostView> {
    let post = self.store.create_post(input).await?;
    tracing::info!(post_id = post.id, "post created");
    let authors = self.resolve_users([post.author_id]).await?;
    let author = authors.get(post.author_id)?;
    Ok(PostView::new(post, author, Reactions::default()))
  }

  /// Single-post detail: the only view that inlines comments.
  #[tracing::instrument(skip(self))]
  pub async fn post(&self, post_id: i64, viewer_id: Option<i64>) -> Result<PostView> {
    let post = self
      .store
      .find_post(post_id)
      .await?
      .ok_or(Error::PostNotFound(post_id))?;
    let comments = self.store.list_comments(post_id).await?;
    // The comment count comes from the list itself.
    let batch = self.load_likes(&[post_id], viewer_id).await?;
    let authors = self
      .resolve_users(
        std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id)),
      )
      .await?;

    let mut reactions = batch.for_post(post_id);
    reactions.comment.count = comments.len() as u64;
    reactions.comment.items = comments
      .into_iter()
      .map(|comment| {
        let author = authors.get(comment.author_id)?;
        Ok(CommentView::new(comment, author))
      })
      .collect::<Result<_>>()?;

    let author = authors.get(post.author_id)?;
    Ok(PostView::new(post, author, reactions))
  }

  /// Fetch up to [`MAX_POSTS_BY_ID`] posts in the order requested. Missing
  /// and deleted posts are left out; repeated ids are returned once.
  #[tracing::instrument(skip(self))]
  pub async fn posts(
    &self,
    post_ids: &[i64],
    viewer_id: Option<i64>,
  ) -> Result<Vec<PostView>> {
    if post_ids.len() > MAX_POSTS_BY_ID {
      return Err(Error::InvalidArgument(format!(
        "at most {MAX_POSTS_BY_ID} post ids may be requested, got {}",
        post_ids.len()
      )));
    }
    let mut seen = HashSet::new();
    let ids: Vec<i64> = post_ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let posts = self.store.find_posts_by_ids(&ids).await?;
    self.assemble_list(posts, viewer_id).await
  }

  #[tracing::instrument(skip(self))]
  pub async fn delete_post(&self, post_id: i64) -> Result<()> {
    self.store.delete_post(post_id).await?;
    tracing::info!("post deleted");
    Ok(())
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  /// Every live comment on a post, newest first.
  #[tracing::instrument(skip(self))]
  pub async fn comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
    if self.store.find_post(post_id).await?.is_none() {
      return Err(Error::PostNotFound(post_id));
    }
    let comments = self.store.list_comments(post_id).await?;
    let authors = self
      .resolve_users(comments.iter().map(|comment| comment.author_id))
      .await?;
    comments
      .into_iter()
      .map(|comment| {
        let author = authors.get(comment.author_id)?;
        Ok(CommentView::new(comment, author))
      })
      .collect()
  }

  #[tracing::instrument(skip_all, fields(post_id = input.post_id, author_id = input.author_id))]
  pub async fn create_comment(&self, input: NewComment) -> Result<CommentView> {
    let comment = self.store.create_comment(input).await?;
    tracing::info!(comment_id = comment.id, "comment created");
    let authors = self.resolve_users([comment.author_id]).await?;
    let author = authors.get(comment.author_id)?;
    Ok(CommentView::new(comment, author))
  }

  #[tracing::instrument(skip(self))]
  pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> Result<()> {
    self.store.delete_comment(post_id, comment_id).await?;
    tracing::info!("comment deleted");
    Ok(())
  }

  // ── Likes ─────────────────────────────────────────────────────────────────

  /// Idempotent: liking twice leaves one like.
  #[tracing::instrument(skip(self))]
  pub async fn like(&self, post_id: i64, user_id: i64) -> Result<()> {
    let inserted = self.store.create_like(post_id, user_id).await?;
    tracing::debug!(inserted, "like");
    Ok(())
  }

  /// Idempotent: unliking a post that was never liked is not an error.
  #[tracing::instrument(skip(self))]
  pub async fn unlike(&self, post_id: i64, user_id: i64) -> Result<()> {
    let removed = self.store.delete_like(post_id, user_id).await?;
    tracing::debug!(removed, "unlike");
    Ok(())
  }
}
