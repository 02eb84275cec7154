//! Follow and unfollow, plus the follower/following listings.

use crate::{
  Error, Result,
  page::{Page, PageRequest},
  store::FeedStore,
  user::Follow,
  view::UserSummary,
};

use super::Service;

impl<S> Service<S>
where
  S: FeedStore,
  Error: From<S::Error>,
{
  #[tracing::instrument(skip(self))]
  pub async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<Follow> {
    if follower_id == followee_id {
      return Err(Error::SelfFollow);
    }
    let edge = self.store.create_follow(follower_id, followee_id).await?;
    tracing::info!(edge_id = edge.id, "follow created");
    Ok(edge)
  }

  #[tracing::instrument(skip(self))]
  pub async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<()> {
    self.store.delete_follow(follower_id, followee_id).await?;
    tracing::info!("follow removed");
    Ok(())
  }

  pub async fn is_following(
    &self,
    follower_id: i64,
    followee_id: i64,
  ) -> Result<bool> {
    Ok(self.store.is_following(follower_id, followee_id).await?)
  }

  /// Users following `user_id`, most recent follow first. The cursor is a
  /// follow edge id.
  #[tracing::instrument(skip(self))]
  pub async fn followers(
    &self,
    user_id: i64,
    page: PageRequest,
  ) -> Result<Page<UserSummary>> {
    let edges = self.store.list_followers(user_id, page).await?;
    self.resolve_edges(edges, page, |edge| edge.follower_id).await
  }

  /// Users `user_id` follows, most recent follow first. The cursor is a
  /// follow edge id.
  #[tracing::instrument(skip(self))]
  pub async fn following(
    &self,
    user_id: i64,
    page: PageRequest,
  ) -> Result<Page<UserSummary>> {
    let edges = self.store.list_following(user_id, page).await?;
    self.resolve_edges(edges, page, |edge| edge.followee_id).await
  }

  async fn resolve_edges(
    &self,
    edges: Vec<Follow>,
    page: PageRequest,
    counterpart: fn(&Follow) -> i64,
  ) -> Result<Page<UserSummary>> {
    let page = Page::from_window(edges, page.size(), |edge| edge.id);
    let users = self.resolve_users(page.items.iter().map(counterpart)).await?;
    page.try_map(|edge| users.get(counterpart(&edge)))
  }
}
