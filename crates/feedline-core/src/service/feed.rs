//! The feed assembler.

use crate::{
  Error, Result,
  page::{Page, PageRequest},
  post::Post,
  store::{FeedScope, FeedStore},
  view::PostView,
};

use super::Service;

impl<S> Service<S>
where
  S: FeedStore,
  Error: From<S::Error>,
{
  /// One page of the reverse-chronological feed.
  ///
  /// An anonymous viewer sees every post; a known viewer sees posts by the
  /// users they follow (not their own). The `size + 1` window is cut down
  /// before any reaction or author lookup, so the row that only signals
  /// `has_next` costs nothing extra.
  #[tracing::instrument(skip(self))]
  pub async fn feed(
    &self,
    viewer_id: Option<i64>,
    page: PageRequest,
  ) -> Result<Page<PostView>> {
    let scope = match viewer_id {
      Some(viewer) => {
        let followees = self.store.list_followee_ids(viewer).await?;
        if followees.is_empty() {
          return Ok(Page::empty());
        }
        FeedScope::Authors(followees)
      }
      None => FeedScope::Public,
    };

    let window = self.store.find_feed_window(&scope, page).await?;
    let page = Page::from_window(window, page.size(), |post| post.id);
    tracing::debug!(
      items = page.items.len(),
      has_next = page.has_next,
      "feed window"
    );

    let Page { items, next_cursor, has_next } = page;
    let items = self.assemble_list(items, viewer_id).await?;
    Ok(Page { items, next_cursor, has_next })
  }

  /// Attach authors and reaction summaries to `posts`, keeping their order.
  /// Comment bodies are never inlined in lists.
  pub(super) async fn assemble_list(
    &self,
    posts: Vec<Post>,
    viewer_id: Option<i64>,
  ) -> Result<Vec<PostView>> {
    let post_ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
    let reactions = self.load_reactions(&post_ids, viewer_id).await?;
    let authors = self
      .resolve_users(posts.iter().map(|post| post.author_id))
      .await?;

    posts
      .into_iter()
      .map(|post| {
        let author = authors.get(post.author_id)?;
        let reactions = reactions.for_post(post.id);
        Ok(PostView::new(post, author, reactions))
      })
      .collect()
  }
}
