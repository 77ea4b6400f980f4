//! Operations scoped to a single user's namespace.

use memobase_core::{Blob, BlobData, BlobType, Fields, ProfileReport, UserEvent, UserProfile};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use crate::query::{ContextQuery, ProfileQuery};
use crate::{Error, MemobaseClient};

/// Handle to one end-user of a project.
///
/// Borrows the client it was created from. Deleting the remote user makes the
/// handle stale; the handle itself needs no teardown.
#[derive(Debug, Clone)]
pub struct User<'c> {
    user_id: String,
    client: &'c MemobaseClient,
    fields: Fields,
}

impl<'c> User<'c> {
    pub(crate) fn new(client: &'c MemobaseClient, user_id: impl Into<String>, fields: Fields) -> Self {
        Self {
            user_id: user_id.into(),
            client,
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.user_id
    }

    /// User record as returned by the service, empty for handles created
    /// without a lookup.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn client(&self) -> &'c MemobaseClient {
        self.client
    }

    /// Store a blob for this user and return its id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), memobase_client::Error> {
    /// use memobase_client::{Blob, MemobaseClient, TranscriptStamp};
    ///
    /// let client = MemobaseClient::new("http://localhost:8019", Some("secret"))?;
    /// let user = client.user("user-1");
    /// let blob = Blob::transcript([
    ///     TranscriptStamp::new("Good morning", 0.0).with_end(1.2).with_speaker("host"),
    ///     TranscriptStamp::new("Morning!", 1.4),
    /// ]);
    /// let blob_id = user.insert(&blob).await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, blob), fields(user_id = %self.user_id, blob_type = %blob.blob_type()))]
    pub async fn insert(&self, blob: &Blob) -> Result<String, Error> {
        blob.content().validate()?;
        let request = self
            .client
            .request(Method::POST, &["blobs", "insert", self.user_id.as_str()])?
            .json(blob);
        let blob_id = self.client.execute(request).await?.id()?;
        debug!(blob_id = %blob_id, "blob inserted");
        Ok(blob_id)
    }

    /// Fetch a blob and reconstruct its typed variant.
    pub async fn get(&self, blob_id: &str) -> Result<Blob, Error> {
        Ok(self.get_data(blob_id).await?.into_blob()?)
    }

    /// Fetch a blob in its wire form, including `updated_at`.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn get_data(&self, blob_id: &str) -> Result<BlobData, Error> {
        let request = self
            .client
            .request(Method::GET, &["blobs", self.user_id.as_str(), blob_id])?;
        Ok(self.client.execute(request).await?.into_blob_data()?)
    }

    /// List blob ids of one type. `page` is 0-based.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn get_all(
        &self,
        blob_type: BlobType,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<String>, Error> {
        let request = self
            .client
            .request(
                Method::GET,
                &["users", "blobs", self.user_id.as_str(), blob_type.as_str()],
            )?
            .query(&[("page", page), ("page_size", page_size)]);
        Ok(self.client.execute(request).await?.ids()?)
    }

    /// Delete a blob.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn delete(&self, blob_id: &str) -> Result<(), Error> {
        let request = self
            .client
            .request(Method::DELETE, &["blobs", self.user_id.as_str(), blob_id])?;
        self.client.execute(request).await?;
        Ok(())
    }

    /// Ask the service to process buffered blobs of one type.
    ///
    /// Success means the request was accepted. Processing runs on the
    /// service side and its completion is not observable here; poll
    /// [`profile`](Self::profile) if you need the results.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn flush(&self, blob_type: BlobType) -> Result<(), Error> {
        let request = self.client.request(
            Method::POST,
            &["users", "buffer", self.user_id.as_str(), blob_type.as_str()],
        )?;
        self.client.execute(request).await?;
        debug!("flush accepted");
        Ok(())
    }

    /// Read the user's profiles.
    ///
    /// Entries the client cannot decode are skipped with a warning rather
    /// than failing the call. Use [`profile_report`](Self::profile_report)
    /// to see what was skipped.
    pub async fn profile(&self, query: &ProfileQuery) -> Result<Vec<UserProfile>, Error> {
        let report = self.profile_report(query).await?;
        for skipped in &report.skipped {
            warn!(
                user_id = %self.user_id,
                index = skipped.index,
                reason = %skipped.reason,
                "skipping malformed profile entry"
            );
        }
        Ok(report.profiles)
    }

    /// Read the user's profiles along with the entries that failed to decode.
    #[instrument(skip(self, query), fields(user_id = %self.user_id))]
    pub async fn profile_report(&self, query: &ProfileQuery) -> Result<ProfileReport, Error> {
        let request = self
            .client
            .request(Method::GET, &["users", "profile", self.user_id.as_str()])?
            .query(&query.to_pairs());
        Ok(self.client.execute(request).await?.profiles()?)
    }

    /// Delete one profile entry.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn delete_profile(&self, profile_id: &str) -> Result<(), Error> {
        let request = self.client.request(
            Method::DELETE,
            &["users", "profile", self.user_id.as_str(), profile_id],
        )?;
        self.client.execute(request).await?;
        Ok(())
    }

    /// Most recent memory events, newest first.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn events(
        &self,
        topk: u32,
        max_token_size: Option<u32>,
    ) -> Result<Vec<UserEvent>, Error> {
        let mut params = vec![("topk", topk.to_string())];
        if let Some(size) = max_token_size {
            params.push(("max_token_size", size.to_string()));
        }
        let request = self
            .client
            .request(Method::GET, &["users", "event", self.user_id.as_str()])?
            .query(&params);
        Ok(self.client.execute(request).await?.events()?)
    }

    /// Prompt-ready memory context assembled from profiles and events.
    #[instrument(skip(self, query), fields(user_id = %self.user_id))]
    pub async fn context(&self, query: &ContextQuery) -> Result<String, Error> {
        let request = self
            .client
            .request(Method::GET, &["users", "context", self.user_id.as_str()])?
            .query(&query.to_pairs());
        Ok(self.client.execute(request).await?.context()?)
    }
}
