use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{Error, Fields, MemobaseClient, User};

/// Envelope status the service reports for an unknown user.
const NOT_FOUND_STATUS: i64 = 404;

#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

impl MemobaseClient {
    /// Register a user.
    ///
    /// Without an `id` the service assigns one. Returns the user id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), memobase_client::Error> {
    /// use memobase_client::{Fields, MemobaseClient};
    ///
    /// let client = MemobaseClient::new("http://localhost:8019", Some("secret"))?;
    /// let mut data = Fields::new();
    /// data.insert("name".into(), "Gus".into());
    /// let user_id = client.add_user(Some(&data), None).await?;
    /// println!("created {user_id}");
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, data))]
    pub async fn add_user(&self, data: Option<&Fields>, id: Option<&str>) -> Result<String, Error> {
        let request = self
            .request(Method::POST, &["users"])?
            .json(&CreateUserRequest { data, id });
        let user_id = self.execute(request).await?.id()?;
        debug!(user_id = %user_id, "user created");
        Ok(user_id)
    }

    /// Replace a user's data. Returns the user id.
    #[instrument(skip(self, data))]
    pub async fn update_user(&self, user_id: &str, data: &Fields) -> Result<String, Error> {
        let request = self
            .request(Method::PUT, &["users", user_id])?
            .json(data);
        Ok(self.execute(request).await?.id()?)
    }

    /// Fetch a user and return a handle carrying the stored record.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<User<'_>, Error> {
        let request = self.request(Method::GET, &["users", user_id])?;
        let fields = self.execute(request).await?.into_fields();
        Ok(User::new(self, user_id, fields))
    }

    /// A handle for `user_id` without contacting the service.
    pub fn user(&self, user_id: impl Into<String>) -> User<'_> {
        User::new(self, user_id, Fields::new())
    }

    /// Fetch a user, creating it under the same id if the service does not
    /// know it.
    ///
    /// Only a not-found reply (envelope status 404) triggers creation. Other
    /// service failures, such as a rejected key, and transport or decoding
    /// errors are returned as is.
    #[instrument(skip(self))]
    pub async fn get_or_create_user(&self, user_id: &str) -> Result<User<'_>, Error> {
        match self.get_user(user_id).await {
            Ok(user) => Ok(user),
            Err(Error::Service { status, message }) if status == NOT_FOUND_STATUS => {
                debug!(message = %message, "user not found, creating");
                self.add_user(None, Some(user_id)).await?;
                Ok(self.user(user_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a user and everything stored for it.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        let request = self.request(Method::DELETE, &["users", user_id])?;
        self.execute(request).await?;
        Ok(())
    }
}
