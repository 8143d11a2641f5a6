use std::env;

use url::Url;

use crate::error::{Error, Result};
use crate::task::UserId;

/// An authenticated session against the hosted backend.
///
/// Signing in is done elsewhere; this only carries what every request needs.
#[derive(Clone, Debug)]
pub struct Session {
    url: Url,
    api_key: String,
    user_id: UserId,
    access_token: String,
}

impl Session {
    pub fn new(url: Url, api_key: String, user_id: UserId, access_token: String) -> Self {
        Self { url, api_key, user_id, access_token }
    }

    /// Build a session from `MYPSICO_URL`, `MYPSICO_API_KEY`, `MYPSICO_USER_ID` and `MYPSICO_ACCESS_TOKEN`.
    ///
    /// The access token defaults to the API key, which is what an anonymous session uses.
    pub fn from_env() -> Result<Self> {
        let url = Url::parse(&require("MYPSICO_URL")?)?;
        let api_key = require("MYPSICO_API_KEY")?;
        let user_id = UserId::from(require("MYPSICO_USER_ID")?);
        let access_token = env::var("MYPSICO_ACCESS_TOKEN").unwrap_or_else(|_| api_key.clone());
        Ok(Self::new(url, api_key, user_id, access_token))
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn api_key(&self) -> &str { &self.api_key }
    pub fn user_id(&self) -> &UserId { &self.user_id }
    pub fn access_token(&self) -> &str { &self.access_token }

    /// Build the URL of a REST resource, e.g. `todos` gives `<backend>/rest/v1/todos`
    pub fn rest_url(&self, resource: &str) -> Result<Url> {
        let mut base = self.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join("rest/v1/")?.join(resource)?)
    }
}

fn require(var: &str) -> Result<String> {
    env::var(var).map_err(|_| Error::MissingConfig(var.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_urls() {
        for base in &["https://abc.backend.io", "https://abc.backend.io/", "https://proxy.org/backend"] {
            let session = Session::new(Url::parse(base).unwrap(), "key".to_string(), UserId::from("u1"), "token".to_string());
            let url = session.rest_url("todos").unwrap();
            assert!(url.as_str().ends_with("/rest/v1/todos"), "{}", url);
        }
        let session = Session::new(Url::parse("https://proxy.org/backend").unwrap(), "key".to_string(), UserId::from("u1"), "token".to_string());
        assert_eq!(session.rest_url("todos").unwrap().as_str(), "https://proxy.org/backend/rest/v1/todos");
    }
}
