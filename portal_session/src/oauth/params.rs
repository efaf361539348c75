use url::Url;

/// Query parameters the identity provider redirect lands with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthCallbackParams {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl OAuthCallbackParams {
    pub fn new(access_token: Option<&str>, error: Option<&str>) -> Self {
        Self {
            access_token: access_token.map(str::to_string),
            error: error.map(str::to_string),
            error_description: None,
        }
    }

    /// Parse a raw query string, with or without the leading `?`.
    /// Empty values count as absent and the first occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "access_token" | "token" => &mut params.access_token,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.to_string());
        }

        params
    }

    /// Parse the query of a full callback URL.
    pub fn from_url(callback_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(callback_url)?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }
}
