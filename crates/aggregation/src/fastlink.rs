use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Provider IDs offered first in the FastLink site search.
const SITE_SEARCH_PROVIDER_IDS: &str = "16441,16442,16443,16444,16445";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FastLinkFlow {
    #[default]
    Aggregation,
    Verification,
}

impl FastLinkFlow {
    pub fn as_str(self) -> &'static str {
        match self {
            FastLinkFlow::Aggregation => "Aggregation",
            FastLinkFlow::Verification => "Verification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastLinkOptions {
    /// DOM element the widget is mounted into.
    pub container_id: String,
    #[serde(default)]
    pub flow: FastLinkFlow,
}

/// Configuration object handed to the FastLink browser widget.
pub fn fastlink_config(
    fastlink_url: &str,
    login_name: &str,
    access_token: &str,
    options: &FastLinkOptions,
) -> Value {
    json!({
        "fastLinkURL": fastlink_url,
        "token": {
            "tokenType": "AccessToken",
            "value": access_token,
        },
        "config": {
            "flow": options.flow.as_str(),
            "iframeTarget": options.container_id,
            "providerSearchInput": true,
            "base64ImageSrc": true,
            "siteSearchProviderIds": SITE_SEARCH_PROVIDER_IDS,
        },
        "user": {
            "loginName": login_name,
        },
    })
}
