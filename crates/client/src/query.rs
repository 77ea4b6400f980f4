//! Query options for profile and context reads.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Filtering and truncation options for [`User::profile`](crate::User::profile).
///
/// Unset options are not sent; the service then applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileQuery {
    /// Maximum number of profiles to return.
    pub topk: Option<u32>,
    /// Token budget for the returned profile content.
    pub max_token_size: Option<u32>,
    /// Topics ranked first when truncating.
    pub prefer_topics: Vec<String>,
    /// Only return profiles with these topics.
    pub only_topics: Vec<String>,
    /// Maximum number of sub-topics per topic.
    pub max_subtopic_size: Option<u32>,
    /// Per-topic sub-topic limits, overriding `max_subtopic_size`.
    pub topic_limits: BTreeMap<String, u32>,
}

impl ProfileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topk(mut self, topk: u32) -> Self {
        self.topk = Some(topk);
        self
    }

    #[must_use]
    pub fn max_token_size(mut self, max_token_size: u32) -> Self {
        self.max_token_size = Some(max_token_size);
        self
    }

    #[must_use]
    pub fn prefer_topic(mut self, topic: impl Into<String>) -> Self {
        self.prefer_topics.push(topic.into());
        self
    }

    #[must_use]
    pub fn only_topic(mut self, topic: impl Into<String>) -> Self {
        self.only_topics.push(topic.into());
        self
    }

    #[must_use]
    pub fn max_subtopic_size(mut self, size: u32) -> Self {
        self.max_subtopic_size = Some(size);
        self
    }

    #[must_use]
    pub fn topic_limit(mut self, topic: impl Into<String>, limit: u32) -> Self {
        self.topic_limits.insert(topic.into(), limit);
        self
    }

    /// Query pairs in request order. List options repeat their key.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(topk) = self.topk {
            params.push(("topk", topk.to_string()));
        }
        push_shared(
            &mut params,
            self.max_token_size,
            &self.prefer_topics,
            &self.only_topics,
            self.max_subtopic_size,
            &self.topic_limits,
        );
        params
    }
}

/// Options for [`User::context`](crate::User::context).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextQuery {
    /// Token budget for the whole context.
    pub max_token_size: Option<u32>,
    pub prefer_topics: Vec<String>,
    pub only_topics: Vec<String>,
    pub max_subtopic_size: Option<u32>,
    pub topic_limits: BTreeMap<String, u32>,
    /// Share of the budget given to profiles rather than events (0.0 to 1.0).
    pub profile_event_ratio: Option<f64>,
}

impl ContextQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_token_size(mut self, max_token_size: u32) -> Self {
        self.max_token_size = Some(max_token_size);
        self
    }

    #[must_use]
    pub fn prefer_topic(mut self, topic: impl Into<String>) -> Self {
        self.prefer_topics.push(topic.into());
        self
    }

    #[must_use]
    pub fn only_topic(mut self, topic: impl Into<String>) -> Self {
        self.only_topics.push(topic.into());
        self
    }

    #[must_use]
    pub fn max_subtopic_size(mut self, size: u32) -> Self {
        self.max_subtopic_size = Some(size);
        self
    }

    #[must_use]
    pub fn topic_limit(mut self, topic: impl Into<String>, limit: u32) -> Self {
        self.topic_limits.insert(topic.into(), limit);
        self
    }

    #[must_use]
    pub fn profile_event_ratio(mut self, ratio: f64) -> Self {
        self.profile_event_ratio = Some(ratio);
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_shared(
            &mut params,
            self.max_token_size,
            &self.prefer_topics,
            &self.only_topics,
            self.max_subtopic_size,
            &self.topic_limits,
        );
        if let Some(ratio) = self.profile_event_ratio {
            params.push(("profile_event_ratio", ratio.to_string()));
        }
        params
    }
}

fn push_shared(
    params: &mut Vec<(&'static str, String)>,
    max_token_size: Option<u32>,
    prefer_topics: &[String],
    only_topics: &[String],
    max_subtopic_size: Option<u32>,
    topic_limits: &BTreeMap<String, u32>,
) {
    if let Some(size) = max_token_size {
        params.push(("max_token_size", size.to_string()));
    }
    for topic in prefer_topics {
        params.push(("prefer_topics", topic.clone()));
    }
    for topic in only_topics {
        params.push(("only_topics", topic.clone()));
    }
    if let Some(size) = max_subtopic_size {
        params.push(("max_subtopic_size", size.to_string()));
    }
    if !topic_limits.is_empty() {
        let limits: Map<String, Value> = topic_limits
            .iter()
            .map(|(topic, limit)| (topic.clone(), Value::from(*limit)))
            .collect();
        params.push(("topic_limits_json", Value::Object(limits).to_string()));
    }
}
