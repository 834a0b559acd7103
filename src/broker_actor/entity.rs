//! Topic log records.

use crate::framework::StoreEntity;
use crate::publisher::OutboundMessage;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One appended message.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRecord {
    pub offset: u64,
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    pub producer_id: Uuid,
    pub sequence: Option<u64>,
}

/// The log is append-only.
#[derive(Debug, Clone)]
pub enum TopicUpdate {}

#[derive(Debug, Clone)]
pub enum TopicFilter {
    Topic(String),
    Producer { producer_id: Uuid, sequence: u64 },
}

impl StoreEntity for TopicRecord {
    type Id = u64;
    type Create = OutboundMessage;
    type Update = TopicUpdate;
    type Filter = TopicFilter;

    fn from_create_params(offset: u64, message: OutboundMessage) -> Result<Self, String> {
        if message.topic.is_empty() {
            return Err("topic must not be empty".into());
        }
        Ok(Self {
            offset,
            topic: message.topic,
            key: message.key,
            value: message.value,
            timestamp: message.timestamp,
            producer_id: message.producer_id,
            sequence: message.sequence,
        })
    }

    fn apply_update(&mut self, update: TopicUpdate) -> Result<(), String> {
        match update {}
    }

    fn matches(&self, filter: &TopicFilter) -> bool {
        match filter {
            TopicFilter::Topic(topic) => self.topic == *topic,
            TopicFilter::Producer { producer_id, sequence } => {
                self.producer_id == *producer_id && self.sequence == Some(*sequence)
            }
        }
    }

    /// Idempotent producers stamp a sequence; the broker keeps one record per
    /// `(producer session, sequence)`.
    fn unique_key(&self) -> Option<String> {
        self.sequence.map(|sequence| format!("{}:{sequence}", self.producer_id))
    }
}
