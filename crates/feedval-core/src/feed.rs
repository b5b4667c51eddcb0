//! # Typed Feed Model
//!
//! Strongly-typed records for one feed configuration entry, decoded from a
//! [`Document`] after schema validation has accepted it.
//!
//! Keys are kebab-case in documents (`file-watcher`, `inbound-datasets`,
//! `max-file-size`). Unknown keys are ignored here; rejecting them is the
//! schema layer's job.
//!
//! ## Ingestion Source
//!
//! A feed owns exactly one [`IngestionSource`]. Documents carry the source
//! as one of three optional keys; [`FeedConfig`] resolves them into the
//! enum during decoding, so code downstream of the decoder matches on a
//! variant instead of probing three options.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::document::{Document, NodeKind};
use crate::error::{DecodeError, ShapeError, SourceError};

fn default_active() -> bool {
    true
}

/// Unsigned fields that documents may spell as integral floats (`60.0`).
/// YAML writers emit them, and draft-07 `integer` accepts them.
mod whole_number {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{Deserializer, Error, Unexpected, Visitor};

    const EXPECTED: &str = "a non-negative whole number in range";

    /// 2^64, the first float past `u64::MAX`.
    const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

    pub(super) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64>,
    {
        deserializer.deserialize_option(OptionalWhole(PhantomData))
    }

    struct OptionalWhole<T>(PhantomData<T>);

    impl<'de, T: TryFrom<u64>> Visitor<'de> for OptionalWhole<T> {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(EXPECTED)
        }

        fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(Whole(PhantomData)).map(Some)
        }
    }

    struct Whole<T>(PhantomData<T>);

    impl<'de, T: TryFrom<u64>> Visitor<'de> for Whole<T> {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(EXPECTED)
        }

        fn visit_u64<E: Error>(self, n: u64) -> Result<T, E> {
            T::try_from(n).map_err(|_| E::invalid_value(Unexpected::Unsigned(n), &EXPECTED))
        }

        fn visit_i64<E: Error>(self, n: i64) -> Result<T, E> {
            match u64::try_from(n) {
                Ok(n) => self.visit_u64(n),
                Err(_) => Err(E::invalid_value(Unexpected::Signed(n), &EXPECTED)),
            }
        }

        fn visit_f64<E: Error>(self, x: f64) -> Result<T, E> {
            if x.fract() == 0.0 && (0.0..U64_BOUND).contains(&x) {
                self.visit_u64(x as u64)
            } else {
                Err(E::invalid_value(Unexpected::Float(x), &EXPECTED))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// One data-ingestion configuration entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFeedConfig")]
pub struct FeedConfig {
    /// Feed name; never empty.
    pub name: String,
    /// Whether the feed is enabled. Defaults to `true`.
    pub active: bool,
    /// Optional processing layer label.
    pub layer: Option<String>,
    /// Optional log location for the feed.
    pub logs_uri: Option<String>,
    /// The single ingestion source this feed reads from.
    pub source: IngestionSource,
    /// Datasets expected from the source, in document order.
    pub inbound_datasets: Vec<InboundDataset>,
}

impl FeedConfig {
    /// The file-watcher source, if that is the variant in use.
    pub fn file_watcher(&self) -> Option<&FileWatcher> {
        match &self.source {
            IngestionSource::FileWatcher(fw) => Some(fw),
            _ => None,
        }
    }

    /// The kafka-file-replay source, if that is the variant in use.
    pub fn kafka_file_replay(&self) -> Option<&KafkaFileReplay> {
        match &self.source {
            IngestionSource::KafkaFileReplay(replay) => Some(replay),
            _ => None,
        }
    }

    /// The kafka-topic source, if that is the variant in use.
    pub fn kafka_topic(&self) -> Option<&KafkaTopic> {
        match &self.source {
            IngestionSource::KafkaTopic(topic) => Some(topic),
            _ => None,
        }
    }

    /// Kafka client settings of a Kafka-based source.
    pub fn kafka_configs(&self) -> Option<&BTreeMap<String, ConfigScalar>> {
        match &self.source {
            IngestionSource::FileWatcher(_) => None,
            IngestionSource::KafkaFileReplay(replay) => Some(&replay.configs),
            IngestionSource::KafkaTopic(topic) => Some(&topic.configs),
        }
    }
}

/// Wire shape of a feed before the source variant is resolved.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawFeedConfig {
    name: String,
    #[serde(default = "default_active")]
    active: bool,
    layer: Option<String>,
    logs_uri: Option<String>,
    file_watcher: Option<FileWatcher>,
    kafka_file_replay: Option<KafkaFileReplay>,
    kafka_topic: Option<KafkaTopic>,
    #[serde(default)]
    inbound_datasets: Vec<InboundDataset>,
}

impl TryFrom<RawFeedConfig> for FeedConfig {
    type Error = ShapeError;

    fn try_from(raw: RawFeedConfig) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(ShapeError::EmptyName);
        }
        let source = match (raw.file_watcher, raw.kafka_file_replay, raw.kafka_topic) {
            (Some(fw), None, None) => IngestionSource::FileWatcher(fw),
            (None, Some(replay), None) => IngestionSource::KafkaFileReplay(replay),
            (None, None, Some(topic)) => IngestionSource::KafkaTopic(topic),
            (None, None, None) => return Err(SourceError::Missing.into()),
            (fw, replay, topic) => {
                let present: Vec<&str> = [
                    fw.map(|_| SourceKind::FileWatcher),
                    replay.map(|_| SourceKind::KafkaFileReplay),
                    topic.map(|_| SourceKind::KafkaTopic),
                ]
                .into_iter()
                .flatten()
                .map(|kind| kind.as_str())
                .collect();
                return Err(SourceError::Ambiguous(present.join(", ")).into());
            }
        };
        Ok(Self {
            name: raw.name,
            active: raw.active,
            layer: raw.layer,
            logs_uri: raw.logs_uri,
            source,
            inbound_datasets: raw.inbound_datasets,
        })
    }
}

// ---------------------------------------------------------------------------
// Ingestion sources
// ---------------------------------------------------------------------------

/// The ingestion-source variant owned by a feed.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestionSource {
    /// Polls a directory for new files.
    FileWatcher(FileWatcher),
    /// Replays files announced on Kafka.
    KafkaFileReplay(KafkaFileReplay),
    /// Consumes records from Kafka topics.
    KafkaTopic(KafkaTopic),
}

impl IngestionSource {
    /// Discriminant of the variant.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::FileWatcher(_) => SourceKind::FileWatcher,
            Self::KafkaFileReplay(_) => SourceKind::KafkaFileReplay,
            Self::KafkaTopic(_) => SourceKind::KafkaTopic,
        }
    }

    /// The source's own `name`, if set.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::FileWatcher(fw) => fw.name.as_deref(),
            Self::KafkaFileReplay(replay) => replay.name.as_deref(),
            Self::KafkaTopic(topic) => topic.name.as_deref(),
        }
    }
}

/// Ingestion-source discriminant, named after its document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `file-watcher`
    FileWatcher,
    /// `kafka-file-replay`
    KafkaFileReplay,
    /// `kafka-topic`
    KafkaTopic,
}

impl SourceKind {
    /// The document key for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileWatcher => "file-watcher",
            Self::KafkaFileReplay => "kafka-file-replay",
            Self::KafkaTopic => "kafka-topic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory-polling source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileWatcher {
    pub name: Option<String>,
    pub active: Option<bool>,
    /// Polling interval in seconds.
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub interval: Option<u64>,
    pub inbound_uri: Option<String>,
    pub preprocess_uri: Option<String>,
    pub monitor_uri: Option<String>,
    pub logs_uri: Option<String>,
    pub transaction: Option<Transaction>,
}

/// Kafka-announced file replay source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KafkaFileReplay {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub flow_class: Option<String>,
    /// Polling interval in seconds.
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub interval: Option<u64>,
    pub inbound_uri: Option<String>,
    pub preprocess_uri: Option<String>,
    pub monitor_uri: Option<String>,
    pub logs_uri: Option<String>,
    pub bootstrap_servers: Option<String>,
    pub topics: Option<String>,
    pub consumer_group_id: Option<String>,
    pub starting_offsets: Option<String>,
    #[serde(default)]
    pub configs: BTreeMap<String, ConfigScalar>,
}

/// Kafka topic consumer source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KafkaTopic {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub flow_class: Option<String>,
    pub inbound_uri: Option<String>,
    pub preprocess_uri: Option<String>,
    pub monitor_uri: Option<String>,
    pub logs_uri: Option<String>,
    pub bootstrap_servers: Option<String>,
    pub topics: Option<String>,
    pub consumer_group_id: Option<String>,
    pub consumer_id: Option<String>,
    pub starting_offsets: Option<String>,
    #[serde(default)]
    pub configs: BTreeMap<String, ConfigScalar>,
}

/// A Kafka client setting value. Settings mix strings, numbers and flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl ConfigScalar {
    /// The string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value denotes the given port, written either as an
    /// integer or as its decimal string.
    pub fn is_port(&self, port: u16) -> bool {
        match self {
            Self::Integer(n) => *n == i64::from(port),
            Self::String(s) => *s == port.to_string(),
            _ => false,
        }
    }
}

impl fmt::Display for ConfigScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Commit / rollback handling for a file-watcher.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Transaction {
    pub commit: Option<Commit>,
    pub rollback: Option<Rollback>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Commit {
    pub success_uri: Option<String>,
    pub done_file: Option<DoneFile>,
}

/// Marker file written after a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DoneFile {
    pub uri: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Rollback {
    pub failure_uri: Option<String>,
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

/// Compression applied to inbound files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Gzip,
    Zip,
    #[serde(rename = "none")]
    Uncompressed,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zip => "zip",
            Self::Uncompressed => "none",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dataset expected from a feed's source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InboundDataset {
    pub name: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Glob or regex selecting the dataset's files.
    pub pattern: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub module: Option<String>,
    pub format: Option<String>,
    pub compression: Option<Compression>,
    pub delimiter: Option<String>,
    #[serde(alias = "trailing-delimeter")]
    pub trailing_delimiter: Option<bool>,
    /// Comma-separated column names to append.
    pub add_columns: Option<String>,
    /// Comma-separated column names to drop.
    pub drop_columns: Option<String>,
    pub cob_script: Option<String>,
    pub text_header: Option<TextHeader>,
    pub text_trailer: Option<TextTrailer>,
    pub output: Option<Output>,
    /// Upper bound on a single inbound file, in bytes.
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub max_file_size: Option<u64>,
}

/// Header line layout of text files: a token plus fixed field positions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TextHeader {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub token: Option<String>,
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub source_name_position: Option<u32>,
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub cob_position: Option<u32>,
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub snapshot_position: Option<u32>,
    pub snapshot_format: Option<String>,
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub record_count_position: Option<u32>,
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub column_count_position: Option<u32>,
    pub column_names_present: Option<bool>,
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub frequency_position: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TextTrailer {
    pub token: Option<String>,
}

/// Where a dataset lands once ingested.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Output {
    pub hive: Option<Hive>,
    pub done_file_uri: Option<String>,
    pub done_file_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Hive {
    pub table_name: Option<String>,
    #[serde(default)]
    pub partitions: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode one feed entry found at position `index` of a document.
pub fn decode_feed(index: usize, value: &Value) -> Result<FeedConfig, DecodeError> {
    FeedConfig::deserialize(value).map_err(|e| DecodeError::Feed {
        index,
        reason: e.to_string(),
    })
}

/// Decode every entry of a feed document.
///
/// The outer error is returned only when the root is not an array. Each
/// entry decodes independently, so one bad entry does not hide the others;
/// the inner vector is index-aligned with the document.
pub fn decode_document(
    document: &Document,
) -> Result<Vec<Result<FeedConfig, DecodeError>>, DecodeError> {
    let entries = document.entries().ok_or(DecodeError::NotAnArray {
        found: NodeKind::of(document.as_value()),
    })?;
    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, value)| decode_feed(index, value))
        .collect())
}
