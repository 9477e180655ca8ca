//! Declarative audio and text-effect intents
//!
//! Declarations arrive as compact key:value token strings, e.g.
//! `id:bgm src:/audio/bg.mp3 volume:0.8 loop:true`. The runtime only parses
//! and queues intents; the host drains them and performs actual playback or
//! rendering.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Effect declaration error
#[derive(Debug, Clone, thiserror::Error)]
pub enum EffectError {
    #[error("malformed effect token `{0}` (expected key:value)")]
    MalformedToken(String),
    #[error("duplicate key `{0}` in effect declaration")]
    DuplicateKey(String),
    #[error("effect declaration is missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("key `{key}` has invalid value `{value}`")]
    InvalidValue { key: String, value: String },
}

/// A declared audio playback intent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioIntent {
    pub id: String,
    pub src: String,
    pub volume: f64,
    pub looped: bool,
}

/// A declared text presentation effect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextEffectIntent {
    pub id: String,
    pub kind: String,
    pub intensity: f64,
    pub duration_ms: f64,
}

/// Split a declaration into (key, value) pairs, rejecting repeats
fn parse_pairs(text: &str) -> Result<Vec<(&str, &str)>, EffectError> {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for token in text.split_whitespace() {
        // Values may themselves contain `:` (URLs, paths)
        let Some((key, value)) = token.split_once(':') else {
            return Err(EffectError::MalformedToken(token.to_string()));
        };
        if key.is_empty() || value.is_empty() {
            return Err(EffectError::MalformedToken(token.to_string()));
        }
        if pairs.iter().any(|(k, _)| *k == key) {
            return Err(EffectError::DuplicateKey(key.to_string()));
        }
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn lookup<'a>(pairs: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn require<'a>(pairs: &[(&'a str, &'a str)], key: &'static str) -> Result<&'a str, EffectError> {
    lookup(pairs, key).ok_or(EffectError::MissingKey(key))
}

fn parse_num(key: &str, value: &str) -> Result<f64, EffectError> {
    value.parse().map_err(|_| EffectError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, EffectError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(EffectError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl AudioIntent {
    /// Parse `id:… src:… [volume:…] [loop:…]`
    pub fn parse(text: &str) -> Result<Self, EffectError> {
        let pairs = parse_pairs(text)?;
        Ok(Self {
            id: require(&pairs, "id")?.to_string(),
            src: require(&pairs, "src")?.to_string(),
            volume: match lookup(&pairs, "volume") {
                Some(v) => parse_num("volume", v)?,
                None => 1.0,
            },
            looped: match lookup(&pairs, "loop") {
                Some(v) => parse_bool("loop", v)?,
                None => false,
            },
        })
    }
}

impl TextEffectIntent {
    /// Parse `id:… kind:… [intensity:…] [duration:…]`
    pub fn parse(text: &str) -> Result<Self, EffectError> {
        let pairs = parse_pairs(text)?;
        Ok(Self {
            id: require(&pairs, "id")?.to_string(),
            kind: require(&pairs, "kind")?.to_string(),
            intensity: match lookup(&pairs, "intensity") {
                Some(v) => parse_num("intensity", v)?,
                None => 1.0,
            },
            duration_ms: match lookup(&pairs, "duration") {
                Some(v) => parse_num("duration", v)?,
                None => 0.0,
            },
        })
    }
}

/// Queues declared intents until the host drains them
#[derive(Debug, Default)]
pub struct EffectManager {
    audio: Vec<AudioIntent>,
    text: Vec<TextEffectIntent>,
}

impl EffectManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and queue an audio intent
    pub fn declare_audio(&mut self, text: &str) -> Result<AudioIntent, EffectError> {
        let intent = AudioIntent::parse(text)?;
        debug!("declared audio intent `{}`", intent.id);
        self.audio.push(intent.clone());
        Ok(intent)
    }

    /// Parse and queue a text-effect intent
    pub fn declare_text(&mut self, text: &str) -> Result<TextEffectIntent, EffectError> {
        let intent = TextEffectIntent::parse(text)?;
        debug!("declared text effect `{}` ({})", intent.id, intent.kind);
        self.text.push(intent.clone());
        Ok(intent)
    }

    /// Take every queued audio intent, oldest first
    pub fn drain_audio(&mut self) -> Vec<AudioIntent> {
        std::mem::take(&mut self.audio)
    }

    /// Take every queued text-effect intent, oldest first
    pub fn drain_text(&mut self) -> Vec<TextEffectIntent> {
        std::mem::take(&mut self.text)
    }

    /// Queued audio intents not yet drained
    pub fn pending_audio(&self) -> &[AudioIntent] {
        &self.audio
    }

    /// Queued text-effect intents not yet drained
    pub fn pending_text(&self) -> &[TextEffectIntent] {
        &self.text
    }

    /// Discard every queued intent
    pub fn clear(&mut self) {
        self.audio.clear();
        self.text.clear();
    }
}
