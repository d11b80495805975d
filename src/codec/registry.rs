use super::{Codec, DecoderBackend, PassthroughCodec};
use crate::av::{CodecParams, StreamKind};
use crate::error::Result;

/// Builds a native codec for the given parameters.
pub type CodecFactory = Box<dyn Fn(&CodecParams) -> Result<Box<dyn Codec>> + Send + Sync>;

enum EntryKind {
    Native(CodecFactory),
    Passthrough,
}

/// One decoder implementation able to handle one codec.
pub struct CodecEntry {
    /// Decoder name, matched against the preferred decoder lists.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Stream kind the decoder handles.
    pub kind: StreamKind,
    /// Codec the decoder handles.
    pub codec: String,
    factory: EntryKind,
}

impl CodecEntry {
    /// Whether the entry forwards compressed audio.
    pub fn is_passthrough(&self) -> bool {
        matches!(self.factory, EntryKind::Passthrough)
    }

    /// `"name (description)"`, as shown to the user.
    pub fn desc(&self) -> String {
        format!("{} ({})", self.name, self.description)
    }

    /// Instantiates the decoder.
    pub fn create(&self, params: &CodecParams) -> Result<DecoderBackend> {
        match &self.factory {
            EntryKind::Native(factory) => Ok(DecoderBackend::native(self.kind, factory(params)?)),
            EntryKind::Passthrough => Ok(DecoderBackend::Passthrough(PassthroughCodec::new(params))),
        }
    }
}

impl std::fmt::Debug for CodecEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("codec", &self.codec)
            .field("passthrough", &self.is_passthrough())
            .finish()
    }
}

/// All decoders known to the application.
#[derive(Debug, Default)]
pub struct CodecRegistry {
    entries: Vec<CodecEntry>,
}

impl CodecRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a native decoder `name` for `codec`.
    pub fn register<F>(&mut self, kind: StreamKind, codec: &str, name: &str, description: &str, factory: F)
    where
        F: Fn(&CodecParams) -> Result<Box<dyn Codec>> + Send + Sync + 'static,
    {
        self.entries.push(CodecEntry {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            codec: codec.to_string(),
            factory: EntryKind::Native(Box::new(factory)),
        });
    }

    /// Registers bitstream passthrough for the audio codec `codec`.
    pub fn register_passthrough(&mut self, codec: &str) {
        self.entries.push(CodecEntry {
            name: format!("spdif_{}", codec),
            description: format!("passthrough for {}", codec),
            kind: StreamKind::Audio,
            codec: codec.to_string(),
            factory: EntryKind::Passthrough,
        });
    }

    /// Candidate decoders for `params`, in the order they should be tried.
    ///
    /// Names in `preferred` come first, in the given order. Passthrough
    /// entries are used only for codecs listed in `passthrough`, and then
    /// take priority over everything else.
    pub fn select(&self, params: &CodecParams, preferred: &[String], passthrough: &[String]) -> Vec<&CodecEntry> {
        let use_passthrough = params.kind == StreamKind::Audio && passthrough.iter().any(|c| *c == params.codec);

        let mut matching: Vec<&CodecEntry> = self
            .entries
            .iter()
            .filter(|e| e.kind == params.kind && e.codec == params.codec)
            .filter(|e| use_passthrough || !e.is_passthrough())
            .collect();

        let rank = |entry: &CodecEntry| -> usize {
            if entry.is_passthrough() {
                return 0;
            }
            preferred
                .iter()
                .position(|name| *name == entry.name)
                .map_or(preferred.len() + 1, |pos| pos + 1)
        };
        // stable: registration order breaks ties
        matching.sort_by_key(|e| rank(*e));
        matching
    }
}
