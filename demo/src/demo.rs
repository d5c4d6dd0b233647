//! The demo facade: open, index, query, save.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use codec::{parse_message, write_instructions, Instruction, ParseOptions, Snapshot};
use wire::{
    decode_payload, encode_payload, read_frame, write_end, write_frame, MessageFrame, WireResult,
};

use crate::analyzer::{Analyzer, MapSegment};
use crate::error::{DemoError, DemoResult};

/// One indexed message: its raw frame plus lazily materialized state.
#[derive(Debug)]
struct MessageRecord {
    /// The on-disk frame, kept verbatim so saving is byte-exact.
    frame: MessageFrame,
    /// Parsed instructions; `None` until loaded.
    instructions: Option<Vec<Instruction>>,
    /// Set when parsing failed; the instruction list stays empty.
    failed: bool,
    /// Resolved snapshot, populated during analysis.
    snapshot: Option<Snapshot>,
    /// Set when the snapshot's delta baseline was unavailable.
    delta_unresolved: bool,
    /// Set when the snapshot carried a vehicle state.
    has_vehicle: bool,
    /// Set when the message carries a gamestate.
    is_init: bool,
}

impl MessageRecord {
    fn new(frame: MessageFrame) -> Self {
        Self {
            frame,
            instructions: None,
            failed: false,
            snapshot: None,
            delta_unresolved: false,
            has_vehicle: false,
            is_init: false,
        }
    }
}

/// A demo recording: an indexed message sequence with lazy decoding
/// and map-transition analysis.
///
/// The facade owns all per-demo mutable codec state; demos on separate
/// threads are fully independent.
#[derive(Debug)]
pub struct Demo {
    messages: Vec<MessageRecord>,
    maps: Vec<MapSegment>,
    options: ParseOptions,
    decode_codec: huffman::Codec,
    encode_codec: huffman::Codec,
    open: bool,
    analyzed: bool,
}

impl Default for Demo {
    fn default() -> Self {
        Self::new()
    }
}

impl Demo {
    /// Creates an empty, closed demo.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Creates a demo with explicit parsing options.
    #[must_use]
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            messages: Vec::new(),
            maps: Vec::new(),
            options,
            decode_codec: huffman::Codec::new(),
            encode_codec: huffman::Codec::new(),
            open: false,
            analyzed: false,
        }
    }

    /// Loads a demo file and builds the message index; runs analysis
    /// when requested. Returns `false` on unrecoverable structural
    /// failure, leaving the demo closed.
    pub fn open(&mut self, path: impl AsRef<Path>, analyze: bool) -> bool {
        let path = path.as_ref();
        match self.try_open(path) {
            Ok(()) => {
                self.open = true;
                if analyze {
                    self.analyse();
                }
                true
            }
            Err(err) => {
                log::warn!("open {}: {err}", path.display());
                self.close();
                false
            }
        }
    }

    fn try_open(&mut self, path: &Path) -> WireResult<()> {
        self.close();
        let mut reader = BufReader::new(File::open(path)?);
        while let Some(frame) = read_frame(&mut reader)? {
            self.messages.push(MessageRecord::new(frame));
        }
        Ok(())
    }

    /// Whether a demo file is currently loaded.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Releases all messages and analysis state.
    pub fn close(&mut self) {
        self.messages.clear();
        self.maps.clear();
        self.decode_codec.reset();
        self.encode_codec.reset();
        self.open = false;
        self.analyzed = false;
    }

    /// Re-emits the current message sequence to a new file. The raw
    /// frames are written verbatim, so an unmodified demo saves
    /// byte-for-byte equal to its source.
    pub fn save(&self, path: impl AsRef<Path>, end_sign: bool) -> bool {
        let path = path.as_ref();
        match self.try_save(path, end_sign) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("save {}: {err}", path.display());
                false
            }
        }
    }

    fn try_save(&self, path: &Path, end_sign: bool) -> WireResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for record in &self.messages {
            write_frame(&mut writer, &record.frame)?;
        }
        write_end(&mut writer, end_sign)?;
        Ok(())
    }

    /// Appends a message built from instructions, encoding its payload
    /// through the demo's Huffman codec.
    ///
    /// # Errors
    ///
    /// Propagates codec errors from instruction serialization and wire
    /// errors from payload compression.
    pub fn append_message(
        &mut self,
        sequence: i32,
        instructions: &[Instruction],
    ) -> DemoResult<()> {
        let plain = write_instructions(instructions, &self.options)?;
        let payload = encode_payload(&mut self.encode_codec, &plain)?;
        let mut record = MessageRecord::new(MessageFrame { sequence, payload });
        record.instructions = Some(instructions.to_vec());
        self.messages.push(record);
        self.analyzed = false;
        self.open = true;
        Ok(())
    }

    /// Number of indexed messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The sequence number of a message.
    #[must_use]
    pub fn sequence(&self, index: usize) -> Option<i32> {
        self.messages.get(index).map(|record| record.frame.sequence)
    }

    /// The stored payload size of a message, in bytes.
    #[must_use]
    pub fn message_size(&self, index: usize) -> Option<usize> {
        self.messages.get(index).map(|record| record.frame.payload.len())
    }

    /// Materializes a message if needed and returns its instructions.
    /// Out-of-range indices return `None`; a message that failed to
    /// decode returns an empty list.
    pub fn message(&mut self, index: usize) -> Option<&[Instruction]> {
        if index >= self.messages.len() {
            return None;
        }
        self.load_message(index);
        self.messages[index].instructions.as_deref()
    }

    /// Ensures a message is parsed into instructions.
    pub fn load_message(&mut self, index: usize) {
        let Some(record) = self.messages.get_mut(index) else {
            return;
        };
        if record.instructions.is_some() {
            return;
        }
        let parsed = decode_payload(&mut self.decode_codec, &record.frame.payload)
            .map_err(DemoError::from)
            .and_then(|plain| {
                parse_message(&plain, &self.options).map_err(DemoError::from)
            });
        match parsed {
            Ok(instructions) => record.instructions = Some(instructions),
            Err(err) => {
                log::warn!("message {index}: decode failed: {err}");
                record.instructions = Some(Vec::new());
                record.failed = true;
            }
        }
    }

    /// Drops a message's parsed state, keeping the raw frame.
    pub fn unload_message(&mut self, index: usize) {
        if let Some(record) = self.messages.get_mut(index) {
            record.instructions = None;
            record.snapshot = None;
            record.delta_unresolved = false;
        }
    }

    /// Whether a message is currently materialized.
    #[must_use]
    pub fn is_message_loaded(&self, index: usize) -> bool {
        self.messages
            .get(index)
            .is_some_and(|record| record.instructions.is_some())
    }

    /// Whether a message failed to decode.
    #[must_use]
    pub fn is_message_failed(&self, index: usize) -> bool {
        self.messages.get(index).is_some_and(|record| record.failed)
    }

    /// The resolved snapshot of a message, when analysis produced one.
    #[must_use]
    pub fn snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.messages.get(index).and_then(|record| record.snapshot.as_ref())
    }

    /// Whether a message's snapshot referenced an unavailable baseline.
    #[must_use]
    pub fn is_delta_unresolved(&self, index: usize) -> bool {
        self.messages
            .get(index)
            .is_some_and(|record| record.delta_unresolved)
    }

    /// Whether a message's snapshot carried a vehicle state.
    #[must_use]
    pub fn has_vehicle_state(&self, index: usize) -> bool {
        self.messages
            .get(index)
            .is_some_and(|record| record.has_vehicle)
    }

    /// Whether a message carries a gamestate, per the last analysis.
    #[must_use]
    pub fn is_init_message(&self, index: usize) -> bool {
        self.messages.get(index).is_some_and(|record| record.is_init)
    }

    /// Removes a message range, inclusive. Analysis and resolved
    /// snapshots are invalidated: deltas across the cut can no longer
    /// be trusted.
    pub fn delete_message(&mut self, first: usize, last: usize) {
        if first >= self.messages.len() || last < first {
            return;
        }
        let last = last.min(self.messages.len() - 1);
        self.messages.drain(first..=last);
        self.maps.clear();
        self.analyzed = false;
        for record in &mut self.messages {
            record.snapshot = None;
            record.delta_unresolved = false;
        }
    }

    /// Runs the map-transition analysis: materializes every message in
    /// order, resolves snapshots, and builds the segment index.
    /// Per-message failures degrade to warnings.
    pub fn analyse(&mut self) {
        let mut analyzer = Analyzer::new();
        for index in 0..self.messages.len() {
            self.load_message(index);
            let record = &self.messages[index];
            let instructions = record.instructions.as_deref().unwrap_or(&[]);
            let is_init = instructions
                .iter()
                .any(|instruction| matches!(instruction, Instruction::GameState(_)));
            let analysis = analyzer.observe(index, instructions);
            let record = &mut self.messages[index];
            record.snapshot = analysis.snapshot;
            record.delta_unresolved = analysis.delta_unresolved;
            record.has_vehicle = analysis.has_vehicle;
            record.is_init = is_init;
        }
        self.maps = analyzer.into_segments();
        self.analyzed = true;
    }

    /// Whether analysis has been run on the current message sequence.
    #[must_use]
    pub const fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    /// Number of map segments found by analysis.
    #[must_use]
    pub fn maps_count(&self) -> usize {
        self.maps.len()
    }

    /// The map name of a segment.
    #[must_use]
    pub fn map_name(&self, map: usize) -> Option<&str> {
        self.maps.get(map).map(|segment| segment.name.as_str())
    }

    /// The message index of a segment's first snapshot, falling back
    /// to the segment's opening message.
    #[must_use]
    pub fn map_id(&self, map: usize) -> Option<usize> {
        self.maps
            .get(map)
            .map(|segment| segment.first_snapshot.unwrap_or(segment.message_index))
    }

    /// The level start time of a segment.
    #[must_use]
    pub fn map_start_time(&self, map: usize) -> Option<i32> {
        self.maps.get(map).and_then(|segment| segment.start_time)
    }

    /// The end time of a segment: the next segment's start, or the
    /// last snapshot time of the demo for the final segment.
    #[must_use]
    pub fn map_end_time(&self, map: usize) -> Option<i32> {
        let segment = self.maps.get(map)?;
        match self.maps.get(map + 1) {
            Some(next) => next.start_time,
            None => segment.last_snapshot_time,
        }
    }

    /// Whether a segment is a restart rather than a new map.
    #[must_use]
    pub fn is_map_restart(&self, map: usize) -> bool {
        self.maps.get(map).is_some_and(|segment| segment.restart)
    }

    /// The raw frames, for tooling that needs stored sizes.
    #[must_use]
    pub fn frames(&self) -> impl Iterator<Item = &MessageFrame> {
        self.messages.iter().map(|record| &record.frame)
    }
}
