//! Map-transition analysis over the message stream.

use codec::{CodecError, GameState, Instruction, Snapshot, SnapshotAssembler};

/// One map segment of a demo: a gamestate, map change, or restart and
/// everything up to the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSegment {
    /// Index of the message that started the segment.
    pub message_index: usize,
    /// Index of the first message carrying a snapshot, once seen.
    pub first_snapshot: Option<usize>,
    /// Map name from the server info, empty when unparsable.
    pub name: String,
    /// Level start time from its configuration string.
    pub start_time: Option<i32>,
    /// Server time of the segment's last snapshot.
    pub last_snapshot_time: Option<i32>,
    /// Whether this segment is a restart of the previous map.
    pub restart: bool,
}

/// Per-message facts recorded during analysis.
#[derive(Debug, Default)]
pub struct MessageAnalysis {
    /// The resolved snapshot, when the message carried one and its
    /// baseline was available.
    pub snapshot: Option<Snapshot>,
    /// Set when a delta snapshot referenced an evicted baseline.
    pub delta_unresolved: bool,
    /// Set when the snapshot carried a vehicle state.
    pub has_vehicle: bool,
}

/// Streaming analyzer: feed it each message's instructions in order.
#[derive(Debug)]
pub(crate) struct Analyzer {
    gamestate: GameState,
    assembler: SnapshotAssembler,
    segments: Vec<MapSegment>,
}

impl Analyzer {
    pub(crate) fn new() -> Self {
        Self {
            gamestate: GameState::default(),
            assembler: SnapshotAssembler::new(),
            segments: Vec::new(),
        }
    }

    pub(crate) fn into_segments(self) -> Vec<MapSegment> {
        self.segments
    }

    fn start_segment(&mut self, message_index: usize, restart_hint: bool) {
        let name = match self.gamestate.map_name() {
            Some(name) => name,
            None => {
                log::warn!("message {message_index}: server info carries no map name");
                String::new()
            }
        };
        let restart = restart_hint
            || self
                .segments
                .last()
                .is_some_and(|previous| !name.is_empty() && previous.name == name);
        self.segments.push(MapSegment {
            message_index,
            first_snapshot: None,
            name,
            start_time: self.gamestate.level_start_time(),
            last_snapshot_time: None,
            restart,
        });
    }

    /// Observes one message. At most one segment is opened per message;
    /// a gamestate takes precedence over a map-change marker or a
    /// restart command arriving alongside it.
    pub(crate) fn observe(
        &mut self,
        message_index: usize,
        instructions: &[Instruction],
    ) -> MessageAnalysis {
        let mut analysis = MessageAnalysis::default();
        let mut segment_opened = false;

        for instruction in instructions {
            match instruction {
                Instruction::GameState(gamestate) => {
                    self.gamestate = gamestate.clone();
                    self.assembler.set_gamestate(gamestate);
                    if segment_opened {
                        // The trigger that got here first spoke for this
                        // message; refresh its identity from the gamestate.
                        if let Some(segment) = self.segments.last_mut() {
                            if let Some(name) = self.gamestate.map_name() {
                                segment.name = name;
                            }
                            segment.start_time = self.gamestate.level_start_time();
                        }
                    } else {
                        self.start_segment(message_index, false);
                        segment_opened = true;
                    }
                }
                Instruction::MapChange => {
                    if !segment_opened {
                        self.start_segment(message_index, false);
                        segment_opened = true;
                    }
                }
                Instruction::ServerCommand { text, .. } => {
                    if self.gamestate.apply_server_command(text) {
                        continue;
                    }
                    if text.starts_with("map_restart") && !segment_opened {
                        self.start_segment(message_index, true);
                        segment_opened = true;
                    }
                }
                Instruction::ConfigString { index, text } => {
                    if let Err(err) = self.gamestate.set_config_string(*index, text.clone()) {
                        log::warn!("message {message_index}: {err}");
                    }
                }
                Instruction::Snapshot(raw) => {
                    analysis.has_vehicle |= raw.vehicle_delta.is_some();
                    match self.assembler.resolve(message_index, raw) {
                        Ok(snapshot) => {
                            if let Some(segment) = self.segments.last_mut() {
                                segment.first_snapshot.get_or_insert(message_index);
                                segment.last_snapshot_time = Some(snapshot.server_time);
                            }
                            analysis.snapshot = Some(snapshot);
                        }
                        Err(CodecError::DeltaUnresolved {
                            referenced, ..
                        }) => {
                            log::warn!(
                                "message {message_index}: delta baseline {referenced} unavailable"
                            );
                            analysis.delta_unresolved = true;
                            if let Some(segment) = self.segments.last_mut() {
                                segment.first_snapshot.get_or_insert(message_index);
                                segment.last_snapshot_time = Some(raw.server_time);
                            }
                        }
                        Err(err) => {
                            log::warn!("message {message_index}: snapshot resolution failed: {err}");
                        }
                    }
                }
                Instruction::Baseline { index, state } => {
                    self.gamestate.baselines.insert(*index, state.clone());
                }
                Instruction::Nop
                | Instruction::Download { .. }
                | Instruction::SetGame { .. }
                | Instruction::EndOfFile => {}
            }
        }

        analysis
    }
}
