//! Snapshot resolution against the baseline window.

use std::collections::BTreeMap;

use schema::limits::{BASELINE_WINDOW, MAX_CLIENTS};

use crate::delta::{apply_field_patch, apply_player_patch, EntityOp};
use crate::entity::EntityState;
use crate::error::{CodecError, CodecResult, Violation};
use crate::gamestate::GameState;
use crate::snapshot::{RawSnapshot, Snapshot};
use crate::usercmd::UserCmd;

/// A fixed-capacity ring buffer of resolved snapshots keyed by message
/// index. Eviction is strict FIFO: once more than the window capacity
/// of snapshots has been decoded, the oldest is gone and deltas against
/// it fail.
#[derive(Debug)]
struct SnapshotWindow {
    entries: Vec<Option<(usize, Snapshot)>>,
    head: usize,
    len: usize,
    last_index: Option<usize>,
}

impl SnapshotWindow {
    fn new(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            entries,
            head: 0,
            len: 0,
            last_index: None,
        }
    }

    fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.head = 0;
        self.len = 0;
        self.last_index = None;
    }

    /// Inserts a snapshot; message indices must be strictly increasing.
    /// An out-of-order insert is dropped with a warning rather than
    /// corrupting the window.
    fn insert(&mut self, index: usize, snapshot: Snapshot) {
        if let Some(last) = self.last_index {
            if index <= last {
                log::warn!("snapshot window: dropping out-of-order insert {index} after {last}");
                return;
            }
        }
        let cap = self.entries.len();
        if self.len < cap {
            let slot = (self.head + self.len) % cap;
            self.entries[slot] = Some((index, snapshot));
            self.len += 1;
        } else {
            self.entries[self.head] = Some((index, snapshot));
            self.head = (self.head + 1) % cap;
        }
        self.last_index = Some(index);
    }

    fn get(&self, index: usize) -> Option<&Snapshot> {
        let cap = self.entries.len();
        (0..self.len).find_map(|i| {
            let slot = (self.head + i) % cap;
            match &self.entries[slot] {
                Some((idx, snapshot)) if *idx == index => Some(snapshot),
                _ => None,
            }
        })
    }
}

/// Resolves wire-shaped snapshots into complete world states.
///
/// Owns the per-demo mutable decode state: the snapshot window, the
/// gamestate entity baselines, and the per-client command baselines.
#[derive(Debug)]
pub struct SnapshotAssembler {
    window: SnapshotWindow,
    baselines: BTreeMap<u16, EntityState>,
    cmd_baselines: Vec<UserCmd>,
}

impl Default for SnapshotAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotAssembler {
    /// Creates an assembler with the protocol's baseline window size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: SnapshotWindow::new(BASELINE_WINDOW),
            baselines: BTreeMap::new(),
            cmd_baselines: vec![UserCmd::default(); MAX_CLIENTS],
        }
    }

    /// Installs a gamestate: resets the window, the entity baselines,
    /// and the command baselines. Called at match start and on every
    /// map change.
    pub fn set_gamestate(&mut self, gamestate: &GameState) {
        self.window.clear();
        self.baselines = gamestate.baselines.clone();
        self.cmd_baselines = vec![UserCmd::default(); MAX_CLIENTS];
    }

    /// Resolves one wire snapshot into a complete world state and
    /// retains it for later deltas.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DeltaUnresolved`] when the referenced
    /// baseline snapshot has been evicted or was never decoded; the
    /// window is not updated in that case.
    pub fn resolve(&mut self, message_index: usize, raw: &RawSnapshot) -> CodecResult<Snapshot> {
        let (from, delta_from) = if raw.is_delta() {
            let offset = usize::from(raw.delta_num);
            let referenced =
                message_index
                    .checked_sub(offset)
                    .ok_or(Violation::DeltaBeforeStart {
                        message_index,
                        offset: raw.delta_num,
                    })?;
            match self.window.get(referenced) {
                Some(snapshot) => (snapshot.clone(), Some(referenced)),
                None => {
                    return Err(CodecError::DeltaUnresolved {
                        message_index,
                        referenced,
                    })
                }
            }
        } else {
            (Snapshot::default(), None)
        };

        let mut snapshot = Snapshot {
            server_time: raw.server_time,
            delta_from,
            snap_flags: raw.snap_flags,
            area_mask: raw.area_mask.clone(),
            player_state: from.player_state.clone(),
            vehicle_state: None,
            entities: from.entities.clone(),
            commands: Vec::new(),
        };

        apply_player_patch(&mut snapshot.player_state, &raw.player_delta);

        if let Some(vehicle_patch) = &raw.vehicle_delta {
            let mut vehicle = from.vehicle_state.clone().unwrap_or_default();
            apply_player_patch(&mut vehicle, vehicle_patch);
            snapshot.vehicle_state = Some(vehicle);
        }

        for op in &raw.entity_ops {
            match op {
                EntityOp::Remove { number } => {
                    snapshot.entities.remove(number);
                }
                EntityOp::Update { number, patch } => {
                    let mut state = snapshot
                        .entities
                        .get(number)
                        .or_else(|| self.baselines.get(number))
                        .cloned()
                        .unwrap_or_else(|| EntityState::with_number(*number));
                    state.number = *number;
                    apply_field_patch(&mut state, &patch.fields);
                    for (name, value) in &patch.extensions {
                        state.extensions.insert(name.clone(), *value);
                    }
                    snapshot.entities.insert(*number, state);
                }
            }
        }

        if let Some(commands) = &raw.commands {
            for (client, patch) in commands {
                let slot = usize::from(*client);
                if slot >= self.cmd_baselines.len() {
                    return Err(Violation::ClientNumber {
                        client: u32::from(*client),
                    }
                    .into());
                }
                apply_field_patch(&mut self.cmd_baselines[slot], patch);
                snapshot.commands.push((*client, self.cmd_baselines[slot]));
            }
        }

        self.window.insert(message_index, snapshot.clone());
        Ok(snapshot)
    }
}
