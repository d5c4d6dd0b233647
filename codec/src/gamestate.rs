//! The initial full reference state of a map segment.

use std::collections::BTreeMap;

use schema::limits::{CS_LEVEL_START_TIME, CS_SERVERINFO, MAX_CONFIGSTRINGS};

use crate::entity::EntityState;
use crate::error::{CodecResult, Violation};

/// The gamestate sent at match start or map change: configuration
/// strings plus per-entity baselines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameState {
    pub command_sequence: i32,
    pub client_num: i32,
    pub checksum_feed: i32,
    /// Dense indexed strings, `0..1700`.
    pub config_strings: BTreeMap<u16, String>,
    /// Baseline entity states keyed by entity number.
    pub baselines: BTreeMap<u16, EntityState>,
}

impl GameState {
    /// The configuration string at `index`, empty if unset.
    #[must_use]
    pub fn config_string(&self, index: u16) -> &str {
        self.config_strings.get(&index).map_or("", String::as_str)
    }

    /// Sets a configuration string, validating the index range.
    ///
    /// # Errors
    ///
    /// Returns a [`Violation::ConfigStringIndex`] error for indices at or
    /// above the slot count.
    pub fn set_config_string(&mut self, index: u16, text: String) -> CodecResult<()> {
        if usize::from(index) >= MAX_CONFIGSTRINGS {
            return Err(Violation::ConfigStringIndex {
                index: u32::from(index),
            }
            .into());
        }
        if text.is_empty() {
            self.config_strings.remove(&index);
        } else {
            self.config_strings.insert(index, text);
        }
        Ok(())
    }

    /// The current map name, from the server-info string.
    #[must_use]
    pub fn map_name(&self) -> Option<String> {
        info_value(self.config_string(CS_SERVERINFO), "mapname")
    }

    /// The level start time, from its reserved configuration string.
    #[must_use]
    pub fn level_start_time(&self) -> Option<i32> {
        self.config_string(CS_LEVEL_START_TIME).trim().parse().ok()
    }

    /// Applies a server command to the gamestate if it mutates it.
    ///
    /// `cs <index> <value>` commands update configuration strings
    /// incrementally; everything else is left to the caller. Returns
    /// `true` if the command was consumed.
    pub fn apply_server_command(&mut self, command: &str) -> bool {
        let Some(rest) = command.strip_prefix("cs ") else {
            return false;
        };
        let rest = rest.trim_start();
        let Some((index_str, value)) = rest.split_once(' ') else {
            return false;
        };
        let Ok(index) = index_str.parse::<u16>() else {
            return false;
        };
        let value = value.trim().trim_matches('"');
        self.set_config_string(index, value.to_string()).is_ok()
    }
}

/// Looks up a key in a backslash-separated info string.
///
/// Both `key\value\...` and `\key\value\...` layouts occur in the wild;
/// a leading separator is skipped.
#[must_use]
pub fn info_value(info: &str, key: &str) -> Option<String> {
    let mut tokens = info.split('\\');
    if info.starts_with('\\') {
        tokens.next();
    }
    loop {
        let candidate = tokens.next()?;
        let value = tokens.next()?;
        if candidate == key {
            return Some(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_value_without_leading_separator() {
        assert_eq!(
            info_value("mapname\\ctf_yavin\\", "mapname"),
            Some("ctf_yavin".to_string())
        );
    }

    #[test]
    fn info_value_with_leading_separator() {
        let info = "\\g_gametype\\8\\mapname\\mp/ffa3\\sv_hostname\\server";
        assert_eq!(info_value(info, "mapname"), Some("mp/ffa3".to_string()));
        assert_eq!(info_value(info, "g_gametype"), Some("8".to_string()));
        assert_eq!(info_value(info, "missing"), None);
    }

    #[test]
    fn map_name_reads_serverinfo() {
        let mut gs = GameState::default();
        gs.set_config_string(CS_SERVERINFO, "mapname\\ffa1\\".to_string())
            .unwrap();
        assert_eq!(gs.map_name(), Some("ffa1".to_string()));
    }

    #[test]
    fn level_start_time_parses_integer() {
        let mut gs = GameState::default();
        gs.set_config_string(CS_LEVEL_START_TIME, "1000".to_string())
            .unwrap();
        assert_eq!(gs.level_start_time(), Some(1000));

        gs.set_config_string(CS_LEVEL_START_TIME, "junk".to_string())
            .unwrap();
        assert_eq!(gs.level_start_time(), None);
    }

    #[test]
    fn set_config_string_rejects_out_of_range() {
        let mut gs = GameState::default();
        assert!(gs.set_config_string(1700, "x".to_string()).is_err());
        assert!(gs.set_config_string(1699, "x".to_string()).is_ok());
    }

    #[test]
    fn empty_value_clears_the_slot() {
        let mut gs = GameState::default();
        gs.set_config_string(5, "value".to_string()).unwrap();
        gs.set_config_string(5, String::new()).unwrap();
        assert_eq!(gs.config_string(5), "");
        assert!(!gs.config_strings.contains_key(&5));
    }

    #[test]
    fn server_command_updates_configstring() {
        let mut gs = GameState::default();
        assert!(gs.apply_server_command("cs 21 \"5000\""));
        assert_eq!(gs.level_start_time(), Some(5000));
    }

    #[test]
    fn unrelated_server_command_is_ignored() {
        let mut gs = GameState::default();
        assert!(!gs.apply_server_command("print \"hello\""));
        assert!(!gs.apply_server_command("map_restart"));
    }
}
