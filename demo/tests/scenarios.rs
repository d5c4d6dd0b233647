use std::fs;
use std::path::PathBuf;

use codec::{
    EntityOp, EntityPatch, FieldValue, GameState, Instruction, PlayerPatch, RawSnapshot,
};
use demo::Demo;

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("dm26-{}-{}", std::process::id(), name));
    path
}

fn gamestate(map: &str, start_time: &str) -> Instruction {
    let mut gs = GameState::default();
    gs.set_config_string(2, format!("mapname\\{map}\\")).unwrap();
    gs.set_config_string(21, start_time.to_string()).unwrap();
    Instruction::GameState(gs)
}

fn snapshot(server_time: i32, delta_num: u8, ops: Vec<EntityOp>) -> Instruction {
    Instruction::Snapshot(RawSnapshot {
        server_time,
        delta_num,
        snap_flags: 0,
        area_mask: Vec::new(),
        player_delta: PlayerPatch::default(),
        vehicle_delta: None,
        entity_ops: ops,
        commands: None,
    })
}

fn entity_update(number: u16, fields: Vec<(u16, FieldValue)>) -> EntityOp {
    EntityOp::Update {
        number,
        patch: EntityPatch {
            fields,
            extensions: Vec::new(),
        },
    }
}

#[test]
fn empty_demo_roundtrips() {
    // A file consisting solely of the end sentinel.
    let path = temp_path("empty.dm_26");
    fs::write(&path, (-1i32).to_le_bytes()).unwrap();

    let mut demo = Demo::new();
    assert!(demo.open(&path, true));
    assert_eq!(demo.message_count(), 0);
    assert_eq!(demo.maps_count(), 0);

    let out = temp_path("empty-out.dm_26");
    assert!(demo.save(&out, false));
    assert_eq!(fs::read(&out).unwrap(), fs::read(&path).unwrap());

    fs::remove_file(&path).ok();
    fs::remove_file(&out).ok();
}

#[test]
fn single_gamestate_message_analyzes() {
    let path = temp_path("gamestate.dm_26");
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ctf_yavin", "1000"), Instruction::EndOfFile])
        .unwrap();
    assert!(demo.save(&path, false));

    let mut reopened = Demo::new();
    assert!(reopened.open(&path, true));
    assert_eq!(reopened.message_count(), 1);
    assert_eq!(reopened.maps_count(), 1);
    assert_eq!(reopened.map_name(0), Some("ctf_yavin"));
    assert_eq!(reopened.map_start_time(0), Some(1000));
    assert!(!reopened.is_map_restart(0));
    assert!(reopened.is_init_message(0));

    fs::remove_file(&path).ok();
}

#[test]
fn non_delta_snapshot_decodes_and_reencodes_exactly() {
    let path = temp_path("snapshot.dm_26");
    let instructions = vec![
        Instruction::Snapshot(RawSnapshot {
            server_time: 5000,
            delta_num: 0,
            snap_flags: 0,
            area_mask: vec![0xFF],
            ..RawSnapshot::default()
        }),
        Instruction::EndOfFile,
    ];

    let mut demo = Demo::new();
    demo.append_message(1, &instructions).unwrap();
    assert!(demo.save(&path, false));

    let mut reopened = Demo::new();
    assert!(reopened.open(&path, true));
    assert_eq!(reopened.message(0), Some(&instructions[..]));

    let snapshot = reopened.snapshot(0).unwrap();
    assert_eq!(snapshot.server_time, 5000);
    assert!(snapshot.entities.is_empty());
    assert_eq!(snapshot.player_state.weapon, 0);
    assert_eq!(snapshot.area_mask, vec![0xFF]);

    // Re-encoding the decoded instructions reproduces the file.
    let parsed = reopened.message(0).unwrap().to_vec();
    let mut rebuilt = Demo::new();
    rebuilt.append_message(1, &parsed).unwrap();
    let out = temp_path("snapshot-out.dm_26");
    assert!(rebuilt.save(&out, false));
    assert_eq!(fs::read(&out).unwrap(), fs::read(&path).unwrap());

    fs::remove_file(&path).ok();
    fs::remove_file(&out).ok();
}

#[test]
fn delta_snapshot_chain_moves_entity() {
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "900")]).unwrap();
    demo.append_message(
        1,
        &[snapshot(
            1000,
            0,
            vec![entity_update(5, vec![(20, FieldValue::Float(100.0))])],
        )],
    )
    .unwrap();
    demo.append_message(
        2,
        &[snapshot(
            1050,
            1,
            vec![entity_update(5, vec![(22, FieldValue::Float(8.0))])],
        )],
    )
    .unwrap();
    demo.analyse();

    let first = demo.snapshot(1).unwrap();
    assert_eq!(first.entities[&5].origin, [100.0, 0.0, 0.0]);

    let second = demo.snapshot(2).unwrap();
    assert_eq!(second.entities[&5].origin, [100.0, 0.0, 8.0]);
    assert_eq!(second.delta_from, Some(1));
}

#[test]
fn map_change_mid_demo_splits_segments() {
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "100")]).unwrap();
    demo.append_message(1, &[snapshot(150, 0, Vec::new())]).unwrap();
    demo.append_message(2, &[gamestate("ffa2", "500")]).unwrap();
    demo.analyse();

    assert_eq!(demo.maps_count(), 2);
    assert_eq!(demo.map_name(0), Some("ffa1"));
    assert_eq!(demo.map_name(1), Some("ffa2"));
    assert!(!demo.is_map_restart(1));
    assert_eq!(demo.map_end_time(0), demo.map_start_time(1));
}

#[test]
fn map_restart_keeps_the_name() {
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "100")]).unwrap();
    demo.append_message(1, &[snapshot(150, 0, Vec::new())]).unwrap();
    demo.append_message(
        2,
        &[
            Instruction::ServerCommand {
                sequence: 9,
                text: "map_restart".to_string(),
            },
            gamestate("ffa1", "600"),
        ],
    )
    .unwrap();
    demo.analyse();

    assert_eq!(demo.maps_count(), 2);
    assert_eq!(demo.map_name(1), Some("ffa1"));
    assert!(demo.is_map_restart(1));
    assert!(!demo.is_map_restart(0));
}

#[test]
fn server_times_are_monotone_and_match_level_start() {
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "1000")]).unwrap();
    for (i, time) in [1000, 1050, 1100, 1150].iter().enumerate() {
        demo.append_message(i as i32 + 1, &[snapshot(*time, 0, Vec::new())])
            .unwrap();
    }
    demo.analyse();

    let mut last = i32::MIN;
    for index in 1..demo.message_count() {
        let time = demo.snapshot(index).unwrap().server_time;
        assert!(time >= last, "server time regressed at message {index}");
        last = time;
    }

    let first_snapshot = demo.map_id(0).unwrap();
    assert_eq!(
        demo.snapshot(first_snapshot).unwrap().server_time,
        demo.map_start_time(0).unwrap()
    );
}

#[test]
fn saved_demo_is_byte_identical() {
    let path = temp_path("roundtrip.dm_26");
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("mp/duel1", "200")]).unwrap();
    demo.append_message(
        1,
        &[snapshot(
            250,
            0,
            vec![entity_update(7, vec![(45, FieldValue::Int(3))])],
        )],
    )
    .unwrap();
    demo.append_message(2, &[snapshot(300, 1, Vec::new())]).unwrap();
    assert!(demo.save(&path, false));

    let mut reopened = Demo::new();
    assert!(reopened.open(&path, true));
    let out = temp_path("roundtrip-out.dm_26");
    assert!(reopened.save(&out, false));
    assert_eq!(fs::read(&out).unwrap(), fs::read(&path).unwrap());

    fs::remove_file(&path).ok();
    fs::remove_file(&out).ok();
}

#[test]
fn end_sign_roundtrips_when_matched() {
    let path = temp_path("endsign.dm_26");
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "0")]).unwrap();
    assert!(demo.save(&path, true));

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[bytes.len() - 8..], &[0xFF; 8], "two sentinels");

    let mut reopened = Demo::new();
    assert!(reopened.open(&path, false));
    let out = temp_path("endsign-out.dm_26");
    assert!(reopened.save(&out, true));
    assert_eq!(fs::read(&out).unwrap(), bytes);

    fs::remove_file(&path).ok();
    fs::remove_file(&out).ok();
}

#[test]
fn messages_load_lazily() {
    let path = temp_path("lazy.dm_26");
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "0")]).unwrap();
    demo.append_message(1, &[snapshot(100, 0, Vec::new())]).unwrap();
    demo.save(&path, false);

    let mut reopened = Demo::new();
    assert!(reopened.open(&path, false));
    assert!(!reopened.is_message_loaded(0));
    assert!(!reopened.is_message_loaded(1));

    assert!(reopened.message(1).is_some());
    assert!(reopened.is_message_loaded(1));
    assert!(!reopened.is_message_loaded(0));

    reopened.unload_message(1);
    assert!(!reopened.is_message_loaded(1));

    assert!(reopened.message(99).is_none());

    fs::remove_file(&path).ok();
}

#[test]
fn delete_message_invalidates_analysis() {
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "0")]).unwrap();
    demo.append_message(1, &[snapshot(100, 0, Vec::new())]).unwrap();
    demo.append_message(2, &[snapshot(150, 1, Vec::new())]).unwrap();
    demo.analyse();
    assert!(demo.is_analyzed());
    assert_eq!(demo.message_count(), 3);

    demo.delete_message(1, 1);
    assert_eq!(demo.message_count(), 2);
    assert!(!demo.is_analyzed());
    assert_eq!(demo.maps_count(), 0);
    assert!(demo.snapshot(1).is_none());
}

#[test]
fn corrupt_message_fails_alone() {
    let path = temp_path("corrupt.dm_26");
    let mut demo = Demo::new();
    demo.append_message(0, &[gamestate("ffa1", "0")]).unwrap();
    assert!(demo.save(&path, false));

    // Append a frame whose payload decodes to garbage opcodes.
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 4); // drop the sentinel
    let mut codec = huffman::Codec::new();
    let garbage = codec.compress(&[0u8; 8]).unwrap();
    bytes.extend_from_slice(&7i32.to_le_bytes());
    bytes.extend_from_slice(&(garbage.len() as i32).to_le_bytes());
    bytes.extend_from_slice(&garbage);
    bytes.extend_from_slice(&(-1i32).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let mut reopened = Demo::new();
    assert!(reopened.open(&path, true));
    assert_eq!(reopened.message_count(), 2);
    assert!(!reopened.is_message_failed(0));
    assert!(reopened.is_message_failed(1));
    assert_eq!(reopened.message(1), Some(&[][..]));
    // The healthy message still analyzed.
    assert_eq!(reopened.maps_count(), 1);

    fs::remove_file(&path).ok();
}

#[test]
fn vehicle_state_flag_is_tracked() {
    let mut demo = Demo::new();
    demo.append_message(
        0,
        &[Instruction::Snapshot(RawSnapshot {
            server_time: 100,
            vehicle_delta: Some(PlayerPatch {
                fields: vec![(25, FieldValue::Int(2))],
                arrays: None,
            }),
            ..RawSnapshot::default()
        })],
    )
    .unwrap();
    demo.append_message(1, &[snapshot(150, 1, Vec::new())]).unwrap();
    demo.analyse();

    assert!(demo.has_vehicle_state(0));
    assert!(!demo.has_vehicle_state(1));
    let resolved = demo.snapshot(0).unwrap();
    assert_eq!(resolved.vehicle_state.as_ref().unwrap().weapon, 2);
}
