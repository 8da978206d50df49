//! TLV vocabulary for the AO game variant.
//!
//! Every payload field is one little-endian 16-bit word; the field tables
//! below define both the binary layout (field order) and the document
//! surface (field names and types).

use crate::error::Error;
use crate::registry::TypeRegistry;
use crate::tlv::{FieldDef, TlvKindDef};

/// On-disk tags used by AO path bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TlvTag {
    ContinuePoint = 0,
    Hoist = 2,
    Edge = 3,
    Door = 5,
    LiftPoint = 7,
    Slig = 15,
    Switch = 17,
    Scrab = 24,
}

pub fn register_enums(registry: &mut TypeRegistry) -> Result<(), Error> {
    registry.add_enum("scale", &[(0, "full"), (1, "half")])?;
    registry.add_enum("bool", &[(0, "false"), (1, "true")])?;
    registry.add_enum("facing", &[(0, "left"), (1, "right")])?;
    registry.add_enum(
        "slig_start_state",
        &[
            (0, "listening"),
            (1, "paused"),
            (2, "sleeping"),
            (3, "chase"),
            (4, "chase_and_disappear"),
            (5, "falling_to_chase"),
        ],
    )?;
    registry.add_enum(
        "scrab_patrol_type",
        &[(0, "whole_path"), (1, "within_screen")],
    )?;
    registry.add_enum("edge_type", &[(0, "left"), (1, "right"), (2, "both")])?;
    registry.add_enum("door_state", &[(0, "closed"), (1, "open"), (2, "locked")])?;
    registry.add_enum("switch_action", &[(0, "toggle"), (1, "on"), (2, "off")])?;
    registry.add_enum("hoist_type", &[(0, "next_edge"), (1, "next_floor")])?;
    Ok(())
}

const fn boolean(name: &'static str) -> FieldDef {
    FieldDef::enumerated(name, "bool", 0)
}

pub static KINDS: &[TlvKindDef] = &[
    TlvKindDef {
        tag: TlvTag::ContinuePoint as u32,
        name: "ContinuePoint",
        fields: &[
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::int16("zone_number"),
        ],
    },
    TlvKindDef {
        tag: TlvTag::Hoist as u32,
        name: "Hoist",
        fields: &[
            FieldDef::enumerated("hoist_type", "hoist_type", 0),
            FieldDef::enumerated("edge_type", "edge_type", 0),
            FieldDef::int16("id"),
            FieldDef::enumerated("scale", "scale", 0),
        ],
    },
    TlvKindDef {
        tag: TlvTag::Edge as u32,
        name: "Edge",
        fields: &[
            FieldDef::enumerated("type", "edge_type", 0),
            boolean("can_grab"),
            FieldDef::enumerated("scale", "scale", 0),
        ],
    },
    TlvKindDef {
        tag: TlvTag::Door as u32,
        name: "Door",
        fields: &[
            FieldDef::int16("level"),
            FieldDef::int16("path"),
            FieldDef::int16("camera"),
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::int16("door_number"),
            FieldDef::int16("lock_id"),
            FieldDef::enumerated("start_state", "door_state", 0),
            FieldDef::int16("target_door_number"),
        ],
    },
    TlvKindDef {
        tag: TlvTag::LiftPoint as u32,
        name: "LiftPoint",
        fields: &[
            FieldDef::int16("id"),
            boolean("start_point"),
            FieldDef::int16("stop_type"),
            FieldDef::enumerated("scale", "scale", 0),
        ],
    },
    // 32 payload words, 0x58 bytes with the header.
    TlvKindDef {
        tag: TlvTag::Slig as u32,
        name: "Slig",
        fields: &[
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::enumerated("start_state", "slig_start_state", 0),
            FieldDef::int16("pause_time"),
            FieldDef::int16("pause_left_min"),
            FieldDef::int16("pause_left_max"),
            FieldDef::int16("pause_right_min"),
            FieldDef::int16("pause_right_max"),
            FieldDef::int16("chal_type"),
            FieldDef::int16("chal_time"),
            FieldDef::int16("num_times_to_shoot"),
            FieldDef::int16("unknown"),
            FieldDef::int16("code1"),
            FieldDef::int16("code2"),
            boolean("chase_abe"),
            FieldDef::enumerated("start_direction", "facing", 0),
            FieldDef::int16("panic_timeout"),
            FieldDef::int16("num_panic_sounds"),
            FieldDef::int16("panic_sound_timeout"),
            FieldDef::int16("stop_chase_delay"),
            FieldDef::int16("time_to_wait_before_chase"),
            FieldDef::int16("slig_id"),
            FieldDef::int16("listen_time"),
            FieldDef::percent("percent_say_what"),
            FieldDef::percent("percent_beat_mud"),
            boolean("talk_to_abe"),
            boolean("dont_shoot"),
            FieldDef::int16("z_shoot_delay"),
            boolean("stay_awake"),
            boolean("disable_resources"),
            FieldDef::int16("noise_wake_up_distance"),
            FieldDef::int16("id"),
            FieldDef::int16("pad"),
        ],
    },
    TlvKindDef {
        tag: TlvTag::Switch as u32,
        name: "Switch",
        fields: &[
            FieldDef::int16("target_id"),
            FieldDef::enumerated("action", "switch_action", 0),
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::int16("on_sound"),
            FieldDef::int16("off_sound"),
            FieldDef::int16("sound_direction"),
        ],
    },
    // 10 payload words, 0x2C bytes with the header.
    TlvKindDef {
        tag: TlvTag::Scrab as u32,
        name: "Scrab",
        fields: &[
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::int16("attack_delay"),
            FieldDef::enumerated("patrol_type", "scrab_patrol_type", 0),
            FieldDef::int16("left_min_delay"),
            FieldDef::int16("left_max_delay"),
            FieldDef::int16("right_min_delay"),
            FieldDef::int16("right_max_delay"),
            FieldDef::int16("attack_duration"),
            boolean("disable_resources"),
            boolean("roar_randomly"),
        ],
    },
];
