//! TLV vocabulary for the AE game variant. Same machinery as AO, different
//! tags and field sets.

use crate::error::Error;
use crate::registry::TypeRegistry;
use crate::tlv::{FieldDef, TlvKindDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TlvTag {
    ContinuePoint = 0,
    Hoist = 2,
    Door = 5,
    TimedMine = 13,
    Slig = 20,
    Paramite = 33,
    SecurityEye = 62,
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
    registry.add_enum("edge_type", &[(0, "left"), (1, "right"), (2, "both")])?;
    registry.add_enum("door_state", &[(0, "closed"), (1, "open"), (2, "locked")])?;
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
        tag: TlvTag::TimedMine as u32,
        name: "TimedMine",
        fields: &[
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::int16("id"),
            FieldDef::int16("ticks_before_explode"),
            boolean("disable_resources"),
        ],
    },
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
            FieldDef::int16("shoot_possible_delay"),
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
            FieldDef::enumerated("start_direction", "facing", 0),
            FieldDef::int16("panic_timeout"),
            FieldDef::int16("num_panic_sounds"),
            FieldDef::int16("panic_sound_timeout"),
            FieldDef::int16("stop_chase_delay"),
            FieldDef::int16("time_to_wait_before_chase"),
            boolean("chase_abe"),
            FieldDef::int16("unused"),
        ],
    },
    TlvKindDef {
        tag: TlvTag::Paramite as u32,
        name: "Paramite",
        fields: &[
            FieldDef::enumerated("scale", "scale", 0),
            boolean("entrance"),
            FieldDef::int16("attack_delay"),
            FieldDef::int16("id"),
        ],
    },
    TlvKindDef {
        tag: TlvTag::SecurityEye as u32,
        name: "SecurityEye",
        fields: &[
            FieldDef::enumerated("scale", "scale", 0),
            FieldDef::int16("disable_id"),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::{KINDS, TlvTag};

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<u32> = KINDS.iter().map(|k| k.tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), KINDS.len());
    }

    #[test]
    fn slig_uses_its_own_tag_value() {
        let slig = KINDS.iter().find(|k| k.name == "Slig").unwrap();
        assert_eq!(slig.tag, TlvTag::Slig as u32);
        assert_ne!(slig.tag, crate::ao::TlvTag::Slig as u32);
    }
}
