//! Record schemas of the control format.

use wuj_schema::{Field, PooledKind};

/// Key of the file magic in the header record.
pub const MAGIC_KEY: &str = "magic";
/// Key of the format version.
pub const VERSION_KEY: &str = "version";
/// Header field holding the animation header offset.
pub const ANIMATION_OFFSET_KEY: &str = "animation header offset";
/// Header field holding the layout header offset.
pub const LAYOUT_OFFSET_KEY: &str = "layout header offset";
/// Header field holding the string pool offset.
pub const STRINGS_OFFSET_KEY: &str = "strings offset";

/// Names of the header's string references, in file order.
pub const HEADER_STRINGS: [&str; 3] = ["main brlyt", "bmg", "picture source brlyt"];

/// File header. The three offsets are absolute.
pub const HEADER: &[Field<PooledKind>] = &[
    Field::new(MAGIC_KEY, PooledKind::TAG),
    Field::new(VERSION_KEY, PooledKind::U16),
    Field::new(HEADER_STRINGS[0], PooledKind::String),
    Field::new(HEADER_STRINGS[1], PooledKind::String),
    Field::new(HEADER_STRINGS[2], PooledKind::String),
    Field::new(ANIMATION_OFFSET_KEY, PooledKind::U16),
    Field::new(LAYOUT_OFFSET_KEY, PooledKind::U16),
    Field::new(STRINGS_OFFSET_KEY, PooledKind::U16),
    Field::padding(PooledKind::pad(2)),
];

const GROUP: &[Field<PooledKind>] = &[
    Field::new("name", PooledKind::String),
    Field::new("pane", PooledKind::String),
    Field::new("first animation", PooledKind::U16),
    Field::new("animation count", PooledKind::U16),
];

const ANIMATION: &[Field<PooledKind>] = &[
    Field::new("name", PooledKind::String),
    Field::new("brlan", PooledKind::String),
    Field::new("next", PooledKind::String),
    Field::new("reversed", PooledKind::BOOL16),
    Field::new("speed", PooledKind::F32),
];

/// Animation groups and the animations they index into.
pub const ANIMATION_HEADER: &[Field<PooledKind>] = &[
    Field::new("groups", PooledKind::array(GROUP)),
    Field::new("animations", PooledKind::array(ANIMATION)),
];

const VARIANT: &[Field<PooledKind>] = &[
    Field::new("name", PooledKind::String),
    Field::new("opacity", PooledKind::U16),
    Field::new("animated", PooledKind::BOOL16),
    Field::padding(PooledKind::pad(2)),
    Field::new("animation delay", PooledKind::F32),
    Field::new("translation x 4:3", PooledKind::F32),
    Field::new("translation y 4:3", PooledKind::F32),
    Field::new("translation z 4:3", PooledKind::F32),
    Field::new("scale x 4:3", PooledKind::F32),
    Field::new("scale y 4:3", PooledKind::F32),
    Field::new("translation x 16:9", PooledKind::F32),
    Field::new("translation y 16:9", PooledKind::F32),
    Field::new("translation z 16:9", PooledKind::F32),
    Field::new("scale x 16:9", PooledKind::F32),
    Field::new("scale y 16:9", PooledKind::F32),
    Field::new("first message", PooledKind::U16),
    Field::new("message count", PooledKind::U16),
    Field::new("first picture", PooledKind::U16),
    Field::new("picture count", PooledKind::U16),
];

const MESSAGE: &[Field<PooledKind>] = &[
    Field::new("pane", PooledKind::String),
    Field::new("name", PooledKind::String),
    Field::new("message id", PooledKind::U32),
];

const PICTURE: &[Field<PooledKind>] = &[
    Field::new("destination pane", PooledKind::String),
    Field::new("source pane", PooledKind::String),
];

/// Screen variants and the message and picture bindings they index into.
pub const LAYOUT_HEADER: &[Field<PooledKind>] = &[
    Field::new("variants", PooledKind::array(VARIANT)),
    Field::new("messages", PooledKind::array(MESSAGE)),
    Field::new("pictures", PooledKind::array(PICTURE)),
];
