//! Chunk schemas of the layout format.
//!
//! Offsets in the comments are from the start of the chunk.

use wuj_schema::{Field, InlineKind, ScopeRule, SectionTable, Tag, SIZE_KEY, TAG_KEY};

pub const LYT1: Tag = Tag::new(b"lyt1");
pub const TXL1: Tag = Tag::new(b"txl1");
pub const FNL1: Tag = Tag::new(b"fnl1");
pub const MAT1: Tag = Tag::new(b"mat1");
pub const PAN1: Tag = Tag::new(b"pan1");
pub const PAS1: Tag = Tag::new(b"pas1");
pub const PAE1: Tag = Tag::new(b"pae1");
pub const PIC1: Tag = Tag::new(b"pic1");
pub const BND1: Tag = Tag::new(b"bnd1");
pub const TXT1: Tag = Tag::new(b"txt1");
pub const WND1: Tag = Tag::new(b"wnd1");
pub const GRP1: Tag = Tag::new(b"grp1");
pub const GRS1: Tag = Tag::new(b"grs1");
pub const GRE1: Tag = Tag::new(b"gre1");

const BASE: &[Field<InlineKind>] = &[
    Field::new(TAG_KEY, InlineKind::TAG),
    Field::new(SIZE_KEY, InlineKind::U32),
];

const LAYOUT: &[Field<InlineKind>] = &[
    Field::new(TAG_KEY, InlineKind::TAG),
    Field::new(SIZE_KEY, InlineKind::U32),
    Field::new("centered", InlineKind::BOOL8),
    Field::padding(InlineKind::pad(3)),
    Field::new("size x", InlineKind::F32),
    Field::new("size y", InlineKind::F32),
];

const TEXTURE: &[Field<InlineKind>] = &[
    Field::new("name", InlineKind::U32),
    Field::padding(InlineKind::pad(4)),
];

const TEXTURE_LIST: &[Field<InlineKind>] = &[
    Field::new(TAG_KEY, InlineKind::TAG),
    Field::new(SIZE_KEY, InlineKind::U32),
    // 0x08
    Field::new("tpls", InlineKind::array(0x0C, TEXTURE)),
    Field::padding(InlineKind::pad(2)),
];

/// Shared by every pane kind; kind-specific data stays undecoded.
const PANE: &[Field<InlineKind>] = &[
    Field::new(TAG_KEY, InlineKind::TAG),
    Field::new(SIZE_KEY, InlineKind::U32),
    Field::new("flags", InlineKind::U8),
    Field::new("origin", InlineKind::U8),
    Field::new("alpha", InlineKind::U8),
    Field::padding(InlineKind::pad(1)),
    // 0x0C
    Field::new("name", InlineKind::string(16)),
    Field::new("user data", InlineKind::string(8)),
    // 0x24
    Field::new("translation x", InlineKind::F32),
    Field::new("translation y", InlineKind::F32),
    Field::new("translation z", InlineKind::F32),
    Field::new("rotation x", InlineKind::F32),
    Field::new("rotation y", InlineKind::F32),
    Field::new("rotation z", InlineKind::F32),
    Field::new("scale x", InlineKind::F32),
    Field::new("scale y", InlineKind::F32),
    Field::new("size x", InlineKind::F32),
    Field::new("size y", InlineKind::F32),
];

const GROUP_PANE: &[Field<InlineKind>] = &[Field::new("name", InlineKind::string(16))];

const GROUP: &[Field<InlineKind>] = &[
    Field::new(TAG_KEY, InlineKind::TAG),
    Field::new(SIZE_KEY, InlineKind::U32),
    Field::new("name", InlineKind::string(16)),
    // 0x18
    Field::new("panes", InlineKind::array(0x1C, GROUP_PANE)),
    Field::padding(InlineKind::pad(2)),
];

/// Every chunk kind a layout may contain.
pub const LAYOUT_SECTIONS: SectionTable = SectionTable {
    schemas: &[
        (LYT1, LAYOUT),
        (TXL1, TEXTURE_LIST),
        (FNL1, BASE),
        (MAT1, BASE),
        (PAN1, PANE),
        (PAS1, BASE),
        (PAE1, BASE),
        (PIC1, PANE),
        (BND1, PANE),
        (TXT1, PANE),
        (WND1, PANE),
        (GRP1, GROUP),
        (GRS1, BASE),
        (GRE1, BASE),
    ],
    scopes: &[
        ScopeRule {
            owner: PAN1,
            open: PAS1,
            close: PAE1,
        },
        ScopeRule {
            owner: GRP1,
            open: GRS1,
            close: GRE1,
        },
    ],
};

#[cfg(test)]
mod tests {
    use wuj_schema::{field_offset, record_size};

    use super::*;

    #[test]
    fn test_schema_sizes() {
        assert_eq!(record_size(LAYOUT), 0x14);
        assert_eq!(record_size(TEXTURE_LIST), 0x0C);
        assert_eq!(record_size(PANE), 0x4C);
        assert_eq!(record_size(GROUP), 0x1C);
        assert_eq!(field_offset(PANE, "translation x"), Some(0x24));
        assert_eq!(field_offset(GROUP, "panes"), Some(0x18));
    }

    #[test]
    fn test_every_tag_has_a_schema() {
        for rule in LAYOUT_SECTIONS.scopes {
            assert!(LAYOUT_SECTIONS.schema(rule.owner).is_some());
            assert!(LAYOUT_SECTIONS.schema(rule.open).is_some());
            assert!(LAYOUT_SECTIONS.schema(rule.close).is_some());
        }
        assert_eq!(LAYOUT_SECTIONS.schemas.len(), 14);
    }
}
