use std::collections::HashMap;

use lazy_static::lazy_static;

/// Letters that look alike: a base letter with its accented variants.
const VISUAL_LETTER_GROUPS: &[&str] = &[
    "aàáâãäåæāăąǎǟǡǻȁȃȧ",
    "cçćĉċčƈ",
    "dďđḋḍḏḑ",
    "eèéêëēĕėęěȅȇȩ",
    "gĝğġģǥǧǵ",
    "hĥħḣḥḧḩ",
    "iìíîïĩīĭįıǐȉȋ",
    "jĵǰ",
    "kķǩḱḳ",
    "lĺļľŀłḷ",
    "nñńņňŉŋǹ",
    "oòóôõöøōŏőǒǫǭȍȏȫȭȯȱ",
    "rŕŗřȑȓṙṛ",
    "sśŝşšșṡṣ",
    "tţťŧțṫṭ",
    "uùúûüũūŭůűųǔǖǘǚǜȕȗ",
    "wŵẁẃẅẇ",
    "yýÿŷȳẏỳ",
    "zźżžƶẑẓ",
];

lazy_static! {
    static ref VISUAL_GROUP_MASKS: HashMap<char, u32> = {
        let mut masks = HashMap::new();
        for (i, group) in VISUAL_LETTER_GROUPS.iter().enumerate() {
            let bit = 1u32 << i;
            for c in group.chars().flat_map(|c| c.to_lowercase().chain(c.to_uppercase())) {
                *masks.entry(c).or_insert(0) |= bit;
            }
        }
        masks
    };
}

/// Bit set of the visual groups `c` belongs to; 0 for letters in none.
pub fn visual_mask(c: char) -> u32 {
    VISUAL_GROUP_MASKS.get(&c).copied().unwrap_or(0)
}

pub fn look_alike(a: char, b: char) -> bool {
    visual_mask(a) & visual_mask(b) != 0
}
