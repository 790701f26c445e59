use super::Complexity;

/// A source the manager knows how to build out of the box
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourcePreset {
    pub type_tag: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub complexity: Complexity,
}

pub const DEFAULT_PRESETS: [SourcePreset; 4] = [
    SourcePreset {
        type_tag: "white",
        name: "White Noise",
        color: "#ffffff",
        complexity: Complexity::Basic,
    },
    SourcePreset {
        type_tag: "brown",
        name: "Brown Noise",
        color: "#8b4513",
        complexity: Complexity::Basic,
    },
    SourcePreset {
        type_tag: "pink",
        name: "Pink Noise",
        color: "#ffc0cb",
        complexity: Complexity::Basic,
    },
    SourcePreset {
        type_tag: "ocean",
        name: "Ocean",
        color: "#4a90e2",
        complexity: Complexity::Complex,
    },
];
