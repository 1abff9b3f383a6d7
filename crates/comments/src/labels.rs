/// Interface strings the heuristics look for.
/// Supports: English, Spanish

/// Buttons that load more top-level comments.
pub const LOAD_MORE_COMMENTS: &[&str] = &[
    // English
    "See more comments",
    "View more comments",
    // Spanish
    "Ver más comentarios",
    // English
    "View previous comments",
    // Spanish
    "Mostrar comentarios anteriores",
    "Mostrar más comentarios",
    // English
    "Load more comments",
    // Spanish
    "Cargar más comentarios",
];

/// Inline "see more" links that expand a truncated comment.
pub const SEE_MORE: &[&str] = &["See more", "Ver más", "Show more", "Mostrar más"];

/// Fragments of relative timestamps ("2 h", "hace 5 min").
pub const TIME_FRAGMENTS: &[&str] = &["h", "min", "21 h", "2 h", "hace"];

/// Navigation chrome that disqualifies a time-anchored context.
pub const NAVIGATION_WORDS: &[&str] = &["inicio", "video", "explorar", "reels", "chats no leídos"];

/// Navigation chrome that disqualifies a bold-author container.
pub const CONTAINER_NOISE_WORDS: &[&str] = &[
    "inicio",
    "video",
    "explorar",
    "reels",
    "notificaciones",
    "chats no leídos",
];

/// Words worth counting when studying an unfamiliar page layout.
pub const INSPECT_KEYWORDS: &[&str] = &["hora", "minuto", "Me gusta", "Responder", "hace"];

pub fn contains_any(text_lower: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text_lower.contains(w))
}
