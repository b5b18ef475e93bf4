//! Category taxonomy types.

use std::collections::HashMap;

/// Mapping from category identifier to display label.
///
/// Identifiers are strings because the marketplace uses both numeric ids
/// (`"91"`) and URL slugs (`"autos"`) depending on which markup generation
/// the page was served from. Order is irrelevant; a snapshot is always
/// replaced wholesale on refresh.
pub type CategoryMap = HashMap<String, String>;

/// Broad top-level categories used when the live site cannot be scraped.
///
/// The category selector must never be empty, so lookups fall back to this
/// fixed list instead of surfacing fetch errors.
pub fn fallback_categories() -> CategoryMap {
    [
        ("1", "Auto's"),
        ("2", "Motoren"),
        ("3", "Elektronica"),
        ("4", "Computers en Software"),
        ("5", "Kleding | Dames"),
        ("6", "Kleding | Heren"),
        ("7", "Meubels"),
        ("8", "Huis en Inrichting"),
        ("9", "Antiek en Kunst"),
        ("10", "Audio, Tv en Foto"),
        ("11", "Boeken"),
        ("12", "Muziek en Instrumenten"),
        ("13", "Verzamelen"),
        ("14", "Sport en Fitness"),
        ("15", "Spelcomputers en Games"),
        ("16", "Hobby en Vrije tijd"),
    ]
    .into_iter()
    .map(|(id, label)| (id.to_string(), label.to_string()))
    .collect()
}
