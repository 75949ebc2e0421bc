use scenery_query::Address;

use crate::entry::{AnnotationKind, Choices, RegistryEntry};

fn fixed(options: &[&str]) -> Choices {
    Choices::Fixed(options.iter().map(|&option| option.to_owned()).collect())
}

/// Default table for scene files.
pub(crate) fn entries() -> Vec<RegistryEntry> {
    use AnnotationKind::*;

    vec![
        RegistryEntry::by_key("color", Color),
        RegistryEntry::by_key("offset", Vector),
        RegistryEntry::by_key("visible", Boolean),
        RegistryEntry::by_key("interactive", Boolean),
        RegistryEntry::by_key("cap", Dropdown).with_choices(fixed(&["butt", "square", "round"])),
        RegistryEntry::by_key("join", Dropdown).with_choices(fixed(&["bevel", "round", "miter"])),
        RegistryEntry::by_key("style", Dropdown)
            .with_choices(Choices::KeysAt(Address::parse("styles"))),
        RegistryEntry::by_key("source", Dropdown)
            .with_choices(Choices::KeysAt(Address::parse("sources"))),
        RegistryEntry::by_key("order", Number),
        RegistryEntry::by_key("width", Number),
    ]
}
