//! ARIA Support
//!
//! States the site's widgets mirror into attributes.

/// ARIA state/property attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaState {
    /// Disclosure open/closed
    Expanded,
    /// Toggle button on/off
    Pressed,
    /// Form control failed validation
    Invalid,
    /// Id of the element describing this one
    DescribedBy,
}

impl AriaState {
    /// Attribute name
    pub fn attr(&self) -> &'static str {
        match self {
            Self::Expanded => "aria-expanded",
            Self::Pressed => "aria-pressed",
            Self::Invalid => "aria-invalid",
            Self::DescribedBy => "aria-describedby",
        }
    }
}

/// Render a boolean ARIA value
pub fn aria_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Parse a boolean ARIA value; anything but `true`/`false` is `None`
pub fn parse_aria_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
