//! Data roles for item models.
//!
//! Roles define what aspect of a cell is being requested or set. Each cell
//! of the outliner can answer several roles: its text, its edit value, a
//! tool tip, colors, a check state for the visibility column, and so on.

/// Standard roles for accessing different aspects of item data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Primary text (or value) to display.
    Display,
    /// Value for editing (may be richer than the display text).
    Edit,
    /// Tooltip text shown on hover. Should return `String`.
    ToolTip,
    /// Text alignment for this cell. Should return `TextAlignment`.
    TextAlignment,
    /// Background color for the cell. Should return `Color`.
    BackgroundColor,
    /// Foreground (text) color for the cell. Should return `Color`.
    ForegroundColor,
    /// Check state for checkable cells. Should return `CheckState`.
    CheckState,
    /// Application-specific roles.
    User(u32),
}

/// Whether the visibility of an item may be toggled. Returns `Bool`.
pub const HIDEABLE_ROLE: ItemRole = ItemRole::User(0);

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque red.
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Opaque cyan.
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    /// Opaque dark gray.
    pub const DARK_GRAY: Color = Color::rgb(128, 128, 128);
    /// Opaque light gray.
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns a darker color, dividing each channel by `factor / 100`.
    ///
    /// `darker(200)` halves the brightness. Factors of 100 or less return the
    /// color unchanged.
    pub fn darker(self, factor: u32) -> Self {
        if factor <= 100 {
            return self;
        }
        let scale = |c: u8| ((c as u32 * 100) / factor) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }
}

/// Alignment flags for text within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlignment {
    /// Align to the left edge.
    #[default]
    Left,
    /// Align to the center.
    Center,
    /// Align to the right edge.
    Right,
}

/// Check state for checkable cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Not checked.
    #[default]
    Unchecked,
    /// Partially checked (tri-state).
    PartiallyChecked,
    /// Fully checked.
    Checked,
}

impl CheckState {
    /// Returns `true` if the item is checked (fully or partially).
    pub fn is_checked(&self) -> bool {
        !matches!(self, CheckState::Unchecked)
    }

    /// Toggles between Unchecked and Checked.
    /// PartiallyChecked becomes Unchecked.
    pub fn toggle(&self) -> CheckState {
        match self {
            CheckState::Unchecked => CheckState::Checked,
            CheckState::PartiallyChecked | CheckState::Checked => CheckState::Unchecked,
        }
    }
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

/// Container for the data a cell answers for a role.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data (for Display, ToolTip, etc.).
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Color data.
    Color(Color),
    /// Text alignment data.
    TextAlignment(TextAlignment),
    /// Check state data.
    CheckState(CheckState),
}

impl ItemData {
    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ItemData::Float(n) => Some(*n),
            ItemData::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the data as a color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            ItemData::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Attempts to get the data as text alignment.
    pub fn as_text_alignment(&self) -> Option<TextAlignment> {
        match self {
            ItemData::TextAlignment(a) => Some(*a),
            _ => None,
        }
    }

    /// Attempts to get the data as check state.
    pub fn as_check_state(&self) -> Option<CheckState> {
        match self {
            ItemData::CheckState(s) => Some(*s),
            _ => None,
        }
    }

    /// Interprets the data as a truth value the way toggle editors send it:
    /// booleans, non-zero integers and checked states are `true`.
    pub fn to_flag(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            ItemData::Int(n) => Some(*n != 0),
            ItemData::CheckState(s) => Some(s.is_checked()),
            _ => None,
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<Color> for ItemData {
    fn from(c: Color) -> Self {
        ItemData::Color(c)
    }
}

impl From<TextAlignment> for ItemData {
    fn from(a: TextAlignment) -> Self {
        ItemData::TextAlignment(a)
    }
}

impl From<CheckState> for ItemData {
    fn from(s: CheckState) -> Self {
        ItemData::CheckState(s)
    }
}

impl<T: Into<ItemData>> From<Option<T>> for ItemData {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => value.into(),
            None => ItemData::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_state_toggle() {
        assert_eq!(CheckState::Unchecked.toggle(), CheckState::Checked);
        assert_eq!(CheckState::Checked.toggle(), CheckState::Unchecked);
        assert_eq!(CheckState::PartiallyChecked.toggle(), CheckState::Unchecked);
        assert_eq!(CheckState::from(true), CheckState::Checked);
    }

    #[test]
    fn test_item_data_string() {
        let data = ItemData::from("hello");
        assert_eq!(data.as_string(), Some("hello"));
        assert!(data.as_int().is_none());
        assert_eq!(data.into_string().as_deref(), Some("hello"));
    }

    #[test]
    fn test_item_data_from_option() {
        assert!(ItemData::from(None::<String>).is_none());
        assert_eq!(ItemData::from(Some(true)), ItemData::Bool(true));
    }

    #[test]
    fn test_to_flag() {
        assert_eq!(ItemData::Bool(false).to_flag(), Some(false));
        assert_eq!(ItemData::Int(2).to_flag(), Some(true));
        assert_eq!(ItemData::CheckState(CheckState::Checked).to_flag(), Some(true));
        assert_eq!(ItemData::from("yes").to_flag(), None);
    }

    #[test]
    fn test_color_darker() {
        assert_eq!(Color::CYAN.darker(200), Color::rgb(0, 127, 127));
        assert_eq!(Color::RED.darker(50), Color::RED);
    }
}
