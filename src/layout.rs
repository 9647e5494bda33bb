use std::fmt;

const ROW_UNITS: f32 = 10.0;

const LOWERCASE_ROWS: [&[&str]; 4] = [
    &["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"],
    &["a", "s", "d", "f", "g", "h", "j", "k", "l"],
    &["shift", "z", "x", "c", "v", "b", "n", "m", "backspace"],
    &["?123", "space", "send"],
];

const SYMBOL_ROWS: [&[&str]; 4] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
    &["@", "#", "$", "_", "&", "-", "+", "(", ")", "/"],
    &["=", "*", "\"", "'", ":", ";", "!", "?", "backspace"],
    &["ABC", "space", "."],
];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("Layout size must be positive (got {width}x{height})")]
    InvalidSize { width: f32, height: f32 },
    #[error("Layout row {0} has no keys")]
    EmptyRow(usize),
    #[error("Layout has no rows")]
    NoRows,
}

/// Axis-aligned key region in container coordinates. Half-open on the far edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Letter,
    Modifier,
    Action,
}

/// What a key does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCap {
    Char(char),
    Shift,
    Backspace,
    Space,
    Send,
    Symbols,
    Letters,
}

impl KeyCap {
    pub fn from_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeyCap::Char(c));
        }

        match label {
            "shift" => Some(KeyCap::Shift),
            "backspace" => Some(KeyCap::Backspace),
            "space" => Some(KeyCap::Space),
            "send" => Some(KeyCap::Send),
            "?123" => Some(KeyCap::Symbols),
            "ABC" => Some(KeyCap::Letters),
            _ => None,
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            KeyCap::Char(_) => KeyKind::Letter,
            KeyCap::Shift => KeyKind::Modifier,
            _ => KeyKind::Action,
        }
    }

    /// Width in key units.
    fn units(&self) -> f32 {
        match self {
            KeyCap::Space => 4.0,
            KeyCap::Send => 2.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for KeyCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCap::Char(c) => write!(f, "{}", c),
            KeyCap::Shift => f.write_str("shift"),
            KeyCap::Backspace => f.write_str("backspace"),
            KeyCap::Space => f.write_str("space"),
            KeyCap::Send => f.write_str("send"),
            KeyCap::Symbols => f.write_str("?123"),
            KeyCap::Letters => f.write_str("ABC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub cap: KeyCap,
    pub bounds: Rect,
    pub row: usize,
    pub col: usize,
}

impl Key {
    pub fn kind(&self) -> KeyKind {
        self.cap.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutVariant {
    Lowercase,
    Uppercase,
    Symbols,
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    variant: LayoutVariant,
    rows: Vec<Vec<Key>>,
    width: f32,
    height: f32,
}

impl KeyboardLayout {
    /// Builds one of the stock tables sized to a `width` x `height` container.
    pub fn standard(variant: LayoutVariant, width: f32, height: f32) -> Result<Self, LayoutError> {
        let layout = match variant {
            LayoutVariant::Lowercase | LayoutVariant::Uppercase => {
                Self::from_labels(variant, &LOWERCASE_ROWS, width, height)?
            }
            LayoutVariant::Symbols => Self::from_labels(variant, &SYMBOL_ROWS, width, height)?,
        };

        if variant == LayoutVariant::Uppercase {
            return Ok(layout.uppercased());
        }
        Ok(layout)
    }

    /// Builds a layout from label rows. Unknown multi-character labels are skipped.
    pub fn from_labels(
        variant: LayoutVariant,
        rows: &[&[&str]],
        width: f32,
        height: f32,
    ) -> Result<Self, LayoutError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::InvalidSize { width, height });
        }
        if rows.is_empty() {
            return Err(LayoutError::NoRows);
        }

        let row_height = height / rows.len() as f32;
        let unit = width / ROW_UNITS;
        let mut built = Vec::with_capacity(rows.len());

        for (row_index, labels) in rows.iter().enumerate() {
            let caps: Vec<KeyCap> = labels
                .iter()
                .filter_map(|label| {
                    let cap = KeyCap::from_label(label);
                    if cap.is_none() {
                        log::warn!("Skipping unknown key label: {}", label);
                    }
                    cap
                })
                .collect();

            if caps.is_empty() {
                return Err(LayoutError::EmptyRow(row_index));
            }

            let row_units: f32 = caps.iter().map(KeyCap::units).sum();
            // Rows wider than the container shrink to fit
            let key_unit = unit.min(width / row_units);
            let mut x = (width - row_units * key_unit) / 2.0;
            let y = row_index as f32 * row_height;

            let keys = caps
                .into_iter()
                .enumerate()
                .map(|(col, cap)| {
                    let key_width = cap.units() * key_unit;
                    let key = Key {
                        cap,
                        bounds: Rect::new(x, y, key_width, row_height),
                        row: row_index,
                        col,
                    };
                    x += key_width;
                    key
                })
                .collect();
            built.push(keys);
        }

        Ok(Self {
            variant,
            rows: built,
            width,
            height,
        })
    }

    fn uppercased(mut self) -> Self {
        for key in self.rows.iter_mut().flatten() {
            if let KeyCap::Char(c) = key.cap {
                key.cap = KeyCap::Char(c.to_ascii_uppercase());
            }
        }
        self.variant = LayoutVariant::Uppercase;
        self
    }

    pub fn variant(&self) -> LayoutVariant {
        self.variant
    }

    pub fn rows(&self) -> &[Vec<Key>] {
        &self.rows
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.rows.iter().flatten()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Geometric hit test against key bounds.
    pub fn key_at(&self, x: f32, y: f32) -> Option<&Key> {
        self.keys().find(|key| key.bounds.contains(x, y))
    }

    pub fn find(&self, cap: KeyCap) -> Option<&Key> {
        self.keys().find(|key| key.cap == cap)
    }
}
