use serde::Serialize;

/// Slack added before truncating a real onto a byte, so that
/// `encode(decode(g)) == g` survives binary floating point.
pub const QUANTIZE_TOLERANCE: f64 = 1e-6;

/// Channel offset used by [`ValueDomain::NormalizedVec2`] when negatives are allowed.
pub const SIGNED_BYTE_OFFSET: f64 = 128.0;

/// Configuration of one value domain. Immutable and `Copy`; live state lives in
/// [`ValueCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    Bool,
    Int {
        range: i32,
    },
    Float {
        range: f64,
    },
    IntPair {
        range_x: i32,
        range_y: i32,
    },
    Vec2 {
        midpoint: (i32, i32),
        range: i32,
    },
    NormalizedVec2 {
        range: f64,
        allow_negative: bool,
    },
    Randomized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    IntPair,
    Vec2,
    NormalizedVec2,
    Randomized,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::IntPair => "IntPair",
            Self::Vec2 => "Vec2",
            Self::NormalizedVec2 => "NormalizedVec2",
            Self::Randomized => "Randomized",
        }
    }

    /// Swatch name the hat editor has always used for this value type.
    pub fn color_name(self) -> &'static str {
        match self {
            Self::Bool => "Snow2",
            Self::Int => "cyan",
            Self::Float => "Lime",
            Self::IntPair => "DeepSkyBlue",
            Self::Vec2 => "Tan1",
            Self::NormalizedVec2 => "Maroon1",
            Self::Randomized => "SlateBlue",
        }
    }
}

/// Decoded semantic value of a channel pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Empty,
    Int(i32),
    Float(f64),
    IntPair(i32, i32),
    Vec2(i32, i32),
    NormalizedVec2(f64, f64),
}

impl Value {
    pub fn components(&self) -> Vec<f64> {
        match *self {
            Self::Empty => Vec::new(),
            Self::Int(value) => vec![value as f64],
            Self::Float(value) => vec![value],
            Self::IntPair(x, y) | Self::Vec2(x, y) => vec![x as f64, y as f64],
            Self::NormalizedVec2(x, y) => vec![x, y],
        }
    }

    /// Components padded with zeros to the `(a, b)` shape `set_value` takes.
    pub fn pair(&self) -> (f64, f64) {
        let components = self.components();
        (
            components.first().copied().unwrap_or(0.0),
            components.get(1).copied().unwrap_or(0.0),
        )
    }
}

impl ValueDomain {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool => ValueKind::Bool,
            Self::Int { .. } => ValueKind::Int,
            Self::Float { .. } => ValueKind::Float,
            Self::IntPair { .. } => ValueKind::IntPair,
            Self::Vec2 { .. } => ValueKind::Vec2,
            Self::NormalizedVec2 { .. } => ValueKind::NormalizedVec2,
            Self::Randomized => ValueKind::Randomized,
        }
    }

    /// Number of semantic components a decoded value carries.
    pub fn arity(&self) -> usize {
        match self {
            Self::Bool | Self::Randomized => 0,
            Self::Int { .. } | Self::Float { .. } => 1,
            Self::IntPair { .. } | Self::Vec2 { .. } | Self::NormalizedVec2 { .. } => 2,
        }
    }

    pub fn decode(&self, g: u8, b: u8) -> Value {
        let (g, b) = (i32::from(g), i32::from(b));
        match *self {
            Self::Bool | Self::Randomized => Value::Empty,
            Self::Int { range } => Value::Int(clamp_int(g, 0, range)),
            Self::Float { range } => Value::Float(g as f64 / 255.0 * range),
            Self::IntPair { range_x, range_y } => {
                Value::IntPair(clamp_int(g, 0, range_x), clamp_int(b, 0, range_y))
            }
            Self::Vec2 { midpoint, range } => Value::Vec2(
                clamp_int(g - midpoint.0, -range, range),
                clamp_int(b - midpoint.1, -range, range),
            ),
            Self::NormalizedVec2 {
                range,
                allow_negative,
            } => {
                let offset = normalized_offset(allow_negative);
                let x = (g as f64 - offset) / 255.0 * range;
                let y = (b as f64 - offset) / 255.0 * range;
                let half = range / 2.0;
                // Without negatives x spans the full range but y keeps the
                // signed half-range bound.
                if allow_negative {
                    Value::NormalizedVec2(clamp_real(x, -half, half), clamp_real(y, -half, half))
                } else {
                    Value::NormalizedVec2(clamp_real(x, 0.0, range), clamp_real(y, -half, half))
                }
            }
        }
    }

    /// Maps semantic components onto a channel pair. The result is not yet
    /// clamped into byte range; see [`clamp_byte`].
    pub fn encode(&self, a: f64, b: f64) -> (i32, i32) {
        match *self {
            Self::Bool => (0, 0),
            Self::Int { .. } => (quantize(a), 0),
            Self::Float { range } => (quantize(255.0 * (a / range)), 0),
            Self::IntPair { .. } => (quantize(a), quantize(b)),
            Self::Vec2 { midpoint, .. } => (
                quantize(a + midpoint.0 as f64),
                quantize(b + midpoint.1 as f64),
            ),
            Self::NormalizedVec2 {
                range,
                allow_negative,
            } => {
                let offset = normalized_offset(allow_negative);
                (
                    quantize(255.0 * (a / range) + offset),
                    quantize(255.0 * (b / range) + offset),
                )
            }
            Self::Randomized => {
                let seed = quantize(a);
                (seed, seed)
            }
        }
    }

    pub fn help(&self) -> String {
        match *self {
            Self::Bool => "If this meta pixel exists its properties are on".to_owned(),
            Self::Int { range } => format!(
                "The green RGB value is the value of the integer. This integer has a max value of {range}"
            ),
            Self::Float { range } => format!(
                "0 through 255 will be translated into a number between two values. For this float those two values are 0.0 to {range:?}."
            ),
            Self::IntPair { range_x, range_y } => format!(
                "The green RGB value is the first value of the integer, the second is the blue RGB value. This IntPair has a max value A & max value B of ({range_x}, {range_y})"
            ),
            Self::Vec2 { midpoint, range } => format!(
                "{} is 0, negative numbers are below that value & positive above. This Vec2 has a range of {} which means the min & max are ({}, {})",
                midpoint.0,
                range,
                midpoint.0 - range,
                midpoint.1 + range
            ),
            Self::NormalizedVec2 {
                range,
                allow_negative,
            } => {
                let (min, max) = if allow_negative {
                    (-range / 2.0, range / 2.0)
                } else {
                    (0.0, range)
                };
                format!(
                    "A vector that behaves like a float where the green & blue RGB values (0 through 255) are turned into a different number range. For this NormalizedVec2 that is ({min:?}, {max:?})"
                )
            }
            Self::Randomized => self.kind().name().to_owned(),
        }
    }
}

/// Live codec state: a domain plus its decoded value and cached channel pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCodec {
    domain: ValueDomain,
    value: Value,
    green: u8,
    blue: u8,
}

impl ValueCodec {
    pub fn new(domain: ValueDomain) -> Self {
        let mut codec = Self {
            domain,
            value: Value::Empty,
            green: 0,
            blue: 0,
        };
        codec.set_colors(0, 0);
        codec
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn colors(&self) -> (u8, u8) {
        (self.green, self.blue)
    }

    /// Decodes the pair, then re-derives the cached channels from the decoded
    /// value so both representations agree.
    pub fn set_colors(&mut self, g: u8, b: u8) {
        self.value = self.domain.decode(g, b);
        let (green, blue) = match self.domain {
            ValueDomain::Randomized => self.domain.encode(g as f64, 0.0),
            _ => {
                let (a, b) = self.value.pair();
                self.domain.encode(a, b)
            }
        };
        self.green = clamp_byte(green);
        self.blue = clamp_byte(blue);
    }

    /// Encodes the components, then normalises through [`Self::set_colors`]
    /// so out-of-domain input settles on the domain bound.
    pub fn set_value(&mut self, a: f64, b: f64) {
        if matches!(self.domain, ValueDomain::Bool | ValueDomain::Randomized) {
            return;
        }
        let (green, blue) = self.domain.encode(a, b);
        self.set_colors(clamp_byte(green), clamp_byte(blue));
    }
}

pub fn clamp_byte(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn quantize(value: f64) -> i32 {
    (value + QUANTIZE_TOLERANCE * value.signum()).trunc() as i32
}

fn normalized_offset(allow_negative: bool) -> f64 {
    if allow_negative {
        SIGNED_BYTE_OFFSET
    } else {
        0.0
    }
}

fn clamp_int(value: i32, min: i32, max: i32) -> i32 {
    value.max(min).min(max)
}

fn clamp_real(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
