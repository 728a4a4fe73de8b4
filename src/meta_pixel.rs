use image::Rgba;

use crate::catalog::MetaPixelType;
use crate::codec::{clamp_byte, Value, ValueCodec, ValueDomain};
use crate::error_codes::MetaPixelError;

/// A live metapixel: one catalog type plus the codec state it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaPixel {
    kind: &'static MetaPixelType,
    codec: ValueCodec,
}

impl MetaPixel {
    /// Builds a metapixel from a stored channel pair, decoding it immediately.
    pub fn new(kind: &'static MetaPixelType, g: u8, b: u8) -> Self {
        let mut codec = ValueCodec::new(kind.domain);
        codec.set_colors(g, b);
        Self { kind, codec }
    }

    /// Builds a metapixel holding the catalog's declared default value.
    pub fn with_default(kind: &'static MetaPixelType) -> Self {
        let mut pixel = Self::new(kind, 0, 0);
        let (a, b) = kind.default.pair();
        pixel.set_value(a, b);
        pixel
    }

    pub fn kind(&self) -> &'static MetaPixelType {
        self.kind
    }

    pub fn id(&self) -> u8 {
        self.kind.id
    }

    pub fn name(&self) -> &'static str {
        self.kind.name
    }

    pub fn colors(&self) -> (u8, u8) {
        self.codec.colors()
    }

    /// Row pixel for the reserved column: `(id, g, b, 255)`.
    pub fn get_rgba(&self) -> Rgba<u8> {
        let (a, b) = self.codec.value().pair();
        let (green, blue) = match self.kind.domain {
            ValueDomain::Randomized => {
                let (seed, _) = self.codec.colors();
                (i32::from(seed), i32::from(seed))
            }
            domain => domain.encode(a, b),
        };
        Rgba([self.kind.id, clamp_byte(green), clamp_byte(blue), u8::MAX])
    }

    pub fn get_value(&self) -> Value {
        self.codec.value()
    }

    pub fn set_value(&mut self, a: f64, b: f64) {
        self.codec.set_value(a, b);
    }

    pub fn set_colors(&mut self, g: u8, b: u8) {
        self.codec.set_colors(g, b);
    }

    /// Applies free-form text input. Text that is not a finite number counts
    /// as `0.0`; the failure is logged and never returned.
    pub fn set_value_text(&mut self, a: &str, b: &str) {
        let a = parse_component(a).unwrap_or_else(|error| {
            log::debug!("{}: {error}, using 0.0", self.name());
            0.0
        });
        let b = parse_component(b).unwrap_or_else(|error| {
            log::debug!("{}: {error}, using 0.0", self.name());
            0.0
        });
        self.set_value(a, b);
    }

    /// Applies free-form channel input. Integers outside `0..=255` are
    /// clamped; anything else counts as `0`.
    pub fn set_colors_text(&mut self, g: &str, b: &str) {
        let g = parse_channel(g).unwrap_or_else(|error| {
            log::debug!("{}: {error}, using 0", self.name());
            0
        });
        let b = parse_channel(b).unwrap_or_else(|error| {
            log::debug!("{}: {error}, using 0", self.name());
            0
        });
        self.set_colors(g, b);
    }

    pub fn type_help(&self) -> &'static str {
        self.kind.help
    }

    pub fn value_help(&self) -> String {
        self.kind.value_help()
    }

    /// Display form of the value: first component to 2 decimals, second to 3,
    /// integral results without a fraction.
    pub fn format_components(&self) -> Vec<String> {
        self.get_value()
            .components()
            .into_iter()
            .zip([2usize, 3])
            .map(|(component, decimals)| format_component(component, decimals))
            .collect()
    }
}

pub fn parse_component(raw: &str) -> Result<f64, MetaPixelError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MetaPixelError::ValueParse {
            input: trimmed.to_owned(),
        }),
    }
}

pub fn parse_channel(raw: &str) -> Result<u8, MetaPixelError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map(|value| value.clamp(0, 255) as u8)
        .map_err(|_| MetaPixelError::ValueParse {
            input: trimmed.to_owned(),
        })
}

fn format_component(value: f64, decimals: usize) -> String {
    let rounded = format!("{value:.decimals$}");
    let truncated = value.trunc();
    match rounded.parse::<f64>() {
        Ok(parsed) if parsed == truncated => format!("{}", truncated as i64),
        Ok(parsed) => format!("{parsed}"),
        Err(_) => rounded,
    }
}
