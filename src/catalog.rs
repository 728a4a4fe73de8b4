use serde::Serialize;

use crate::codec::{Value, ValueDomain};
use crate::error_codes::MetaPixelError;
use crate::persistence::GRID_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Misc,
    Capes,
    Particles,
    Strange,
    Special,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Misc => "Misc",
            Self::Capes => "Capes",
            Self::Particles => "Particles",
            Self::Strange => "Strange",
            Self::Special => "Special",
        }
    }

    pub fn color_name(self) -> &'static str {
        match self {
            Self::Misc => "Gold",
            Self::Capes => "LightSkyBlue",
            Self::Particles => "PaleGreen",
            Self::Strange => "Wheat1",
            Self::Special => "HotPink",
        }
    }
}

/// One catalog declaration. The red channel of a stored row is `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaPixelType {
    pub id: u8,
    pub name: &'static str,
    pub domain: ValueDomain,
    #[serde(skip)]
    pub default: Value,
    pub help: &'static str,
    pub category: Category,
}

const HAT_VEC2: ValueDomain = ValueDomain::Vec2 {
    midpoint: (128, 128),
    range: 16,
};
const UNIT_FLOAT: ValueDomain = ValueDomain::Float { range: 1.0 };
const CENTERED: Value = Value::Vec2(0, 0);

const fn normalized(range: f64, allow_negative: bool) -> ValueDomain {
    ValueDomain::NormalizedVec2 {
        range,
        allow_negative,
    }
}

const fn entry(
    id: u8,
    name: &'static str,
    domain: ValueDomain,
    default: Value,
    help: &'static str,
    category: Category,
) -> MetaPixelType {
    MetaPixelType {
        id,
        name,
        domain,
        default,
        help,
        category,
    }
}

const RANDOMIZE_HELP_X: &str = "If present, the previously defined metapixel value will have a random number between G and B applied to its X value each time it's used. This will generally only work with particles..";

#[rustfmt::skip]
const CATALOG_TABLE: [MetaPixelType; 35] = [
    // Misc
    entry(1, "HatOffset", HAT_VEC2, CENTERED,
        "Hat offset position in pixels", Category::Misc),
    entry(2, "UseDuckColor", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, White (255, 255, 255) and Grey(157, 157, 157) will be recolored to duck colors.",
        Category::Misc),
    // Capes
    entry(10, "CapeOffset", HAT_VEC2, CENTERED,
        "Cape offset position in pixels", Category::Capes),
    entry(11, "CapeForeground", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, the cape will be drawn over the duck.", Category::Capes),
    entry(12, "CapeSwayModifier", normalized(1.0, true), Value::NormalizedVec2(0.3, 1.0),
        "Affects cape length, and left to right sway.", Category::Capes),
    entry(13, "CapeWiggleModifier", normalized(1.0, true), Value::NormalizedVec2(1.0, 1.0),
        "Affects how much the cape wiggles in the wind.", Category::Capes),
    entry(14, "CapeTaperStart", UNIT_FLOAT, Value::Float(0.5),
        "Affects how narrow the cape/trail is at the top/beginning.", Category::Capes),
    entry(15, "CapeTaperEnd", UNIT_FLOAT, Value::Float(1.0),
        "Affects how narrow the cape/trail is at the bottom/end.", Category::Capes),
    entry(16, "CapeAlphaStart", UNIT_FLOAT, Value::Float(1.0),
        "Affects how transparent the cape/trail is at the top/beginning.", Category::Capes),
    entry(17, "CapeAlphaEnd", UNIT_FLOAT, Value::Float(1.0),
        "Affects how transparent the cape/trail is at the bottom/end.", Category::Capes),
    entry(20, "CapeIsTrail", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, the cape will be a trail instead of a cape (think of the rainbow trail left by the TV object).",
        Category::Capes),
    // Particles
    entry(30, "ParticleEmitterOffset", HAT_VEC2, CENTERED,
        "The offset in pixels from the center of the hat where particles will be emitted.",
        Category::Particles),
    entry(31, "ParticleDefaultBehavior", ValueDomain::Int { range: 4 }, Value::Int(0),
        "B defines a particle behavior from a list of presets: 0 = No Behavior, 1 = Spit, 2 = Burst, 3 = Halo, 4 = Exclamation",
        Category::Particles),
    entry(32, "ParticleEmitShape", ValueDomain::IntPair { range_x: 2, range_y: 2 }, Value::IntPair(0, 0),
        "G: 0 = Point, 1 = Circle, 2 = Box   B: 0 = Emit Around Shape Border Randomly, 1 = Fill Shape Randomly, 2 = Emit Around Shape Border Uniformly",
        Category::Particles),
    entry(33, "ParticleEmitShapeSize", ValueDomain::Vec2 { midpoint: (24, 24), range: 24 }, CENTERED,
        "X and Y size of the particle emitter (in pixels). Should be IntPair with usage but is this type in docs.",
        Category::Particles),
    entry(34, "ParticleCount", ValueDomain::Int { range: 8 }, Value::Int(4),
        "The number of particles to emit.", Category::Particles),
    entry(35, "ParticleLifespan", ValueDomain::Float { range: 2.0 }, Value::Float(1.0),
        "Life span of the particle, in seconds (0 to 2 seconds)", Category::Particles),
    entry(36, "ParticleVelocity", normalized(2.0, true), Value::NormalizedVec2(0.0, 0.0),
        "Initial velocity of the particle.", Category::Particles),
    entry(37, "ParticleGravity", normalized(2.0, true), Value::NormalizedVec2(0.0, 0.0),
        "Gravity applied to the particle.", Category::Particles),
    entry(38, "ParticleFriction", normalized(2.0, false), Value::NormalizedVec2(1.0, 1.0),
        "Friction applied to the particle (The value it's velocity is multiplied by every frame).",
        Category::Particles),
    entry(39, "ParticleAlpha", normalized(2.0, false), Value::NormalizedVec2(1.0, 1.0),
        "G = Start alpha, B = End alpha", Category::Particles),
    entry(40, "ParticleScale", normalized(2.0, false), Value::NormalizedVec2(1.0, 0.0),
        "G = Start scale, B = End scale", Category::Particles),
    entry(41, "ParticleRotation", normalized(36.0, false), Value::NormalizedVec2(0.0, 0.0),
        "G = Start rotation, B = End rotation", Category::Particles),
    entry(42, "ParticleOffset", HAT_VEC2, CENTERED,
        "Additional X Y offset of particle.", Category::Particles),
    entry(43, "ParticleBackground", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, particles will be rendered behind the duck.", Category::Particles),
    entry(44, "ParticleAnchor", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, particles will stay anchored around the hat position when it's moving.",
        Category::Particles),
    entry(45, "ParticleAnimated", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, particles will animate through their frames. Otherwise, a frame will be picked randomly.",
        Category::Particles),
    entry(46, "ParticleAnimationLoop", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, the particle animation will loop.", Category::Particles),
    entry(47, "ParticleAnimationRandomFrame", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, the particle animation will start on a random frame.",
        Category::Particles),
    entry(48, "ParticleAnimationSpeed", UNIT_FLOAT, Value::Float(0.1),
        "How quickly the particle animates.", Category::Particles),
    // Strange
    entry(70, "WetLips", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, the hat will have 'wet lips'.", Category::Strange),
    entry(71, "MechanicalLips", ValueDomain::Bool, Value::Empty,
        "If this metapixel exists, the hat will have 'mechanical lips'.", Category::Strange),
    // Special
    entry(100, "RandomizeParameterX", ValueDomain::Randomized, Value::Empty,
        RANDOMIZE_HELP_X, Category::Special),
    entry(101, "RandomizeParameterY", ValueDomain::Randomized, Value::Empty,
        RANDOMIZE_HELP_X, Category::Special),
    entry(102, "RandomizeParameter", ValueDomain::Randomized, Value::Empty,
        "If present, the previously defined metapixel value will have a random number between G and B applied to its X and Y values each time it's used. This will generally only work with particles..",
        Category::Special),
];

pub static CATALOG: [MetaPixelType; 35] = CATALOG_TABLE;

// Every type must fit in its own row of the reserved column.
const _: () = assert!(CATALOG_TABLE.len() <= GRID_HEIGHT as usize);

const NO_ENTRY: u8 = u8::MAX;

static INDEX: [u8; 256] = build_index(&CATALOG_TABLE);

const fn build_index(table: &[MetaPixelType]) -> [u8; 256] {
    let mut index = [NO_ENTRY; 256];
    let mut position = 0;
    while position < table.len() {
        let id = table[position].id as usize;
        assert!(index[id] == NO_ENTRY, "duplicate metapixel id in catalog");
        index[id] = position as u8;
        position += 1;
    }
    index
}

pub fn all() -> &'static [MetaPixelType] {
    &CATALOG
}

pub fn lookup(id: u8) -> Option<&'static MetaPixelType> {
    match INDEX[id as usize] {
        NO_ENTRY => None,
        position => CATALOG.get(position as usize),
    }
}

pub fn require(id: u8) -> Result<&'static MetaPixelType, MetaPixelError> {
    lookup(id).ok_or(MetaPixelError::UnknownTypeId { id, row: None })
}

/// Resolves a user-supplied type reference: a catalog name (any case) or a decimal id.
pub fn lookup_name(name: &str) -> Option<&'static MetaPixelType> {
    let trimmed = name.trim();
    if let Ok(id) = trimmed.parse::<u8>() {
        return lookup(id);
    }
    CATALOG
        .iter()
        .find(|kind| kind.name.eq_ignore_ascii_case(trimmed))
}

pub fn resolve(name: &str) -> Result<&'static MetaPixelType, MetaPixelError> {
    lookup_name(name).ok_or_else(|| MetaPixelError::UnknownTypeName {
        name: name.to_owned(),
    })
}

impl MetaPixelType {
    pub fn value_help(&self) -> String {
        self.domain.help()
    }
}
