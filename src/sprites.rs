use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

use crate::config::CELL_WIDTH;
use crate::input::Direction;
use crate::obstacle::ObstacleKind;

/// Everything the renderer can draw in a grid cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Sprite {
    Head(Direction),
    /// Closed mouth with the tongue flicked out.
    HeadTongue(Direction),
    HeadEating,
    HeadDead,
    Body,
    Tail,
    Food,
    Obstacle(ObstacleKind),
}

/// Glyph overrides from a skin file. Each glyph spans `CELL_WIDTH` columns.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteGlyphs {
    pub head_up: String,
    pub head_down: String,
    pub head_left: String,
    pub head_right: String,
    pub tongue_up: String,
    pub tongue_down: String,
    pub tongue_left: String,
    pub tongue_right: String,
    pub head_eating: String,
    pub head_dead: String,
    pub body: String,
    pub tail: String,
    pub food: String,
    pub boulder: String,
    pub slab: String,
    pub pebble: String,
    pub stump: String,
}

impl Default for SpriteGlyphs {
    fn default() -> Self {
        let glyph = |sprite| default_glyph(sprite).to_owned();

        Self {
            head_up: glyph(Sprite::Head(Direction::Up)),
            head_down: glyph(Sprite::Head(Direction::Down)),
            head_left: glyph(Sprite::Head(Direction::Left)),
            head_right: glyph(Sprite::Head(Direction::Right)),
            tongue_up: glyph(Sprite::HeadTongue(Direction::Up)),
            tongue_down: glyph(Sprite::HeadTongue(Direction::Down)),
            tongue_left: glyph(Sprite::HeadTongue(Direction::Left)),
            tongue_right: glyph(Sprite::HeadTongue(Direction::Right)),
            head_eating: glyph(Sprite::HeadEating),
            head_dead: glyph(Sprite::HeadDead),
            body: glyph(Sprite::Body),
            tail: glyph(Sprite::Tail),
            food: glyph(Sprite::Food),
            boulder: glyph(Sprite::Obstacle(ObstacleKind::Boulder)),
            slab: glyph(Sprite::Obstacle(ObstacleKind::Slab)),
            pebble: glyph(Sprite::Obstacle(ObstacleKind::Pebble)),
            stump: glyph(Sprite::Obstacle(ObstacleKind::Stump)),
        }
    }
}

impl SpriteGlyphs {
    #[must_use]
    pub fn get(&self, sprite: Sprite) -> &str {
        match sprite {
            Sprite::Head(Direction::Up) => &self.head_up,
            Sprite::Head(Direction::Down) => &self.head_down,
            Sprite::Head(Direction::Left) => &self.head_left,
            Sprite::Head(Direction::Right) => &self.head_right,
            Sprite::HeadTongue(Direction::Up) => &self.tongue_up,
            Sprite::HeadTongue(Direction::Down) => &self.tongue_down,
            Sprite::HeadTongue(Direction::Left) => &self.tongue_left,
            Sprite::HeadTongue(Direction::Right) => &self.tongue_right,
            Sprite::HeadEating => &self.head_eating,
            Sprite::HeadDead => &self.head_dead,
            Sprite::Body => &self.body,
            Sprite::Tail => &self.tail,
            Sprite::Food => &self.food,
            Sprite::Obstacle(ObstacleKind::Boulder) => &self.boulder,
            Sprite::Obstacle(ObstacleKind::Slab) => &self.slab,
            Sprite::Obstacle(ObstacleKind::Pebble) => &self.pebble,
            Sprite::Obstacle(ObstacleKind::Stump) => &self.stump,
        }
    }

    fn named(&self) -> [(&'static str, &str); 17] {
        [
            ("head_up", &self.head_up),
            ("head_down", &self.head_down),
            ("head_left", &self.head_left),
            ("head_right", &self.head_right),
            ("tongue_up", &self.tongue_up),
            ("tongue_down", &self.tongue_down),
            ("tongue_left", &self.tongue_left),
            ("tongue_right", &self.tongue_right),
            ("head_eating", &self.head_eating),
            ("head_dead", &self.head_dead),
            ("body", &self.body),
            ("tail", &self.tail),
            ("food", &self.food),
            ("boulder", &self.boulder),
            ("slab", &self.slab),
            ("pebble", &self.pebble),
            ("stump", &self.stump),
        ]
    }

    fn validate(&self) -> Result<(), SkinError> {
        for (name, glyph) in self.named() {
            let width = glyph.width();
            if width != usize::from(CELL_WIDTH) {
                return Err(SkinError::GlyphWidth {
                    name,
                    glyph: glyph.to_owned(),
                    width,
                    expected: CELL_WIDTH,
                });
            }
        }
        Ok(())
    }
}

/// Why a skin file could not be used.
#[derive(Debug, Error)]
pub enum SkinError {
    #[error("failed to read skin file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid skin file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("glyph `{name}` ({glyph:?}) is {width} columns wide; expected {expected}")]
    GlyphWidth {
        name: &'static str,
        glyph: String,
        width: usize,
        expected: u16,
    },
}

/// Sprite lookup resolved once per session.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum SpriteSet {
    #[default]
    Default,
    Custom(Box<SpriteGlyphs>),
}

impl SpriteSet {
    /// Resolves the skin at `path`, falling back to the built-in glyphs
    /// (with a warning) when it is missing or invalid.
    #[must_use]
    pub fn resolve(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::Default;
        };

        match Self::load(path) {
            Ok(set) => {
                info!(path = %path.display(), "custom skin loaded");
                set
            }
            Err(error) => {
                warn!(%error, "using default skin");
                Self::Default
            }
        }
    }

    /// Loads and validates a skin file.
    pub fn load(path: &Path) -> Result<Self, SkinError> {
        let raw = fs::read_to_string(path).map_err(|source| SkinError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &raw)
    }

    fn from_json(path: &Path, raw: &str) -> Result<Self, SkinError> {
        let glyphs = serde_json::from_str::<SpriteGlyphs>(raw).map_err(|source| {
            SkinError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        glyphs.validate()?;
        Ok(Self::Custom(Box::new(glyphs)))
    }

    #[must_use]
    pub fn glyph(&self, sprite: Sprite) -> &str {
        match self {
            Self::Default => default_glyph(sprite),
            Self::Custom(glyphs) => glyphs.get(sprite),
        }
    }
}

fn default_glyph(sprite: Sprite) -> &'static str {
    match sprite {
        Sprite::Head(Direction::Up) => "▲▲",
        Sprite::Head(Direction::Down) => "▼▼",
        Sprite::Head(Direction::Left) => "◂█",
        Sprite::Head(Direction::Right) => "█▸",
        Sprite::HeadTongue(Direction::Up) => "▲~",
        Sprite::HeadTongue(Direction::Down) => "▼~",
        Sprite::HeadTongue(Direction::Left) => "~█",
        Sprite::HeadTongue(Direction::Right) => "█~",
        Sprite::HeadEating => "◆◆",
        Sprite::HeadDead => "××",
        Sprite::Body => "██",
        Sprite::Tail => "▓▓",
        Sprite::Food => "()",
        Sprite::Obstacle(ObstacleKind::Boulder) => "██",
        Sprite::Obstacle(ObstacleKind::Slab) => "▆▆",
        Sprite::Obstacle(ObstacleKind::Pebble) => "▄▄",
        Sprite::Obstacle(ObstacleKind::Stump) => "╬╬",
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{SkinError, Sprite, SpriteGlyphs, SpriteSet};
    use crate::input::Direction;
    use crate::obstacle::ObstacleKind;

    #[test]
    fn default_glyphs_fit_one_cell() {
        assert!(SpriteGlyphs::default().validate().is_ok());
    }

    #[test]
    fn custom_skin_overrides_only_given_glyphs() {
        let set = SpriteSet::from_json(Path::new("skin.json"), r#"{ "food": "<>" }"#)
            .expect("skin should parse");

        assert_eq!(set.glyph(Sprite::Food), "<>");
        assert_eq!(
            set.glyph(Sprite::Head(Direction::Up)),
            SpriteSet::Default.glyph(Sprite::Head(Direction::Up))
        );
    }

    #[test]
    fn tongue_glyphs_can_be_overridden_per_direction() {
        let set = SpriteSet::from_json(Path::new("skin.json"), r#"{ "tongue_left": "<█" }"#)
            .expect("skin should parse");

        assert_eq!(set.glyph(Sprite::HeadTongue(Direction::Left)), "<█");
        assert_eq!(set.glyph(Sprite::HeadTongue(Direction::Right)), "█~");
    }

    #[test]
    fn wrong_width_glyph_is_rejected() {
        let result = SpriteSet::from_json(Path::new("skin.json"), r#"{ "pebble": "o" }"#);

        assert!(matches!(
            result,
            Err(SkinError::GlyphWidth { name: "pebble", width: 1, .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = SpriteSet::from_json(Path::new("skin.json"), r#"{ "mane": "~~" }"#);

        assert!(matches!(result, Err(SkinError::Parse { .. })));
    }

    #[test]
    fn missing_skin_falls_back_to_default() {
        let set = SpriteSet::resolve(Some(Path::new("/definitely/not/a/skin.json")));

        assert_eq!(set, SpriteSet::Default);
        assert_eq!(set.glyph(Sprite::Obstacle(ObstacleKind::Stump)), "╬╬");
    }
}
