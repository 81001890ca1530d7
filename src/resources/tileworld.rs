//! Tile grid shared by every actor in a level.
//!
//! A [`TileWorld`] is built once per level from a character grid and a
//! [`TilePalette`] mapping each symbol to a [`TileDescriptor`]. Cells hold
//! shared references to the palette entry, so every `'b'` in a map points at
//! the same descriptor. Systems treat the world as read-only during a tick.
//!
//! Lookups outside the grid resolve to the palette's boundary tile, which is
//! solid by default. This keeps actors from integrating past the world edge.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use glam::{IVec2, Vec2};
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length in pixels of the tiles used by the bundled levels.
pub const DEFAULT_TILE_SIZE: IVec2 = IVec2::new(50, 50);

/// Extra behavior attached to a tile beyond solidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFunction {
    #[default]
    None,
    /// Spawns a shelled enemy at this cell when the level loads.
    SpawnEnemy,
    /// Marks a collectible position.
    SpawnCollectible,
    /// Marks the player spawn.
    SpawnActor,
    /// Advances the level when the player crouches on it.
    AdvanceLevel,
}

/// Immutable description of one tile type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileDescriptor {
    #[serde(default)]
    pub solid: bool,
    #[serde(default)]
    pub lethal: bool,
    #[serde(default)]
    pub special: SpecialFunction,
    /// Symbol this tile is drawn as instead of its own, if any.
    #[serde(default)]
    pub remap: Option<char>,
}

impl TileDescriptor {
    pub fn solid() -> Self {
        Self {
            solid: true,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lethal(mut self) -> Self {
        self.lethal = true;
        self
    }

    pub fn with_special(mut self, special: SpecialFunction) -> Self {
        self.special = special;
        self
    }
}

/// Symbol table used when turning a character grid into a [`TileWorld`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilePalette {
    pub tiles: FxHashMap<char, TileDescriptor>,
    /// Tile returned for coordinates outside the grid.
    #[serde(default = "TileDescriptor::solid")]
    pub boundary: TileDescriptor,
}

impl Default for TilePalette {
    /// Symbols used by the bundled level files.
    fn default() -> Self {
        let mut tiles = FxHashMap::default();
        tiles.insert('a', TileDescriptor::empty()); // sign
        for stone in ['b', 'c', 'd', 'e', 'f'] {
            tiles.insert(stone, TileDescriptor::solid());
        }
        tiles.insert('g', TileDescriptor::empty());
        tiles.insert(' ', TileDescriptor::empty());
        tiles.insert('i', TileDescriptor::solid().lethal()); // spikes
        tiles.insert('j', TileDescriptor::empty()); // castle backdrop
        for bridge in ['h', 'k', 'q'] {
            tiles.insert(bridge, TileDescriptor::solid());
        }
        tiles.insert('w', TileDescriptor::solid().lethal()); // lava surface
        tiles.insert('x', TileDescriptor::solid().lethal()); // lava depth
        tiles.insert(
            '.',
            TileDescriptor::solid().with_special(SpecialFunction::AdvanceLevel),
        );
        tiles.insert(
            'l',
            TileDescriptor::empty().with_special(SpecialFunction::SpawnCollectible),
        );
        tiles.insert(
            'm',
            TileDescriptor::empty().with_special(SpecialFunction::SpawnEnemy),
        );
        tiles.insert(
            'p',
            TileDescriptor::empty().with_special(SpecialFunction::SpawnActor),
        );
        Self {
            tiles,
            boundary: TileDescriptor::solid(),
        }
    }
}

impl TilePalette {
    /// Parse a palette from its JSON form.
    ///
    /// ```json
    /// { "tiles": { "b": { "solid": true }, "w": { "solid": true, "lethal": true } } }
    /// ```
    pub fn from_json(text: &str) -> Result<Self, WorldLoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Add or replace a symbol.
    pub fn with_tile(mut self, symbol: char, tile: TileDescriptor) -> Self {
        self.tiles.insert(symbol, tile);
        self
    }
}

/// Reasons a level cannot be turned into a [`TileWorld`].
#[derive(Debug, Error)]
pub enum WorldLoadError {
    #[error("map contains no rows")]
    Empty,
    #[error("map row {row} is {actual} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tile palette: {0}")]
    Palette(#[from] serde_json::Error),
}

/// Loaded tile grid, addressed by integer grid coordinates.
#[derive(Resource, Debug, Clone)]
pub struct TileWorld {
    size: IVec2,
    tile_size: IVec2,
    cells: Vec<Arc<TileDescriptor>>,
    symbols: Vec<char>,
    boundary: Arc<TileDescriptor>,
}

impl TileWorld {
    /// Build a world from equally wide rows of palette symbols.
    pub fn from_rows<S: AsRef<str>>(
        rows: &[S],
        palette: &TilePalette,
        tile_size: IVec2,
    ) -> Result<Self, WorldLoadError> {
        let first = rows.first().ok_or(WorldLoadError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(WorldLoadError::Empty);
        }

        let shared: FxHashMap<char, Arc<TileDescriptor>> = palette
            .tiles
            .iter()
            .map(|(symbol, tile)| (*symbol, Arc::new(tile.clone())))
            .collect();

        let mut cells = Vec::with_capacity(width * rows.len());
        let mut symbols = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(WorldLoadError::RaggedRow {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let tile = shared
                    .get(&symbol)
                    .ok_or(WorldLoadError::UnknownSymbol { symbol, x, y })?;
                cells.push(Arc::clone(tile));
                symbols.push(symbol);
            }
        }

        let world = Self {
            size: IVec2::new(width as i32, rows.len() as i32),
            tile_size: tile_size.max(IVec2::ONE),
            cells,
            symbols,
            boundary: Arc::new(palette.boundary.clone()),
        };
        info!("Loaded map is {}x{} tiles", world.size.x, world.size.y);
        Ok(world)
    }

    /// Build a world from newline-separated rows. Trailing `\r` is ignored.
    pub fn parse(
        text: &str,
        palette: &TilePalette,
        tile_size: IVec2,
    ) -> Result<Self, WorldLoadError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        Self::from_rows(&rows, palette, tile_size)
    }

    /// Read and parse a level file.
    pub fn load(
        path: impl AsRef<Path>,
        palette: &TilePalette,
        tile_size: IVec2,
    ) -> Result<Self, WorldLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, palette, tile_size)
    }

    /// Grid dimensions in tiles.
    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn tile_size(&self) -> IVec2 {
        self.tile_size
    }

    pub fn contains(&self, coord: IVec2) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.size.x && coord.y < self.size.y
    }

    fn index(&self, coord: IVec2) -> Option<usize> {
        self.contains(coord)
            .then(|| (coord.y * self.size.x + coord.x) as usize)
    }

    /// Tile at a grid coordinate; the boundary tile when out of range.
    pub fn tile_at(&self, coord: IVec2) -> &TileDescriptor {
        match self.index(coord) {
            Some(i) => &*self.cells[i],
            None => &*self.boundary,
        }
    }

    /// Symbol the cell was loaded from, if the coordinate is inside the grid.
    pub fn symbol_at(&self, coord: IVec2) -> Option<char> {
        self.index(coord).map(|i| self.symbols[i])
    }

    /// World-space position to grid coordinate, flooring toward negative infinity.
    pub fn world_to_grid(&self, position: Vec2) -> IVec2 {
        IVec2::new(
            (position.x.floor() as i32).div_euclid(self.tile_size.x),
            (position.y.floor() as i32).div_euclid(self.tile_size.y),
        )
    }

    /// Top-left corner of a grid cell in world space.
    pub fn grid_to_world(&self, coord: IVec2) -> Vec2 {
        (coord * self.tile_size).as_vec2()
    }

    /// Shorthand for `tile_at(world_to_grid(position))`.
    pub fn tile_at_position(&self, position: Vec2) -> &TileDescriptor {
        self.tile_at(self.world_to_grid(position))
    }

    /// Cells whose tile carries a spawn or trigger function, in row-major order.
    pub fn special_cells(&self) -> impl Iterator<Item = (IVec2, SpecialFunction)> + '_ {
        let width = self.size.x;
        self.cells.iter().enumerate().filter_map(move |(i, tile)| {
            (tile.special != SpecialFunction::None).then(|| {
                let i = i as i32;
                (IVec2::new(i % width, i / width), tile.special)
            })
        })
    }

    /// Total height of the map in world units.
    pub fn pixel_height(&self) -> f32 {
        (self.size.y * self.tile_size.y) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TileWorld {
        let rows = ["g g g", "gpmgg", "bbbbb"];
        TileWorld::from_rows(&rows, &TilePalette::default(), DEFAULT_TILE_SIZE).unwrap()
    }

    #[test]
    fn test_tile_lookup_inside_grid() {
        let world = sample();
        assert!(!world.tile_at(IVec2::new(0, 0)).solid);
        assert!(world.tile_at(IVec2::new(2, 2)).solid);
        assert_eq!(world.size(), IVec2::new(5, 3));
    }

    #[test]
    fn test_out_of_range_is_solid_boundary() {
        let world = sample();
        assert!(world.tile_at(IVec2::new(-1, 0)).solid);
        assert!(world.tile_at(IVec2::new(0, -1)).solid);
        assert!(world.tile_at(IVec2::new(5, 0)).solid);
        assert!(world.tile_at(IVec2::new(0, 3)).solid);
    }

    #[test]
    fn test_world_to_grid_floors_toward_negative_infinity() {
        let world = sample();
        assert_eq!(world.world_to_grid(Vec2::new(0.0, 0.0)), IVec2::new(0, 0));
        assert_eq!(world.world_to_grid(Vec2::new(49.9, 50.0)), IVec2::new(0, 1));
        assert_eq!(world.world_to_grid(Vec2::new(-0.5, -1.0)), IVec2::new(-1, -1));
        assert_eq!(world.world_to_grid(Vec2::new(-50.0, -51.0)), IVec2::new(-1, -2));
    }

    #[test]
    fn test_cells_share_descriptors() {
        let world = sample();
        let a = world.index(IVec2::new(0, 2)).unwrap();
        let b = world.index(IVec2::new(4, 2)).unwrap();
        assert!(Arc::ptr_eq(&world.cells[a], &world.cells[b]));
    }

    #[test]
    fn test_special_cells_in_row_major_order() {
        let world = sample();
        let specials: Vec<_> = world.special_cells().collect();
        assert_eq!(
            specials,
            vec![
                (IVec2::new(1, 1), SpecialFunction::SpawnActor),
                (IVec2::new(2, 1), SpecialFunction::SpawnEnemy),
            ]
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = ["ggg", "gg"];
        let err = TileWorld::from_rows(&rows, &TilePalette::default(), DEFAULT_TILE_SIZE)
            .unwrap_err();
        assert!(matches!(
            err,
            WorldLoadError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let rows = ["g?g"];
        let err = TileWorld::from_rows(&rows, &TilePalette::default(), DEFAULT_TILE_SIZE)
            .unwrap_err();
        assert!(matches!(
            err,
            WorldLoadError::UnknownSymbol {
                symbol: '?',
                x: 1,
                y: 0
            }
        ));
    }

    #[test]
    fn test_empty_map_rejected() {
        let rows: [&str; 0] = [];
        assert!(matches!(
            TileWorld::from_rows(&rows, &TilePalette::default(), DEFAULT_TILE_SIZE),
            Err(WorldLoadError::Empty)
        ));
    }

    #[test]
    fn test_palette_from_json() {
        let palette = TilePalette::from_json(
            r##"{ "tiles": { "#": { "solid": true, "lethal": true }, ".": {} } }"##,
        )
        .unwrap();
        assert!(palette.tiles[&'#'].lethal);
        assert!(!palette.tiles[&'.'].solid);
        assert!(palette.boundary.solid);

        let world = TileWorld::parse("..\n##\n", &palette, IVec2::new(16, 16)).unwrap();
        assert!(world.tile_at_position(Vec2::new(17.0, 20.0)).lethal);
    }

    #[test]
    fn test_palette_json_error_surfaces() {
        assert!(matches!(
            TilePalette::from_json("{ not json"),
            Err(WorldLoadError::Palette(_))
        ));
    }
}
