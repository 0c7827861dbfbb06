use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tile code for walkable floor.
pub const FLOOR: char = '.';

pub const DEFAULT_WIDTH: usize = 24;
pub const DEFAULT_HEIGHT: usize = 24;

// top-down view, row 0 first
const DEFAULT_ROWS: [&str; DEFAULT_HEIGHT] = [
    "########################",
    "#...#==================#",
    "#...#=....==..........=#",
    "#.........==.....=....=#",
    "#...#=....==.....=....=#",
    "#...#=....==.....=....=#",
    "#...#=======..======.==#",
    "#...########..######.###",
    "#......................#",
    "#...################...#",
    "#.............#....#...#",
    "#####.#######.#....#...#",
    "#MMMM.MMMMNNN.N.NN.#...#",
    "#M.......MNNN....N.#...#",
    "#M.8..8..MN......N.#...#",
    "#M.......MN......N.#...#",
    "#M.8..8..MNNNNNNNN.#...#",
    "#MMMMMMMMM.........#...#",
    "##########.#########...#",
    "#......................#",
    "#!!!!.!!!!!!!!!!!!!!!!!#",
    "#..........!...........#",
    "#......................^",
    "########################",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Every channel halved, used for the darker wall side.
    pub const fn halved(self) -> Self {
        Self::new(self.r / 2, self.g / 2, self.b / 2)
    }

    /// 0x00RRGGBB, the layout softbuffer expects.
    #[inline]
    pub const fn pack(self) -> u32 {
        (self.b as u32) | ((self.g as u32) << 8) | ((self.r as u32) << 16)
    }
}

/// The registered wall kinds. The discriminant indexes the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallKind {
    Stone,
    Brick,
    Violet,
    Moss,
    Granite,
    Marble,
    Exit,
}

impl WallKind {
    pub const COUNT: usize = 7;

    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            '#' => WallKind::Stone,
            '=' => WallKind::Brick,
            'M' => WallKind::Violet,
            'N' => WallKind::Moss,
            '8' => WallKind::Granite,
            '!' => WallKind::Marble,
            '^' => WallKind::Exit,
            _ => return None,
        })
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall(WallKind),
}

impl Tile {
    pub fn from_code(code: char) -> Option<Self> {
        if code == FLOOR {
            Some(Tile::Floor)
        } else {
            WallKind::from_code(code).map(Tile::Wall)
        }
    }

    #[inline]
    pub fn is_floor(self) -> bool {
        self == Tile::Floor
    }
}

/// Base color per wall kind, indexed directly by the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallPalette {
    colors: [Rgb; WallKind::COUNT],
}

impl WallPalette {
    #[inline]
    pub fn color(&self, kind: WallKind) -> Rgb {
        self.colors[kind.index()]
    }
}

impl Default for WallPalette {
    fn default() -> Self {
        Self {
            colors: [
                Rgb::new(0x80, 0x80, 0x80),
                Rgb::new(0x5E, 0x26, 0x12),
                Rgb::new(0x80, 0x00, 0xFF),
                Rgb::new(0x80, 0xFF, 0x00),
                Rgb::new(0x83, 0x7E, 0x7C),
                Rgb::new(0xFF, 0xFF, 0xFF),
                Rgb::new(0xFC, 0x15, 0x01),
            ],
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map has {actual} cells, expected width * height = {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("map dimensions {width}x{height} are too large")]
    TooLarge { width: usize, height: usize },

    #[error("map tile at [{x:3},{y:3}] has an unknown tile type ({code:?})")]
    UnknownTile { x: usize, y: usize, code: char },

    #[error("map edge at [{x:3},{y:3}] is a floor (should be wall)")]
    OpenBoundary { x: usize, y: usize },
}

/// Raw character grid as authored, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSource {
    pub width: usize,
    pub height: usize,
    /// Rows top to bottom. Only the concatenation matters, so a grid may
    /// also be supplied as a single string.
    pub rows: Vec<String>,
}

impl MapSource {
    fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.rows.iter().flat_map(|row| row.chars())
    }

    /// Checks the cell count, then walks the grid row-major and reports the
    /// first unknown code or open boundary cell.
    pub fn validate(&self) -> Result<(), MapError> {
        let expected = self
            .width
            .checked_mul(self.height)
            .ok_or(MapError::TooLarge {
                width: self.width,
                height: self.height,
            })?;
        let actual = self.codes().count();
        if actual != expected {
            return Err(MapError::SizeMismatch { expected, actual });
        }

        for (i, code) in self.codes().enumerate() {
            let (x, y) = (i % self.width, i / self.width);
            let tile = Tile::from_code(code).ok_or(MapError::UnknownTile { x, y, code })?;
            let on_edge = x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1;
            if on_edge && tile.is_floor() {
                return Err(MapError::OpenBoundary { x, y });
            }
        }
        Ok(())
    }
}

impl Default for MapSource {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rows: DEFAULT_ROWS.iter().map(|row| row.to_string()).collect(),
        }
    }
}

/// Validated, immutable tile grid. Every boundary cell is a wall, so
/// anything walking from an interior cell hits a wall before leaving.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl GridMap {
    pub fn load(source: &MapSource) -> Result<Self, MapError> {
        source.validate()?;
        let tiles = source.codes().filter_map(Tile::from_code).collect();
        Ok(Self {
            width: source.width,
            height: source.height,
            tiles,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Caller keeps `x < width` and `y < height`.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        debug_assert!(x < self.width && y < self.height, "tile [{x},{y}] off map");
        self.tiles[y * self.width + x]
    }

    #[inline]
    pub fn is_floor(&self, x: usize, y: usize) -> bool {
        self.tile_at(x, y).is_floor()
    }
}

/// Grid map plus wall palette, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct World {
    pub map: GridMap,
    pub palette: WallPalette,
}

impl World {
    pub fn new(map: GridMap, palette: WallPalette) -> Self {
        Self { map, palette }
    }
}
