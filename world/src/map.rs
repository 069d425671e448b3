//! Tile map storage, parsing and drawing.

use bastion_core::{
    render::{Canvas, Rect, Rgba, TextureHandle, TextureService},
    GridCoord, ResourceError,
};
use thiserror::Error;

use crate::config::SpritePaths;

/// Number of tile rows in a map.
pub const MAP_ROWS: usize = 20;
/// Number of tile columns in a map.
pub const MAP_COLUMNS: usize = 25;

/// Walkable grass.
pub const GRASS: u8 = 0;
/// Path lane.
pub const PATH: u8 = 1;
/// Decorative water.
pub const WATER: u8 = 2;

/// Failure to parse a textual map description.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapParseError {
    /// The description does not contain exactly [`MAP_ROWS`] rows.
    #[error("expected {MAP_ROWS} rows, found {found}")]
    RowCount {
        /// Number of non-empty rows found.
        found: usize,
    },
    /// A row does not contain exactly [`MAP_COLUMNS`] codes.
    #[error("row {row}: expected {MAP_COLUMNS} columns, found {found}")]
    ColumnCount {
        /// Zero-based row index.
        row: usize,
        /// Number of codes found in the row.
        found: usize,
    },
    /// A token is not a tile code.
    #[error("row {row}, column {column}: invalid tile code `{token}`")]
    InvalidCode {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending token.
        token: String,
    },
}

/// Fixed-size grid of tile codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    codes: [[u8; MAP_COLUMNS]; MAP_ROWS],
}

impl TileMap {
    /// Creates a map from raw row-major codes.
    #[must_use]
    pub const fn from_rows(codes: [[u8; MAP_COLUMNS]; MAP_ROWS]) -> Self {
        Self { codes }
    }

    /// Creates an all-grass map crossed by a single horizontal path row.
    #[must_use]
    pub fn flat_with_path(path_row: u32) -> Self {
        let mut codes = [[GRASS; MAP_COLUMNS]; MAP_ROWS];
        if let Some(row) = codes.get_mut(path_row as usize) {
            *row = [PATH; MAP_COLUMNS];
        }
        Self { codes }
    }

    /// Parses a textual map: one line per row, codes separated by
    /// whitespace or commas. Blank lines and lines starting with `#` are
    /// skipped.
    pub fn parse(source: &str) -> Result<Self, MapParseError> {
        let rows: Vec<&str> = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        if rows.len() != MAP_ROWS {
            return Err(MapParseError::RowCount { found: rows.len() });
        }

        let mut codes = [[GRASS; MAP_COLUMNS]; MAP_ROWS];
        for (row, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .collect();

            if tokens.len() != MAP_COLUMNS {
                return Err(MapParseError::ColumnCount {
                    row,
                    found: tokens.len(),
                });
            }

            for (column, token) in tokens.iter().enumerate() {
                codes[row][column] =
                    token
                        .parse::<u8>()
                        .map_err(|_| MapParseError::InvalidCode {
                            row,
                            column,
                            token: (*token).to_owned(),
                        })?;
            }
        }

        Ok(Self { codes })
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        MAP_COLUMNS as u32
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        MAP_ROWS as u32
    }

    /// Reports whether `cell` lies inside the map.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.column() < self.columns() && cell.row() < self.rows()
    }

    /// Tile code stored at `cell`.
    #[must_use]
    pub fn code(&self, cell: GridCoord) -> Option<u8> {
        self.codes
            .get(cell.row() as usize)
            .and_then(|row| row.get(cell.column() as usize))
            .copied()
    }
}

/// Tile textures owned by a level.
#[derive(Debug)]
pub struct TileAtlas {
    grass: TextureHandle,
    path: TextureHandle,
    water: Option<TextureHandle>,
}

impl TileAtlas {
    /// Loads the tile textures.
    ///
    /// The grass and path textures are mandatory and their failure is
    /// returned. A missing water texture is logged and tolerated.
    pub fn load(
        textures: &mut dyn TextureService,
        sprites: &SpritePaths,
    ) -> Result<Self, ResourceError> {
        let grass = textures.load(&sprites.grass)?;
        let path = match textures.load(&sprites.path) {
            Ok(handle) => handle,
            Err(error) => {
                textures.release(grass);
                return Err(error);
            }
        };
        let water = match textures.load(&sprites.water) {
            Ok(handle) => Some(handle),
            Err(error) => {
                log::warn!("Water texture missing. Proceeding without it. ({error})");
                None
            }
        };

        Ok(Self { grass, path, water })
    }

    /// Reports whether the optional water texture is available.
    #[must_use]
    pub const fn has_water(&self) -> bool {
        self.water.is_some()
    }

    /// Hands every texture back to `textures`.
    pub fn release(self, textures: &mut dyn TextureService) {
        textures.release(self.grass);
        textures.release(self.path);
        if let Some(water) = self.water {
            textures.release(water);
        }
    }

    /// Draws every tile of `map`. Unknown codes and water without a
    /// texture draw as grass.
    pub fn draw(&self, map: &TileMap, canvas: &mut dyn Canvas, tile_size: f32) {
        for (row, codes) in map.codes.iter().enumerate() {
            for (column, code) in codes.iter().enumerate() {
                let texture = match *code {
                    PATH => self.path,
                    WATER => self.water.unwrap_or(self.grass),
                    _ => self.grass,
                };
                let dest = Rect::new(
                    column as f32 * tile_size,
                    row as f32 * tile_size,
                    tile_size,
                    tile_size,
                );
                canvas.draw_texture(texture, dest, Rgba::WHITE);
            }
        }
    }
}
