pub mod config;
pub mod params;
pub mod session;

pub use config::AppConfig;
pub use params::{
    clamp_gauge, clamp_zoom, DisplayParams, GenerationParams, ParamsPatch, CELL_SIZE,
    MAX_COLORS, MAX_GAUGE, MAX_GRID_HEIGHT, MAX_GRID_WIDTH, MAX_ZOOM, MIN_CELL_HEIGHT,
    MIN_COLORS, MIN_GAUGE, MIN_GRID_WIDTH, MIN_ZOOM,
};
pub use session::{SessionId, SessionRecord};
