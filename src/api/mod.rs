pub mod grid;
pub mod palette;
pub mod session;

use utoipa::OpenApi;

pub use grid::{__path_get_grid, __path_get_grid_png, __path_paint_cell, __path_region_replace};
pub use grid::{
    get_grid, get_grid_png, paint_cell, region_replace, GridResponse, PaintCellRequest,
    RegionReplaceRequest,
};
pub use palette::{
    __path_delete_color, __path_get_clusters, __path_get_palette, __path_merge_colors,
    __path_replace_color, __path_simplify, __path_simplify_bw,
};
pub use palette::{
    delete_color, get_clusters, get_palette, merge_colors, replace_color, simplify, simplify_bw,
    ClustersResponse, ColorDeleteRequest, ColorMergeRequest, ColorReplaceRequest, EditResponse,
    SimplifyBwResponse, SimplifyRequest, DEFAULT_CLUSTER_THRESHOLD,
};
pub use session::{
    __path_create_session, __path_generate, __path_row_at, __path_undo, __path_update_params,
    __path_upload_image,
};
pub use session::{
    create_session, generate, row_at, undo, update_params, upload_image, GenerateResponse,
    MessageResponse, RowAtRequest, RowAtResponse, SessionResponse, UndoResponse,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stitchgrid API",
        description = "Turn photos into editable knitting and crochet charts",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        create_session,
        upload_image,
        generate,
        update_params,
        undo,
        row_at,
        get_palette,
        replace_color,
        delete_color,
        merge_colors,
        get_clusters,
        simplify,
        simplify_bw,
        paint_cell,
        region_replace,
        get_grid,
        get_grid_png,
    ),
    components(schemas(
        SessionResponse,
        MessageResponse,
        GenerateResponse,
        UndoResponse,
        RowAtRequest,
        RowAtResponse,
        crate::models::ParamsPatch,
        crate::chart::PaletteUsage,
        EditResponse,
        ColorReplaceRequest,
        ColorDeleteRequest,
        ColorMergeRequest,
        SimplifyRequest,
        SimplifyBwResponse,
        ClustersResponse,
        PaintCellRequest,
        RegionReplaceRequest,
        GridResponse,
    )),
    tags(
        (name = "Session", description = "Session lifecycle, source image and parameters"),
        (name = "Palette", description = "Palette inspection and color edits"),
        (name = "Grid", description = "Cell edits and chart rendering")
    )
)]
pub struct ApiDoc;
