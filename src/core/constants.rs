//! Engine-wide constants: the initial view, the dataset query, the style
//! assets and the cluster defaults. Keeping them in a single place makes it
//! easier to tweak the map without hunting through the components.

/// Initial map center, San Francisco Mission district.
pub const DEFAULT_CENTER: (f64, f64) = (37.75846, -122.42347);

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 12.47;

/// DOM container id handed to the renderer.
pub const DEFAULT_CONTAINER: &str = "map";

/// Square tile size in pixels used by vector-tile renderers.
pub const TILE_SIZE: f64 = 512.0;

/// Highest zoom level the camera accepts.
pub const MAX_ZOOM: f64 = 22.0;

/// Steepest camera pitch in degrees.
pub const MAX_PITCH: f64 = 60.0;

/// Environment variable holding the renderer access token.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Styles API used to resolve `mapbox://styles/...` URLs.
pub const STYLES_API: &str = "https://api.mapbox.com/styles/v1";

/// Street and sidewalk cleaning reports, GeoJSON export.
pub const DATASET_URL: &str = "https://data.sfgov.org/resource/aqnm-j7pg.geojson";

/// Row filter applied server side.
pub const DATASET_FILTER: &str = "_251_feces_needles_condoms_y_n_where_y_none >= 0";

/// Hard cap on fetched records.
pub const MAX_RECORDS: usize = 10_000;

/// Elevation tiles feeding the hillshade layer.
pub const TERRAIN_URL: &str = "mapbox://mapbox.terrain-rgb";

/// Source id of the elevation tiles.
pub const TERRAIN_SOURCE_ID: &str = "dem";

/// Layer id of the shaded relief.
pub const HILLSHADE_LAYER_ID: &str = "hillshading";

/// Layer id of the building extrusions.
pub const BUILDINGS_LAYER_ID: &str = "3d-buildings";

/// Source id of the report collection.
pub const REPORTS_SOURCE_ID: &str = "reports";

/// Layer ids declared by the cluster presenter.
pub const CLUSTERS_LAYER_ID: &str = "clusters";
pub const CLUSTER_COUNT_LAYER_ID: &str = "cluster-count";
pub const UNCLUSTERED_LAYER_ID: &str = "unclustered-point";

/// Default clustering thresholds.
pub const DEFAULT_CLUSTER_MAX_ZOOM: u8 = 13;
pub const DEFAULT_CLUSTER_RADIUS: f64 = 20.0;

/// Display hints written onto every normalized record.
pub const MARKER_COLOR_KEY: &str = "marker-color";
pub const MARKER_COLOR: &str = "#0000ff";
pub const LINE_KEY: &str = "line";
pub const LINE_COLOR: &str = "blue";
