// Grid
pub const DEFAULT_GRID_WIDTH: i32 = 20;
pub const DEFAULT_GRID_HEIGHT: i32 = 30;
pub const INITIAL_SNAKE_LENGTH: usize = 3;

// Timers
pub const POWER_UP_POLL_MS: u64 = 100;
pub const SYNC_DEBOUNCE_MS: u64 = 2_000;
pub const STORAGE_PROBE_TIMEOUT_MS: u64 = 1_000;
pub const STORAGE_FLUSH_TIMEOUT_MS: u64 = 2_000;
/// Host loop sleep between polls in the binaries.
pub const HOST_POLL_MS: u64 = 16;

// Food placement
pub const FOOD_PLACEMENT_ATTEMPTS: u32 = 100;
pub const FOOD_MARGIN_RATIO: f64 = 0.1;
pub const FOOD_MARGIN_MIN: i32 = 1;
pub const FOOD_MARGIN_MAX: i32 = 3;

// Milestone food (every Nth fruit eaten)
pub const RUBY_EVERY: u32 = 15;
pub const EMERALD_EVERY: u32 = 30;
pub const DIAMOND_EVERY: u32 = 50;

// Economy
pub const LEVEL_2_COST: u32 = 50;
pub const LEVEL_3_COST: u32 = 150;
/// (hearts, gem cost)
pub const HEART_BUNDLES: [(u32, u32); 3] = [(1, 20), (3, 50), (5, 75)];

// Continue-with-heart
pub const CONTINUE_IMMUNITY_MS: u64 = 3_000;

// Level 3 obstacles
pub const OBSTACLE_BAR_WIDTH_RATIO: f64 = 0.4;
pub const OBSTACLE_BAR_ROW_OFFSET: i32 = 3;
pub const OBSTACLE_CORNER_INSET: i32 = 1;
pub const OBSTACLE_CORNER_ARM_X: i32 = 6;
pub const OBSTACLE_CORNER_ARM_Y: i32 = 10;

// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://api.snake-arcade.app/api";
pub const HTTP_TIMEOUT_SECONDS: u64 = 10;
