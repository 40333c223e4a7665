//! Application-wide constants
//!
//! Timer periods, edge thresholds, file names and default payloads used
//! across the widget shell.

/// Data directory layout
pub mod paths {
    /// Directory name under the platform data dir
    pub const APP_DIR: &str = "sticky-widgets";

    /// Fallback data directory when no platform data dir is available
    pub const FALLBACK_DATA_DIR: &str = "data";

    /// Subdirectory holding HTML widget configs
    pub const HTML_DIR: &str = "note/html";

    /// Subdirectory holding Markdown widget configs
    pub const MARKDOWN_DIR: &str = "note/md";

    /// Quick-launch bar config file
    pub const LAUNCHER_FILE: &str = "qs.json";

    /// Feature toggles file
    pub const APP_SETTINGS_FILE: &str = "app.json";

    /// Extension of per-instance config files
    pub const CONFIG_EXTENSION: &str = "json";

    /// Extension used for in-flight atomic writes
    pub const TEMP_EXTENSION: &str = "json.tmp";

    /// Extension of settings editor outcome files
    pub const OUTCOME_EXTENSION: &str = "outcome";
}

/// Widget instance behavior
pub mod widget {
    /// Autosave period per instance
    pub const AUTOSAVE_INTERVAL_MS: u64 = 3000;

    /// Content wider than this wraps
    pub const MAX_CONTENT_WIDTH: u32 = 800;

    /// Inner padding between window edge and content
    pub const CONTENT_PADDING: u32 = 15;

    /// Position used for freshly created instances
    pub const DEFAULT_X: i32 = 100;
    pub const DEFAULT_Y: i32 = 100;

    pub const HTML_SEED_CONTENT: &str = "<h1>这是一个示例html小组件</h1>";
    pub const HTML_NEW_CONTENT: &str = "<h1>Hello World!</h1>";
    pub const MARKDOWN_SEED_CONTENT: &str = "这是一个示例Markdown小组件";
    pub const MARKDOWN_NEW_CONTENT: &str = "F**k the rules——《海上钢琴师》";
}

/// Edge snapping and auto-hide
pub mod snap {
    /// A window whose left edge is at or left of this x is on the left edge
    pub const LEFT_THRESHOLD: i32 = 10;

    /// Distance from the right/bottom work-area edge that counts as touching it
    pub const FAR_EDGE_THRESHOLD: i32 = 15;

    /// Width of the sliver left visible when hidden
    pub const HIDDEN_SLIVER: i32 = 10;

    /// Idle time on an edge before sliding out of view
    pub const INACTIVITY_TIMEOUT_MS: u64 = 1000;

    pub const POSITION_SAMPLE_MS: u64 = 5000;
    pub const FULLSCREEN_SAMPLE_MS: u64 = 1000;
    pub const INACTIVITY_SAMPLE_MS: u64 = 200;
    pub const CURSOR_SAMPLE_MS: u64 = 200;

    /// Slide animation duration
    pub const ANIMATION_MS: u64 = 180;
}

/// Quick-launch bar layout
pub mod launcher {
    pub const MAX_APPS: usize = 5;

    /// Horizontal space taken by one app slot
    pub const SLOT_WIDTH: u32 = 70;

    /// Left margin before the first slot
    pub const SLOT_MARGIN: u32 = 10;

    /// Extra width beyond the slots
    pub const BAR_PADDING: u32 = 20;

    pub const BAR_HEIGHT: u32 = 100;
    pub const EMPTY_WIDTH: u32 = 150;
    pub const EMPTY_HEIGHT: u32 = 90;

    /// Vertical band of the bar occupied by the app buttons
    pub const BUTTON_ROW_TOP: i32 = 30;
    pub const BUTTON_ROW_BOTTOM: i32 = 80;

    /// Top of the title line
    pub const TITLE_TOP: i32 = 6;

    /// Label offset inside its slot
    pub const LABEL_INSET: i32 = 4;
    pub const LABEL_TOP: i32 = 16;

    /// Top of the status line, below the buttons
    pub const STATUS_TOP: i32 = 82;

    pub const DEFAULT_OPACITY: f32 = 0.9;
    pub const DEFAULT_X: i32 = 0;
    pub const DEFAULT_Y: i32 = 878;

    pub const TITLE: &str = "快速启动";

    pub const DEFAULT_FULLSCREEN_KEYWORDS: &[&str] = &[
        "PowerPoint ",
        "WPS Presentation Slide Show",
        "希沃白板",
        "Microsoft Edge",
    ];
}

/// Fullscreen exam-mode screen
pub mod exam {
    pub const CAPTION: &str = "考试模式";

    /// Caption size in pixels (25pt)
    pub const FONT_SIZE: f32 = 33.0;

    /// Opaque black (ARGB)
    pub const BACKGROUND: u32 = 0xFF00_0000;

    /// White caption (ARGB)
    pub const FOREGROUND: u32 = 0xFFFF_FFFF;
}

/// Pointer interaction
pub mod mouse {
    /// Left mouse button number
    pub const BUTTON_LEFT: u8 = 1;

    /// Right mouse button number
    pub const BUTTON_RIGHT: u8 = 3;

    /// Movement (px) below which a press/release pair is a click
    pub const CLICK_SLOP: i32 = 3;
}

/// Run loop pacing
pub mod event_loop {
    /// Sleep bound while an animation is in flight (~60 fps)
    pub const FRAME_MS: u64 = 16;

    /// Sleep bound while idle
    pub const IDLE_MS: u64 = 50;
}

/// X11 protocol constants
pub mod x11 {
    /// ARGB color depth (32-bit: 8 bits each for Alpha, Red, Green, Blue)
    pub const ARGB_DEPTH: u8 = 32;

    /// Override redirect flag for unmanaged windows
    pub const OVERRIDE_REDIRECT: u32 = 1;

    /// WM_CLASS value (instance\0class\0)
    pub const WM_CLASS: &[u8] = b"sticky-widgets\0sticky-widgets\0";
}

/// Default presentation
pub mod presentation {
    /// Semi-transparent white card (ARGB)
    pub const BACKGROUND: u32 = 0xC8FF_FFFF;

    /// Black text (ARGB)
    pub const FOREGROUND: u32 = 0xFF00_0000;

    /// Body text size in pixels
    pub const FONT_SIZE: f32 = 14.0;

    /// Font family looked up through fontconfig
    pub const FONT_FAMILY: &str = "Microsoft YaHei";
}
